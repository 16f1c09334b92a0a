//! Tier 5: semantic integrity.
//!
//! Checks that survive a structurally sound graph: options with no lever on
//! the goal, options that are the same intervention under different names,
//! dangling intervention keys, factors that merely restate the goal, and
//! option->factor edges that carry estimated rather than canonical values.

use std::collections::BTreeMap;

use serde_json::json;

use crate::graph::{Edge, EffectDirection, FactorCategory, NodeKind};
use crate::issue::{edge_path, node_path, IssueCode, ValidationIssue};
use crate::traverse::{reachable, Direction};

use super::label::LabelHeuristic;
use super::{unique_nodes, TierContext};

/// Canonical signature of an intervention map.
///
/// Each entry renders as `factor_id:value` with the value fixed to four
/// decimals; entries are sorted and joined with `|`. Two options with the
/// same signature set the same factors to the same values.
#[must_use]
pub fn intervention_signature(interventions: &BTreeMap<String, f64>) -> String {
    let mut parts: Vec<String> = interventions
        .iter()
        .map(|(id, value)| {
            let rounded = (value * 1e4).round() / 1e4;
            // Avoid "-0.0000" for values that round to zero from below.
            let rounded = if rounded == 0.0 { 0.0 } else { rounded };
            format!("{id}:{rounded:.4}")
        })
        .collect();
    parts.sort();
    parts.join("|")
}

fn no_effect_path(ctx: &TierContext<'_>, issues: &mut Vec<ValidationIssue>) {
    let goals = ctx.index.of_kind(NodeKind::Goal);
    if goals.is_empty() {
        return;
    }
    let to_goal = reachable(
        &ctx.index,
        goals.iter().map(|n| n.id.as_str()),
        Direction::Reverse,
    );

    for option in ctx.index.of_kind(NodeKind::Option) {
        let downstream = reachable(&ctx.index, [option.id.as_str()], Direction::Forward);
        let has_lever = downstream
            .iter()
            .any(|id| ctx.categories.is_controllable(id) && to_goal.contains(id));
        if !has_lever {
            issues.push(
                ValidationIssue::error(
                    IssueCode::NoEffectPath,
                    format!(
                        "Option '{}' reaches no controllable factor with a path to the goal",
                        option.id
                    ),
                )
                .at(node_path(&option.id)),
            );
        }
    }
}

fn options_identical(ctx: &TierContext<'_>, issues: &mut Vec<ValidationIssue>) {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (_, node) in unique_nodes(ctx.graph).filter(|(_, n)| n.kind == NodeKind::Option) {
        let Some(interventions) = node.interventions().filter(|m| !m.is_empty()) else {
            continue;
        };
        groups
            .entry(intervention_signature(interventions))
            .or_default()
            .push(node.id.clone());
    }

    for (signature, mut ids) in groups {
        if ids.len() < 2 {
            continue;
        }
        ids.sort();
        issues.push(
            ValidationIssue::error(
                IssueCode::OptionsIdentical,
                format!("Options {} set identical interventions", ids.join(", ")),
            )
            .with_context(json!({ "option_ids": ids, "signature": signature })),
        );
    }
}

fn intervention_refs(ctx: &TierContext<'_>, issues: &mut Vec<ValidationIssue>) {
    for (_, node) in unique_nodes(ctx.graph).filter(|(_, n)| n.kind == NodeKind::Option) {
        let Some(interventions) = node.interventions() else {
            continue;
        };
        for key in interventions.keys() {
            if ctx.index.kind_of(key) == Some(NodeKind::Factor) {
                continue;
            }
            issues.push(
                ValidationIssue::error(
                    IssueCode::InvalidInterventionRef,
                    format!(
                        "Option '{}' intervenes on '{key}', which is not a factor",
                        node.id
                    ),
                )
                .at(format!("{}.data.interventions.{key}", node_path(&node.id)))
                .with_context(json!({ "option_id": node.id, "factor_id": key })),
            );
        }
    }
}

fn goal_numbers(
    ctx: &TierContext<'_>,
    heuristic: &dyn LabelHeuristic,
    issues: &mut Vec<ValidationIssue>,
) {
    for (_, node) in unique_nodes(ctx.graph).filter(|(_, n)| n.kind == NodeKind::Factor) {
        let controllable = ctx.categories.is_controllable(&node.id)
            || node.declared_category() == Some(FactorCategory::Controllable);
        if controllable || !heuristic.looks_like_goal_number(&node.label) {
            continue;
        }
        issues.push(
            ValidationIssue::error(
                IssueCode::GoalNumberAsFactor,
                format!(
                    "Factor '{}' ({}) restates the goal target instead of a causal variable",
                    node.id, node.label
                ),
            )
            .at(node_path(&node.id))
            .with_context(json!({ "label": node.label, "heuristic": heuristic.name() })),
        );
    }
}

fn exactly(value: Option<f64>, expected: f64) -> bool {
    value.is_some_and(|v| (v - expected).abs() <= f64::EPSILON)
}

fn canonical_deviations(edge: &Edge) -> Vec<&'static str> {
    let mut out = Vec::new();
    if !exactly(edge.strength_mean, Edge::CANONICAL_MEAN) {
        out.push("strength_mean");
    }
    if !exactly(edge.strength_std, Edge::CANONICAL_STD) {
        out.push("strength_std");
    }
    if !exactly(edge.belief_exists, Edge::CANONICAL_BELIEF) {
        out.push("belief_exists");
    }
    if edge.direction() != Some(EffectDirection::Positive) {
        out.push("effect_direction");
    }
    out
}

fn canonical_option_edges(ctx: &TierContext<'_>, issues: &mut Vec<ValidationIssue>) {
    for (i, edge) in ctx.graph.edges.iter().enumerate() {
        let shape = (ctx.index.kind_of(&edge.from), ctx.index.kind_of(&edge.to));
        if shape != (Some(NodeKind::Option), Some(NodeKind::Factor)) {
            continue;
        }
        let deviations = canonical_deviations(edge);
        if deviations.is_empty() {
            continue;
        }
        issues.push(
            ValidationIssue::error(
                IssueCode::StructuralEdgeNotCanonicalError,
                format!(
                    "Option edge {} must carry mean=1, std=0.01, belief=1, positive; deviates in {}",
                    edge.label(),
                    deviations.join(", ")
                ),
            )
            .at(edge_path(i))
            .with_context(json!({
                "edge": edge.label(),
                "deviations": deviations,
                "strength_mean": edge.strength_mean,
                "strength_std": edge.strength_std,
                "belief_exists": edge.belief_exists,
            })),
        );
    }
}

pub(crate) fn check(ctx: &TierContext<'_>, heuristic: &dyn LabelHeuristic) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    no_effect_path(ctx, &mut issues);
    options_identical(ctx, &mut issues);
    intervention_refs(ctx, &mut issues);
    goal_numbers(ctx, heuristic, &mut issues);
    canonical_option_edges(ctx, &mut issues);
    issues
}
