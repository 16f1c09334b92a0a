//! Non-blocking advisories.

use serde_json::json;

use crate::config::{StructuralEdgeTolerance, WarningThresholds};
use crate::graph::{Edge, EffectDirection, NodeKind};
use crate::issue::{edge_path, node_path, IssueCode, ValidationIssue};
use crate::matrix;

use super::{unique_nodes, TierContext};

fn near(value: Option<f64>, expected: f64, epsilon: f64) -> bool {
    value.map_or(true, |v| (v - expected).abs() <= epsilon)
}

/// Fields of a structural edge that fail the tolerant check. Absent fields pass.
fn structural_deviations(edge: &Edge, tol: &StructuralEdgeTolerance) -> Vec<&'static str> {
    let mut out = Vec::new();
    if !near(edge.strength_mean, Edge::CANONICAL_MEAN, tol.epsilon) {
        out.push("strength_mean");
    }
    if edge.strength_std.is_some_and(|s| s > tol.max_std) {
        out.push("strength_std");
    }
    if !near(edge.belief_exists, Edge::CANONICAL_BELIEF, tol.epsilon) {
        out.push("belief_exists");
    }
    if edge
        .effect_direction
        .as_ref()
        .is_some_and(|d| d.known() != Some(EffectDirection::Positive))
    {
        out.push("effect_direction");
    }
    out
}

fn edge_warnings(
    i: usize,
    edge: &Edge,
    kinds: (Option<NodeKind>, Option<NodeKind>),
    ctx: &TierContext<'_>,
    out: &mut Vec<ValidationIssue>,
) {
    let w: &WarningThresholds = &ctx.config.warnings;
    let label = edge.label();

    if let Some(mean) = edge.strength_mean {
        if mean < w.min_strength || mean > w.max_strength {
            out.push(
                ValidationIssue::warn(
                    IssueCode::StrengthOutOfRange,
                    format!(
                        "Edge {label} strength_mean {mean} is outside [{}, {}]",
                        w.min_strength, w.max_strength
                    ),
                )
                .at(edge_path(i))
                .with_context(json!({ "strength_mean": mean })),
            );
        }
        match kinds {
            (Some(NodeKind::Outcome), Some(NodeKind::Goal)) if mean < 0.0 => out.push(
                ValidationIssue::warn(
                    IssueCode::OutcomeNegativePolarity,
                    format!("Outcome edge {label} into the goal has negative strength {mean}"),
                )
                .at(edge_path(i))
                .with_context(json!({ "strength_mean": mean })),
            ),
            (Some(NodeKind::Risk), Some(NodeKind::Goal)) if mean > 0.0 => out.push(
                ValidationIssue::warn(
                    IssueCode::RiskPositivePolarity,
                    format!("Risk edge {label} into the goal has positive strength {mean}"),
                )
                .at(edge_path(i))
                .with_context(json!({ "strength_mean": mean })),
            ),
            _ => {}
        }
    }

    if let Some(belief) = edge.belief_exists {
        if !(0.0..=1.0).contains(&belief) {
            out.push(
                ValidationIssue::warn(
                    IssueCode::BeliefOutOfRange,
                    format!("Edge {label} belief_exists {belief} is outside [0, 1]"),
                )
                .at(edge_path(i))
                .with_context(json!({ "belief_exists": belief })),
            );
        } else if belief < w.low_belief {
            out.push(
                ValidationIssue::warn(
                    IssueCode::LowEdgeConfidence,
                    format!("Edge {label} has low existence belief {belief}"),
                )
                .at(edge_path(i))
                .with_context(json!({ "belief_exists": belief, "threshold": w.low_belief })),
            );
        }
    }

    let structural = match kinds {
        (Some(from), Some(to)) => matrix::is_structural(from, to),
        _ => false,
    };
    if structural {
        let deviations = structural_deviations(edge, &ctx.config.structural);
        if !deviations.is_empty() {
            out.push(
                ValidationIssue::warn(
                    IssueCode::StructuralEdgeNotCanonical,
                    format!(
                        "Structural edge {label} deviates from canonical values in {}",
                        deviations.join(", ")
                    ),
                )
                .at(edge_path(i))
                .with_context(json!({ "deviations": deviations })),
            );
        }
    } else if let Some(std) = edge.strength_std.filter(|&s| s < w.min_causal_std) {
        out.push(
            ValidationIssue::warn(
                IssueCode::EdgeStdTooLow,
                format!("Causal edge {label} has overconfident strength_std {std}"),
            )
            .at(edge_path(i))
            .with_context(json!({ "strength_std": std, "threshold": w.min_causal_std })),
        );
    }
}

pub(crate) fn collect(ctx: &TierContext<'_>) -> Vec<ValidationIssue> {
    let mut out = Vec::new();

    for (i, edge) in ctx.graph.edges.iter().enumerate() {
        let kinds = (ctx.index.kind_of(&edge.from), ctx.index.kind_of(&edge.to));
        edge_warnings(i, edge, kinds, ctx, &mut out);
    }

    for (_, node) in unique_nodes(ctx.graph).filter(|(_, n)| n.kind == NodeKind::Factor) {
        if !ctx.categories.is_controllable(&node.id) {
            continue;
        }
        let empty = node
            .factor_data()
            .and_then(|d| d.uncertainty_drivers.as_ref())
            .is_some_and(Vec::is_empty);
        if empty {
            out.push(
                ValidationIssue::warn(
                    IssueCode::EmptyUncertaintyDrivers,
                    format!("Controllable factor '{}' lists no uncertainty drivers", node.id),
                )
                .at(node_path(&node.id)),
            );
        }
    }

    out
}
