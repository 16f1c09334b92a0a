//! Tier 3: every node is downstream of the decision and upstream of the goal.
//!
//! Exemptions from the decision-side check:
//!
//! - an observable or external factor that cannot be reached from the
//!   decision but can reach the goal is an exogenous root and passes silently;
//! - an outcome or risk node in the same position passes with an info issue.
//!
//! The goal-side check has no exemptions.

use std::collections::HashSet;

use serde_json::json;

use crate::graph::{FactorCategory, NodeKind};
use crate::issue::{node_path, IssueCode, ValidationIssue};
use crate::traverse::{reachable, Direction};

use super::{unique_nodes, TierContext};

/// Issues plus the ids granted the info-level outcome/risk exemption.
#[derive(Debug, Default)]
pub(crate) struct ReachabilityFindings {
    pub issues: Vec<ValidationIssue>,
    pub exempt: HashSet<String>,
}

pub(crate) fn check(ctx: &TierContext<'_>) -> ReachabilityFindings {
    let mut out = ReachabilityFindings::default();

    let decisions = ctx.index.of_kind(NodeKind::Decision);
    let goals = ctx.index.of_kind(NodeKind::Goal);
    if decisions.is_empty() || goals.is_empty() {
        return out;
    }

    let from_decision = reachable(
        &ctx.index,
        decisions.iter().map(|n| n.id.as_str()),
        Direction::Forward,
    );
    let to_goal = reachable(
        &ctx.index,
        goals.iter().map(|n| n.id.as_str()),
        Direction::Reverse,
    );

    for (_, node) in unique_nodes(ctx.graph) {
        let id = node.id.as_str();
        let reaches_goal = to_goal.contains(id);

        let checks_decision_side = match node.kind {
            NodeKind::Decision | NodeKind::Goal => false,
            NodeKind::Option
            | NodeKind::Factor
            | NodeKind::Outcome
            | NodeKind::Risk
            | NodeKind::Action => true,
        };

        if checks_decision_side && !from_decision.contains(id) {
            let controllable =
                ctx.categories.category_of(id) == Some(FactorCategory::Controllable);
            match node.kind {
                NodeKind::Factor if reaches_goal && !controllable => {}
                NodeKind::Outcome | NodeKind::Risk if reaches_goal => {
                    let reason = if ctx.index.predecessors(id).is_empty() {
                        "isolated"
                    } else {
                        "exogenous"
                    };
                    out.issues.push(
                        ValidationIssue::info(
                            IssueCode::UnreachableOutcomeExempt,
                            format!(
                                "{} '{id}' is not reachable from the decision but reaches the goal ({reason})",
                                node.kind
                            ),
                        )
                        .at(node_path(id))
                        .with_context(json!({ "reason": reason, "kind": node.kind })),
                    );
                    out.exempt.insert(id.to_string());
                }
                _ => out.issues.push(
                    ValidationIssue::error(
                        IssueCode::UnreachableFromDecision,
                        format!("{} '{id}' is not reachable from the decision", node.kind),
                    )
                    .at(node_path(id))
                    .with_context(json!({ "kind": node.kind })),
                ),
            }
        }

        if node.kind != NodeKind::Decision && !reaches_goal {
            out.issues.push(
                ValidationIssue::error(
                    IssueCode::NoPathToGoal,
                    format!("{} '{id}' has no path to the goal", node.kind),
                )
                .at(node_path(id))
                .with_context(json!({ "kind": node.kind })),
            );
        }
    }

    out
}
