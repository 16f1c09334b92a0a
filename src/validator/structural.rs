//! Tier 1: node counts, size ceilings and referential integrity.

use serde_json::json;

use crate::graph::NodeKind;
use crate::issue::{edge_path, IssueCode, ValidationIssue};

use super::TierContext;

fn ids(ctx: &TierContext<'_>, kind: NodeKind) -> Vec<String> {
    ctx.index.of_kind(kind).iter().map(|n| n.id.clone()).collect()
}

fn exactly_one(
    ctx: &TierContext<'_>,
    kind: NodeKind,
    missing: IssueCode,
    multiple: IssueCode,
) -> Option<ValidationIssue> {
    let found = ids(ctx, kind);
    match found.len() {
        1 => None,
        0 => Some(ValidationIssue::error(
            missing,
            format!("Graph must contain exactly one {kind} node, found none"),
        )),
        n => Some(
            ValidationIssue::error(
                multiple,
                format!("Graph must contain exactly one {kind} node, found {n}"),
            )
            .with_context(json!({ "node_ids": found })),
        ),
    }
}

pub(crate) fn check(ctx: &TierContext<'_>) -> Vec<ValidationIssue> {
    let limits = &ctx.config.limits;
    let mut issues = Vec::new();

    issues.extend(exactly_one(
        ctx,
        NodeKind::Goal,
        IssueCode::MissingGoal,
        IssueCode::MultipleGoals,
    ));
    issues.extend(exactly_one(
        ctx,
        NodeKind::Decision,
        IssueCode::MissingDecision,
        IssueCode::MultipleDecisions,
    ));

    let options = ctx.index.count(NodeKind::Option);
    let range = json!({ "count": options, "min": limits.min_options, "max": limits.max_options });
    if options < limits.min_options {
        issues.push(
            ValidationIssue::error(
                IssueCode::InsufficientOptions,
                format!(
                    "Graph has {options} option nodes, at least {} required",
                    limits.min_options
                ),
            )
            .with_context(range),
        );
    } else if options > limits.max_options {
        issues.push(
            ValidationIssue::error(
                IssueCode::TooManyOptions,
                format!(
                    "Graph has {options} option nodes, at most {} allowed",
                    limits.max_options
                ),
            )
            .with_context(range),
        );
    }

    if ctx.index.count(NodeKind::Outcome) + ctx.index.count(NodeKind::Risk) == 0 {
        issues.push(ValidationIssue::error(
            IssueCode::MissingOutcomeOrRisk,
            "Graph must contain at least one outcome or risk node",
        ));
    }

    let nodes = ctx.graph.nodes.len();
    if nodes > limits.max_nodes {
        issues.push(
            ValidationIssue::error(
                IssueCode::TooManyNodes,
                format!("Graph has {nodes} nodes, at most {} allowed", limits.max_nodes),
            )
            .with_context(json!({ "count": nodes, "max": limits.max_nodes })),
        );
    }
    let edges = ctx.graph.edges.len();
    if edges > limits.max_edges {
        issues.push(
            ValidationIssue::error(
                IssueCode::TooManyEdges,
                format!("Graph has {edges} edges, at most {} allowed", limits.max_edges),
            )
            .with_context(json!({ "count": edges, "max": limits.max_edges })),
        );
    }

    for (i, edge) in ctx.graph.edges.iter().enumerate() {
        for (endpoint, id) in [("from", &edge.from), ("to", &edge.to)] {
            if !ctx.index.by_id.contains_key(id.as_str()) {
                issues.push(
                    ValidationIssue::error(
                        IssueCode::InvalidEdgeRef,
                        format!("Edge {} references missing node '{id}'", edge.label()),
                    )
                    .at(edge_path(i))
                    .with_context(json!({ "endpoint": endpoint, "node_id": id })),
                );
            }
        }
    }

    issues
}
