//! Tier 6: NaN and infinities.

use serde_json::json;

use crate::graph::NodeData;
use crate::issue::{IssueCode, ValidationIssue};

use super::TierContext;

fn non_finite(path: String, value: f64) -> ValidationIssue {
    ValidationIssue::error(
        IssueCode::NonFiniteValue,
        format!("{path} is not a finite number ({value})"),
    )
    .with_context(json!({ "value": value.to_string() }))
    .at(path)
}

pub(crate) fn check(ctx: &TierContext<'_>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (i, node) in ctx.graph.nodes.iter().enumerate() {
        match &node.data {
            NodeData::Factor(d) => {
                for (field, value) in [("value", d.value), ("baseline", d.baseline)] {
                    if let Some(v) = value.filter(|v| !v.is_finite()) {
                        issues.push(non_finite(format!("nodes[{i}].data.{field}"), v));
                    }
                }
            }
            NodeData::Interventions(d) => {
                for (key, &v) in d.interventions.iter().flatten() {
                    if !v.is_finite() {
                        issues.push(non_finite(
                            format!("nodes[{i}].data.interventions.{key}"),
                            v,
                        ));
                    }
                }
            }
            NodeData::Opaque(_) | NodeData::Empty => {}
        }
    }

    for (i, edge) in ctx.graph.edges.iter().enumerate() {
        for (field, value) in [
            ("strength_mean", edge.strength_mean),
            ("strength_std", edge.strength_std),
            ("belief_exists", edge.belief_exists),
        ] {
            if let Some(v) = value.filter(|v| !v.is_finite()) {
                issues.push(non_finite(format!("edges[{i}].{field}"), v));
            }
        }
    }

    issues
}
