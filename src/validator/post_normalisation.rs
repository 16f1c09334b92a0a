//! Sign agreement check for graphs that have been through numeric clamping.
//!
//! Reconciliation fixes sign disagreements before validation; clamping
//! downstream can reintroduce them. This check only reads the graph.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::graph::{EffectDirection, Graph};
use crate::issue::{edge_path, IssueCode, ValidationIssue};

/// Result of [`validate_post_normalisation`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostNormalisationReport {
    /// True iff `errors` is empty.
    pub valid: bool,
    /// `SIGN_MISMATCH` errors only.
    pub errors: Vec<ValidationIssue>,
    /// Always empty.
    pub warnings: Vec<ValidationIssue>,
}

/// Reports every edge whose declared direction disagrees with the sign of
/// its `strength_mean`. Mixed, unrecognised and absent directions and zero
/// means are not compared.
#[must_use]
pub fn validate_post_normalisation(graph: &Graph) -> PostNormalisationReport {
    let mut errors = Vec::new();

    for (i, edge) in graph.edges.iter().enumerate() {
        let Some(declared @ (EffectDirection::Positive | EffectDirection::Negative)) =
            edge.direction()
        else {
            continue;
        };
        let Some(mean) = edge.strength_mean else {
            continue;
        };
        let Some(actual) = EffectDirection::from_sign(mean) else {
            continue;
        };
        if declared != actual {
            errors.push(
                ValidationIssue::error(
                    IssueCode::SignMismatch,
                    format!(
                        "Edge {} is declared {declared} but strength_mean is {mean}",
                        edge.label()
                    ),
                )
                .at(edge_path(i))
                .with_context(json!({
                    "effect_direction": declared,
                    "strength_mean": mean,
                })),
            );
        }
    }

    tracing::debug!(errors = errors.len(), "post-normalisation check complete");

    PostNormalisationReport {
        valid: errors.is_empty(),
        errors,
        warnings: Vec::new(),
    }
}
