//! Rule 3: goal-constraint targets are matched to real node ids.
//!
//! An exact id match is kept. Otherwise both ids are reduced to a stem
//! (known prefix stripped, lowercased, one inflectional suffix trimmed) and
//! compared by substring containment in either direction. Stems shorter
//! than [`MIN_STEM_LEN`] never match. A unique candidate is remapped; zero or
//! several candidates drop the constraint.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::graph::Graph;

use super::mutation::{field, Cause, MutationCode, StrpMutation, StrpRule};
use super::view::ReconcileView;

/// Prefixes removed before fuzzy comparison.
pub const ID_PREFIXES: [&str; 3] = ["fac_", "out_", "risk_"];

/// Shortest stem that takes part in fuzzy matching.
pub const MIN_STEM_LEN: usize = 4;

const STEM_SUFFIXES: [&str; 5] = ["ing", "es", "ed", "s", "e"];

/// An externally supplied constraint on a goal-relevant node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalConstraint {
    /// Optional stable id, echoed in mutation records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Target node id.
    pub node_id: String,
    /// Every other field, carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GoalConstraint {
    /// Creates a constraint on `node_id`.
    #[must_use]
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            id: None,
            node_id: node_id.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Sets the constraint id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Adds an opaque field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Comparison stem of a node id.
#[must_use]
pub fn stem(id: &str) -> String {
    let lower = id.to_lowercase();
    let bare = ID_PREFIXES
        .iter()
        .find_map(|p| lower.strip_prefix(p))
        .unwrap_or(&lower);
    STEM_SUFFIXES
        .iter()
        .filter_map(|s| bare.strip_suffix(s))
        .find(|trimmed| trimmed.len() >= MIN_STEM_LEN)
        .unwrap_or(bare)
        .to_string()
}

/// Node ids whose stem overlaps the stem of `target`.
fn candidates(graph: &Graph, target: &str) -> Vec<String> {
    let wanted = stem(target);
    if wanted.len() < MIN_STEM_LEN {
        return Vec::new();
    }
    let mut seen = HashSet::new();
    graph
        .nodes
        .iter()
        .filter(|n| seen.insert(n.id.as_str()))
        .filter(|n| {
            let s = stem(&n.id);
            s.len() >= MIN_STEM_LEN && (s.contains(&wanted) || wanted.contains(&s))
        })
        .map(|n| n.id.clone())
        .collect()
}

pub(super) fn apply(
    view: &mut ReconcileView<'_>,
    constraints: Vec<GoalConstraint>,
) -> Vec<GoalConstraint> {
    let mut kept = Vec::with_capacity(constraints.len());

    for mut constraint in constraints {
        if view.graph().node(&constraint.node_id).is_some() {
            kept.push(constraint);
            continue;
        }

        let found = candidates(view.graph(), &constraint.node_id);
        let before = serde_json::Value::String(constraint.node_id.clone());

        if let [target] = found.as_slice() {
            let cause = Cause::new(
                StrpRule::ConstraintNormalization,
                MutationCode::ConstraintRemapped,
                format!(
                    "No node '{}'; remapped to closest match '{target}'",
                    constraint.node_id
                ),
            );
            view.note(
                StrpMutation::from_cause(
                    cause,
                    field::CONSTRAINT_NODE_ID,
                    before,
                    serde_json::Value::String(target.clone()),
                )
                .on_constraint(constraint.id.clone()),
            );
            constraint.node_id.clone_from(target);
            kept.push(constraint);
        } else {
            let reason = if found.is_empty() {
                format!("No node matches '{}'; constraint dropped", constraint.node_id)
            } else {
                format!(
                    "'{}' is ambiguous between {}; constraint dropped",
                    constraint.node_id,
                    found.join(", ")
                )
            };
            let cause = Cause::new(
                StrpRule::ConstraintNormalization,
                MutationCode::ConstraintDropped,
                reason,
            );
            view.note(
                StrpMutation::from_cause(
                    cause,
                    field::CONSTRAINT_NODE_ID,
                    before,
                    serde_json::Value::Null,
                )
                .on_constraint(constraint.id),
            );
        }
    }

    kept
}
