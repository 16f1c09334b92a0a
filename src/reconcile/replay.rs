//! Re-applying a mutation log.
//!
//! Replaying the log of a reconciliation run onto an untouched copy of its
//! input reproduces the reconciled graph. Constraint mutations carry no graph
//! change and are skipped. Targets are located by their recorded position;
//! logs without positions fall back to the first matching id or label.

use serde::de::DeserializeOwned;

use crate::error::{EngineError, EngineResult};
use crate::graph::Graph;

use super::mutation::{field, Cause, MutationCode, StrpMutation};
use super::view::ReconcileView;

fn after<T: DeserializeOwned>(m: &StrpMutation) -> EngineResult<T> {
    serde_json::from_value(m.after.clone()).map_err(|e| EngineError::Serialization {
        message: format!("mutation value for {}: {e}", m.field),
    })
}

/// Resolves a target by its recorded position, else by the first match.
fn position<T>(
    items: &[T],
    index: Option<usize>,
    key: &str,
    what: &str,
    matches: impl Fn(&T) -> bool,
) -> EngineResult<usize> {
    match index {
        Some(i) if items.get(i).is_some_and(&matches) => Ok(i),
        Some(i) => Err(EngineError::precondition(format!(
            "replay: {what} {i} is not '{key}'"
        ))),
        None => items
            .iter()
            .position(matches)
            .ok_or_else(|| EngineError::precondition(format!("replay: no {what} '{key}'"))),
    }
}

fn node_position(graph: &Graph, m: &StrpMutation, id: &str) -> EngineResult<usize> {
    position(&graph.nodes, m.index, id, "node", |n| n.id == id)
}

fn edge_position(graph: &Graph, m: &StrpMutation, label: &str) -> EngineResult<usize> {
    position(&graph.edges, m.index, label, "edge", |e| e.label() == label)
}

/// Applies `mutations` to `graph` through the same restricted setters the
/// rules use. Returns the number of fields that changed.
///
/// # Errors
///
/// Returns `EngineError::Precondition` if a mutation targets a node, edge or
/// field that does not exist, and `EngineError::Serialization` if its `after`
/// value does not fit the field.
pub fn replay(graph: &mut Graph, mutations: &[StrpMutation]) -> EngineResult<usize> {
    let mut view = ReconcileView::new(graph);
    let mut changed = 0usize;

    for m in mutations {
        if matches!(
            m.code,
            MutationCode::ConstraintRemapped | MutationCode::ConstraintDropped
        ) {
            continue;
        }
        let cause = Cause::new(m.rule, m.code, m.reason.clone());

        let applied = match (m.node_id.as_deref(), m.edge_id.as_deref(), m.field.as_str()) {
            (Some(id), _, field::CATEGORY) => {
                let i = node_position(view.graph(), m, id)?;
                view.set_factor_category(i, after(m)?, cause)
            }
            (Some(id), _, field::FACTOR_TYPE) => {
                let i = node_position(view.graph(), m, id)?;
                view.set_factor_type(i, after(m)?, cause)
            }
            (Some(id), _, field::UNCERTAINTY_DRIVERS) => {
                let i = node_position(view.graph(), m, id)?;
                view.set_uncertainty_drivers(i, after(m)?, cause)
            }
            (Some(id), _, field::EXTRACTION_TYPE) => {
                let i = node_position(view.graph(), m, id)?;
                view.set_extraction_type(i, after(m)?, cause)
            }
            (None, Some(label), field::EFFECT_DIRECTION) => {
                let i = edge_position(view.graph(), m, label)?;
                view.set_edge_direction(i, after(m)?, cause)
            }
            _ => {
                return Err(EngineError::precondition(format!(
                    "replay: cannot apply {} mutation to field '{}'",
                    m.rule, m.field
                )))
            }
        };
        if applied {
            changed += 1;
        }
    }

    tracing::debug!(mutations = mutations.len(), changed, "mutation log replayed");
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, EffectDirection, Lenient, Node};
    use crate::reconcile::{reconcile, ReconcileOptions};

    fn sideways(edge: Edge) -> Edge {
        let mut edge = edge;
        edge.effect_direction = Some(Lenient::Unknown("sideways".to_string()));
        edge
    }

    #[test]
    fn test_parallel_edges_replay_by_position() {
        let original = Graph::new()
            .with_node(Node::factor("a", "A"))
            .with_node(Node::outcome("b", "B"))
            .with_edge(sideways(Edge::new("a", "b").with_strength(-0.5, 0.1)))
            .with_edge(sideways(Edge::new("a", "b")));

        let mut reconciled = original.clone();
        let outcome = reconcile(&mut reconciled, &ReconcileOptions::default());
        assert_eq!(outcome.mutations.len(), 3);
        assert_eq!(reconciled.edges[0].direction(), Some(EffectDirection::Negative));
        assert_eq!(reconciled.edges[1].direction(), Some(EffectDirection::Positive));

        let mut replayed = original;
        assert_eq!(replay(&mut replayed, &outcome.mutations).unwrap(), 3);
        assert_eq!(replayed, reconciled);
    }

    #[test]
    fn test_stale_position_is_rejected() {
        let mut g = Graph::new()
            .with_node(Node::factor("f", "F").with_factor_type("widgets"))
            .with_node(Node::factor("x", "X"));
        let outcome = reconcile(&mut g.clone(), &ReconcileOptions::default());
        assert_eq!(outcome.mutations[0].index, Some(0));

        g.nodes.swap(0, 1);
        let err = replay(&mut g, &outcome.mutations).unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn test_log_without_positions_matches_first_occurrence() {
        let original = Graph::new().with_node(Node::factor("f", "F").with_factor_type("widgets"));
        let mut reconciled = original.clone();
        let mut outcome = reconcile(&mut reconciled, &ReconcileOptions::default());
        for m in &mut outcome.mutations {
            m.index = None;
        }

        let mut replayed = original;
        assert_eq!(replay(&mut replayed, &outcome.mutations).unwrap(), 1);
        assert_eq!(replayed, reconciled);
    }
}
