//! Restricted write access to a graph.
//!
//! Reconciliation rules see the graph read-only and may change it only
//! through the setters here. Each setter targets a node or edge by position,
//! writes exactly one field, and records exactly one [`StrpMutation`]. Writing
//! a value equal to the current one is a no-op and records nothing. There is
//! no way to add, remove, or retarget a node or edge.

use serde::Serialize;

use crate::graph::{EffectDirection, ExtractionType, FactorCategory, FactorType, Graph, Lenient};

use super::mutation::{field, Cause, StrpMutation};

fn to_json<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

/// Writes `new` into `slot` and returns the before/after pair if it changed.
fn swap<T>(slot: &mut T, new: T) -> Option<(serde_json::Value, serde_json::Value)>
where
    T: PartialEq + Serialize,
{
    if *slot == new {
        return None;
    }
    let before = to_json(slot);
    *slot = new;
    Some((before, to_json(slot)))
}

/// Mutable view over a graph that logs every field it writes.
#[derive(Debug)]
pub struct ReconcileView<'g> {
    graph: &'g mut Graph,
    log: Vec<StrpMutation>,
}

impl<'g> ReconcileView<'g> {
    /// Wraps `graph` with an empty log.
    pub fn new(graph: &'g mut Graph) -> Self {
        Self {
            graph,
            log: Vec::new(),
        }
    }

    /// Read-only access to the graph.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &*self.graph
    }

    /// Mutations recorded so far.
    #[must_use]
    pub fn mutations(&self) -> &[StrpMutation] {
        &self.log
    }

    /// Consumes the view, returning the log.
    #[must_use]
    pub fn into_mutations(self) -> Vec<StrpMutation> {
        self.log
    }

    /// Records a mutation that does not touch the graph.
    pub(crate) fn note(&mut self, mutation: StrpMutation) {
        self.log.push(mutation);
    }

    fn record_node(
        &mut self,
        node: usize,
        cause: Cause,
        name: &str,
        change: Option<(serde_json::Value, serde_json::Value)>,
    ) -> bool {
        let Some((before, after)) = change else {
            return false;
        };
        let id = self.graph.nodes[node].id.clone();
        self.log
            .push(StrpMutation::from_cause(cause, name, before, after).on_node(id, node));
        true
    }

    /// Sets node `category`. Returns true if the value changed.
    pub fn set_factor_category(
        &mut self,
        node: usize,
        category: Option<Lenient<FactorCategory>>,
        cause: Cause,
    ) -> bool {
        let Some(n) = self.graph.nodes.get_mut(node) else {
            return false;
        };
        let change = swap(&mut n.category, category);
        self.record_node(node, cause, field::CATEGORY, change)
    }

    /// Sets factor `data.factor_type`. No-op on non-factor nodes.
    pub fn set_factor_type(
        &mut self,
        node: usize,
        factor_type: Option<Lenient<FactorType>>,
        cause: Cause,
    ) -> bool {
        let Some(d) = self.graph.nodes.get_mut(node).and_then(|n| n.factor_data_mut()) else {
            return false;
        };
        let change = swap(&mut d.factor_type, factor_type);
        self.record_node(node, cause, field::FACTOR_TYPE, change)
    }

    /// Sets factor `data.uncertainty_drivers`. No-op on non-factor nodes.
    pub fn set_uncertainty_drivers(
        &mut self,
        node: usize,
        drivers: Option<Vec<String>>,
        cause: Cause,
    ) -> bool {
        let Some(d) = self.graph.nodes.get_mut(node).and_then(|n| n.factor_data_mut()) else {
            return false;
        };
        let change = swap(&mut d.uncertainty_drivers, drivers);
        self.record_node(node, cause, field::UNCERTAINTY_DRIVERS, change)
    }

    /// Sets factor `data.extractionType`. No-op on non-factor nodes.
    pub fn set_extraction_type(
        &mut self,
        node: usize,
        extraction_type: Option<Lenient<ExtractionType>>,
        cause: Cause,
    ) -> bool {
        let Some(d) = self.graph.nodes.get_mut(node).and_then(|n| n.factor_data_mut()) else {
            return false;
        };
        let change = swap(&mut d.extraction_type, extraction_type);
        self.record_node(node, cause, field::EXTRACTION_TYPE, change)
    }

    /// Sets edge `effect_direction`. Returns true if the value changed.
    pub fn set_edge_direction(
        &mut self,
        edge: usize,
        direction: Option<Lenient<EffectDirection>>,
        cause: Cause,
    ) -> bool {
        let Some(e) = self.graph.edges.get_mut(edge) else {
            return false;
        };
        let Some((before, after)) = swap(&mut e.effect_direction, direction) else {
            return false;
        };
        let label = e.label();
        self.log.push(
            StrpMutation::from_cause(cause, field::EFFECT_DIRECTION, before, after)
                .on_edge(label, edge),
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};
    use crate::reconcile::mutation::{MutationCode, StrpRule};

    fn cause() -> Cause {
        Cause::new(StrpRule::EnumValidation, MutationCode::EnumValueCorrected, "test")
    }

    #[test]
    fn test_setters_record_one_mutation_per_change() {
        let mut g = Graph::new()
            .with_node(Node::factor("f", "F").with_factor_type("widgets"))
            .with_edge(Edge::new("f", "g").with_id("e1"));
        let mut view = ReconcileView::new(&mut g);

        assert!(view.set_factor_type(0, Some(FactorType::Other.into()), cause()));
        assert!(!view.set_factor_type(0, Some(FactorType::Other.into()), cause()));
        assert!(view.set_edge_direction(0, Some(EffectDirection::Negative.into()), cause()));

        let log = view.into_mutations();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].node_id.as_deref(), Some("f"));
        assert_eq!(log[0].before, "widgets");
        assert_eq!(log[0].after, "other");
        assert_eq!(log[1].edge_id.as_deref(), Some("e1"));
        assert_eq!(log[1].before, serde_json::Value::Null);
        assert_eq!(g.edges[0].direction(), Some(EffectDirection::Negative));
    }

    #[test]
    fn test_factor_setters_ignore_other_kinds_and_bad_positions() {
        let mut g = Graph::new().with_node(Node::outcome("out", "Out"));
        let mut view = ReconcileView::new(&mut g);
        assert!(!view.set_factor_type(0, Some(FactorType::Cost.into()), cause()));
        assert!(!view.set_uncertainty_drivers(3, Some(vec![]), cause()));
        assert!(!view.set_edge_direction(0, None, cause()));
        assert!(view.mutations().is_empty());
    }
}
