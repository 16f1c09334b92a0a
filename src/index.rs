//! Lookup tables over a graph.
//!
//! The index borrows the graph; it performs no validation. Duplicate node ids
//! overwrite earlier entries in `by_id` (last wins) but every node still
//! appears in `by_kind`.

use std::collections::HashMap;

use crate::graph::{Graph, Node, NodeKind};

/// Node lookups and adjacency lists.
#[derive(Debug, Clone, Default)]
pub struct GraphIndex<'g> {
    /// Node by id.
    pub by_id: HashMap<&'g str, &'g Node>,
    /// Nodes by kind, in document order.
    pub by_kind: HashMap<NodeKind, Vec<&'g Node>>,
    /// Successor ids, in edge order.
    pub forward: HashMap<&'g str, Vec<&'g str>>,
    /// Predecessor ids, in edge order.
    pub reverse: HashMap<&'g str, Vec<&'g str>>,
}

impl<'g> GraphIndex<'g> {
    /// Builds the index.
    #[must_use]
    pub fn build(graph: &'g Graph) -> Self {
        let mut index = Self::default();
        for node in &graph.nodes {
            index.by_id.insert(node.id.as_str(), node);
            index.by_kind.entry(node.kind).or_default().push(node);
        }
        for edge in &graph.edges {
            index
                .forward
                .entry(edge.from.as_str())
                .or_default()
                .push(edge.to.as_str());
            index
                .reverse
                .entry(edge.to.as_str())
                .or_default()
                .push(edge.from.as_str());
        }
        index
    }

    /// Nodes of the given kind (empty if none).
    #[must_use]
    pub fn of_kind(&self, kind: NodeKind) -> &[&'g Node] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of nodes of the given kind.
    #[must_use]
    pub fn count(&self, kind: NodeKind) -> usize {
        self.of_kind(kind).len()
    }

    /// Kind of the node with `id`, if it exists.
    #[must_use]
    pub fn kind_of(&self, id: &str) -> Option<NodeKind> {
        self.by_id.get(id).map(|n| n.kind)
    }

    /// Successors of `id`.
    #[must_use]
    pub fn successors(&self, id: &str) -> &[&'g str] {
        self.forward.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Predecessors of `id`.
    #[must_use]
    pub fn predecessors(&self, id: &str) -> &[&'g str] {
        self.reverse.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}
