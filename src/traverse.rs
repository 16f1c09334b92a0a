//! Breadth-first reachability over a [`GraphIndex`].
//!
//! Walks follow adjacency lists only, so edges to ids that do not resolve to a
//! node are traversed like any other. The validator rejects such edges
//! separately.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::category::FactorCategories;
use crate::graph::NodeKind;
use crate::index::GraphIndex;

/// Which way to walk edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Follow `from -> to`.
    Forward,
    /// Follow `to -> from`.
    Reverse,
}

fn neighbours<'a, 'g>(index: &'a GraphIndex<'g>, id: &str, direction: Direction) -> &'a [&'g str] {
    match direction {
        Direction::Forward => index.successors(id),
        Direction::Reverse => index.predecessors(id),
    }
}

/// Every id reachable from `seeds`, seeds included.
pub fn reachable<'g, I>(index: &GraphIndex<'g>, seeds: I, direction: Direction) -> HashSet<&'g str>
where
    I: IntoIterator<Item = &'g str>,
{
    let mut visited: HashSet<&'g str> = HashSet::new();
    let mut queue: VecDeque<&'g str> = VecDeque::new();

    for seed in seeds {
        if visited.insert(seed) {
            queue.push_back(seed);
        }
    }

    while let Some(id) = queue.pop_front() {
        for &next in neighbours(index, id, direction) {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    visited
}

/// Returns true if some strict ancestor of `start` satisfies `pred`.
///
/// Stops at the first match.
pub fn has_ancestor<'g, F>(index: &GraphIndex<'g>, start: &'g str, mut pred: F) -> bool
where
    F: FnMut(&str) -> bool,
{
    let mut visited: HashSet<&'g str> = HashSet::from([start]);
    let mut queue: VecDeque<&'g str> = VecDeque::from([start]);

    while let Some(id) = queue.pop_front() {
        for &prev in index.predecessors(id) {
            if !visited.insert(prev) {
                continue;
            }
            if pred(prev) {
                return true;
            }
            queue.push_back(prev);
        }
    }
    false
}

/// How many outcome/risk nodes are downstream of at least one controllable factor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllabilitySummary {
    /// Outcome and risk nodes in the graph.
    pub total_outcome_risk_nodes: usize,
    /// Those with a controllable factor ancestor.
    pub with_controllable_ancestry: usize,
    /// Those without one.
    pub without_controllable_ancestry: usize,
    /// Ids of the nodes without one, in document order.
    pub nodes_without_controllable_ancestry: Vec<String>,
    /// Subset of the above that reachability marked as exempt.
    pub exempt_without_controllable_ancestry: Vec<String>,
}

impl ControllabilitySummary {
    /// Walks upstream from every outcome/risk node looking for a controllable factor.
    ///
    /// `exempt` holds the ids the reachability tier exempted at info level.
    #[must_use]
    pub fn compute(
        index: &GraphIndex<'_>,
        categories: &FactorCategories,
        exempt: &HashSet<String>,
    ) -> Self {
        let mut summary = Self::default();
        let targets = index
            .of_kind(NodeKind::Outcome)
            .iter()
            .chain(index.of_kind(NodeKind::Risk));

        for node in targets {
            summary.total_outcome_risk_nodes += 1;
            if has_ancestor(index, node.id.as_str(), |id| categories.is_controllable(id)) {
                summary.with_controllable_ancestry += 1;
            } else {
                summary.without_controllable_ancestry += 1;
                summary.nodes_without_controllable_ancestry.push(node.id.clone());
                if exempt.contains(&node.id) {
                    summary
                        .exempt_without_controllable_ancestry
                        .push(node.id.clone());
                }
            }
        }
        summary
    }

    /// Number of exempt nodes without controllable ancestry.
    #[must_use]
    pub fn exempt_count(&self) -> usize {
        self.exempt_without_controllable_ancestry.len()
    }
}
