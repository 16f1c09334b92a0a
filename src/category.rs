//! Structural category inference for factor nodes.
//!
//! The inferred category is derived from topology and data presence only:
//!
//! - any incoming edge from an option node: `controllable`
//! - otherwise `data.value` set: `observable`
//! - otherwise: `external`
//!
//! Inference is authoritative. A declared `category` that disagrees is either
//! reported (factor data tier) or overwritten (reconciliation).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::graph::{FactorCategory, Graph, Lenient, NodeKind};
use crate::index::GraphIndex;

/// Inferred category of one factor node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorCategoryInfo {
    /// Factor node id.
    pub node_id: String,
    /// Inferred category.
    pub category: FactorCategory,
    /// True if an option node has an edge into this factor.
    pub has_option_edge: bool,
    /// True if `data.value` is set.
    pub has_value: bool,
    /// Category as declared on the node, possibly contradicting `category`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_category: Option<Lenient<FactorCategory>>,
}

impl FactorCategoryInfo {
    /// Returns true if the node declares a category other than the inferred one.
    #[must_use]
    pub fn is_mismatched(&self) -> bool {
        self.explicit_category
            .as_ref()
            .is_some_and(|c| c.known() != Some(self.category))
    }
}

/// Categories for every factor node, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct FactorCategories {
    infos: Vec<FactorCategoryInfo>,
    by_id: HashMap<String, usize>,
}

impl FactorCategories {
    /// Infers categories for every factor in `graph`.
    #[must_use]
    pub fn infer(graph: &Graph, index: &GraphIndex<'_>) -> Self {
        let option_targets: HashSet<&str> = graph
            .edges
            .iter()
            .filter(|e| index.kind_of(&e.from) == Some(NodeKind::Option))
            .map(|e| e.to.as_str())
            .collect();

        let mut out = Self::default();
        for node in graph.nodes.iter().filter(|n| n.kind == NodeKind::Factor) {
            let has_option_edge = option_targets.contains(node.id.as_str());
            let has_value = node.factor_data().is_some_and(|d| d.value.is_some());
            let category = if has_option_edge {
                FactorCategory::Controllable
            } else if has_value {
                FactorCategory::Observable
            } else {
                FactorCategory::External
            };
            out.by_id.insert(node.id.clone(), out.infos.len());
            out.infos.push(FactorCategoryInfo {
                node_id: node.id.clone(),
                category,
                has_option_edge,
                has_value,
                explicit_category: node.category.clone(),
            });
        }
        out
    }

    /// Info for the factor with `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&FactorCategoryInfo> {
        self.by_id.get(id).map(|&i| &self.infos[i])
    }

    /// Inferred category for the factor with `id`.
    #[must_use]
    pub fn category_of(&self, id: &str) -> Option<FactorCategory> {
        self.get(id).map(|i| i.category)
    }

    /// Returns true if `id` is a factor inferred controllable.
    #[must_use]
    pub fn is_controllable(&self, id: &str) -> bool {
        self.category_of(id) == Some(FactorCategory::Controllable)
    }

    /// All infos in document order.
    pub fn iter(&self) -> impl Iterator<Item = &FactorCategoryInfo> {
        self.infos.iter()
    }

    /// Number of factors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Returns true if the graph has no factors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}
