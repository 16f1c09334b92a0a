//! Structural truth reconciliation.
//!
//! Five rules run in order over one graph, each correcting metadata that
//! contradicts structure the generator itself built:
//!
//! 1. category override
//! 2. enum validation
//! 3. goal-constraint target normalization (only when constraints are given)
//! 4. sign reconciliation
//! 5. controllable data completeness (opt-in)
//!
//! Reconciliation never adds, removes, or rewires a node or edge. Writes go
//! through [`ReconcileView`], which records one [`StrpMutation`] per field
//! change, so the log is a complete diff and [`replay`] reproduces the result.
//! A second run over the output records nothing.

mod category_override;
mod completeness;
mod constraints;
mod enum_validation;
mod mutation;
mod replay;
mod sign;
mod view;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::FactorCategories;
use crate::graph::Graph;
use crate::index::GraphIndex;

pub use constraints::{stem, GoalConstraint, ID_PREFIXES, MIN_STEM_LEN};
pub use mutation::{field, Cause, MutationCode, StrpMutation, StrpRule};
pub use replay::replay;
pub use view::ReconcileView;

/// Inputs beyond the graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileOptions {
    /// Constraints whose targets Rule 3 normalizes. Rule 3 is skipped when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_constraints: Option<Vec<GoalConstraint>>,
    /// Enables Rule 5.
    pub fill_controllable_data: bool,
}

impl ReconcileOptions {
    /// Supplies goal constraints.
    #[must_use]
    pub fn with_goal_constraints(mut self, constraints: Vec<GoalConstraint>) -> Self {
        self.goal_constraints = Some(constraints);
        self
    }

    /// Enables or disables Rule 5.
    #[must_use]
    pub fn with_fill_controllable_data(mut self, enabled: bool) -> Self {
        self.fill_controllable_data = enabled;
        self
    }
}

/// Result of [`reconcile`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    /// Every field change, in the order it was made.
    pub mutations: Vec<StrpMutation>,
    /// Surviving constraints with normalized targets, if any were supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_constraints: Option<Vec<GoalConstraint>>,
}

impl ReconcileOutcome {
    /// Returns true if reconciliation changed nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Mutation counts keyed by rule. Rules with no mutations are absent.
    #[must_use]
    pub fn count_by_rule(&self) -> BTreeMap<StrpRule, usize> {
        let mut counts = BTreeMap::new();
        for m in &self.mutations {
            *counts.entry(m.rule).or_insert(0) += 1;
        }
        counts
    }
}

fn log_rule(rule: StrpRule, view: &ReconcileView<'_>, before: usize) {
    tracing::debug!(
        rule = %rule,
        mutations = view.mutations().len() - before,
        "reconciliation rule complete"
    );
}

/// Runs the five rules over `graph` in place.
pub fn reconcile(graph: &mut Graph, options: &ReconcileOptions) -> ReconcileOutcome {
    // Structure is fixed for the whole pass, so inference is computed once.
    let inferred = {
        let index = GraphIndex::build(graph);
        FactorCategories::infer(graph, &index)
    };
    let mut view = ReconcileView::new(graph);

    let mark = view.mutations().len();
    category_override::apply(&mut view, &inferred);
    log_rule(StrpRule::CategoryOverride, &view, mark);

    let mark = view.mutations().len();
    enum_validation::apply(&mut view);
    log_rule(StrpRule::EnumValidation, &view, mark);

    let goal_constraints = options.goal_constraints.as_ref().map(|supplied| {
        let mark = view.mutations().len();
        let kept = constraints::apply(&mut view, supplied.clone());
        log_rule(StrpRule::ConstraintNormalization, &view, mark);
        kept
    });

    let mark = view.mutations().len();
    sign::apply(&mut view);
    log_rule(StrpRule::SignReconciliation, &view, mark);

    if options.fill_controllable_data {
        let mark = view.mutations().len();
        completeness::apply(&mut view, &inferred);
        log_rule(StrpRule::ControllableDataCompleteness, &view, mark);
    }

    let mutations = view.into_mutations();
    tracing::debug!(mutations = mutations.len(), "graph reconciled");

    ReconcileOutcome {
        mutations,
        goal_constraints,
    }
}
