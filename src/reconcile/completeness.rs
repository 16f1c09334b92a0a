//! Rule 5: controllable factors get default `factor_type` and
//! `uncertainty_drivers` when still missing.
//!
//! Opt-in, for a late pass once enrichment and repair have stopped writing.
//! The same fill is used by Rule 1 for factors that just became controllable.

use crate::category::FactorCategories;
use crate::graph::{NodeKind, DEFAULT_FACTOR_TYPE, DEFAULT_UNCERTAINTY_DRIVER};

use super::mutation::{Cause, MutationCode, StrpRule};
use super::view::ReconcileView;

/// Writes the defaults into whichever of the two fields is unset.
pub(super) fn fill_defaults(view: &mut ReconcileView<'_>, node: usize, rule: StrpRule, why: &str) {
    let Some(data) = view.graph().nodes.get(node).and_then(|n| n.factor_data()) else {
        return;
    };
    let missing_type = data.factor_type.is_none();
    let missing_drivers = data.uncertainty_drivers.is_none();

    if missing_type {
        view.set_factor_type(
            node,
            Some(DEFAULT_FACTOR_TYPE.into()),
            Cause::new(
                rule,
                MutationCode::ControllableDataFilled,
                format!("{why}; factor_type defaulted to '{DEFAULT_FACTOR_TYPE}'"),
            ),
        );
    }
    if missing_drivers {
        view.set_uncertainty_drivers(
            node,
            Some(vec![DEFAULT_UNCERTAINTY_DRIVER.to_string()]),
            Cause::new(
                rule,
                MutationCode::ControllableDataFilled,
                format!("{why}; uncertainty_drivers defaulted"),
            ),
        );
    }
}

pub(super) fn apply(view: &mut ReconcileView<'_>, inferred: &FactorCategories) {
    for i in 0..view.graph().nodes.len() {
        let node = &view.graph().nodes[i];
        if node.kind != NodeKind::Factor || !inferred.is_controllable(&node.id) {
            continue;
        }
        fill_defaults(
            view,
            i,
            StrpRule::ControllableDataCompleteness,
            "Controllable factor is missing required data",
        );
    }
}
