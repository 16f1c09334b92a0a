//! Rule 1: a declared factor category that contradicts structure is
//! overwritten with the inferred one.
//!
//! Only recognised declarations are compared. Unrecognised strings are left
//! to Rule 2, which clears them.

use crate::category::FactorCategories;
use crate::graph::{FactorCategory, NodeKind};

use super::completeness::fill_defaults;
use super::mutation::{Cause, MutationCode, StrpRule};
use super::view::ReconcileView;

pub(super) fn apply(view: &mut ReconcileView<'_>, inferred: &FactorCategories) {
    for i in 0..view.graph().nodes.len() {
        let node = &view.graph().nodes[i];
        if node.kind != NodeKind::Factor {
            continue;
        }
        let (Some(declared), Some(actual)) =
            (node.declared_category(), inferred.category_of(&node.id))
        else {
            continue;
        };
        if declared == actual {
            continue;
        }

        view.set_factor_category(
            i,
            Some(actual.into()),
            Cause::new(
                StrpRule::CategoryOverride,
                MutationCode::CategoryOverride,
                format!("Declared {declared} but structure implies {actual}"),
            ),
        );

        if actual == FactorCategory::Controllable {
            fill_defaults(
                view,
                i,
                StrpRule::CategoryOverride,
                "Factor became controllable",
            );
            continue;
        }

        let strip = |what: &str| {
            Cause::new(
                StrpRule::CategoryOverride,
                MutationCode::ControllableDataStripped,
                format!("Factor is {actual}; {what} only applies to controllable factors"),
            )
        };
        view.set_factor_type(i, None, strip("factor_type"));
        view.set_uncertainty_drivers(i, None, strip("uncertainty_drivers"));
    }
}
