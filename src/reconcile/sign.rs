//! Rule 4: an edge's declared direction follows the sign of its mean.

use crate::graph::EffectDirection;

use super::mutation::{Cause, MutationCode, StrpRule};
use super::view::ReconcileView;

pub(super) fn apply(view: &mut ReconcileView<'_>) {
    for i in 0..view.graph().edges.len() {
        let edge = &view.graph().edges[i];
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
        if declared == actual {
            continue;
        }
        view.set_edge_direction(
            i,
            Some(actual.into()),
            Cause::new(
                StrpRule::SignReconciliation,
                MutationCode::SignCorrected,
                format!("Declared {declared} but strength_mean is {mean}"),
            ),
        );
    }
}
