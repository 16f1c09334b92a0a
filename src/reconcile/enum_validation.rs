//! Rule 2: out-of-schema enum values are reset to safe defaults.
//!
//! | field              | reset to     |
//! |--------------------|--------------|
//! | `factor_type`      | `other`      |
//! | `extractionType`   | `inferred`   |
//! | `category`         | unset        |
//! | `effect_direction` | `positive`   |

use crate::graph::{EffectDirection, ExtractionType, Lenient, SchemaEnum, DEFAULT_FACTOR_TYPE};

use super::mutation::{Cause, MutationCode, StrpRule};
use super::view::ReconcileView;

fn unknown<T>(value: Option<&Lenient<T>>) -> Option<String> {
    match value {
        Some(Lenient::Unknown(raw)) => Some(raw.clone()),
        _ => None,
    }
}

fn cause(field: &str, raw: &str, reset: &str) -> Cause {
    Cause::new(
        StrpRule::EnumValidation,
        MutationCode::EnumValueCorrected,
        format!("'{raw}' is not a valid {field}; reset to {reset}"),
    )
}

pub(super) fn apply(view: &mut ReconcileView<'_>) {
    for i in 0..view.graph().nodes.len() {
        let node = &view.graph().nodes[i];
        let category = unknown(node.category.as_ref());
        let (factor_type, extraction_type) = node.factor_data().map_or((None, None), |d| {
            (
                unknown(d.factor_type.as_ref()),
                unknown(d.extraction_type.as_ref()),
            )
        });

        if let Some(raw) = category {
            view.set_factor_category(i, None, cause("category", &raw, "unset"));
        }
        if let Some(raw) = factor_type {
            view.set_factor_type(
                i,
                Some(DEFAULT_FACTOR_TYPE.into()),
                cause("factor_type", &raw, DEFAULT_FACTOR_TYPE.as_str()),
            );
        }
        if let Some(raw) = extraction_type {
            view.set_extraction_type(
                i,
                Some(ExtractionType::Inferred.into()),
                cause("extractionType", &raw, ExtractionType::Inferred.as_str()),
            );
        }
    }

    for i in 0..view.graph().edges.len() {
        if let Some(raw) = unknown(view.graph().edges[i].effect_direction.as_ref()) {
            view.set_edge_direction(
                i,
                Some(EffectDirection::Positive.into()),
                cause("effect_direction", &raw, EffectDirection::Positive.as_str()),
            );
        }
    }
}
