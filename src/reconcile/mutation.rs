//! Reconciliation audit records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::issue::Severity;

/// Field names used in [`StrpMutation::field`].
pub mod field {
    /// Node `category`.
    pub const CATEGORY: &str = "category";
    /// Factor `data.factor_type`.
    pub const FACTOR_TYPE: &str = "data.factor_type";
    /// Factor `data.uncertainty_drivers`.
    pub const UNCERTAINTY_DRIVERS: &str = "data.uncertainty_drivers";
    /// Factor `data.extractionType`.
    pub const EXTRACTION_TYPE: &str = "data.extractionType";
    /// Edge `effect_direction`.
    pub const EFFECT_DIRECTION: &str = "effect_direction";
    /// Goal constraint `node_id`.
    pub const CONSTRAINT_NODE_ID: &str = "node_id";
}

/// The rule that produced a mutation, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrpRule {
    /// Rule 1: declared factor category yields to inference.
    CategoryOverride,
    /// Rule 2: out-of-schema enum values reset to safe defaults.
    EnumValidation,
    /// Rule 3: goal-constraint targets matched to real node ids.
    ConstraintNormalization,
    /// Rule 4: edge direction follows the sign of its mean.
    SignReconciliation,
    /// Rule 5: defaults filled on controllable factors (opt-in).
    ControllableDataCompleteness,
}

impl StrpRule {
    /// Wire spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CategoryOverride => "category_override",
            Self::EnumValidation => "enum_validation",
            Self::ConstraintNormalization => "constraint_normalization",
            Self::SignReconciliation => "sign_reconciliation",
            Self::ControllableDataCompleteness => "controllable_data_completeness",
        }
    }
}

impl fmt::Display for StrpRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationCode {
    /// Declared category replaced by the inferred one.
    CategoryOverride,
    /// Default `factor_type` or `uncertainty_drivers` written.
    ControllableDataFilled,
    /// `factor_type` or `uncertainty_drivers` removed from a non-controllable factor.
    ControllableDataStripped,
    /// Out-of-schema enum value reset.
    EnumValueCorrected,
    /// Constraint retargeted to a fuzzy-matched node.
    ConstraintRemapped,
    /// Constraint removed for lack of a unique target.
    ConstraintDropped,
    /// Edge direction flipped to match its mean.
    SignCorrected,
}

impl MutationCode {
    /// Severity attached to mutations with this code.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::EnumValueCorrected | Self::SignCorrected => Severity::Warn,
            Self::CategoryOverride
            | Self::ControllableDataFilled
            | Self::ControllableDataStripped
            | Self::ConstraintRemapped
            | Self::ConstraintDropped => Severity::Info,
        }
    }
}

/// Why a write is happening. Passed to every view setter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    /// Producing rule.
    pub rule: StrpRule,
    /// Mutation code.
    pub code: MutationCode,
    /// Human-readable reason.
    pub reason: String,
}

impl Cause {
    /// Creates a cause.
    #[must_use]
    pub fn new(rule: StrpRule, code: MutationCode, reason: impl Into<String>) -> Self {
        Self {
            rule,
            code,
            reason: reason.into(),
        }
    }
}

/// One field change made by reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrpMutation {
    /// Producing rule.
    pub rule: StrpRule,
    /// What happened.
    pub code: MutationCode,

    /// Target node, for node field changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,

    /// Target edge label, for edge field changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_id: Option<String>,

    /// Position of the target in `nodes` or `edges`. Ids and labels need not
    /// be unique; the position always is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,

    /// Target constraint, for goal-constraint changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_id: Option<String>,

    /// Changed field, see [`field`].
    pub field: String,
    /// Value before; `null` when unset.
    pub before: serde_json::Value,
    /// Value after; `null` when unset.
    pub after: serde_json::Value,
    /// Human-readable reason.
    pub reason: String,
    /// `info` or `warn`.
    pub severity: Severity,
}

impl StrpMutation {
    pub(crate) fn from_cause(
        cause: Cause,
        field: &str,
        before: serde_json::Value,
        after: serde_json::Value,
    ) -> Self {
        Self {
            rule: cause.rule,
            severity: cause.code.severity(),
            code: cause.code,
            node_id: None,
            edge_id: None,
            index: None,
            constraint_id: None,
            field: field.to_string(),
            before,
            after,
            reason: cause.reason,
        }
    }

    #[must_use]
    pub(crate) fn on_node(mut self, id: impl Into<String>, index: usize) -> Self {
        self.node_id = Some(id.into());
        self.index = Some(index);
        self
    }

    #[must_use]
    pub(crate) fn on_edge(mut self, label: impl Into<String>, index: usize) -> Self {
        self.edge_id = Some(label.into());
        self.index = Some(index);
        self
    }

    #[must_use]
    pub(crate) fn on_constraint(mut self, id: Option<String>) -> Self {
        self.constraint_id = id;
        self
    }
}
