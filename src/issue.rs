//! Validation issues.
//!
//! Every rule violation the engine finds is an issue with a stable code. The
//! downstream repair step keys its fixes on [`IssueCode`], so the wire
//! spelling of each code is part of the public contract.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How much an issue matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Observability only; never blocks.
    Info,
    /// Advisory; the graph is still valid.
    Warn,
    /// Blocks acceptance.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Stable issue codes.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    // Structural
    MissingGoal,
    MultipleGoals,
    MissingDecision,
    MultipleDecisions,
    InsufficientOptions,
    TooManyOptions,
    MissingOutcomeOrRisk,
    TooManyNodes,
    TooManyEdges,
    InvalidEdgeRef,

    // Topology
    GoalHasOutgoing,
    DecisionHasIncoming,
    InvalidEdgeType,
    CycleDetected,

    // Reachability
    UnreachableFromDecision,
    UnreachableOutcomeExempt,
    NoPathToGoal,

    // Factor data
    ControllableMissingData,
    ObservableMissingData,
    ObservableExtraData,
    ExternalHasData,
    CategoryMismatch,

    // Semantic
    NoEffectPath,
    OptionsIdentical,
    InvalidInterventionRef,
    GoalNumberAsFactor,
    StructuralEdgeNotCanonicalError,

    // Numeric
    NonFiniteValue,

    // Warnings
    StrengthOutOfRange,
    BeliefOutOfRange,
    OutcomeNegativePolarity,
    RiskPositivePolarity,
    LowEdgeConfidence,
    StructuralEdgeNotCanonical,
    EdgeStdTooLow,
    EmptyUncertaintyDrivers,

    // Post-normalisation
    SignMismatch,
}

impl IssueCode {
    /// Wire spelling, e.g. `CYCLE_DETECTED`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingGoal => "MISSING_GOAL",
            Self::MultipleGoals => "MULTIPLE_GOALS",
            Self::MissingDecision => "MISSING_DECISION",
            Self::MultipleDecisions => "MULTIPLE_DECISIONS",
            Self::InsufficientOptions => "INSUFFICIENT_OPTIONS",
            Self::TooManyOptions => "TOO_MANY_OPTIONS",
            Self::MissingOutcomeOrRisk => "MISSING_OUTCOME_OR_RISK",
            Self::TooManyNodes => "TOO_MANY_NODES",
            Self::TooManyEdges => "TOO_MANY_EDGES",
            Self::InvalidEdgeRef => "INVALID_EDGE_REF",
            Self::GoalHasOutgoing => "GOAL_HAS_OUTGOING",
            Self::DecisionHasIncoming => "DECISION_HAS_INCOMING",
            Self::InvalidEdgeType => "INVALID_EDGE_TYPE",
            Self::CycleDetected => "CYCLE_DETECTED",
            Self::UnreachableFromDecision => "UNREACHABLE_FROM_DECISION",
            Self::UnreachableOutcomeExempt => "UNREACHABLE_OUTCOME_EXEMPT",
            Self::NoPathToGoal => "NO_PATH_TO_GOAL",
            Self::ControllableMissingData => "CONTROLLABLE_MISSING_DATA",
            Self::ObservableMissingData => "OBSERVABLE_MISSING_DATA",
            Self::ObservableExtraData => "OBSERVABLE_EXTRA_DATA",
            Self::ExternalHasData => "EXTERNAL_HAS_DATA",
            Self::CategoryMismatch => "CATEGORY_MISMATCH",
            Self::NoEffectPath => "NO_EFFECT_PATH",
            Self::OptionsIdentical => "OPTIONS_IDENTICAL",
            Self::InvalidInterventionRef => "INVALID_INTERVENTION_REF",
            Self::GoalNumberAsFactor => "GOAL_NUMBER_AS_FACTOR",
            Self::StructuralEdgeNotCanonicalError => "STRUCTURAL_EDGE_NOT_CANONICAL_ERROR",
            Self::NonFiniteValue => "NON_FINITE_VALUE",
            Self::StrengthOutOfRange => "STRENGTH_OUT_OF_RANGE",
            Self::BeliefOutOfRange => "BELIEF_OUT_OF_RANGE",
            Self::OutcomeNegativePolarity => "OUTCOME_NEGATIVE_POLARITY",
            Self::RiskPositivePolarity => "RISK_POSITIVE_POLARITY",
            Self::LowEdgeConfidence => "LOW_EDGE_CONFIDENCE",
            Self::StructuralEdgeNotCanonical => "STRUCTURAL_EDGE_NOT_CANONICAL",
            Self::EdgeStdTooLow => "EDGE_STD_TOO_LOW",
            Self::EmptyUncertaintyDrivers => "EMPTY_UNCERTAINTY_DRIVERS",
            Self::SignMismatch => "SIGN_MISMATCH",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Stable code.
    pub code: IssueCode,
    /// Severity.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,

    /// Location, e.g. `edges[17]` or `nodesById.fac_price`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Structured diagnostic payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl ValidationIssue {
    /// Creates an issue.
    #[must_use]
    pub fn new(code: IssueCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            path: None,
            context: None,
        }
    }

    /// Creates an error-level issue.
    #[must_use]
    pub fn error(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    /// Creates a warning.
    #[must_use]
    pub fn warn(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warn, message)
    }

    /// Creates an info-level issue.
    #[must_use]
    pub fn info(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Info, message)
    }

    /// Sets the path.
    #[must_use]
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the structured context.
    #[must_use]
    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Returns true if this issue blocks acceptance.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

/// Path of an edge by position.
#[must_use]
pub fn edge_path(index: usize) -> String {
    format!("edges[{index}]")
}

/// Path of a node by id.
#[must_use]
pub fn node_path(id: &str) -> String {
    format!("nodesById.{id}")
}
