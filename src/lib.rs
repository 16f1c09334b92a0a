//! # causalcheck - Validation and reconciliation for causal decision graphs
//!
//! causalcheck checks a directed decision graph (a goal, a decision, its
//! options, the factors they move and the outcomes and risks those factors
//! drive) against a closed set of structural and semantic rules, and corrects
//! a bounded set of metadata fields that contradict the graph's own structure.
//!
//! ## Core Concepts
//!
//! - **Graph**: flat node and edge lists; edges refer to nodes by id
//! - **Factor category**: controllable, observable or external, inferred from
//!   topology and data, never trusted from the declaration
//! - **Validator**: six tiers (structural, topology, reachability, factor
//!   data, semantic, numeric) plus non-blocking warnings
//! - **Reconciliation**: five ordered rules that rewrite metadata through a
//!   restricted view, logging one mutation per field change
//!
//! ## Usage
//!
//! ```rust,ignore
//! use causalcheck::{Engine, Graph, ReconcileOptions};
//!
//! let mut graph = Graph::from_json(&std::fs::read_to_string("graph.json")?)?;
//! let outcome = Engine::default().run(&mut graph, &ReconcileOptions::default());
//! for issue in &outcome.report.errors {
//!     println!("{} at {:?}: {}", issue.code, issue.path, issue.message);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Data model
pub mod error;
pub mod graph;
pub mod issue;

// Shared analysis
pub mod category;
pub mod index;
pub mod matrix;
pub mod traverse;

// Validation and reconciliation
pub mod config;
pub mod reconcile;
pub mod validator;

// Pipeline
pub mod engine;
pub mod telemetry;

pub use category::{FactorCategories, FactorCategoryInfo};
pub use config::{EngineConfig, GraphLimits, StructuralEdgeTolerance, WarningThresholds};
pub use engine::{Engine, NoopRepair, PipelineOutcome, Repair};
pub use error::{ConfigError, EngineError, EngineResult};
pub use graph::{
    Edge, EffectDirection, ExtractionType, FactorCategory, FactorData, FactorType, Graph, Lenient,
    Node, NodeData, NodeKind, OptionData, SchemaEnum,
};
pub use index::GraphIndex;
pub use issue::{IssueCode, Severity, ValidationIssue};
pub use reconcile::{
    reconcile, replay, GoalConstraint, MutationCode, ReconcileOptions, ReconcileOutcome,
    StrpMutation, StrpRule,
};
pub use telemetry::{TelemetryCounts, TelemetryEvent, TelemetrySink, TracingSink};
pub use traverse::ControllabilitySummary;
pub use validator::{
    validate, validate_post_normalisation, GoalNumberPatterns, LabelHeuristic,
    PostNormalisationReport, ValidationReport, Validator,
};
