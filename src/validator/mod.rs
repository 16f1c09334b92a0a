//! Six-tier graph validator.
//!
//! Tiers run in a fixed order and every tier always runs, so a single call
//! reports the full issue set:
//!
//! 1. structural: node counts by kind, size ceilings, dangling endpoints
//! 2. topology: sink/source shape, edge matrix, cycles
//! 3. reachability: decision-to-node and node-to-goal paths
//! 4. factor data: data completeness against inferred category
//! 5. semantic: effect paths, duplicate options, canonical structural edges
//! 6. numeric: NaN and infinities
//!
//! The warning pass and the controllability summary are computed alongside.
//! The validator only reads the graph.

mod factor_data;
mod label;
mod numeric;
mod post_normalisation;
mod reachability;
mod semantic;
mod structural;
mod topology;
mod warnings;

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::category::FactorCategories;
use crate::config::EngineConfig;
use crate::graph::Graph;
use crate::index::GraphIndex;
use crate::issue::{IssueCode, Severity, ValidationIssue};
use crate::traverse::ControllabilitySummary;

pub use label::{GoalNumberPatterns, LabelHeuristic};
pub use post_normalisation::{validate_post_normalisation, PostNormalisationReport};
pub use semantic::intervention_signature;

/// Shared read-only state handed to every tier.
pub(crate) struct TierContext<'g> {
    pub graph: &'g Graph,
    pub index: GraphIndex<'g>,
    pub categories: FactorCategories,
    pub config: &'g EngineConfig,
}

impl<'g> TierContext<'g> {
    fn new(graph: &'g Graph, config: &'g EngineConfig) -> Self {
        let index = GraphIndex::build(graph);
        let categories = FactorCategories::infer(graph, &index);
        Self {
            graph,
            index,
            categories,
            config,
        }
    }
}

/// Result of [`Validator::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True iff `errors` is empty.
    pub valid: bool,
    /// Blocking issues, in tier order.
    pub errors: Vec<ValidationIssue>,
    /// Non-blocking advisories.
    pub warnings: Vec<ValidationIssue>,
    /// Observability-only findings (reachability exemptions).
    pub info: Vec<ValidationIssue>,
    /// Controllable-ancestry metric over outcome/risk nodes.
    pub controllability_summary: ControllabilitySummary,
}

impl ValidationReport {
    /// Returns true if any error, warning or info issue carries `code`.
    #[must_use]
    pub fn has_code(&self, code: IssueCode) -> bool {
        self.all_issues().any(|i| i.code == code)
    }

    /// Every issue carrying `code`, errors first.
    pub fn issues_with_code(&self, code: IssueCode) -> impl Iterator<Item = &ValidationIssue> {
        self.all_issues().filter(move |i| i.code == code)
    }

    /// Errors, then warnings, then info.
    pub fn all_issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .chain(self.info.iter())
    }
}

/// Configured validator.
#[derive(Clone)]
pub struct Validator {
    config: EngineConfig,
    heuristic: Arc<dyn LabelHeuristic>,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("config", &self.config)
            .field("heuristic", &self.heuristic.name())
            .finish()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Validator {
    /// Creates a validator with the curated goal-number heuristic.
    ///
    /// `config` is expected to have passed [`EngineConfig::validate`].
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            heuristic: Arc::new(GoalNumberPatterns::default()),
        }
    }

    /// Replaces the goal-number label heuristic.
    #[must_use]
    pub fn with_heuristic(mut self, heuristic: Arc<dyn LabelHeuristic>) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs all six tiers, the warning pass and the controllability summary.
    #[must_use]
    pub fn validate(&self, graph: &Graph) -> ValidationReport {
        let ctx = TierContext::new(graph, &self.config);

        let mut issues = Vec::new();

        let found = structural::check(&ctx);
        tracing::debug!(tier = "structural", issues = found.len(), "validation tier complete");
        issues.extend(found);

        let found = topology::check(&ctx);
        tracing::debug!(tier = "topology", issues = found.len(), "validation tier complete");
        issues.extend(found);

        let reach = reachability::check(&ctx);
        tracing::debug!(
            tier = "reachability",
            issues = reach.issues.len(),
            exempt = reach.exempt.len(),
            "validation tier complete"
        );
        issues.extend(reach.issues);

        let found = factor_data::check(&ctx);
        tracing::debug!(tier = "factor_data", issues = found.len(), "validation tier complete");
        issues.extend(found);

        let found = semantic::check(&ctx, self.heuristic.as_ref());
        tracing::debug!(tier = "semantic", issues = found.len(), "validation tier complete");
        issues.extend(found);

        let found = numeric::check(&ctx);
        tracing::debug!(tier = "numeric", issues = found.len(), "validation tier complete");
        issues.extend(found);

        let mut warnings = warnings::collect(&ctx);
        let controllability_summary =
            ControllabilitySummary::compute(&ctx.index, &ctx.categories, &reach.exempt);

        let mut errors = Vec::new();
        let mut info = Vec::new();
        for issue in issues {
            match issue.severity {
                Severity::Error => errors.push(issue),
                Severity::Warn => warnings.push(issue),
                Severity::Info => info.push(issue),
            }
        }

        tracing::debug!(
            errors = errors.len(),
            warnings = warnings.len(),
            info = info.len(),
            "graph validated"
        );

        ValidationReport {
            valid: errors.is_empty(),
            errors,
            warnings,
            info,
            controllability_summary,
        }
    }
}

/// Validates `graph` with the default configuration.
#[must_use]
pub fn validate(graph: &Graph) -> ValidationReport {
    Validator::default().validate(graph)
}

/// Nodes in document order, first occurrence of each id only.
pub(crate) fn unique_nodes(graph: &Graph) -> impl Iterator<Item = (usize, &crate::graph::Node)> {
    let mut seen: HashSet<&str> = HashSet::new();
    graph
        .nodes
        .iter()
        .enumerate()
        .filter(move |(_, n)| seen.insert(n.id.as_str()))
}
