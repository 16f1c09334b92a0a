//! Pipeline telemetry.
//!
//! Each pipeline run produces one [`TelemetryEvent`] whose [`TelemetryCounts`]
//! have a stable serialized shape for downstream dashboards. Emission is
//! fire-and-forget: the engine logs a failing sink and carries on.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::reconcile::{ReconcileOutcome, StrpRule};
use crate::validator::ValidationReport;

/// Event name for a completed `reconcile -> repair -> validate` run.
pub const PIPELINE_COMPLETED: &str = "graph_pipeline.completed";

/// Identifier of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Creates a new random run id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issue, mutation and controllability counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounts {
    /// Validation errors.
    pub error_count: usize,
    /// Validation warnings.
    pub warning_count: usize,
    /// Info-level findings.
    pub info_count: usize,
    /// Reconciliation mutations.
    pub mutation_count: usize,
    /// Reconciliation mutations per rule.
    pub mutations_by_rule: BTreeMap<StrpRule, usize>,
    /// Outcome and risk nodes.
    pub total_outcome_risk_nodes: usize,
    /// Outcome/risk nodes with a controllable ancestor.
    pub with_controllable_ancestry: usize,
    /// Outcome/risk nodes without one.
    pub without_controllable_ancestry: usize,
    /// Of those, the ones exempted by reachability.
    pub exempt_without_controllable_ancestry: usize,
}

impl TelemetryCounts {
    /// Collects counts from a run's results.
    #[must_use]
    pub fn collect(report: &ValidationReport, reconciled: &ReconcileOutcome) -> Self {
        let summary = &report.controllability_summary;
        Self {
            error_count: report.errors.len(),
            warning_count: report.warnings.len(),
            info_count: report.info.len(),
            mutation_count: reconciled.mutations.len(),
            mutations_by_rule: reconciled.count_by_rule(),
            total_outcome_risk_nodes: summary.total_outcome_risk_nodes,
            with_controllable_ancestry: summary.with_controllable_ancestry,
            without_controllable_ancestry: summary.without_controllable_ancestry,
            exempt_without_controllable_ancestry: summary.exempt_count(),
        }
    }
}

/// One telemetry emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Event name.
    pub event: String,
    /// Run identifier.
    pub run_id: RunId,
    /// Emission time.
    pub emitted_at: DateTime<Utc>,
    /// BLAKE3 fingerprint of the validated graph.
    pub graph_fingerprint: String,
    /// Counts.
    pub counts: TelemetryCounts,
}

impl TelemetryEvent {
    /// Creates an event stamped now with a fresh run id.
    #[must_use]
    pub fn new(
        event: impl Into<String>,
        graph_fingerprint: impl Into<String>,
        counts: TelemetryCounts,
    ) -> Self {
        Self {
            event: event.into(),
            run_id: RunId::new(),
            emitted_at: Utc::now(),
            graph_fingerprint: graph_fingerprint.into(),
            counts,
        }
    }
}

/// Destination for telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Name of the sink (for diagnostics).
    fn name(&self) -> &str;

    /// Delivers one event.
    ///
    /// # Errors
    ///
    /// Implementations return `EngineError::Telemetry` when delivery fails.
    fn emit(&self, event: &TelemetryEvent) -> EngineResult<()>;
}

/// Sink that writes events as structured `tracing` records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn name(&self) -> &str {
        "tracing"
    }

    fn emit(&self, event: &TelemetryEvent) -> EngineResult<()> {
        let c = &event.counts;
        tracing::info!(
            event = %event.event,
            run_id = %event.run_id,
            fingerprint = %event.graph_fingerprint,
            errors = c.error_count,
            warnings = c.warning_count,
            info = c.info_count,
            mutations = c.mutation_count,
            outcome_risk_nodes = c.total_outcome_risk_nodes,
            without_controllable_ancestry = c.without_controllable_ancestry,
            "telemetry"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Graph, Node};
    use crate::reconcile::{reconcile, ReconcileOptions};
    use crate::validator::validate;

    #[test]
    fn test_counts_shape_is_stable() {
        let json = serde_json::to_value(TelemetryCounts::default()).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "error_count",
                "exempt_without_controllable_ancestry",
                "info_count",
                "mutation_count",
                "mutations_by_rule",
                "total_outcome_risk_nodes",
                "warning_count",
                "with_controllable_ancestry",
                "without_controllable_ancestry",
            ]
        );
    }

    #[test]
    fn test_counts_from_results() {
        let mut g = Graph::new()
            .with_node(Node::factor("f", "F").with_factor_type("widgets"))
            .with_node(Node::outcome("out", "Out"))
            .with_edge(Edge::new("f", "out"));
        let reconciled = reconcile(&mut g, &ReconcileOptions::default());
        let report = validate(&g);
        let counts = TelemetryCounts::collect(&report, &reconciled);

        assert_eq!(counts.mutation_count, 1);
        assert_eq!(counts.mutations_by_rule.get(&StrpRule::EnumValidation), Some(&1));
        assert_eq!(counts.error_count, report.errors.len());
        assert_eq!(counts.total_outcome_risk_nodes, 1);
        assert_eq!(counts.without_controllable_ancestry, 1);

        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json["mutations_by_rule"]["enum_validation"], 1);
    }

    #[test]
    fn test_tracing_sink_accepts_events() {
        let event = TelemetryEvent::new(PIPELINE_COMPLETED, "abc", TelemetryCounts::default());
        assert!(TracingSink.emit(&event).is_ok());
        assert_ne!(event.run_id, RunId::new());
    }
}
