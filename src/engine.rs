//! The `reconcile -> repair -> validate` pipeline.
//!
//! [`Engine::run`] reconciles the graph in place, hands blocking issues to a
//! pluggable [`Repair`] step, validates the result and emits one telemetry
//! event. The engine holds no per-run state and can be shared across threads.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::graph::Graph;
use crate::issue::ValidationIssue;
use crate::reconcile::{reconcile, ReconcileOptions, ReconcileOutcome};
use crate::telemetry::{
    RunId, TelemetryCounts, TelemetryEvent, TelemetrySink, TracingSink, PIPELINE_COMPLETED,
};
use crate::validator::{LabelHeuristic, ValidationReport, Validator};

/// Automated fixes keyed on issue codes. Runs between reconciliation and the
/// final validation.
pub trait Repair: Send + Sync {
    /// Name of the repair strategy (for diagnostics).
    fn name(&self) -> &str;

    /// Patches `graph` in response to `errors`. Returns the number of fixes
    /// applied; zero means the graph was left untouched.
    fn repair(&self, graph: &mut Graph, errors: &[ValidationIssue]) -> usize;
}

/// Repair step that changes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRepair;

impl Repair for NoopRepair {
    fn name(&self) -> &str {
        "noop"
    }

    fn repair(&self, _graph: &mut Graph, _errors: &[ValidationIssue]) -> usize {
        0
    }
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    /// Run identifier, shared with the telemetry event.
    pub run_id: RunId,
    /// Reconciliation mutations and normalized constraints.
    pub reconciled: ReconcileOutcome,
    /// Fixes reported by the repair step.
    pub repairs_applied: usize,
    /// Final validation report.
    pub report: ValidationReport,
    /// Counts handed to the telemetry sink.
    pub counts: TelemetryCounts,
}

impl PipelineOutcome {
    /// Returns true if the final graph is valid.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.report.valid
    }
}

/// Configured pipeline.
#[derive(Clone)]
pub struct Engine {
    validator: Validator,
    repair: Arc<dyn Repair>,
    sink: Arc<dyn TelemetrySink>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("validator", &self.validator)
            .field("repair", &self.repair.name())
            .field("sink", &self.sink.name())
            .finish()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            validator: Validator::default(),
            repair: Arc::new(NoopRepair),
            sink: Arc::new(TracingSink),
        }
    }
}

impl Engine {
    /// Creates an engine after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` if the configuration is invalid.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            validator: Validator::new(config),
            ..Self::default()
        })
    }

    /// Replaces the repair step.
    #[must_use]
    pub fn with_repair(mut self, repair: Arc<dyn Repair>) -> Self {
        self.repair = repair;
        self
    }

    /// Replaces the telemetry sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replaces the goal-number label heuristic.
    #[must_use]
    pub fn with_heuristic(mut self, heuristic: Arc<dyn LabelHeuristic>) -> Self {
        self.validator = self.validator.with_heuristic(heuristic);
        self
    }

    /// Runs the pipeline over `graph`, which is reconciled and possibly
    /// repaired in place.
    pub fn run(&self, graph: &mut Graph, options: &ReconcileOptions) -> PipelineOutcome {
        let reconciled = reconcile(graph, options);

        let mut report = self.validator.validate(graph);
        let mut repairs_applied = 0;
        if !report.valid {
            repairs_applied = self.repair.repair(graph, &report.errors);
            if repairs_applied > 0 {
                tracing::debug!(
                    repair = self.repair.name(),
                    fixes = repairs_applied,
                    "repair step changed the graph, revalidating"
                );
                report = self.validator.validate(graph);
            }
        }

        let counts = TelemetryCounts::collect(&report, &reconciled);
        let fingerprint = graph.fingerprint().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "graph fingerprint unavailable");
            String::new()
        });
        let event = TelemetryEvent::new(PIPELINE_COMPLETED, fingerprint, counts.clone());
        let run_id = event.run_id;

        if let Err(e) = self.sink.emit(&event) {
            tracing::warn!(
                sink = self.sink.name(),
                error = %e,
                "telemetry emission failed, continuing"
            );
        }

        tracing::info!(
            run_id = %run_id,
            valid = report.valid,
            errors = counts.error_count,
            warnings = counts.warning_count,
            mutations = counts.mutation_count,
            repairs = repairs_applied,
            "pipeline complete"
        );

        PipelineOutcome {
            run_id,
            reconciled,
            repairs_applied,
            report,
            counts,
        }
    }

    /// Parses `json` as a graph and runs the pipeline over it.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Precondition` or `EngineError::Serialization` if
    /// the document is not a graph.
    pub fn run_json(
        &self,
        json: &str,
        options: &ReconcileOptions,
    ) -> EngineResult<(Graph, PipelineOutcome)> {
        let mut graph = Graph::from_json(json)?;
        let outcome = self.run(&mut graph, options);
        Ok((graph, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::graph::{Edge, Node};
    use crate::issue::IssueCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingSink;

    impl TelemetrySink for FailingSink {
        fn name(&self) -> &str {
            "failing"
        }

        fn emit(&self, _event: &TelemetryEvent) -> EngineResult<()> {
            Err(EngineError::telemetry("failing", "collector unavailable"))
        }
    }

    /// Drops every edge pointing at a missing node.
    struct DropDanglingEdges {
        calls: AtomicUsize,
    }

    impl Repair for DropDanglingEdges {
        fn name(&self) -> &str {
            "drop_dangling_edges"
        }

        fn repair(&self, graph: &mut Graph, errors: &[ValidationIssue]) -> usize {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !errors.iter().any(|i| i.code == IssueCode::InvalidEdgeRef) {
                return 0;
            }
            let before = graph.edges.len();
            let ids: Vec<String> = graph.nodes.iter().map(|n| n.id.clone()).collect();
            graph
                .edges
                .retain(|e| ids.contains(&e.from) && ids.contains(&e.to));
            before - graph.edges.len()
        }
    }

    fn valid_graph() -> Graph {
        Graph::new()
            .with_node(Node::goal("g", "Profit"))
            .with_node(Node::decision("d", "Pricing"))
            .with_node(Node::option("o1", "Premium").with_intervention("f1", 20.0))
            .with_node(Node::option("o2", "Budget").with_intervention("f2", 5.0))
            .with_node(controllable("f1", "Price"))
            .with_node(controllable("f2", "Volume"))
            .with_node(Node::outcome("out", "Revenue"))
            .with_edge(Edge::structural("d", "o1"))
            .with_edge(Edge::structural("d", "o2"))
            .with_edge(Edge::structural("o1", "f1"))
            .with_edge(Edge::structural("o2", "f2"))
            .with_edge(Edge::new("f1", "out").with_strength(0.6, 0.2).with_belief(0.9))
            .with_edge(Edge::new("f2", "out").with_strength(0.4, 0.2).with_belief(0.9))
            .with_edge(Edge::new("out", "g").with_strength(0.8, 0.1).with_belief(0.95))
    }

    fn controllable(id: &str, label: &str) -> Node {
        Node::factor(id, label)
            .with_value(1.0)
            .with_extraction_type(crate::graph::ExtractionType::Explicit)
            .with_factor_type(crate::graph::FactorType::Other)
            .with_uncertainty_drivers(["Market response"])
    }

    #[test]
    fn test_engine_rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.limits.max_edges = 0;
        assert!(Engine::new(config).unwrap_err().is_config());
    }

    #[test]
    fn test_valid_graph_runs_clean() {
        let mut g = valid_graph();
        let outcome = Engine::default().run(&mut g, &ReconcileOptions::default());
        assert!(outcome.is_valid(), "{:?}", outcome.report.errors);
        assert!(outcome.reconciled.is_noop());
        assert_eq!(outcome.repairs_applied, 0);
        assert_eq!(outcome.counts.error_count, 0);
    }

    #[test]
    fn test_failing_sink_does_not_change_result() {
        let mut a = valid_graph();
        let mut b = valid_graph();
        let quiet = Engine::default().run(&mut a, &ReconcileOptions::default());
        let failing = Engine::default()
            .with_sink(Arc::new(FailingSink))
            .run(&mut b, &ReconcileOptions::default());
        assert_eq!(quiet.report, failing.report);
        assert_eq!(quiet.counts, failing.counts);
    }

    #[test]
    fn test_repair_runs_only_when_invalid_and_triggers_revalidation() {
        let repair = Arc::new(DropDanglingEdges {
            calls: AtomicUsize::new(0),
        });
        let engine = Engine::default().with_repair(repair.clone());

        let mut clean = valid_graph();
        engine.run(&mut clean, &ReconcileOptions::default());
        assert_eq!(repair.calls.load(Ordering::SeqCst), 0);

        let mut broken = valid_graph().with_edge(Edge::new("out", "ghost"));
        let outcome = engine.run(&mut broken, &ReconcileOptions::default());
        assert_eq!(repair.calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.repairs_applied, 1);
        assert!(outcome.is_valid(), "{:?}", outcome.report.errors);
    }

    #[test]
    fn test_run_json_precondition() {
        let err = Engine::default()
            .run_json(r#"{ "nodes": [] }"#, &ReconcileOptions::default())
            .unwrap_err();
        assert!(err.is_precondition());
    }
}
