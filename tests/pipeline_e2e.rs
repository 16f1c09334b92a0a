use std::sync::{Arc, Mutex};

use causalcheck::telemetry::PIPELINE_COMPLETED;
use causalcheck::{
    Edge, Engine, EngineConfig, EngineError, EngineResult, ExtractionType, FactorCategory,
    FactorType, Graph, IssueCode, Node, ReconcileOptions, StrpRule, TelemetryEvent, TelemetrySink,
};

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl TelemetrySink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    fn emit(&self, event: &TelemetryEvent) -> EngineResult<()> {
        self.events
            .lock()
            .map_err(|_| EngineError::telemetry("recording", "poisoned"))?
            .push(event.clone());
        Ok(())
    }
}

struct UnreachableSink;

impl TelemetrySink for UnreachableSink {
    fn name(&self) -> &str {
        "unreachable"
    }

    fn emit(&self, _event: &TelemetryEvent) -> EngineResult<()> {
        Err(EngineError::telemetry("unreachable", "connection refused"))
    }
}

/// Two options on one price factor; the factor is declared external and
/// still lacks its controllable fields.
fn drifted_pricing() -> Graph {
    Graph::new()
        .with_node(Node::goal("g1", "Grow revenue"))
        .with_node(Node::decision("d1", "Set seat price"))
        .with_node(Node::option("o1", "Hold").with_intervention("fac_price", 45.0))
        .with_node(Node::option("o2", "Raise").with_intervention("fac_price", 55.0))
        .with_node(
            Node::factor("fac_price", "Price per seat")
                .with_category(FactorCategory::External)
                .with_value(49.0)
                .with_extraction_type(ExtractionType::Explicit),
        )
        .with_node(Node::outcome("out_revenue", "Recurring revenue"))
        .with_edge(Edge::structural("d1", "o1"))
        .with_edge(Edge::structural("d1", "o2"))
        .with_edge(Edge::structural("o1", "fac_price"))
        .with_edge(Edge::structural("o2", "fac_price"))
        .with_edge(Edge::new("fac_price", "out_revenue").with_strength(0.5, 0.1))
        .with_edge(Edge::new("out_revenue", "g1").with_strength(0.9, 0.1))
}

#[test]
fn pipeline_reconciles_then_validates() {
    let sink = Arc::new(RecordingSink::default());
    let engine = Engine::default().with_sink(sink.clone());

    let mut g = drifted_pricing();
    let outcome = engine.run(&mut g, &ReconcileOptions::default());

    assert!(outcome.is_valid(), "{:#?}", outcome.report.errors);
    assert_eq!(outcome.repairs_applied, 0);
    assert_eq!(outcome.counts.mutation_count, 3);
    assert_eq!(
        outcome.counts.mutations_by_rule.get(&StrpRule::CategoryOverride),
        Some(&3)
    );
    let price = g.node("fac_price").unwrap().factor_data().unwrap();
    assert!(price.factor_type.is_some());

    let events = sink.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.event, PIPELINE_COMPLETED);
    assert_eq!(event.run_id, outcome.run_id);
    assert_eq!(event.counts, outcome.counts);
    assert_eq!(event.graph_fingerprint, g.fingerprint().unwrap());
}

#[test]
fn failing_sink_does_not_change_the_result() {
    let mut quiet = drifted_pricing();
    let mut noisy = drifted_pricing();

    let base = Engine::default().run(&mut quiet, &ReconcileOptions::default());
    let failed = Engine::default()
        .with_sink(Arc::new(UnreachableSink))
        .run(&mut noisy, &ReconcileOptions::default());

    assert_eq!(failed.report, base.report);
    assert_eq!(failed.reconciled, base.reconciled);
    assert_eq!(noisy, quiet);
}

#[test]
fn summary_totals_add_up() {
    let mut g = drifted_pricing()
        .with_node(Node::risk("risk_outage", "Outage"))
        .with_node(Node::outcome("out_brand", "Brand strength"))
        .with_edge(Edge::new("risk_outage", "g1").with_strength(-0.3, 0.2))
        .with_edge(Edge::new("out_brand", "risk_outage").with_strength(-0.2, 0.2));

    let outcome = Engine::default().run(&mut g, &ReconcileOptions::default());
    let s = &outcome.report.controllability_summary;
    assert_eq!(s.total_outcome_risk_nodes, 3);
    assert_eq!(
        s.total_outcome_risk_nodes,
        s.with_controllable_ancestry + s.without_controllable_ancestry
    );
    assert_eq!(s.nodes_without_controllable_ancestry.len(), 2);
    assert_eq!(s.exempt_without_controllable_ancestry.len(), 2);
    assert_eq!(outcome.counts.exempt_without_controllable_ancestry, 2);
    assert_eq!(outcome.counts.info_count, 2);
}

#[test]
fn run_json_rejects_documents_without_graph_arrays() {
    let engine = Engine::default();
    let opts = ReconcileOptions::default();

    let err = engine.run_json(r#"{ "nodes": [] }"#, &opts).unwrap_err();
    assert!(err.is_precondition());
    assert!(err.to_string().contains("edges"));

    let err = engine.run_json(r#"[1, 2, 3]"#, &opts).unwrap_err();
    assert!(err.is_precondition());

    let err = engine.run_json("{ not json", &opts).unwrap_err();
    assert!(err.is_serialization());
}

#[test]
fn run_json_returns_the_reconciled_graph() {
    let json = drifted_pricing().to_json_pretty().unwrap();
    let (graph, outcome) = Engine::default()
        .run_json(&json, &ReconcileOptions::default())
        .unwrap();
    assert!(outcome.is_valid());
    assert_eq!(
        graph.node("fac_price").unwrap().declared_category(),
        Some(FactorCategory::Controllable)
    );
}

#[test]
fn invalid_graph_reports_errors_after_reconciliation() {
    let mut g = drifted_pricing().with_node(
        Node::factor("fac_target", "Reach $2M ARR")
            .with_value(2_000_000.0)
            .with_extraction_type(ExtractionType::Explicit)
            .with_factor_type(FactorType::Revenue),
    );
    g = g.with_edge(Edge::new("fac_target", "out_revenue").with_strength(0.3, 0.1));

    let outcome = Engine::default().run(&mut g, &ReconcileOptions::default());
    assert!(!outcome.is_valid());
    assert!(outcome.report.has_code(IssueCode::GoalNumberAsFactor));
    assert_eq!(outcome.counts.error_count, outcome.report.errors.len());
}

#[test]
fn engine_rejects_bad_config() {
    let mut config = EngineConfig::default();
    config.limits.min_options = 4;
    config.limits.max_options = 3;
    let err = Engine::new(config).unwrap_err();
    assert!(err.is_config());
}

#[test]
fn run_json_keeps_fields_outside_the_model() {
    let mut doc = serde_json::to_value(drifted_pricing()).unwrap();
    doc["nodes"][4]["description"] = serde_json::json!("List price per seat");
    doc["nodes"][4]["data"]["unit"] = serde_json::json!("USD");
    doc["edges"][4]["provenance"] = serde_json::json!("pricing interview");

    let (graph, outcome) = Engine::default()
        .run_json(&doc.to_string(), &ReconcileOptions::default())
        .unwrap();
    assert_eq!(outcome.counts.mutation_count, 3);

    let out = serde_json::to_value(&graph).unwrap();
    assert_eq!(out["nodes"][4]["description"], "List price per seat");
    assert_eq!(out["nodes"][4]["data"]["unit"], "USD");
    assert_eq!(out["nodes"][4]["category"], "controllable");
    assert_eq!(out["edges"][4]["provenance"], "pricing interview");
}
