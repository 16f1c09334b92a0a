use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use causalcheck::{
    reconcile, validate, Edge, ExtractionType, FactorCategory, FactorType, Graph, Node,
    ReconcileOptions,
};

/// One decision, `options` options, one controllable factor per option, and a
/// chain of observable factors feeding a single outcome.
fn make_graph(options: usize, chain: usize) -> Graph {
    let mut g = Graph::new()
        .with_node(Node::goal("g", "Grow margin"))
        .with_node(Node::decision("d", "Choose plan"))
        .with_node(Node::outcome("out", "Margin"))
        .with_edge(Edge::new("out", "g").with_strength(0.8, 0.1));

    for i in 0..options {
        let option = format!("o{i}");
        let factor = format!("f{i}");
        g = g
            .with_node(Node::option(&option, format!("Plan {i}")).with_intervention(&factor, 1.0))
            .with_node(
                Node::factor(&factor, format!("Lever {i}"))
                    // Declared wrong on purpose so reconciliation has work.
                    .with_category(FactorCategory::External)
                    .with_value(0.5)
                    .with_extraction_type(ExtractionType::Explicit)
                    .with_factor_type(FactorType::Cost)
                    .with_uncertainty_drivers(["Supplier pricing"]),
            )
            .with_edge(Edge::structural("d", &option))
            .with_edge(Edge::structural(&option, &factor))
            .with_edge(Edge::new(&factor, "c0").with_strength(0.4, 0.1));
    }

    for j in 0..chain {
        let id = format!("c{j}");
        let next = if j + 1 == chain {
            "out".to_string()
        } else {
            format!("c{}", j + 1)
        };
        g = g
            .with_node(
                Node::factor(&id, format!("Driver {j}"))
                    .with_value(1.0)
                    .with_extraction_type(ExtractionType::Observed),
            )
            .with_edge(Edge::new(&id, next).with_strength(0.3, 0.1));
    }
    g
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");
    for &(options, chain) in &[(2, 4), (6, 20), (6, 40)] {
        let g = make_graph(options, chain);
        group.throughput(Throughput::Elements(g.nodes.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(g.nodes.len()),
            &g,
            |b, g| b.iter(|| validate(black_box(g))),
        );
    }
    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    let template = make_graph(6, 20);
    group.throughput(Throughput::Elements(template.nodes.len() as u64));
    group.bench_function("six_overrides", |b| {
        b.iter_batched(
            || template.clone(),
            |mut g| reconcile(&mut g, &ReconcileOptions::default()),
            criterion::BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_validate, bench_reconcile);
criterion_main!(benches);
