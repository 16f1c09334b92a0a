//! Tier 2: sink/source shape, the edge matrix, and acyclicity.

use std::collections::{HashMap, VecDeque};

use serde_json::json;

use crate::graph::NodeKind;
use crate::issue::{edge_path, node_path, IssueCode, ValidationIssue};
use crate::matrix;

use super::{unique_nodes, TierContext};

fn sink_and_source(ctx: &TierContext<'_>, issues: &mut Vec<ValidationIssue>) {
    for goal in ctx.index.of_kind(NodeKind::Goal) {
        let targets = ctx.index.successors(&goal.id);
        if !targets.is_empty() {
            issues.push(
                ValidationIssue::error(
                    IssueCode::GoalHasOutgoing,
                    format!("Goal '{}' must not have outgoing edges", goal.id),
                )
                .at(node_path(&goal.id))
                .with_context(json!({ "targets": targets })),
            );
        }
    }
    for decision in ctx.index.of_kind(NodeKind::Decision) {
        let sources = ctx.index.predecessors(&decision.id);
        if !sources.is_empty() {
            issues.push(
                ValidationIssue::error(
                    IssueCode::DecisionHasIncoming,
                    format!("Decision '{}' must not have incoming edges", decision.id),
                )
                .at(node_path(&decision.id))
                .with_context(json!({ "sources": sources })),
            );
        }
    }
}

fn edge_types(ctx: &TierContext<'_>, issues: &mut Vec<ValidationIssue>) {
    for (i, edge) in ctx.graph.edges.iter().enumerate() {
        let (Some(from), Some(to)) = (ctx.index.kind_of(&edge.from), ctx.index.kind_of(&edge.to))
        else {
            continue;
        };
        let target_category = ctx.categories.category_of(&edge.to);
        if !matrix::is_allowed(from, to, target_category) {
            issues.push(
                ValidationIssue::error(
                    IssueCode::InvalidEdgeType,
                    format!("Edge {} ({from} -> {to}) is not permitted", edge.label()),
                )
                .at(edge_path(i))
                .with_context(json!({
                    "from_kind": from,
                    "to_kind": to,
                    "target_category": target_category,
                })),
            );
        }
    }
}

/// Kahn's algorithm over resolvable edges. Returns the ids left with
/// non-zero in-degree (nodes on a cycle or downstream of one), sorted; empty
/// iff the graph is acyclic.
pub(crate) fn cyclic_nodes(ctx: &TierContext<'_>) -> Vec<String> {
    let mut in_degree: HashMap<&str, usize> = unique_nodes(ctx.graph)
        .map(|(_, n)| (n.id.as_str(), 0))
        .collect();

    let resolved = |id: &str| ctx.index.by_id.contains_key(id);
    for edge in &ctx.graph.edges {
        if resolved(&edge.from) && resolved(&edge.to) {
            if let Some(d) = in_degree.get_mut(edge.to.as_str()) {
                *d += 1;
            }
        }
    }

    let mut queue: VecDeque<&str> = unique_nodes(ctx.graph)
        .map(|(_, n)| n.id.as_str())
        .filter(|id| in_degree.get(id) == Some(&0))
        .collect();

    let mut dequeued = 0usize;
    while let Some(id) = queue.pop_front() {
        dequeued += 1;
        for &next in ctx.index.successors(id) {
            if let Some(d) = in_degree.get_mut(next) {
                *d -= 1;
                if *d == 0 {
                    queue.push_back(next);
                }
            }
        }
    }

    if dequeued == in_degree.len() {
        return Vec::new();
    }
    let mut left: Vec<String> = in_degree
        .into_iter()
        .filter(|&(_, d)| d > 0)
        .map(|(id, _)| id.to_string())
        .collect();
    left.sort();
    left
}

pub(crate) fn check(ctx: &TierContext<'_>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    sink_and_source(ctx, &mut issues);
    edge_types(ctx, &mut issues);

    let cyclic = cyclic_nodes(ctx);
    if !cyclic.is_empty() {
        issues.push(
            ValidationIssue::error(
                IssueCode::CycleDetected,
                format!(
                    "Graph contains a cycle; {} node(s) could not be topologically ordered",
                    cyclic.len()
                ),
            )
            .with_context(json!({ "node_ids": cyclic })),
        );
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::graph::{Edge, FactorCategory, Graph, Node};

    fn run(graph: &Graph) -> Vec<ValidationIssue> {
        let config = EngineConfig::default();
        let ctx = TierContext::new(graph, &config);
        check(&ctx)
    }

    #[test]
    fn test_factor_cycle_is_detected() {
        let g = Graph::new()
            .with_node(Node::factor("a", "A"))
            .with_node(Node::factor("b", "B"))
            .with_node(Node::factor("c", "C"))
            .with_node(Node::outcome("out", "Out"))
            .with_edge(Edge::new("a", "b"))
            .with_edge(Edge::new("b", "c"))
            .with_edge(Edge::new("c", "a"))
            .with_edge(Edge::new("c", "out"));
        let issues = run(&g);
        let cycle = issues
            .iter()
            .find(|i| i.code == IssueCode::CycleDetected)
            .unwrap();
        assert_eq!(
            cycle.context.as_ref().unwrap()["node_ids"],
            json!(["a", "b", "c", "out"])
        );
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let g = Graph::new()
            .with_node(Node::factor("a", "A"))
            .with_edge(Edge::new("a", "a"));
        assert!(run(&g).iter().any(|i| i.code == IssueCode::CycleDetected));
    }

    #[test]
    fn test_dangling_edges_do_not_affect_cycle_detection() {
        let g = Graph::new()
            .with_node(Node::factor("a", "A"))
            .with_edge(Edge::new("ghost", "a"))
            .with_edge(Edge::new("a", "phantom"));
        assert!(run(&g).is_empty());
    }

    #[test]
    fn test_goal_sink_and_decision_source() {
        let g = Graph::new()
            .with_node(Node::goal("g", "G"))
            .with_node(Node::decision("d", "D"))
            .with_node(Node::outcome("out", "Out"))
            .with_edge(Edge::new("g", "out"))
            .with_edge(Edge::new("out", "d"));
        let codes: Vec<_> = run(&g).into_iter().map(|i| i.code).collect();
        assert!(codes.contains(&IssueCode::GoalHasOutgoing));
        assert!(codes.contains(&IssueCode::DecisionHasIncoming));
        assert!(codes.contains(&IssueCode::InvalidEdgeType));
    }

    #[test]
    fn test_edge_matrix_uses_inferred_category() {
        // The option edge itself makes the factor controllable, so a declared
        // category never rescues or condemns an option->factor edge.
        let g = Graph::new()
            .with_node(Node::option("o", "O"))
            .with_node(Node::factor("f", "F").with_category(FactorCategory::External))
            .with_edge(Edge::structural("o", "f"));
        assert!(run(&g).is_empty());

        let g = Graph::new()
            .with_node(Node::option("o", "O"))
            .with_node(Node::outcome("out", "Out"))
            .with_edge(Edge::new("o", "out"));
        let issues = run(&g);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::InvalidEdgeType);
        assert_eq!(issues[0].path.as_deref(), Some("edges[0]"));
    }
}
