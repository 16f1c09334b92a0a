//! Tier 4: factor payloads must match the inferred category.

use serde_json::json;

use crate::graph::{FactorCategory, FactorData, NodeKind};
use crate::issue::{node_path, IssueCode, ValidationIssue};

use super::{unique_nodes, TierContext};

fn present_fields(data: &FactorData) -> [(&'static str, bool); 4] {
    [
        ("value", data.value.is_some()),
        ("extractionType", data.extraction_type.is_some()),
        ("factor_type", data.factor_type.is_some()),
        ("uncertainty_drivers", data.uncertainty_drivers.is_some()),
    ]
}

fn pick(
    fields: &[(&'static str, bool)],
    wanted: &[&str],
    present: bool,
) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(name, is_set)| wanted.contains(name) && *is_set == present)
        .map(|(name, _)| *name)
        .collect()
}

pub(crate) fn check(ctx: &TierContext<'_>) -> Vec<ValidationIssue> {
    let empty = FactorData::default();
    let mut issues = Vec::new();

    for (_, node) in unique_nodes(ctx.graph).filter(|(_, n)| n.kind == NodeKind::Factor) {
        let Some(info) = ctx.categories.get(&node.id) else {
            continue;
        };
        let id = node.id.as_str();
        let fields = present_fields(node.factor_data().unwrap_or(&empty));

        match info.category {
            FactorCategory::Controllable => {
                let missing = pick(
                    &fields,
                    &["value", "extractionType", "factor_type", "uncertainty_drivers"],
                    false,
                );
                if !missing.is_empty() {
                    issues.push(
                        ValidationIssue::error(
                            IssueCode::ControllableMissingData,
                            format!(
                                "Controllable factor '{id}' is missing {}",
                                missing.join(", ")
                            ),
                        )
                        .at(node_path(id))
                        .with_context(json!({ "missing": missing })),
                    );
                }
            }
            FactorCategory::Observable => {
                let missing = pick(&fields, &["value", "extractionType"], false);
                if !missing.is_empty() {
                    issues.push(
                        ValidationIssue::error(
                            IssueCode::ObservableMissingData,
                            format!(
                                "Observable factor '{id}' is missing {}",
                                missing.join(", ")
                            ),
                        )
                        .at(node_path(id))
                        .with_context(json!({ "missing": missing })),
                    );
                }
                let extra = pick(&fields, &["factor_type", "uncertainty_drivers"], true);
                if !extra.is_empty() {
                    issues.push(
                        ValidationIssue::error(
                            IssueCode::ObservableExtraData,
                            format!(
                                "Observable factor '{id}' must not carry {}",
                                extra.join(", ")
                            ),
                        )
                        .at(node_path(id))
                        .with_context(json!({ "extra": extra })),
                    );
                }
            }
            FactorCategory::External => {
                let extra = pick(&fields, &["value", "factor_type", "uncertainty_drivers"], true);
                if !extra.is_empty() {
                    issues.push(
                        ValidationIssue::error(
                            IssueCode::ExternalHasData,
                            format!("External factor '{id}' must not carry {}", extra.join(", ")),
                        )
                        .at(node_path(id))
                        .with_context(json!({ "extra": extra })),
                    );
                }
            }
        }

        if info.is_mismatched() {
            let declared = info.explicit_category.as_ref().map(|c| c.raw().to_string());
            issues.push(
                ValidationIssue::error(
                    IssueCode::CategoryMismatch,
                    format!(
                        "Factor '{id}' declares category '{}' but is structurally {}",
                        declared.as_deref().unwrap_or_default(),
                        info.category
                    ),
                )
                .at(node_path(id))
                .with_context(json!({ "declared": declared, "inferred": info.category })),
            );
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::graph::{Edge, ExtractionType, FactorType, Graph, Node};

    fn run(graph: &Graph) -> Vec<ValidationIssue> {
        let config = EngineConfig::default();
        let ctx = TierContext::new(graph, &config);
        check(&ctx)
    }

    fn controlled(factor: Node) -> Graph {
        Graph::new()
            .with_node(Node::option("o", "O"))
            .with_node(factor)
            .with_edge(Edge::structural("o", "f"))
    }

    #[test]
    fn test_complete_controllable_factor_passes() {
        let g = controlled(
            Node::factor("f", "Price")
                .with_value(10.0)
                .with_extraction_type(ExtractionType::Explicit)
                .with_factor_type(FactorType::Price)
                .with_uncertainty_drivers(["Competitor response"]),
        );
        assert!(run(&g).is_empty());
    }

    #[test]
    fn test_controllable_lists_exactly_what_is_missing() {
        let g = controlled(Node::factor("f", "Price").with_value(10.0));
        let issues = run(&g);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::ControllableMissingData);
        assert_eq!(
            issues[0].context.as_ref().unwrap()["missing"],
            json!(["extractionType", "factor_type", "uncertainty_drivers"])
        );
        assert_eq!(issues[0].path.as_deref(), Some("nodesById.f"));
    }

    #[test]
    fn test_observable_missing_and_extra() {
        let g = Graph::new().with_node(
            Node::factor("f", "Churn")
                .with_value(0.1)
                .with_factor_type(FactorType::Probability),
        );
        let codes: Vec<_> = run(&g).into_iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![IssueCode::ObservableMissingData, IssueCode::ObservableExtraData]
        );
    }

    #[test]
    fn test_external_with_data() {
        let g = Graph::new()
            .with_node(Node::factor("f", "Weather").with_uncertainty_drivers(["Seasonality"]));
        let issues = run(&g);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::ExternalHasData);
    }

    #[test]
    fn test_declared_category_disagreement() {
        let g = Graph::new().with_node(
            Node::factor("f", "Weather").with_category(FactorCategory::Controllable),
        );
        let issues = run(&g);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::CategoryMismatch);
        let ctx = issues[0].context.as_ref().unwrap();
        assert_eq!(ctx["declared"], "controllable");
        assert_eq!(ctx["inferred"], "external");
    }
}
