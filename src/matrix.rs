//! The closed-world edge matrix.
//!
//! An edge is permitted iff its `(from kind, to kind)` pair appears here and,
//! for pairs refined by factor category, the target factor's inferred
//! category satisfies the refinement.

use crate::graph::{FactorCategory, NodeKind};

/// Extra condition attached to an allowed pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refinement {
    /// The target factor must be inferred with this category.
    TargetCategory(FactorCategory),
}

/// Verdict for one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRule {
    /// Permitted unconditionally.
    Allowed,
    /// Permitted if the refinement holds.
    Refined(Refinement),
    /// Not in the matrix.
    Forbidden,
}

/// Looks up the `(from, to)` pair.
#[must_use]
pub const fn rule_for(from: NodeKind, to: NodeKind) -> EdgeRule {
    use NodeKind::{Action, Decision, Factor, Goal, Outcome, Risk};

    match (from, to) {
        (Decision, NodeKind::Option) => EdgeRule::Allowed,
        (NodeKind::Option, Factor) => {
            EdgeRule::Refined(Refinement::TargetCategory(FactorCategory::Controllable))
        }
        (NodeKind::Option, Action) => EdgeRule::Allowed,
        (Factor | Action, Factor | Outcome | Risk) => EdgeRule::Allowed,
        (Outcome | Risk, Outcome | Risk | Goal) => EdgeRule::Allowed,
        (Goal, _)
        | (_, Decision)
        | (Decision, Goal | Factor | Outcome | Risk | Action)
        | (NodeKind::Option, NodeKind::Option | Outcome | Risk | Goal)
        | (Factor | Action, NodeKind::Option | Goal | Action)
        | (Outcome | Risk, NodeKind::Option | Factor | Action) => EdgeRule::Forbidden,
    }
}

/// Returns true if an edge of this shape is permitted.
///
/// `target_category` is the inferred category of the target when it is a
/// factor; it is ignored otherwise.
#[must_use]
pub fn is_allowed(from: NodeKind, to: NodeKind, target_category: Option<FactorCategory>) -> bool {
    match rule_for(from, to) {
        EdgeRule::Allowed => true,
        EdgeRule::Refined(Refinement::TargetCategory(required)) => {
            target_category == Some(required)
        }
        EdgeRule::Forbidden => false,
    }
}

/// Returns true for decision→option and option→factor edges.
#[must_use]
pub const fn is_structural(from: NodeKind, to: NodeKind) -> bool {
    matches!(
        (from, to),
        (NodeKind::Decision, NodeKind::Option) | (NodeKind::Option, NodeKind::Factor)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_causal_chain_is_allowed() {
        assert!(is_allowed(NodeKind::Decision, NodeKind::Option, None));
        assert!(is_allowed(
            NodeKind::Option,
            NodeKind::Factor,
            Some(FactorCategory::Controllable)
        ));
        assert!(is_allowed(NodeKind::Factor, NodeKind::Factor, Some(FactorCategory::External)));
        assert!(is_allowed(NodeKind::Factor, NodeKind::Outcome, None));
        assert!(is_allowed(NodeKind::Risk, NodeKind::Goal, None));
    }

    #[test]
    fn test_option_to_non_controllable_factor_is_refused() {
        assert!(!is_allowed(
            NodeKind::Option,
            NodeKind::Factor,
            Some(FactorCategory::Observable)
        ));
    }

    #[test]
    fn test_shortcuts_are_forbidden() {
        assert!(!is_allowed(NodeKind::Decision, NodeKind::Goal, None));
        assert!(!is_allowed(NodeKind::Option, NodeKind::Outcome, None));
        assert!(!is_allowed(NodeKind::Factor, NodeKind::Goal, None));
        assert!(!is_allowed(NodeKind::Goal, NodeKind::Outcome, None));
        assert!(!is_allowed(NodeKind::Outcome, NodeKind::Decision, None));
    }

    #[test]
    fn test_structural_pairs() {
        assert!(is_structural(NodeKind::Decision, NodeKind::Option));
        assert!(is_structural(NodeKind::Option, NodeKind::Factor));
        assert!(!is_structural(NodeKind::Factor, NodeKind::Outcome));
    }
}
