//! Goal-number label heuristic.
//!
//! Detects factor labels that restate the goal's target number ("Reach $1M
//! ARR", "80% of target") instead of naming a causal variable. Matching is
//! heuristic: false positives and negatives are expected, so callers can
//! plug in their own [`LabelHeuristic`].

use std::sync::OnceLock;

use regex::Regex;

/// Decides whether a factor label looks like a restated goal number.
pub trait LabelHeuristic: Send + Sync {
    /// Returns true if `label` reads as a goal target rather than a factor.
    fn looks_like_goal_number(&self, label: &str) -> bool;

    /// Short name for diagnostics.
    fn name(&self) -> &'static str;
}

const DEFAULT_MATCHERS: &[&str] = &[
    // "$1.2M ARR", "€500k revenue", "£3 million in sales"
    r"(?i)[$€£]\s?\d[\d,]*(?:\.\d+)?\s?(?:k|m|bn|million|billion)?\s+(?:in\s+)?(?:revenue|arr|mrr|sales|profit|bookings|gmv)\b",
    // "reach 10,000 users", "hit 25%", "target of $2M", "goal of €1M"
    r"(?i)\b(?:reach|hit|achieve|attain|target|goal)(?:s|ed|ing)?\s+(?:of\s+)?[$€£]?\d[\d,]*(?:\.\d+)?\s?(?:%|k|m|bn|million|billion|users|customers|subscribers)?",
    // "80% of target", "90 % of goal"
    r"(?i)\b\d+(?:\.\d+)?\s?%\s+of\s+(?:the\s+)?(?:goal|target)\b",
];

const DEFAULT_EXCLUSIONS: &[&str] = &[
    r"(?i)\b(?:gap|distance|progress|shortfall)\s+(?:to|from|toward|towards)\s+(?:the\s+)?(?:goal|target)\b",
    r"(?i)\bvs\.?\s+target\b",
    r"(?i)\blikelihood\s+of\s+(?:reaching|hitting|achieving)\b",
    // An amount attached to a price or cost is a lever, not a target.
    r"(?i)\b(?:price|pricing|cost|budget|spend|fee|wage|salary)s?\b",
];

static DEFAULT_PATTERNS: OnceLock<GoalNumberPatterns> = OnceLock::new();

/// Regex-backed [`LabelHeuristic`]: a label matches if any matcher hits and
/// no exclusion does.
#[derive(Debug, Clone)]
pub struct GoalNumberPatterns {
    matchers: Vec<Regex>,
    exclusions: Vec<Regex>,
}

impl GoalNumberPatterns {
    /// Compiles a custom pattern set.
    ///
    /// # Errors
    ///
    /// Returns the first pattern that fails to compile.
    pub fn from_patterns(matchers: &[&str], exclusions: &[&str]) -> Result<Self, regex::Error> {
        let compile = |patterns: &[&str]| {
            patterns
                .iter()
                .map(|p| Regex::new(p))
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(Self {
            matchers: compile(matchers)?,
            exclusions: compile(exclusions)?,
        })
    }
}

impl Default for GoalNumberPatterns {
    fn default() -> Self {
        DEFAULT_PATTERNS
            .get_or_init(|| {
                let compile = |patterns: &[&str]| -> Vec<Regex> {
                    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
                };
                Self {
                    matchers: compile(DEFAULT_MATCHERS),
                    exclusions: compile(DEFAULT_EXCLUSIONS),
                }
            })
            .clone()
    }
}

impl LabelHeuristic for GoalNumberPatterns {
    fn looks_like_goal_number(&self, label: &str) -> bool {
        self.matchers.iter().any(|re| re.is_match(label))
            && !self.exclusions.iter().any(|re| re.is_match(label))
    }

    fn name(&self) -> &'static str {
        "goal_number_patterns"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Best-effort heuristic: these pin representative labels, not a guarantee.

    #[test]
    fn test_default_patterns_all_compile() {
        let p = GoalNumberPatterns::default();
        assert_eq!(p.matchers.len(), DEFAULT_MATCHERS.len());
        assert_eq!(p.exclusions.len(), DEFAULT_EXCLUSIONS.len());
    }

    #[test]
    fn test_target_restatements_match() {
        let p = GoalNumberPatterns::default();
        for label in [
            "Reach $1M ARR",
            "Hit 25% market share",
            "Achieve 10,000 users",
            "80% of target",
            "$500k revenue",
            "£3 million in sales",
            "Goal of €1M bookings",
        ] {
            assert!(p.looks_like_goal_number(label), "{label}");
        }
    }

    #[test]
    fn test_causal_variables_do_not_match() {
        let p = GoalNumberPatterns::default();
        for label in [
            "Unit price",
            "Marketing spend",
            "Gap to target revenue",
            "Progress toward goal of $1M",
            "Likelihood of reaching 50% adoption",
            "Revenue vs target",
            "Competitor price $20",
            "Monthly cost of $4,500",
            "Marketing budget of $50k",
            "$20 per seat",
        ] {
            assert!(!p.looks_like_goal_number(label), "{label}");
        }
    }

    #[test]
    fn test_custom_patterns() {
        let p = GoalNumberPatterns::from_patterns(&[r"^GOAL:"], &[]).unwrap();
        assert!(p.looks_like_goal_number("GOAL: 5"));
        assert!(!p.looks_like_goal_number("price"));
        assert!(GoalNumberPatterns::from_patterns(&["("], &[]).is_err());
    }
}
