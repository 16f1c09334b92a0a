//! Engine configuration.
//!
//! Every threshold the validator applies lives here with a default matching
//! the published graph contract. Configuration must be validated before use;
//! [`Engine::new`](crate::engine::Engine::new) does this.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, EngineError, EngineResult};

/// Size limits checked by the structural tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphLimits {
    /// Maximum node count.
    pub max_nodes: usize,
    /// Maximum edge count.
    pub max_edges: usize,
    /// Minimum option count.
    pub min_options: usize,
    /// Maximum option count.
    pub max_options: usize,
}

impl Default for GraphLimits {
    fn default() -> Self {
        Self {
            max_nodes: 50,
            max_edges: 200,
            min_options: 2,
            max_options: 6,
        }
    }
}

/// Tolerances for the structural-edge warning (decision→option, option→factor).
///
/// The strict option→factor error compares against the canonical tuple
/// exactly and ignores these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuralEdgeTolerance {
    /// Largest `strength_std` still considered near-canonical.
    pub max_std: f64,
    /// Absolute tolerance for `strength_mean` and `belief_exists`.
    pub epsilon: f64,
}

impl Default for StructuralEdgeTolerance {
    fn default() -> Self {
        Self {
            max_std: 0.05,
            epsilon: 1e-9,
        }
    }
}

/// Thresholds for the non-blocking warning pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarningThresholds {
    /// Lower bound for `strength_mean`.
    pub min_strength: f64,
    /// Upper bound for `strength_mean`.
    pub max_strength: f64,
    /// `belief_exists` below this is low confidence.
    pub low_belief: f64,
    /// Non-structural `strength_std` below this is overconfident.
    pub min_causal_std: f64,
}

impl Default for WarningThresholds {
    fn default() -> Self {
        Self {
            min_strength: -1.0,
            max_strength: 1.0,
            low_belief: 0.3,
            min_causal_std: 0.05,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Structural size limits.
    pub limits: GraphLimits,
    /// Structural edge tolerances.
    pub structural: StructuralEdgeTolerance,
    /// Warning thresholds.
    pub warnings: WarningThresholds,
}

fn finite(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFiniteThreshold {
            field: field.to_string(),
            value,
        })
    }
}

impl EngineConfig {
    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for zero limits, inverted ranges, or
    /// non-finite thresholds.
    #[allow(clippy::cast_precision_loss)]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let l = &self.limits;
        if l.max_nodes == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "limits.max_nodes".to_string(),
            });
        }
        if l.max_edges == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "limits.max_edges".to_string(),
            });
        }
        if l.max_options == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "limits.max_options".to_string(),
            });
        }
        if l.min_options > l.max_options {
            return Err(ConfigError::InvertedRange {
                field: "limits.options".to_string(),
                min: l.min_options as f64,
                max: l.max_options as f64,
            });
        }

        finite("structural.max_std", self.structural.max_std)?;
        finite("structural.epsilon", self.structural.epsilon)?;

        let w = &self.warnings;
        finite("warnings.min_strength", w.min_strength)?;
        finite("warnings.max_strength", w.max_strength)?;
        finite("warnings.low_belief", w.low_belief)?;
        finite("warnings.min_causal_std", w.min_causal_std)?;
        if w.min_strength > w.max_strength {
            return Err(ConfigError::InvertedRange {
                field: "warnings.strength".to_string(),
                min: w.min_strength,
                max: w.max_strength,
            });
        }
        Ok(())
    }

    /// Parses and validates configuration from JSON. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Serialization` for malformed JSON and
    /// `EngineError::Config` for invalid values.
    pub fn from_json(s: &str) -> EngineResult<Self> {
        let config: Self = serde_json::from_str(s).map_err(|e| EngineError::Serialization {
            message: format!("deserialize config: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }
}
