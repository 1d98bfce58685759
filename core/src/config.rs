//! Runtime configuration. Every field has a default so a partial JSON
//! file (or none at all) is enough.

use crate::{
    query::{DEFAULT_TOP_LIMIT, HIGH_RISK_THRESHOLD},
    simulation::{causal_loop::DEFAULT_DECAY_MONTHS, spillover::DEFAULT_SPILLOVER_SHARE},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EquityConfig {
    /// Location of the precomputed record set.
    pub dataset_path:            String,
    /// Intervention strength is `exp(-month / decay_months)`.
    pub decay_months:            f64,
    /// Share of the primary spillover effect that reaches each neighbour.
    pub spillover_share:         f64,
    /// Scores strictly above this count as high risk in statistics.
    pub high_risk_threshold:     f64,
    pub default_top_limit:       usize,
    pub default_neighbor_limit:  usize,
    pub default_duration_months: u32,
    pub max_duration_months:     u32,
    /// Cap on `neighbor_limit` for spillover requests. Rankings are uncapped.
    pub max_neighbor_limit:      usize,
    /// Upper bound on model/tool round trips per question.
    pub max_tool_turns:          u32,
}

impl Default for EquityConfig {
    fn default() -> Self {
        Self {
            dataset_path:            "./data/bg_predictions.json".to_string(),
            decay_months:            DEFAULT_DECAY_MONTHS,
            spillover_share:         DEFAULT_SPILLOVER_SHARE,
            high_risk_threshold:     HIGH_RISK_THRESHOLD,
            default_top_limit:       DEFAULT_TOP_LIMIT,
            default_neighbor_limit:  4,
            default_duration_months: 12,
            max_duration_months:     120,
            max_neighbor_limit:      500,
            max_tool_turns:          8,
        }
    }
}

impl EquityConfig {
    /// Load from a JSON file. Missing keys fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {}: {e}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(self.decay_months.is_finite() && self.decay_months > 0.0) {
            anyhow::bail!("decay_months must be positive, got {}", self.decay_months);
        }
        if !(0.0..=1.0).contains(&self.spillover_share) {
            anyhow::bail!("spillover_share must be within [0, 1], got {}", self.spillover_share);
        }
        if self.max_duration_months == 0 || self.max_neighbor_limit == 0 || self.max_tool_turns == 0 {
            anyhow::bail!("max_duration_months, max_neighbor_limit and max_tool_turns must be non-zero");
        }
        if self.default_duration_months > self.max_duration_months {
            anyhow::bail!(
                "default_duration_months ({}) exceeds max_duration_months ({})",
                self.default_duration_months,
                self.max_duration_months
            );
        }
        Ok(())
    }
}
