//! Single-step spillover estimate.
//!
//! Unlike the causal-loop projection this does not iterate over time
//! and does not clamp. The effect depends only on the intervention
//! amount, not its kind.

use super::intervention::Intervention;
use crate::{record::BlockGroupRecord, types::Geoid};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SPILLOVER_SHARE: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryEffect {
    pub geoid:                      Geoid,
    pub equity_score_change:        f64,
    pub gentrification_risk_change: f64,
    pub foreclosure_risk_change:    f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborEffect {
    pub geoid:                      Geoid,
    pub equity_score_change:        f64,
    pub gentrification_risk_change: f64,
    pub distance:                   String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpilloverResult {
    pub primary:                   PrimaryEffect,
    pub spillover:                 Vec<NeighborEffect>,
    /// Population of the primary area plus every neighbour.
    pub total_households_impacted: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct SpilloverModel {
    share: f64,
}

impl SpilloverModel {
    pub fn new(share: f64) -> Self {
        Self { share }
    }

    /// Equity effect on the primary area.
    pub fn primary_effect(&self, intervention: &Intervention) -> f64 {
        intervention.amount / 200_000.0 * 5.0
    }

    pub fn project(
        &self,
        record: &BlockGroupRecord,
        neighbors: &[&BlockGroupRecord],
        intervention: &Intervention,
    ) -> SpilloverResult {
        let primary = self.primary_effect(intervention);
        let spill = primary * self.share;

        SpilloverResult {
            primary: PrimaryEffect {
                geoid:                      record.geoid.clone(),
                equity_score_change:        primary,
                gentrification_risk_change: -primary * 0.6,
                foreclosure_risk_change:    -primary * 0.8,
            },
            spillover: neighbors
                .iter()
                .map(|n| NeighborEffect {
                    geoid:                      n.geoid.clone(),
                    equity_score_change:        spill,
                    gentrification_risk_change: -spill * 0.6,
                    distance:                   "adjacent".to_string(),
                })
                .collect(),
            total_households_impacted: record.population
                + neighbors.iter().map(|n| n.population).sum::<u64>(),
        }
    }
}

impl Default for SpilloverModel {
    fn default() -> Self { Self::new(DEFAULT_SPILLOVER_SHARE) }
}

/// Estimate with the default 30% neighbour share.
pub fn simulate_spillover(
    record: &BlockGroupRecord,
    neighbors: &[&BlockGroupRecord],
    intervention: &Intervention,
) -> SpilloverResult {
    SpilloverModel::default().project(record, neighbors, intervention)
}
