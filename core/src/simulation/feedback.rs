//! Feedback loops applied every simulated month.
//!
//! RULE: A loop reads ONLY the state at the start of the month.
//! It never sees the intervention's direct effect for that month,
//! and never sees another loop's adjustment.

use super::state::{ScoreDelta, SimulationState};
use serde::{Deserialize, Serialize};

/// The contract every feedback loop must fulfill.
pub trait FeedbackLoop: Send + Sync {
    /// Unique stable name, used in logs.
    fn name(&self) -> &'static str;

    /// Adjustment contributed by this loop for the month that starts
    /// from `state`.
    fn adjust(&self, state: &SimulationState) -> ScoreDelta;
}

/// Gentrification pressure displaces owners and raises foreclosures.
pub struct DisplacementLoop;

impl FeedbackLoop for DisplacementLoop {
    fn name(&self) -> &'static str { "displacement" }

    fn adjust(&self, state: &SimulationState) -> ScoreDelta {
        let pressure = (state.gentrification_risk / 100.0) * 0.5;
        ScoreDelta { foreclosure: pressure * 2.0, ..ScoreDelta::default() }
    }
}

/// Foreclosures depress prices, which cools gentrification.
pub struct PriceDropLoop;

impl FeedbackLoop for PriceDropLoop {
    fn name(&self) -> &'static str { "price_drop" }

    fn adjust(&self, state: &SimulationState) -> ScoreDelta {
        let pressure = (state.foreclosure_risk / 100.0) * 0.3;
        ScoreDelta { gentrification: -(pressure * 1.5), ..ScoreDelta::default() }
    }
}

/// High equity attracts investment, which can raise gentrification.
pub struct InvestmentLoop;

impl FeedbackLoop for InvestmentLoop {
    fn name(&self) -> &'static str { "investment" }

    fn adjust(&self, state: &SimulationState) -> ScoreDelta {
        let pull = (state.equity_score / 100.0) * 0.2;
        ScoreDelta { gentrification: pull * 0.5, ..ScoreDelta::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopKind {
    Reinforcing,
    Balancing,
}

/// Descriptive entry reported alongside every projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackLoopInfo {
    pub name:     String,
    #[serde(rename = "type")]
    pub kind:     LoopKind,
    /// Nominal strength for display; not used in the computation.
    pub strength: f64,
}

/// The fixed catalogue shown to users next to a causal-loop projection.
pub fn feedback_catalogue() -> Vec<FeedbackLoopInfo> {
    [
        ("HTF Investment → Equity ↑ → Attracts More Investment", LoopKind::Reinforcing, 0.3),
        ("Equity ↑ → Gentrification Risk ↑ (unintended consequence)", LoopKind::Reinforcing, 0.1),
        ("Foreclosure Risk ↓ → Price Stability → Gent Risk ↓", LoopKind::Balancing, -0.2),
    ]
    .into_iter()
    .map(|(name, kind, strength)| FeedbackLoopInfo {
        name: name.to_string(),
        kind,
        strength,
    })
    .collect()
}
