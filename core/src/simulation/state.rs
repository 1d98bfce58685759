use crate::{record::BlockGroupRecord, types::Month};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// One point on a projected trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub month:               Month,
    pub equity_score:        f64,
    pub gentrification_risk: f64,
    pub foreclosure_risk:    f64,
    pub median_income:       f64,
    pub median_price:        f64,
}

impl SimulationState {
    /// Month-0 state taken from a record's current scores.
    pub fn baseline(record: &BlockGroupRecord) -> Self {
        Self {
            month:               0,
            equity_score:        record.equity_score,
            gentrification_risk: record.gentrification_risk,
            foreclosure_risk:    record.foreclosure_risk,
            median_income:       record.median_income,
            median_price:        record.median_price,
        }
    }

    /// Apply one month's delta. Scores are clamped to [0, 100];
    /// income and price carry forward unchanged.
    pub fn step(&self, month: Month, delta: &ScoreDelta) -> Self {
        Self {
            month,
            equity_score:        clamp_score(self.equity_score + delta.equity),
            gentrification_risk: clamp_score(self.gentrification_risk + delta.gentrification),
            foreclosure_risk:    clamp_score(self.foreclosure_risk + delta.foreclosure),
            median_income:       self.median_income,
            median_price:        self.median_price,
        }
    }
}

fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Change to the three scores within a single month.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreDelta {
    pub equity:         f64,
    pub gentrification: f64,
    pub foreclosure:    f64,
}

impl AddAssign for ScoreDelta {
    fn add_assign(&mut self, rhs: Self) {
        self.equity += rhs.equity;
        self.gentrification += rhs.gentrification;
        self.foreclosure += rhs.foreclosure;
    }
}

/// Final minus baseline, per score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreChange {
    pub equity_score:        f64,
    pub gentrification_risk: f64,
    pub foreclosure_risk:    f64,
}

impl ScoreChange {
    pub fn between(baseline: &BlockGroupRecord, last: &SimulationState) -> Self {
        Self {
            equity_score:        last.equity_score - baseline.equity_score,
            gentrification_risk: last.gentrification_risk - baseline.gentrification_risk,
            foreclosure_risk:    last.foreclosure_risk - baseline.foreclosure_risk,
        }
    }
}
