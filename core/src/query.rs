//! Read-only queries over the record set: ranking, pairwise comparison,
//! and county-wide statistics.

use crate::{
    error::{EquityError, EquityResult},
    record::{BlockGroupRecord, Metric},
    store::RecordStore,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const DEFAULT_TOP_LIMIT: usize = 5;
pub const HIGH_RISK_THRESHOLD: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankOrder {
    #[default]
    Highest,
    Lowest,
}

impl fmt::Display for RankOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Highest => f.write_str("highest"),
            Self::Lowest  => f.write_str("lowest"),
        }
    }
}

impl FromStr for RankOrder {
    type Err = EquityError;

    fn from_str(s: &str) -> EquityResult<Self> {
        match s {
            "highest" => Ok(Self::Highest),
            "lowest"  => Ok(Self::Lowest),
            other => Err(EquityError::validation(
                "order",
                format!("expected 'highest' or 'lowest', got '{other}'"),
            )),
        }
    }
}

/// The first `limit` records ranked by `metric`.
///
/// The sort is stable: records with equal values keep their record-set
/// order. Values are ordered with `f64::total_cmp`.
pub fn top_areas(
    records: &[BlockGroupRecord],
    metric: Metric,
    limit: usize,
    order: RankOrder,
) -> Vec<BlockGroupRecord> {
    let mut ranked: Vec<&BlockGroupRecord> = records.iter().collect();
    ranked.sort_by(|a, b| {
        let (a, b) = (metric.value_of(a), metric.value_of(b));
        match order {
            RankOrder::Highest => b.total_cmp(&a),
            RankOrder::Lowest  => a.total_cmp(&b),
        }
    });
    ranked.into_iter().take(limit).cloned().collect()
}

/// Signed differences, first record minus second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDiffs {
    pub equity_score_diff:        f64,
    pub gentrification_risk_diff: f64,
    pub foreclosure_risk_diff:    f64,
    pub income_diff:              f64,
    pub price_diff:               f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub comparison: MetricDiffs,
    pub bg1:        BlockGroupRecord,
    pub bg2:        BlockGroupRecord,
}

pub fn diff_records(bg1: &BlockGroupRecord, bg2: &BlockGroupRecord) -> Comparison {
    Comparison {
        comparison: MetricDiffs {
            equity_score_diff:        bg1.equity_score - bg2.equity_score,
            gentrification_risk_diff: bg1.gentrification_risk - bg2.gentrification_risk,
            foreclosure_risk_diff:    bg1.foreclosure_risk - bg2.foreclosure_risk,
            income_diff:              bg1.median_income - bg2.median_income,
            price_diff:               bg1.median_price - bg2.median_price,
        },
        bg1: bg1.clone(),
        bg2: bg2.clone(),
    }
}

/// Compare two block groups by GEOID. NotFound lists every missing id.
pub fn compare(store: &RecordStore, geoid1: &str, geoid2: &str) -> EquityResult<Comparison> {
    match (store.find_by_geoid(geoid1), store.find_by_geoid(geoid2)) {
        (Some(bg1), Some(bg2)) => Ok(diff_records(bg1, bg2)),
        (bg1, bg2) => {
            let mut missing = Vec::new();
            if bg1.is_none() {
                missing.push(geoid1.to_string());
            }
            if bg2.is_none() && geoid2 != geoid1 {
                missing.push(geoid2.to_string());
            }
            Err(EquityError::NotFound { geoids: missing })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub mean: f64,
    pub min:  f64,
    pub max:  f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub mean:            f64,
    pub high_risk_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaStatistics {
    pub count:               usize,
    pub equity_score:        ScoreSummary,
    pub gentrification_risk: RiskSummary,
    pub foreclosure_risk:    RiskSummary,
    pub total_population:    u64,
}

/// County-wide summary. An empty record set has no mean, so it is
/// rejected with `EmptyDataset`.
pub fn statistics(
    records: &[BlockGroupRecord],
    high_risk_threshold: f64,
) -> EquityResult<AreaStatistics> {
    if records.is_empty() {
        return Err(EquityError::EmptyDataset);
    }
    let n = records.len() as f64;
    let mean = |f: fn(&BlockGroupRecord) -> f64| records.iter().map(f).sum::<f64>() / n;
    let above = |f: fn(&BlockGroupRecord) -> f64| {
        records.iter().filter(|r| f(r) > high_risk_threshold).count()
    };

    let (min, max) = records.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
        (lo.min(r.equity_score), hi.max(r.equity_score))
    });

    Ok(AreaStatistics {
        count: records.len(),
        equity_score: ScoreSummary {
            mean: mean(|r| r.equity_score),
            min,
            max,
        },
        gentrification_risk: RiskSummary {
            mean:            mean(|r| r.gentrification_risk),
            high_risk_count: above(|r| r.gentrification_risk),
        },
        foreclosure_risk: RiskSummary {
            mean:            mean(|r| r.foreclosure_risk),
            high_risk_count: above(|r| r.foreclosure_risk),
        },
        total_population: records.iter().map(|r| r.population).sum(),
    })
}
