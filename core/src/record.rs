//! Block group records and the metrics that can be ranked over them.
//!
//! Records are produced upstream and loaded once. Nothing in this crate
//! creates, mutates or deletes a record after load.

use crate::{
    error::{EquityError, EquityResult},
    types::{tract_prefix, Geoid},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// One Census Block Group with its precomputed scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockGroupRecord {
    pub geoid:               Geoid,
    #[serde(default)]
    pub name:                String,
    pub equity_score:        f64,
    pub gentrification_risk: f64,
    pub foreclosure_risk:    f64,
    /// 0 means unknown.
    #[serde(default)]
    pub median_income:       f64,
    /// 0 means unknown.
    #[serde(default)]
    pub median_price:        f64,
    #[serde(default)]
    pub population:          u64,
    #[serde(default)]
    pub days_on_market:      u32,
    /// Signed fractional change, 0.05 = +5%.
    #[serde(default)]
    pub price_yoy_change:    f64,
}

impl BlockGroupRecord {
    /// The 9-character tract prefix used as a proximity proxy.
    pub fn tract(&self) -> &str {
        tract_prefix(&self.geoid)
    }

    pub fn equity_band(&self) -> EquityBand {
        EquityBand::classify(self.equity_score)
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        metric.value_of(self)
    }
}

/// Numeric record fields that queries may rank by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    EquityScore,
    GentrificationRisk,
    ForeclosureRisk,
    MedianIncome,
    MedianPrice,
    Population,
    DaysOnMarket,
    PriceYoyChange,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::EquityScore,
        Metric::GentrificationRisk,
        Metric::ForeclosureRisk,
        Metric::MedianIncome,
        Metric::MedianPrice,
        Metric::Population,
        Metric::DaysOnMarket,
        Metric::PriceYoyChange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EquityScore        => "equity_score",
            Self::GentrificationRisk => "gentrification_risk",
            Self::ForeclosureRisk    => "foreclosure_risk",
            Self::MedianIncome       => "median_income",
            Self::MedianPrice        => "median_price",
            Self::Population         => "population",
            Self::DaysOnMarket       => "days_on_market",
            Self::PriceYoyChange     => "price_yoy_change",
        }
    }

    pub fn value_of(&self, record: &BlockGroupRecord) -> f64 {
        match self {
            Self::EquityScore        => record.equity_score,
            Self::GentrificationRisk => record.gentrification_risk,
            Self::ForeclosureRisk    => record.foreclosure_risk,
            Self::MedianIncome       => record.median_income,
            Self::MedianPrice        => record.median_price,
            Self::Population         => record.population as f64,
            Self::DaysOnMarket       => f64::from(record.days_on_market),
            Self::PriceYoyChange     => record.price_yoy_change,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = EquityError;

    fn from_str(s: &str) -> EquityResult<Self> {
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Metric::ALL.iter().map(|m| m.as_str()).collect();
                EquityError::validation(
                    "metric",
                    format!("unknown metric '{s}', expected one of {}", known.join(", ")),
                )
            })
    }
}

/// Display band for an equity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquityBand {
    High,     // > 70
    Moderate, // > 40
    Low,
}

impl EquityBand {
    pub fn classify(score: f64) -> Self {
        if score > 70.0 {
            Self::High
        } else if score > 40.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High     => "Strong equity",
            Self::Moderate => "Moderate equity",
            Self::Low      => "Limited equity",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_round_trip_through_from_str() {
        for metric in Metric::ALL {
            assert_eq!(metric.as_str().parse::<Metric>().unwrap(), metric);
        }
    }

    #[test]
    fn unknown_metric_names_the_field() {
        match "walkability".parse::<Metric>() {
            Err(EquityError::Validation { field, .. }) => assert_eq!(field, "metric"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn equity_bands_use_strict_thresholds() {
        assert_eq!(EquityBand::classify(70.0), EquityBand::Moderate);
        assert_eq!(EquityBand::classify(70.1), EquityBand::High);
        assert_eq!(EquityBand::classify(40.0), EquityBand::Low);
        assert_eq!(EquityBand::classify(40.5), EquityBand::Moderate);
    }
}
