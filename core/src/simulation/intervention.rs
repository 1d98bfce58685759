use super::state::ScoreDelta;
use crate::error::{EquityError, EquityResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Closed set of policy levers the models understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionKind {
    /// Housing trust fund investment; `amount` is in dollars.
    HtfInvestment,
    /// Household income increase; `amount` is in percentage points.
    IncomeSupport,
    /// Rent cap; `amount` is in percentage points.
    RentControl,
}

impl InterventionKind {
    pub const ALL: [InterventionKind; 3] = [
        InterventionKind::HtfInvestment,
        InterventionKind::IncomeSupport,
        InterventionKind::RentControl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HtfInvestment => "htf_investment",
            Self::IncomeSupport => "income_support",
            Self::RentControl   => "rent_control",
        }
    }
}

impl FromStr for InterventionKind {
    type Err = EquityError;

    fn from_str(s: &str) -> EquityResult<Self> {
        InterventionKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                EquityError::validation(
                    "intervention_type",
                    format!(
                        "unknown intervention '{s}', expected htf_investment, income_support or rent_control"
                    ),
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    #[serde(rename = "type")]
    pub kind:            InterventionKind,
    pub amount:          f64,
    pub duration_months: u32,
}

impl Intervention {
    pub fn new(kind: InterventionKind, amount: f64, duration_months: u32) -> Self {
        Self { kind, amount, duration_months }
    }

    /// Direct effect on the scores at the given intervention strength,
    /// before any feedback.
    pub fn direct_effect(&self, strength: f64) -> ScoreDelta {
        let amount = self.amount;
        match self.kind {
            InterventionKind::HtfInvestment => ScoreDelta {
                equity:         (amount / 1_000_000.0) * 5.0 * strength,
                gentrification: -(amount / 1_000_000.0) * 3.0 * strength,
                foreclosure:    -(amount / 500_000.0) * 2.0 * strength,
            },
            InterventionKind::IncomeSupport => {
                let boost = amount / 100.0;
                ScoreDelta {
                    equity:         boost * 10.0 * strength,
                    gentrification: 0.0,
                    foreclosure:    -boost * 8.0 * strength,
                }
            }
            InterventionKind::RentControl => ScoreDelta {
                equity:         (amount / 100.0) * 5.0 * strength,
                gentrification: -(amount / 100.0) * 15.0 * strength,
                foreclosure:    0.0,
            },
        }
    }
}
