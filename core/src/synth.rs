//! Synthetic block group generator for demos and tests.
//!
//! Produces plausible records from a seed. Market rules:
//!   - price growth rises with proximity to downtown and with income
//!   - days on market fall with proximity and with income
//!   - gentrification risk follows price growth, low income, and
//!     minority share
//! Equity and foreclosure scores are a simple blend of the same
//! drivers plus noise; they are placeholders for the upstream model.

use crate::{
    error::{EquityError, EquityResult},
    record::BlockGroupRecord,
    rng::SynthRng,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticSpec {
    /// 5-digit state + county FIPS code.
    pub county_fips:          String,
    pub tracts:               u32,
    /// Each tract gets between 1 and this many block groups.
    pub max_groups_per_tract: u32,
    pub seed:                 u64,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            county_fips:          "26065".to_string(), // Ingham County, MI
            tracts:               20,
            max_groups_per_tract: 4,
            seed:                 42,
        }
    }
}

/// Tract codes are `(t + 1) * 100 + suffix` and must fit six digits.
pub const MAX_TRACTS: u32 = 9_999;

const MAX_INCOME: f64 = 140_000.0;
const UNKNOWN_INCOME_RATE: f64 = 0.03;

/// Gentrification risk from price growth, income and minority share.
pub fn gentrification_risk(price_yoy_change: f64, median_income: f64, minority_share: f64) -> f64 {
    let price_factor = (price_yoy_change * 1000.0).clamp(0.0, 50.0);
    let income_factor = ((1.0 - median_income / 75_000.0) * 30.0).max(0.0);
    let displacement = minority_share * 20.0;
    (price_factor + income_factor + displacement).clamp(0.0, 100.0)
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

fn tract_label(code: u32) -> String {
    if code % 100 == 0 {
        format!("{}", code / 100)
    } else {
        format!("{}.{:02}", code / 100, code % 100)
    }
}

impl SyntheticSpec {
    /// Reject inputs that would produce GEOIDs other than 12 digits.
    pub fn validate(&self) -> EquityResult<()> {
        if self.county_fips.len() != 5 || !self.county_fips.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EquityError::validation(
                "county_fips",
                format!("'{}' is not a 5-digit FIPS code", self.county_fips),
            ));
        }
        if self.tracts > MAX_TRACTS {
            return Err(EquityError::validation(
                "tracts",
                format!("at most {MAX_TRACTS} tracts fit a 6-digit tract code, got {}", self.tracts),
            ));
        }
        Ok(())
    }
}

/// Generate the full record set. Same `SyntheticSpec`, same records.
pub fn generate(spec: &SyntheticSpec) -> EquityResult<Vec<BlockGroupRecord>> {
    spec.validate()?;
    let max_groups = spec.max_groups_per_tract.clamp(1, 9);
    let mut records = Vec::new();

    for t in 0..spec.tracts {
        let mut rng = SynthRng::new(spec.seed, u64::from(t));
        let tract_code = (t + 1) * 100 + rng.next_u64_below(3) as u32;
        let proximity = rng.next_f64();
        let tract_minority = rng.uniform(0.05, 0.7);
        let groups = 1 + rng.next_u64_below(u64::from(max_groups)) as u32;

        for bg in 1..=groups {
            records.push(generate_group(&mut rng, spec, tract_code, bg, proximity, tract_minority));
        }
    }

    log::debug!("synth: generated {} block groups across {} tracts", records.len(), spec.tracts);
    Ok(records)
}

fn generate_group(
    rng: &mut SynthRng,
    spec: &SyntheticSpec,
    tract_code: u32,
    bg: u32,
    proximity: f64,
    tract_minority: f64,
) -> BlockGroupRecord {
    let median_income = if rng.chance(UNKNOWN_INCOME_RATE) {
        0.0
    } else {
        rng.uniform(18_000.0, MAX_INCOME).round()
    };
    let income_factor = if median_income > 0.0 { median_income / MAX_INCOME } else { 0.5 };
    let minority = (tract_minority + rng.normal(0.0, 0.1)).clamp(0.0, 1.0);

    let yoy = (0.03 + proximity * 0.04 + income_factor * 0.02 + rng.normal(0.0, 0.02))
        .clamp(-0.05, 0.15);
    let dom = (45.0 + (1.0 - proximity) * 30.0 + (1.0 - income_factor) * 20.0 + rng.normal(0.0, 10.0))
        .clamp(7.0, 180.0);

    let base_price = if median_income > 0.0 { median_income * 2.8 } else { 150_000.0 };
    let median_price = (base_price * (1.0 + yoy)).round();

    let gent = gentrification_risk(yoy, median_income, minority);
    let equity = (100.0
        * (0.45 * income_factor + 0.25 * (1.0 - minority) + 0.15 * proximity + 0.15 * (1.0 - gent / 100.0))
        + rng.normal(0.0, 5.0))
    .clamp(0.0, 100.0);
    let foreclosure = (70.0 - 0.5 * equity + 20.0 * (1.0 - income_factor) + rng.normal(0.0, 5.0))
        .clamp(0.0, 100.0);

    BlockGroupRecord {
        geoid:               format!("{}{:06}{}", spec.county_fips, tract_code, bg),
        name:                format!("Block Group {bg}, Census Tract {}", tract_label(tract_code)),
        equity_score:        round_to(equity, 1),
        gentrification_risk: round_to(gent, 1),
        foreclosure_risk:    round_to(foreclosure, 1),
        median_income,
        median_price,
        population:          400 + rng.next_u64_below(2_600),
        days_on_market:      dom as u32,
        price_yoy_change:    round_to(yoy, 4),
    }
}
