//! CSV export of records and projected timelines.
//!
//! Produces strings only. Writing or downloading the file is up to the
//! caller.

use crate::{
    error::EquityResult,
    record::BlockGroupRecord,
    simulation::{CausalLoopResult, SimulationState},
};
use chrono::NaiveDate;
use csv::{Terminator, WriterBuilder};
use serde::Serialize;

/// Header row for `records_to_csv`; matches `BlockGroupRecord`'s field order.
pub const RECORD_COLUMNS: [&str; 10] = [
    "geoid",
    "name",
    "equity_score",
    "gentrification_risk",
    "foreclosure_risk",
    "median_income",
    "median_price",
    "population",
    "days_on_market",
    "price_yoy_change",
];

/// Header row for `timeline_to_csv`; matches `SimulationState`'s field order.
pub const TIMELINE_COLUMNS: [&str; 6] = [
    "month",
    "equity_score",
    "gentrification_risk",
    "foreclosure_risk",
    "median_income",
    "median_price",
];

/// `header` then one serialized row per item, `\n`-separated with no
/// trailing newline. No rows, no output.
fn write_csv<T: Serialize>(rows: &[T], header: &[&str]) -> EquityResult<String> {
    if rows.is_empty() {
        return Ok(String::new());
    }

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV buffer: {}", e.error()))?;
    let mut out = String::from_utf8(bytes).map_err(anyhow::Error::from)?;
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

pub fn records_to_csv(records: &[BlockGroupRecord]) -> EquityResult<String> {
    write_csv(records, &RECORD_COLUMNS)
}

pub fn timeline_to_csv(timeline: &[SimulationState]) -> EquityResult<String> {
    write_csv(timeline, &TIMELINE_COLUMNS)
}

pub fn records_filename(date: NaiveDate) -> String {
    format!("ingham-housing-equity-{}.csv", date.format("%Y-%m-%d"))
}

pub fn record_filename(geoid: &str) -> String {
    format!("block-group-{geoid}.csv")
}

pub fn timeline_filename(geoid: &str, date: NaiveDate) -> String {
    format!("simulation-timeline-{geoid}-{}.csv", date.format("%Y-%m-%d"))
}

/// A ready-to-download CSV body and its filename.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvExport {
    pub filename: String,
    pub csv:      String,
}

impl CsvExport {
    /// The whole record set, named for `date`.
    pub fn records(records: &[BlockGroupRecord], date: NaiveDate) -> EquityResult<Self> {
        Ok(Self {
            filename: records_filename(date),
            csv:      records_to_csv(records)?,
        })
    }

    /// One block group.
    pub fn record(record: &BlockGroupRecord) -> EquityResult<Self> {
        Ok(Self {
            filename: record_filename(&record.geoid),
            csv:      records_to_csv(std::slice::from_ref(record))?,
        })
    }

    /// The monthly timeline of a causal-loop projection.
    pub fn timeline(result: &CausalLoopResult, date: NaiveDate) -> EquityResult<Self> {
        Ok(Self {
            filename: timeline_filename(&result.baseline.geoid, date),
            csv:      timeline_to_csv(&result.timeline)?,
        })
    }
}

/// Today's date in local time, for default filenames.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
