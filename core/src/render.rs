//! Presentation seam. Map and chart front ends implement `Renderer`
//! against the plain result structures; `PlainTextRenderer` is the
//! console version used by the runner.

use crate::{
    query::{AreaStatistics, Comparison},
    record::{BlockGroupRecord, Metric},
    simulation::{CausalLoopResult, SpilloverResult},
};
use std::fmt::Write;

pub trait Renderer {
    type Output;

    fn render_record(&self, record: &BlockGroupRecord) -> Self::Output;
    fn render_ranking(&self, metric: Metric, records: &[BlockGroupRecord]) -> Self::Output;
    fn render_comparison(&self, comparison: &Comparison) -> Self::Output;
    fn render_statistics(&self, stats: &AreaStatistics) -> Self::Output;
    fn render_causal_loop(&self, result: &CausalLoopResult) -> Self::Output;
    fn render_spillover(&self, result: &SpilloverResult) -> Self::Output;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextRenderer;

fn money(amount: f64) -> String {
    if amount > 0.0 {
        format!("${amount:.0}")
    } else {
        "N/A".to_string()
    }
}

impl Renderer for PlainTextRenderer {
    type Output = String;

    fn render_record(&self, r: &BlockGroupRecord) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} {}", r.geoid, r.name);
        let _ = writeln!(out, "  equity score:        {:.1} ({})", r.equity_score, r.equity_band().label());
        let _ = writeln!(out, "  gentrification risk: {:.1}", r.gentrification_risk);
        let _ = writeln!(out, "  foreclosure risk:    {:.1}", r.foreclosure_risk);
        let _ = writeln!(out, "  median income:       {}", money(r.median_income));
        let _ = writeln!(out, "  median price:        {}", money(r.median_price));
        let _ = writeln!(out, "  population:          {}", r.population);
        let _ = writeln!(out, "  days on market:      {}", r.days_on_market);
        let _ = write!(out, "  price YoY:           {:+.1}%", r.price_yoy_change * 100.0);
        out
    }

    fn render_ranking(&self, metric: Metric, records: &[BlockGroupRecord]) -> String {
        let mut out = format!("=== TOP BY {} ===", metric.as_str().to_uppercase());
        for (i, r) in records.iter().enumerate() {
            let _ = write!(out, "\n  {}. {}: {:.1}", i + 1, r.geoid, r.metric(metric));
        }
        out
    }

    fn render_comparison(&self, c: &Comparison) -> String {
        let d = &c.comparison;
        format!(
            "{} vs {}\n  equity:         {:+.1}\n  gentrification: {:+.1}\n  foreclosure:    {:+.1}\n  income:         {:+.0}\n  price:          {:+.0}",
            c.bg1.geoid,
            c.bg2.geoid,
            d.equity_score_diff,
            d.gentrification_risk_diff,
            d.foreclosure_risk_diff,
            d.income_diff,
            d.price_diff
        )
    }

    fn render_statistics(&self, s: &AreaStatistics) -> String {
        format!(
            "=== COUNTY SUMMARY ===\n  block groups:        {}\n  equity score:        mean {:.1} (min {:.1}, max {:.1})\n  gentrification risk: mean {:.1}, {} high-risk\n  foreclosure risk:    mean {:.1}, {} high-risk\n  total population:    {}",
            s.count,
            s.equity_score.mean,
            s.equity_score.min,
            s.equity_score.max,
            s.gentrification_risk.mean,
            s.gentrification_risk.high_risk_count,
            s.foreclosure_risk.mean,
            s.foreclosure_risk.high_risk_count,
            s.total_population
        )
    }

    fn render_causal_loop(&self, r: &CausalLoopResult) -> String {
        let mut out = format!(
            "{} under {} of {} for {} months",
            r.baseline.geoid,
            r.intervention.kind.as_str(),
            r.intervention.amount,
            r.intervention.duration_months
        );
        for s in &r.timeline {
            let _ = write!(
                out,
                "\n  m{:<3} equity {:6.2}  gent {:6.2}  foreclosure {:6.2}",
                s.month, s.equity_score, s.gentrification_risk, s.foreclosure_risk
            );
        }
        let t = &r.total_change;
        let _ = write!(
            out,
            "\n  total change: equity {:+.2}, gent {:+.2}, foreclosure {:+.2}",
            t.equity_score, t.gentrification_risk, t.foreclosure_risk
        );
        out
    }

    fn render_spillover(&self, r: &SpilloverResult) -> String {
        let p = &r.primary;
        let mut out = format!(
            "{} primary: equity {:+.2}, gent {:+.2}, foreclosure {:+.2}",
            p.geoid, p.equity_score_change, p.gentrification_risk_change, p.foreclosure_risk_change
        );
        for n in &r.spillover {
            let _ = write!(
                out,
                "\n  {} ({}): equity {:+.2}, gent {:+.2}",
                n.geoid, n.distance, n.equity_score_change, n.gentrification_risk_change
            );
        }
        let _ = write!(out, "\n  households impacted: {}", r.total_households_impacted);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        query::{diff_records, RiskSummary, ScoreSummary},
        simulation::{simulate_causal_loop, simulate_spillover, Intervention, InterventionKind},
    };

    fn record() -> BlockGroupRecord {
        BlockGroupRecord {
            geoid:               "260650001001".to_string(),
            name:                "Block Group 1".to_string(),
            equity_score:        72.5,
            gentrification_risk: 40.0,
            foreclosure_risk:    12.0,
            median_income:       0.0,
            median_price:        180_000.0,
            population:          950,
            days_on_market:      21,
            price_yoy_change:    0.052,
        }
    }

    #[test]
    fn record_shows_band_and_unknown_income() {
        let out = PlainTextRenderer.render_record(&record());
        assert!(out.contains("72.5 (Strong equity)"));
        assert!(out.contains("median income:       N/A"));
        assert!(out.contains("$180000"));
        assert!(out.contains("+5.2%"));
    }

    #[test]
    fn ranking_numbers_entries_from_one() {
        let out = PlainTextRenderer.render_ranking(Metric::EquityScore, &[record()]);
        assert_eq!(out, "=== TOP BY EQUITY_SCORE ===\n  1. 260650001001: 72.5");
    }

    fn neighbour() -> BlockGroupRecord {
        BlockGroupRecord {
            geoid:               "260650001002".to_string(),
            equity_score:        60.0,
            gentrification_risk: 50.0,
            foreclosure_risk:    20.0,
            median_income:       40_000.0,
            median_price:        150_000.0,
            population:          1_000,
            ..record()
        }
    }

    #[test]
    fn comparison_shows_signed_differences() {
        let out = PlainTextRenderer.render_comparison(&diff_records(&record(), &neighbour()));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "260650001001 vs 260650001002");
        assert_eq!(lines[1], "  equity:         +12.5");
        assert_eq!(lines[2], "  gentrification: -10.0");
        assert_eq!(lines[3], "  foreclosure:    -8.0");
        assert_eq!(lines[4], "  income:         -40000");
        assert_eq!(lines[5], "  price:          +30000");
    }

    #[test]
    fn causal_loop_lists_every_month_then_totals() {
        let intervention = Intervention::new(InterventionKind::RentControl, 5.0, 2);
        let out = PlainTextRenderer.render_causal_loop(&simulate_causal_loop(&record(), &intervention));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "260650001001 under rent_control of 5 for 2 months");
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("  m0   equity  72.50"), "{}", lines[1]);
        assert!(lines[3].starts_with("  m2 "));
        assert!(lines[4].starts_with("  total change: equity "));
    }

    #[test]
    fn spillover_lists_primary_neighbours_and_households() {
        let neighbour = neighbour();
        let intervention = Intervention::new(InterventionKind::HtfInvestment, 400_000.0, 12);
        let out = PlainTextRenderer.render_spillover(&simulate_spillover(&record(), &[&neighbour], &intervention));
        assert_eq!(
            out,
            "260650001001 primary: equity +10.00, gent -6.00, foreclosure -8.00\n  \
             260650001002 (adjacent): equity +3.00, gent -1.80\n  \
             households impacted: 1950"
        );
    }

    #[test]
    fn statistics_lists_high_risk_counts() {
        let stats = AreaStatistics {
            count:               2,
            equity_score:        ScoreSummary { mean: 50.0, min: 40.0, max: 60.0 },
            gentrification_risk: RiskSummary { mean: 55.0, high_risk_count: 1 },
            foreclosure_risk:    RiskSummary { mean: 20.0, high_risk_count: 0 },
            total_population:    2_000,
        };
        let out = PlainTextRenderer.render_statistics(&stats);
        assert!(out.contains("block groups:        2"));
        assert!(out.contains("mean 55.0, 1 high-risk"));
        assert!(out.contains("total population:    2000"));
    }
}
