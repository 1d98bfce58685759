//! Causal-loop projection: trajectory shape, direct effects, feedback
//! ordering and the clamp invariant.

use equity_core::{
    record::BlockGroupRecord,
    simulation::{
        feedback::{DisplacementLoop, FeedbackLoop},
        simulate_causal_loop, CausalLoopModel, Intervention, InterventionKind, LoopKind,
        SimulationState,
    },
};
use proptest::prelude::*;

const EPS: f64 = 1e-9;

fn record(equity: f64, gent: f64, foreclosure: f64) -> BlockGroupRecord {
    BlockGroupRecord {
        geoid:               "260650001001".to_string(),
        name:                "Block Group 1, Census Tract 1".to_string(),
        equity_score:        equity,
        gentrification_risk: gent,
        foreclosure_risk:    foreclosure,
        median_income:       42_000.0,
        median_price:        135_000.0,
        population:          1_250,
        days_on_market:      33,
        price_yoy_change:    0.06,
    }
}

#[test]
fn htf_investment_first_month_matches_hand_calculation() {
    let bg = record(50.0, 50.0, 50.0);
    let result = simulate_causal_loop(&bg, &Intervention::new(InterventionKind::HtfInvestment, 2_000_000.0, 1));

    let s = (-1.0f64 / 6.0).exp();
    // direct effects
    let d_equity = 10.0 * s;
    let d_gent = -6.0 * s;
    let d_foreclosure = -8.0 * s;
    // feedback from the 50/50/50 starting state
    let gent = 50.0 + d_gent - 0.225 + 0.05;
    let foreclosure = 50.0 + d_foreclosure + 0.5;

    assert!((d_equity - 8.4648).abs() < 1e-3);
    let month1 = &result.timeline[1];
    assert_eq!(month1.month, 1);
    assert!((month1.equity_score - (50.0 + d_equity)).abs() < EPS);
    assert!((month1.gentrification_risk - gent).abs() < EPS);
    assert!((month1.foreclosure_risk - foreclosure).abs() < EPS);
}

#[test]
fn trajectory_has_baseline_plus_one_state_per_month() {
    let bg = record(40.0, 60.0, 30.0);
    let result = simulate_causal_loop(&bg, &Intervention::new(InterventionKind::RentControl, 10.0, 24));
    assert_eq!(result.timeline.len(), 25);
    for (i, state) in result.timeline.iter().enumerate() {
        assert_eq!(state.month as usize, i);
    }
    assert_eq!(result.final_state, result.timeline[24]);
}

#[test]
fn zero_duration_returns_only_the_baseline() {
    let bg = record(40.0, 60.0, 30.0);
    let result = simulate_causal_loop(&bg, &Intervention::new(InterventionKind::IncomeSupport, 15.0, 0));
    assert_eq!(result.timeline, vec![SimulationState::baseline(&bg)]);
    assert_eq!(result.final_state, SimulationState::baseline(&bg));
    assert_eq!(result.total_change.equity_score, 0.0);
    assert_eq!(result.total_change.gentrification_risk, 0.0);
    assert_eq!(result.total_change.foreclosure_risk, 0.0);
}

#[test]
fn total_change_is_final_minus_baseline() {
    let bg = record(45.0, 55.0, 35.0);
    let result = simulate_causal_loop(&bg, &Intervention::new(InterventionKind::IncomeSupport, 15.0, 12));
    let last = &result.final_state;
    assert_eq!(result.total_change.equity_score, last.equity_score - 45.0);
    assert_eq!(result.total_change.gentrification_risk, last.gentrification_risk - 55.0);
    assert_eq!(result.total_change.foreclosure_risk, last.foreclosure_risk - 35.0);
    assert_eq!(result.baseline, bg);
}

#[test]
fn income_and_price_carry_forward() {
    let bg = record(45.0, 55.0, 35.0);
    let result = simulate_causal_loop(&bg, &Intervention::new(InterventionKind::HtfInvestment, 500_000.0, 6));
    for state in &result.timeline {
        assert_eq!(state.median_income, 42_000.0);
        assert_eq!(state.median_price, 135_000.0);
    }
}

#[test]
fn income_support_has_no_direct_gentrification_effect() {
    let intervention = Intervention::new(InterventionKind::IncomeSupport, 20.0, 1);
    let effect = intervention.direct_effect(1.0);
    assert!((effect.equity - 2.0).abs() < EPS);
    assert!((effect.foreclosure + 1.6).abs() < EPS);
    assert_eq!(effect.gentrification, 0.0);
}

#[test]
fn rent_control_has_no_direct_foreclosure_effect() {
    let intervention = Intervention::new(InterventionKind::RentControl, 10.0, 1);
    let effect = intervention.direct_effect(1.0);
    assert!((effect.gentrification + 1.5).abs() < EPS);
    assert!((effect.equity - 0.5).abs() < EPS);
    assert_eq!(effect.foreclosure, 0.0);
}

#[test]
fn strength_decays_to_one_over_e_at_month_six() {
    let model = CausalLoopModel::default();
    assert!((model.strength(0) - 1.0).abs() < EPS);
    assert!((model.strength(6) - (-1.0f64).exp()).abs() < EPS);
    assert!(model.strength(12) < model.strength(6));
}

#[test]
fn feedback_reads_the_pre_step_state() {
    // With a zero-amount intervention only the feedback loops move the
    // scores, so month 1 depends solely on the baseline values.
    let bg = record(80.0, 100.0, 0.0);
    let result = simulate_causal_loop(&bg, &Intervention::new(InterventionKind::HtfInvestment, 0.0, 1));
    let month1 = &result.timeline[1];
    assert!((month1.foreclosure_risk - 1.0).abs() < EPS);
    // gentrification: 100 - 0 + 0.08, clamped
    assert_eq!(month1.gentrification_risk, 100.0);
    assert_eq!(month1.equity_score, 80.0);
}

#[test]
fn scores_clamp_at_both_ends() {
    let bg = record(99.0, 1.0, 2.0);
    let result = simulate_causal_loop(&bg, &Intervention::new(InterventionKind::HtfInvestment, 50_000_000.0, 3));
    let month1 = &result.timeline[1];
    assert_eq!(month1.equity_score, 100.0);
    assert_eq!(month1.gentrification_risk, 0.0);
    assert_eq!(month1.foreclosure_risk, 0.0);
}

#[test]
fn registered_loops_can_be_inspected_individually() {
    let state = SimulationState::baseline(&record(0.0, 50.0, 0.0));
    let delta = DisplacementLoop.adjust(&state);
    assert!((delta.foreclosure - 0.5).abs() < EPS);
    assert_eq!(DisplacementLoop.name(), "displacement");
}

#[test]
fn build_registers_loops_in_execution_order() {
    let model = CausalLoopModel::build(6.0);
    assert_eq!(model.loop_names(), vec!["displacement", "price_drop", "investment"]);
    assert!(CausalLoopModel::new(6.0).loop_names().is_empty());
}

#[test]
fn catalogue_lists_three_loops() {
    let result = simulate_causal_loop(&record(50.0, 50.0, 50.0), &Intervention::new(InterventionKind::RentControl, 5.0, 2));
    assert_eq!(result.feedback_loops.len(), 3);
    let reinforcing = result.feedback_loops.iter().filter(|l| l.kind == LoopKind::Reinforcing).count();
    assert_eq!(reinforcing, 2);
    assert_eq!(result.feedback_loops[2].strength, -0.2);
}

#[test]
fn result_serializes_with_plain_numbers() {
    let result = simulate_causal_loop(&record(50.0, 50.0, 50.0), &Intervention::new(InterventionKind::HtfInvestment, 1_000_000.0, 2));
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["intervention"]["type"], "htf_investment");
    assert!(json["final_state"]["equity_score"].is_f64());
    assert_eq!(json["timeline"].as_array().unwrap().len(), 3);
    assert_eq!(json["feedback_loops"][0]["type"], "reinforcing");
}

fn kind() -> impl Strategy<Value = InterventionKind> {
    prop_oneof![
        Just(InterventionKind::HtfInvestment),
        Just(InterventionKind::IncomeSupport),
        Just(InterventionKind::RentControl),
    ]
}

proptest! {
    #[test]
    fn scores_stay_within_bounds_for_any_magnitude(
        equity in 0.0f64..=100.0,
        gent in 0.0f64..=100.0,
        foreclosure in 0.0f64..=100.0,
        kind in kind(),
        amount in prop_oneof![0.0f64..1_000.0, 0.0f64..1e9, Just(1e15)],
        duration in 0u32..48,
    ) {
        let result = simulate_causal_loop(
            &record(equity, gent, foreclosure),
            &Intervention::new(kind, amount, duration),
        );
        prop_assert_eq!(result.timeline.len(), duration as usize + 1);
        for state in &result.timeline[1..] {
            for score in [state.equity_score, state.gentrification_risk, state.foreclosure_risk] {
                prop_assert!((0.0..=100.0).contains(&score), "score {} escaped [0, 100]", score);
            }
        }
    }
}
