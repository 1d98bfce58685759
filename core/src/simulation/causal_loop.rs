//! The causal-loop projector.
//!
//! EXECUTION ORDER (per month m = 1..=duration, fixed):
//!   1. strength = exp(-m / decay_months)
//!   2. direct intervention effect at that strength
//!   3. feedback loops, in registration order:
//!        displacement  (reinforcing)
//!        price_drop    (balancing)
//!        investment    (mixed)
//!   4. clamp each score to [0, 100] and append the new state
//!
//! Every loop in step 3 reads the state at the START of month m.

use super::{
    feedback::{
        feedback_catalogue, DisplacementLoop, FeedbackLoop, FeedbackLoopInfo, InvestmentLoop,
        PriceDropLoop,
    },
    intervention::Intervention,
    state::{ScoreChange, SimulationState},
};
use crate::{record::BlockGroupRecord, types::Month};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DECAY_MONTHS: f64 = 6.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalLoopResult {
    pub intervention:   Intervention,
    pub baseline:       BlockGroupRecord,
    /// Month 0 (baseline) followed by one state per simulated month.
    pub timeline:       Vec<SimulationState>,
    pub final_state:    SimulationState,
    pub total_change:   ScoreChange,
    pub feedback_loops: Vec<FeedbackLoopInfo>,
}

pub struct CausalLoopModel {
    decay_months: f64,
    loops:        Vec<Box<dyn FeedbackLoop>>,
}

impl CausalLoopModel {
    pub fn new(decay_months: f64) -> Self {
        Self { decay_months, loops: Vec::new() }
    }

    /// Build a model with all feedback loops registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(decay_months: f64) -> Self {
        let mut model = Self::new(decay_months);
        model.register(Box::new(DisplacementLoop));
        model.register(Box::new(PriceDropLoop));
        model.register(Box::new(InvestmentLoop));
        model
    }

    /// Register a feedback loop. Call in the documented execution order.
    pub fn register(&mut self, feedback: Box<dyn FeedbackLoop>) {
        self.loops.push(feedback);
    }

    /// Names of the registered loops, in execution order.
    pub fn loop_names(&self) -> Vec<&'static str> {
        self.loops.iter().map(|l| l.name()).collect()
    }

    /// Intervention strength in month `month`.
    pub fn strength(&self, month: Month) -> f64 {
        (-f64::from(month) / self.decay_months).exp()
    }

    /// Advance one month from `state`.
    pub fn step(&self, state: &SimulationState, intervention: &Intervention, month: Month) -> SimulationState {
        let mut delta = intervention.direct_effect(self.strength(month));
        for feedback in &self.loops {
            let adjustment = feedback.adjust(state);
            log::trace!(
                "month={month} loop={} equity={:+.3} gent={:+.3} foreclosure={:+.3}",
                feedback.name(),
                adjustment.equity,
                adjustment.gentrification,
                adjustment.foreclosure
            );
            delta += adjustment;
        }
        let next = state.step(month, &delta);

        log::debug!(
            "month={month} equity={:.2} gent={:.2} foreclosure={:.2}",
            next.equity_score,
            next.gentrification_risk,
            next.foreclosure_risk
        );
        next
    }

    /// Project `record` forward under `intervention`.
    /// A duration of 0 yields the baseline alone.
    pub fn project(&self, record: &BlockGroupRecord, intervention: &Intervention) -> CausalLoopResult {
        let baseline = SimulationState::baseline(record);
        let mut timeline = Vec::with_capacity(intervention.duration_months as usize + 1);
        timeline.push(baseline.clone());

        let mut state = baseline;
        for month in 1..=intervention.duration_months {
            state = self.step(&state, intervention, month);
            timeline.push(state.clone());
        }

        CausalLoopResult {
            intervention:   intervention.clone(),
            baseline:       record.clone(),
            total_change:   ScoreChange::between(record, &state),
            final_state:    state,
            timeline,
            feedback_loops: feedback_catalogue(),
        }
    }
}

impl Default for CausalLoopModel {
    fn default() -> Self { Self::build(DEFAULT_DECAY_MONTHS) }
}

/// Project with the default model (six-month decay).
pub fn simulate_causal_loop(record: &BlockGroupRecord, intervention: &Intervention) -> CausalLoopResult {
    CausalLoopModel::default().project(record, intervention)
}
