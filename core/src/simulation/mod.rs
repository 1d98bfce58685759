//! What-if projections for a single block group.
//!
//! Two models live here:
//!   - causal_loop: a monthly time-stepped projection with decaying
//!     intervention strength and three feedback loops.
//!   - spillover:   a single-step estimate that pushes a share of the
//!     effect onto neighbouring block groups.
//!
//! Both are pure: they take records by reference and return owned
//! result values. Nothing here can fail once inputs are valid.

pub mod causal_loop;
pub mod feedback;
pub mod intervention;
pub mod spillover;
pub mod state;

pub use causal_loop::{simulate_causal_loop, CausalLoopModel, CausalLoopResult};
pub use feedback::{FeedbackLoop, FeedbackLoopInfo, LoopKind};
pub use intervention::{Intervention, InterventionKind};
pub use spillover::{simulate_spillover, SpilloverModel, SpilloverResult};
pub use state::{ScoreChange, ScoreDelta, SimulationState};
