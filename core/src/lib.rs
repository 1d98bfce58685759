//! Housing-equity data core for a county's Census Block Groups.
//!
//! Layers, leaf to root:
//!   store: the immutable record set, loaded once
//!   query: ranking, comparison, statistics
//!   simulation: causal-loop and spillover projections
//!   dispatch: named tool requests with loosely-typed arguments
//!   assistant: bounded tool-calling loop over a chat model
//!
//! export, render and synth sit beside the stack for CSV output,
//! console rendering and synthetic demo data.

pub mod assistant;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod export;
pub mod query;
pub mod record;
pub mod render;
pub mod rng;
pub mod simulation;
pub mod store;
pub mod synth;
pub mod types;
