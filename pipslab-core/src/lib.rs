//! PipsLab Core — strategy engine, domain types, indicators, simulated venue.
//!
//! This crate contains the per-run half of the system:
//! - Domain types (bars, orders, positions, trades)
//! - Indicator implementations precomputed before the bar loop
//! - The `Strategy` trait and five concrete strategy variants
//! - The bar-by-bar state machine (FLAT → PENDING_ENTRY → IN_POSITION)
//! - The `ExecutionVenue` trait and the bracket-order fill simulator
//!
//! Aggregation, sweeps, and ranking live in `pipslab-runner`.

pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod strategy;
pub mod venue;

pub use error::EngineError;
