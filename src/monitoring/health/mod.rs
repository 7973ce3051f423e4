//! Health checking
//!
//! Rolls per-component status into one report for the pipeline's callers.

mod checker;
mod components;
mod types;


pub use checker::{HealthChecker, HealthInputs};
pub use types::{ComponentHealth, HealthReport, HealthState, HealthSummary};
