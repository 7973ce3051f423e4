//! Configuration data models
//!
//! This module defines all configuration structures used by the governance pipeline.

#![allow(missing_docs)]

pub mod alerting;
pub mod backend;
pub mod budget;
pub mod cache;
pub mod governance;
pub mod logging;
pub mod quality;
pub mod rate_limit;

pub use alerting::*;
pub use backend::*;
pub use budget::*;
pub use cache::*;
pub use governance::*;
pub use logging::*;
pub use quality::*;
pub use rate_limit::*;

/// Default backend request timeout in seconds
pub fn default_timeout() -> u64 {
    30
}

/// Default flag value for features that are on unless disabled
pub fn default_true() -> bool {
    true
}
