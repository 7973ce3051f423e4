//! Request pipeline
//!
//! Sequences every request through the governance components:
//! rate limit, cache, budget, generation with fallback, quality gate with a
//! single bounded retry, usage recording, quota and alert evaluation.

mod builder;
mod governor;
mod outbound;
mod stats;
mod types;

#[cfg(test)]
mod tests;

pub use builder::GovernorBuilder;
pub use governor::Governor;
pub use stats::{PipelineStats, PipelineStatsSnapshot};
pub use types::{BilledGeneration, GovernedResponse, PipelineStage};
