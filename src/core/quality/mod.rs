//! Quality gate
//!
//! Scores generated recipes across weighted dimensions, keeps a bounded
//! per-feature history and running metrics, and tells the caller whether a
//! single retry is warranted. The gate never retries on its own.

mod gate;
mod metrics;
mod optimization;
mod scorers;
mod types;


pub use gate::QualityGate;
pub use metrics::FeatureMetrics;
pub use optimization::{OptimizationAssessment, OptimizationIntent};
pub use types::{IssueSeverity, QualityAssessment, QualityDimension, QualityIssue};
