//! Quality gate configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Quality gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Run the quality gate on generated results
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Minimum acceptable overall score
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    /// Retry generation once when the score is below the minimum
    #[serde(default = "default_true")]
    pub retry_on_low_score: bool,
    /// Weight per dimension name; dimensions without a weight are ignored
    #[serde(default = "default_weights")]
    pub weights: HashMap<String, f64>,
    /// Assessments kept per feature
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    /// Smoothing factor of the per-feature moving average
    #[serde(default = "default_ema_alpha")]
    pub ema_alpha: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_score: default_min_score(),
            retry_on_low_score: true,
            weights: default_weights(),
            history_cap: default_history_cap(),
            ema_alpha: default_ema_alpha(),
        }
    }
}

pub fn default_weights() -> HashMap<String, f64> {
    [
        ("completeness", 0.25),
        ("clarity", 0.20),
        ("practicality", 0.20),
        ("safety", 0.15),
        ("nutrition", 0.10),
        ("format", 0.10),
    ]
    .into_iter()
    .map(|(name, weight)| (name.to_string(), weight))
    .collect()
}

fn default_min_score() -> f64 {
    0.7
}

fn default_history_cap() -> usize {
    1000
}

fn default_ema_alpha() -> f64 {
    0.1
}
