//! Per-feature running quality metrics

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Running aggregate of assessments for one feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureMetrics {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    /// Exponential moving average of the overall score
    pub ema: f64,
    /// Counts per score decile: [0.0, 0.1), [0.1, 0.2), ... [0.9, 1.0]
    pub histogram: [u64; 10],
    /// Assessments below the configured minimum
    pub below_threshold: u64,
    pub last_updated: DateTime<Utc>,
}

impl FeatureMetrics {
    pub(super) fn new(now: DateTime<Utc>) -> Self {
        Self {
            count: 0,
            min: 1.0,
            max: 0.0,
            ema: 0.0,
            histogram: [0; 10],
            below_threshold: 0,
            last_updated: now,
        }
    }

    /// Fold one overall score into the aggregate
    pub(super) fn observe(&mut self, score: f64, alpha: f64, min_score: f64, now: DateTime<Utc>) {
        self.ema = if self.count == 0 {
            score
        } else {
            alpha * score + (1.0 - alpha) * self.ema
        };
        self.count += 1;
        self.min = self.min.min(score);
        self.max = self.max.max(score);
        self.histogram[decile(score)] += 1;
        if score < min_score {
            self.below_threshold += 1;
        }
        self.last_updated = now;
    }

    /// Share of assessments below the minimum
    pub fn below_threshold_rate(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.below_threshold as f64 / self.count as f64
        }
    }
}

fn decile(score: f64) -> usize {
    ((score.clamp(0.0, 1.0) * 10.0) as usize).min(9)
}
