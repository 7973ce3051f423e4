//! Quality gate implementation

use super::metrics::FeatureMetrics;
use super::scorers;
use super::types::{QualityAssessment, QualityDimension, QualityIssue};
use crate::config::QualityConfig;
use crate::core::types::Recipe;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// Score at or above which a dimension is reported as strong
pub const STRONG_SCORE: f64 = 0.8;
/// Score below which a dimension is reported as needing improvement
pub const WEAK_SCORE: f64 = 0.6;

#[derive(Debug, Default)]
pub(super) struct QualityState {
    pub(super) history: HashMap<String, VecDeque<QualityAssessment>>,
    pub(super) metrics: HashMap<String, FeatureMetrics>,
}

/// Weighted multi-dimension quality gate
#[derive(Debug, Clone)]
pub struct QualityGate {
    pub(super) config: QualityConfig,
    pub(super) state: Arc<Mutex<QualityState>>,
}

impl QualityGate {
    pub fn new(config: QualityConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(QualityState::default())),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn min_score(&self) -> f64 {
        self.config.min_score
    }

    /// Score a result and fold it into the feature's history and metrics
    pub fn assess(&self, feature: &str, recipe: &Recipe) -> QualityAssessment {
        let assessment = self.evaluate(feature, recipe);
        self.record(&assessment);
        assessment
    }

    /// Score a result without recording it
    pub fn evaluate(&self, feature: &str, recipe: &Recipe) -> QualityAssessment {
        let mut scores = BTreeMap::new();
        let mut issues: Vec<QualityIssue> = Vec::new();
        let mut suggestions: Vec<String> = Vec::new();
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;

        for dimension in QualityDimension::ALL {
            let Some(&weight) = self.config.weights.get(dimension.as_str()) else {
                continue;
            };
            let scored = scorers::score(dimension, recipe);
            weighted_sum += weight * scored.score;
            weight_total += weight;
            scores.insert(dimension.as_str().to_string(), scored.score);
            issues.extend(scored.issues);
            for suggestion in scored.suggestions {
                if !suggestions.contains(&suggestion) {
                    suggestions.push(suggestion);
                }
            }
        }

        let overall = if weight_total > 0.0 {
            (weighted_sum / weight_total).clamp(0.0, 1.0)
        } else {
            0.0
        };

        QualityAssessment {
            id: uuid::Uuid::new_v4().to_string(),
            feature: feature.to_string(),
            assessed_at: Utc::now(),
            feedback: feedback(&scores),
            scores,
            overall,
            issues,
            suggestions,
            passed: overall >= self.config.min_score,
        }
    }

    /// Whether the caller should spend its single retry on this result
    pub fn should_retry(&self, assessment: &QualityAssessment) -> bool {
        self.config.enabled && self.config.retry_on_low_score && !assessment.passed
    }

    /// Append to the bounded history and update running metrics
    pub fn record(&self, assessment: &QualityAssessment) {
        self.record_at(assessment, assessment.assessed_at)
    }

    pub(super) fn record_at(&self, assessment: &QualityAssessment, now: DateTime<Utc>) {
        let mut state = self.state.lock();

        let history = state
            .history
            .entry(assessment.feature.clone())
            .or_default();
        history.push_back(assessment.clone());
        while history.len() > self.config.history_cap {
            history.pop_front();
        }

        state
            .metrics
            .entry(assessment.feature.clone())
            .or_insert_with(|| FeatureMetrics::new(now))
            .observe(
                assessment.overall,
                self.config.ema_alpha,
                self.config.min_score,
                now,
            );

        debug!(
            feature = %assessment.feature,
            score = assessment.overall,
            passed = assessment.passed,
            "Quality assessed"
        );
    }

    /// Most recent assessments for a feature, newest first
    pub fn history(&self, feature: &str, limit: usize) -> Vec<QualityAssessment> {
        self.state
            .lock()
            .history
            .get(feature)
            .map(|h| h.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    pub fn metrics(&self, feature: &str) -> Option<FeatureMetrics> {
        self.state.lock().metrics.get(feature).cloned()
    }

    pub fn all_metrics(&self) -> HashMap<String, FeatureMetrics> {
        self.state.lock().metrics.clone()
    }
}

/// Lists strong dimensions and those needing improvement
fn feedback(scores: &BTreeMap<String, f64>) -> String {
    let strong: Vec<&str> = scores
        .iter()
        .filter(|(_, s)| **s >= STRONG_SCORE)
        .map(|(name, _)| name.as_str())
        .collect();
    let weak: Vec<&str> = scores
        .iter()
        .filter(|(_, s)| **s < WEAK_SCORE)
        .map(|(name, _)| name.as_str())
        .collect();

    let mut parts = Vec::new();
    if !strong.is_empty() {
        parts.push(format!("Strong: {}.", strong.join(", ")));
    }
    if !weak.is_empty() {
        parts.push(format!("Needs improvement: {}.", weak.join(", ")));
    }
    if parts.is_empty() {
        "Adequate across all dimensions.".to_string()
    } else {
        parts.join(" ")
    }
}
