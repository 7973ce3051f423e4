//! Quality assessment types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A scored dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityDimension {
    Completeness,
    Clarity,
    Practicality,
    Safety,
    Nutrition,
    Format,
}

impl QualityDimension {
    pub const ALL: [QualityDimension; 6] = [
        QualityDimension::Completeness,
        QualityDimension::Clarity,
        QualityDimension::Practicality,
        QualityDimension::Safety,
        QualityDimension::Nutrition,
        QualityDimension::Format,
    ];

    /// Name used in configuration weights and score maps
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityDimension::Completeness => "completeness",
            QualityDimension::Clarity => "clarity",
            QualityDimension::Practicality => "practicality",
            QualityDimension::Safety => "safety",
            QualityDimension::Nutrition => "nutrition",
            QualityDimension::Format => "format",
        }
    }
}

impl std::fmt::Display for QualityDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// A structured finding against one dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub kind: QualityDimension,
    pub severity: IssueSeverity,
    pub message: String,
    /// How sure the heuristic is, in [0, 1]
    pub confidence: f64,
}

impl QualityIssue {
    pub fn new(
        kind: QualityDimension,
        severity: IssueSeverity,
        message: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            confidence,
        }
    }
}

/// Scores for one result; never mutated after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub id: String,
    pub feature: String,
    pub assessed_at: DateTime<Utc>,
    /// Sub-score per dimension name, each in [0, 1]
    pub scores: BTreeMap<String, f64>,
    /// Weighted overall score in [0, 1]
    pub overall: f64,
    pub feedback: String,
    pub issues: Vec<QualityIssue>,
    pub suggestions: Vec<String>,
    /// Overall score met the configured minimum
    pub passed: bool,
}

impl QualityAssessment {
    pub fn score(&self, dimension: QualityDimension) -> Option<f64> {
        self.scores.get(dimension.as_str()).copied()
    }
}

/// Raw output of one dimension scorer
#[derive(Debug, Clone, Default)]
pub(super) struct DimensionScore {
    pub(super) score: f64,
    pub(super) issues: Vec<QualityIssue>,
    pub(super) suggestions: Vec<String>,
}

impl DimensionScore {
    pub(super) fn new() -> Self {
        Self {
            score: 1.0,
            ..Self::default()
        }
    }

    pub(super) fn penalize(
        &mut self,
        amount: f64,
        issue: Option<QualityIssue>,
        suggestion: Option<&str>,
    ) {
        self.score -= amount;
        if let Some(issue) = issue {
            self.issues.push(issue);
        }
        if let Some(suggestion) = suggestion {
            if !self.suggestions.iter().any(|s| s == suggestion) {
                self.suggestions.push(suggestion.to_string());
            }
        }
    }

    pub(super) fn clamped(mut self) -> Self {
        self.score = self.score.clamp(0.0, 1.0);
        self
    }
}
