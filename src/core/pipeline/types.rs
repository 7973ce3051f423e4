//! Pipeline request and response types

use crate::core::quality::QualityAssessment;
use crate::core::router::{AttemptRecord, GenerationSource};
use crate::core::types::Recipe;
use serde::Serialize;

/// Request lifecycle stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Pending,
    RateLimited,
    BudgetBlocked,
    CacheHit,
    Generating,
    /// Served by a fallback backend or local synthesis
    Degraded,
    QualityChecked,
    Retried,
    Recorded,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Pending => "pending",
            PipelineStage::RateLimited => "rate_limited",
            PipelineStage::BudgetBlocked => "budget_blocked",
            PipelineStage::CacheHit => "cache_hit",
            PipelineStage::Generating => "generating",
            PipelineStage::Degraded => "degraded",
            PipelineStage::QualityChecked => "quality_checked",
            PipelineStage::Retried => "retried",
            PipelineStage::Recorded => "recorded",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generation billed to a backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BilledGeneration {
    pub backend: String,
    pub units: u64,
    pub cost: f64,
}

/// Result handed back to the caller
#[derive(Debug, Clone, Serialize)]
pub struct GovernedResponse {
    pub request_id: String,
    pub recipe: Recipe,
    /// Stage that produced the returned recipe
    pub source: GenerationSource,
    pub confidence: f64,
    /// Assessment of the returned recipe, when the gate is enabled
    pub quality: Option<QualityAssessment>,
    pub retried: bool,
    /// Every generation billed for this request, retry included
    pub billed: Vec<BilledGeneration>,
    #[serde(skip)]
    pub attempts: Vec<AttemptRecord>,
    pub stages: Vec<PipelineStage>,
    pub latency_ms: u64,
}

impl GovernedResponse {
    pub fn total_cost(&self) -> f64 {
        self.billed.iter().map(|b| b.cost).sum()
    }

    pub fn total_units(&self) -> u64 {
        self.billed.iter().map(|b| b.units).sum()
    }

    pub fn is_cached(&self) -> bool {
        self.source == GenerationSource::Cache
    }
}
