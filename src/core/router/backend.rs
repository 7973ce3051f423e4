//! The generation capability

use super::error::BackendError;
use crate::core::types::Recipe;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::time::Instant;

/// A request to generate one recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub tenant_id: String,
    /// Feature tag used for cost attribution and quality history
    pub feature: String,
    pub prompt: String,
    /// Free-form constraints such as diet or servings
    #[serde(default)]
    pub constraints: BTreeMap<String, String>,
}

impl GenerationRequest {
    pub fn new(
        tenant_id: impl Into<String>,
        feature: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            feature: feature.into(),
            prompt: prompt.into(),
            constraints: BTreeMap::new(),
        }
    }

    pub fn with_constraint(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.constraints.insert(key.into(), value.into());
        self
    }

    /// Copy of this request whose prompt asks the backend to address `feedback`
    pub fn amended(&self, feedback: &str, suggestions: &[String]) -> Self {
        let mut prompt = format!(
            "{}\n\nThe previous attempt was rejected by review. {}",
            self.prompt, feedback
        );
        for suggestion in suggestions {
            prompt.push_str("\n- ");
            prompt.push_str(suggestion);
        }
        Self {
            prompt,
            ..self.clone()
        }
    }
}

/// A backend's answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub recipe: Recipe,
    /// Units consumed, used for cost estimation and quota
    pub units_used: u64,
}

/// One concrete generation backend
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Name matching the configured chain and rate cards
    fn name(&self) -> &str;

    /// Generate a recipe; `deadline` is the request-wide cut-off
    async fn generate(
        &self,
        request: &GenerationRequest,
        deadline: Instant,
    ) -> Result<GenerationResponse, BackendError>;
}
