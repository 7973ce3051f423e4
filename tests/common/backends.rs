//! Generation backends for tests
//!
//! `MockBackend` replies from memory; `HttpBackend` talks to a wiremock
//! server so the full request path runs over real HTTP.

use async_trait::async_trait;
use governance_gateway::{
    BackendError, GenerationBackend, GenerationRequest, GenerationResponse, Recipe,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

use super::fixtures;

/// In-memory backend with scripted replies
pub struct MockBackend {
    name: String,
    script: Mutex<VecDeque<GenerationResponse>>,
    default_reply: Option<GenerationResponse>,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockBackend {
    /// Always succeeds with a clean recipe
    pub fn ok(name: &str, units: u64) -> Arc<Self> {
        Self::build(name, Vec::new(), Some(fixtures::response(fixtures::recipe(name, 0), units)))
    }

    /// Always fails with a 503
    pub fn failing(name: &str) -> Arc<Self> {
        Self::build(name, Vec::new(), None)
    }

    /// Replies in order, then fails
    pub fn scripted(name: &str, replies: Vec<GenerationResponse>) -> Arc<Self> {
        Self::build(name, replies, None)
    }

    /// Succeeds after `delay`
    pub fn slow(name: &str, delay: Duration) -> Arc<Self> {
        let mut backend = Self::build_inner(
            name,
            Vec::new(),
            Some(fixtures::response(fixtures::recipe(name, 0), 10)),
        );
        backend.delay = delay;
        Arc::new(backend)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn build(
        name: &str,
        replies: Vec<GenerationResponse>,
        default_reply: Option<GenerationResponse>,
    ) -> Arc<Self> {
        Arc::new(Self::build_inner(name, replies, default_reply))
    }

    fn build_inner(
        name: &str,
        replies: Vec<GenerationResponse>,
        default_reply: Option<GenerationResponse>,
    ) -> Self {
        Self {
            name: name.to_string(),
            script: Mutex::new(replies.into()),
            default_reply,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        _request: &GenerationRequest,
        _deadline: Instant,
    ) -> Result<GenerationResponse, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let scripted = self.script.lock().pop_front();
        scripted
            .or_else(|| self.default_reply.clone())
            .ok_or_else(|| BackendError::unavailable(&self.name, "503 Service Unavailable"))
    }
}

/// Backend that POSTs the request as JSON to `{base_url}/generate`
pub struct HttpBackend {
    name: String,
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(name: &str, base_url: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        })
    }
}

#[derive(serde::Deserialize)]
struct GenerateBody {
    recipe: Recipe,
    units_used: u64,
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        deadline: Instant,
    ) -> Result<GenerationResponse, BackendError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let response = self
            .client
            .post(format!("{}/generate", self.base_url))
            .timeout(remaining)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::timeout(&self.name, remaining)
                } else {
                    BackendError::unavailable(&self.name, e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(BackendError::rate_limited(&self.name, None));
        }
        if !status.is_success() {
            return Err(BackendError::unavailable(&self.name, status.to_string()));
        }

        let body: GenerateBody = response
            .json()
            .await
            .map_err(|e| BackendError::invalid_response(&self.name, e.to_string()))?;
        Ok(GenerationResponse {
            recipe: body.recipe,
            units_used: body.units_used,
        })
    }
}
