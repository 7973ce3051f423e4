//! Ordered backend fallback
//!
//! Tries the primary backend, then every fallback in order, then local
//! synthesis. All attempts share one deadline and one cancellation token so a
//! slow chain cannot outlive the request.

use super::backend::{GenerationBackend, GenerationRequest, GenerationResponse};
use super::error::{AttemptRecord, BackendError};
use super::local::LocalSynthesizer;
use super::stats::BackendStats;
use crate::config::{BackendsConfig, LOCAL_BACKEND};
use crate::utils::error::{GovernanceError, Result};
use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Which stage of degradation produced a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationSource {
    Primary { backend: String },
    /// `position` is 1 for the first fallback
    Fallback { backend: String, position: usize },
    LocalSynthesis,
    Cache,
}

impl GenerationSource {
    /// Backend the result is attributed to for cost and quota
    pub fn backend(&self) -> &str {
        match self {
            Self::Primary { backend } | Self::Fallback { backend, .. } => backend,
            Self::LocalSynthesis => LOCAL_BACKEND,
            Self::Cache => "cache",
        }
    }

    /// Confidence attached to results from this source
    pub fn confidence(&self) -> f64 {
        match self {
            Self::Primary { .. } => 0.95,
            Self::Fallback { position, .. } => {
                (0.8 - 0.05 * position.saturating_sub(1) as f64).max(0.5)
            }
            Self::LocalSynthesis => 0.4,
            Self::Cache => 0.9,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Fallback { .. } | Self::LocalSynthesis)
    }
}

/// Result of walking the chain
#[derive(Debug, Clone)]
pub enum FallbackOutcome {
    Success {
        source: GenerationSource,
        response: GenerationResponse,
        attempts: Vec<AttemptRecord>,
    },
    /// Every remote backend failed and local synthesis is disabled
    AllFailed { attempts: Vec<AttemptRecord> },
}

impl FallbackOutcome {
    pub fn attempts(&self) -> &[AttemptRecord] {
        match self {
            Self::Success { attempts, .. } | Self::AllFailed { attempts } => attempts,
        }
    }

    /// Convert into a result, failing with every attempt on `AllFailed`
    pub fn into_result(
        self,
    ) -> Result<(GenerationSource, GenerationResponse, Vec<AttemptRecord>)> {
        match self {
            Self::Success {
                source,
                response,
                attempts,
            } => Ok((source, response, attempts)),
            Self::AllFailed { attempts } => Err(GovernanceError::AllBackendsFailed { attempts }),
        }
    }
}

/// Walks the configured backend chain
pub struct FallbackOrchestrator {
    config: BackendsConfig,
    backends: HashMap<String, Arc<dyn GenerationBackend>>,
    local: LocalSynthesizer,
    stats: DashMap<String, BackendStats>,
}

impl std::fmt::Debug for FallbackOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackOrchestrator")
            .field("chain", &self.config.chain())
            .field("registered", &self.backends.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FallbackOrchestrator {
    pub fn new(config: BackendsConfig) -> Self {
        Self {
            config,
            backends: HashMap::new(),
            local: LocalSynthesizer::new(),
            stats: DashMap::new(),
        }
    }

    /// Register a backend (builder pattern)
    pub fn with_backend(mut self, backend: Arc<dyn GenerationBackend>) -> Self {
        self.register(backend);
        self
    }

    /// Register a backend; a backend with the same name is replaced
    pub fn register(&mut self, backend: Arc<dyn GenerationBackend>) {
        let name = backend.name().to_string();
        if name == LOCAL_BACKEND {
            warn!("Ignoring backend registered under the reserved name '{}'", LOCAL_BACKEND);
            return;
        }
        debug!(backend = %name, "Registered generation backend");
        self.backends.insert(name, backend);
    }

    pub fn config(&self) -> &BackendsConfig {
        &self.config
    }

    /// Registered backend names, sorted
    pub fn registered(&self) -> Vec<String> {
        let mut names: Vec<String> = self.backends.keys().cloned().collect();
        names.sort();
        names
    }

    /// Deadline for a request starting now
    pub fn deadline(&self) -> Instant {
        Instant::now() + self.config.request_deadline()
    }

    /// Generate through the chain under a fresh request deadline
    ///
    /// Returns `Cancelled` if `cancel` fires before a result exists.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<FallbackOutcome> {
        self.generate_until(request, self.deadline(), cancel).await
    }

    /// Generate through the chain, never starting an attempt past `deadline`
    ///
    /// Callers that generate more than once for one request pass the same
    /// deadline to every call.
    pub async fn generate_until(
        &self,
        request: &GenerationRequest,
        deadline: Instant,
        cancel: &CancellationToken,
    ) -> Result<FallbackOutcome> {
        let mut attempts = Vec::new();

        for (position, name) in self.config.chain().into_iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(GovernanceError::Cancelled);
            }

            let Some(backend) = self.backends.get(&name) else {
                warn!(backend = %name, "Unknown backend in fallback chain, skipping");
                attempts.push(AttemptRecord::failed(
                    position,
                    Duration::ZERO,
                    BackendError::UnknownBackend(name),
                ));
                continue;
            };

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!(backend = %name, "Request deadline exhausted before attempt");
                attempts.push(AttemptRecord::failed(
                    position,
                    Duration::ZERO,
                    BackendError::timeout(&name, Duration::ZERO),
                ));
                break;
            }
            let timeout = self.config.timeout_for(&name).min(remaining);

            let started = Instant::now();
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GovernanceError::Cancelled),
                result = tokio::time::timeout(timeout, backend.generate(request, deadline)) => result,
            };
            let latency = started.elapsed();

            let error = match result {
                Ok(Ok(response)) => {
                    self.stats
                        .entry(name.clone())
                        .or_default()
                        .record_success(latency);
                    attempts.push(AttemptRecord::succeeded(&name, position, latency));

                    let source = if position == 0 {
                        GenerationSource::Primary { backend: name }
                    } else {
                        info!(backend = %name, position, "Served by fallback backend");
                        GenerationSource::Fallback {
                            backend: name,
                            position,
                        }
                    };
                    return Ok(FallbackOutcome::Success {
                        source,
                        response,
                        attempts,
                    });
                }
                Ok(Err(error)) => error,
                Err(_) => BackendError::timeout(&name, latency),
            };

            warn!(
                backend = %name,
                kind = error.kind(),
                latency_ms = latency.as_millis() as u64,
                "Generation attempt failed: {}",
                error
            );
            self.stats.entry(name).or_default().record_failure(
                latency,
                error.is_timeout(),
                error.to_string(),
            );
            attempts.push(AttemptRecord::failed(position, latency, error));
        }

        if !self.config.local_synthesis {
            warn!(attempts = attempts.len(), "All generation backends failed");
            return Ok(FallbackOutcome::AllFailed { attempts });
        }
        if cancel.is_cancelled() {
            return Err(GovernanceError::Cancelled);
        }

        info!(
            failed_attempts = attempts.len(),
            "Remote backends exhausted, degrading to local synthesis"
        );
        let response = self.local.synthesize(request);
        let position = attempts.len();
        attempts.push(AttemptRecord::succeeded(LOCAL_BACKEND, position, Duration::ZERO));
        self.stats
            .entry(LOCAL_BACKEND.to_string())
            .or_default()
            .record_success(Duration::ZERO);

        Ok(FallbackOutcome::Success {
            source: GenerationSource::LocalSynthesis,
            response,
            attempts,
        })
    }

    /// Snapshot of per-backend statistics
    pub fn backend_stats(&self) -> HashMap<String, BackendStats> {
        self.stats
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}
