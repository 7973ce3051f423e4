//! Governor builder

use super::governor::Governor;
use super::stats::PipelineStats;
use crate::config::{Config, LOCAL_BACKEND};
use crate::core::budget::BudgetLedger;
use crate::core::cache::{MemoryCache, ResponseCache};
use crate::core::quality::QualityGate;
use crate::core::rate_limiter::RateLimiter;
use crate::core::router::{FallbackOrchestrator, GenerationBackend};
use crate::monitoring::alerts::{AlertManager, NotificationChannel};
use crate::monitoring::health::HealthChecker;
use crate::utils::error::{GovernanceError, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Assembles a [`Governor`] from configuration and injected capabilities
pub struct GovernorBuilder {
    config: Config,
    backends: Vec<Arc<dyn GenerationBackend>>,
    cache: Option<Arc<dyn ResponseCache>>,
    channels: Option<Vec<Arc<dyn NotificationChannel>>>,
}

impl GovernorBuilder {
    pub(super) fn new(config: Config) -> Self {
        Self {
            config,
            backends: Vec::new(),
            cache: None,
            channels: None,
        }
    }

    /// Register a generation backend under its own name
    pub fn backend(mut self, backend: Arc<dyn GenerationBackend>) -> Self {
        self.backends.push(backend);
        self
    }

    /// Register several backends
    pub fn backends(mut self, backends: impl IntoIterator<Item = Arc<dyn GenerationBackend>>) -> Self {
        self.backends.extend(backends);
        self
    }

    /// Use a custom cache instead of the in-memory one
    pub fn cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Use explicit notification channels instead of the configured ones
    pub fn channels(mut self, channels: Vec<Arc<dyn NotificationChannel>>) -> Self {
        self.channels = Some(channels);
        self
    }

    /// Validate the configuration and build every component
    pub fn build(self) -> Result<Governor> {
        self.config.validate()?;
        let governance = self.config.governance;

        let mut orchestrator = FallbackOrchestrator::new(governance.backends.clone());
        for backend in self.backends {
            if backend.name() == LOCAL_BACKEND {
                return Err(GovernanceError::config(format!(
                    "Backend name '{}' is reserved for local synthesis",
                    LOCAL_BACKEND
                )));
            }
            orchestrator.register(backend);
        }
        let registered = orchestrator.registered();
        for name in governance.backends.chain() {
            if !registered.contains(&name) {
                warn!(backend = %name, "Configured backend has no implementation and will be skipped");
            }
        }

        let alerts = match self.channels {
            Some(channels) => AlertManager::with_channels(governance.alerting.clone(), channels),
            None => AlertManager::new(governance.alerting.clone())?,
        };

        let cache = if governance.cache.enabled {
            Some(
                self.cache
                    .unwrap_or_else(|| Arc::new(MemoryCache::new(&governance.cache))),
            )
        } else {
            None
        };

        info!(
            primary = %governance.backends.primary,
            fallbacks = governance.backends.fallbacks.len(),
            cache = cache.is_some(),
            quality_gate = governance.quality.enabled,
            alerting = governance.alerting.enabled,
            "Governor initialized"
        );

        Ok(Governor {
            limiter: Arc::new(RateLimiter::new(governance.rate_limit.clone())),
            ledger: BudgetLedger::new(governance.budget.clone()),
            quality: QualityGate::new(governance.quality.clone()),
            orchestrator: Arc::new(orchestrator),
            alerts,
            cache,
            stats: Arc::new(PipelineStats::new()),
            health: HealthChecker::new(),
            config: Arc::new(governance),
        })
    }
}
