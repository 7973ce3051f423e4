//! Request coordinator

use super::builder::GovernorBuilder;
use super::stats::PipelineStats;
use super::types::{BilledGeneration, GovernedResponse, PipelineStage};
use crate::config::{Config, GovernanceConfig, LOCAL_BACKEND};
use crate::core::budget::{BudgetCheck, BudgetLedger, UsageRecord};
use crate::core::cache::{ResponseCache, cache_key};
use crate::core::quality::{QualityAssessment, QualityGate};
use crate::core::rate_limiter::{LimitTier, RateLimitDecision, RateLimiter};
use crate::core::router::{
    AttemptRecord, FallbackOrchestrator, GenerationRequest, GenerationResponse, GenerationSource,
};
use crate::monitoring::alerts::{AlertManager, SystemSnapshot};
use crate::monitoring::health::HealthChecker;
use crate::utils::error::{GovernanceError, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Requests that must reach generation before system alerts are evaluated
pub const SYSTEM_CHECK_MIN_REQUESTS: u64 = 10;

/// Governs every generation request for all tenants
///
/// Cheap to clone; every component is shared.
#[derive(Clone)]
pub struct Governor {
    pub(super) config: Arc<GovernanceConfig>,
    pub(super) limiter: Arc<RateLimiter>,
    pub(super) ledger: BudgetLedger,
    pub(super) quality: QualityGate,
    pub(super) orchestrator: Arc<FallbackOrchestrator>,
    pub(super) alerts: AlertManager,
    pub(super) cache: Option<Arc<dyn ResponseCache>>,
    pub(super) stats: Arc<PipelineStats>,
    pub(super) health: HealthChecker,
}

impl std::fmt::Debug for Governor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Governor")
            .field("orchestrator", &self.orchestrator)
            .field("cache", &self.cache.is_some())
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}

/// One completed walk of the backend chain
struct Generation {
    source: GenerationSource,
    response: GenerationResponse,
    attempts: Vec<AttemptRecord>,
}

impl Governor {
    pub fn builder(config: Config) -> GovernorBuilder {
        GovernorBuilder::new(config)
    }

    /// Run one request through the full pipeline
    ///
    /// Order: rate limit, cache, budget, generation, quality gate (with at
    /// most one retry), usage recording, quota, alerts, cache fill. Denials
    /// are returned as errors; alert failures never are.
    pub async fn process(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GovernedResponse> {
        let started = Instant::now();
        let request_id = uuid::Uuid::new_v4().to_string();
        let mut stages = vec![PipelineStage::Pending];
        self.stats.request();

        if let RateLimitDecision::Denied {
            tier,
            reason,
            current,
            limit,
            retry_after,
        } = self.limiter.check(&request.tenant_id)
        {
            self.stats.rate_limited();
            info!(
                request_id = %request_id,
                tenant = %request.tenant_id,
                tier = %tier,
                stage = %PipelineStage::RateLimited,
                "Request denied by rate limiter"
            );
            self.alerts
                .check_rate_limit_violation(&request.tenant_id, tier, current, limit);
            return Err(GovernanceError::rate_limited(tier, reason, retry_after));
        }

        let key = cache_key(&request);
        if let Some(cache) = &self.cache {
            if let Some(recipe) = cache.get(&key).await {
                self.stats.cache_hit();
                stages.push(PipelineStage::CacheHit);
                info!(
                    request_id = %request_id,
                    tenant = %request.tenant_id,
                    feature = %request.feature,
                    "Served from cache"
                );
                let source = GenerationSource::Cache;
                return Ok(GovernedResponse {
                    request_id,
                    recipe,
                    confidence: source.confidence(),
                    source,
                    quality: None,
                    retried: false,
                    billed: Vec::new(),
                    attempts: Vec::new(),
                    stages,
                    latency_ms: started.elapsed().as_millis() as u64,
                });
            }
        }

        if let BudgetCheck::Exceeded {
            period,
            spent,
            limit,
        } = self.ledger.check_budget()
        {
            self.stats.budget_blocked();
            info!(
                request_id = %request_id,
                tenant = %request.tenant_id,
                period = %period,
                stage = %PipelineStage::BudgetBlocked,
                "Request denied by budget"
            );
            self.alerts.check_cost_thresholds(&self.ledger.get_alerts());
            return Err(GovernanceError::budget_exceeded(period, spent, limit));
        }

        stages.push(PipelineStage::Generating);
        let deadline = self.orchestrator.deadline();
        let first = match self.generate(&request, deadline, cancel).await {
            Ok(generation) => generation,
            Err(GovernanceError::Cancelled) => {
                self.stats.cancelled();
                info!(request_id = %request_id, "Request cancelled during generation");
                return Err(GovernanceError::Cancelled);
            }
            Err(e) => {
                self.stats.failure();
                self.check_system();
                return Err(e);
            }
        };
        if first.source.is_degraded() {
            stages.push(PipelineStage::Degraded);
        }

        let mut billed = vec![self.bill(&request, &first)];
        let mut attempts = first.attempts.clone();
        let mut chosen = first;
        let mut retried = false;
        let mut quality: Option<QualityAssessment> = None;

        if self.quality.is_enabled() {
            let assessment = self.quality.assess(&request.feature, &chosen.response.recipe);
            stages.push(PipelineStage::QualityChecked);

            if self.quality.should_retry(&assessment) {
                retried = true;
                self.stats.retry();
                stages.push(PipelineStage::Retried);
                debug!(
                    request_id = %request_id,
                    score = assessment.overall,
                    min_score = self.quality.min_score(),
                    "Quality below minimum, retrying once"
                );

                let amended = request.amended(&assessment.feedback, &assessment.suggestions);
                match self.generate(&amended, deadline, cancel).await {
                    Ok(second) => {
                        billed.push(self.bill(&request, &second));
                        attempts.extend(second.attempts.iter().cloned());
                        let second_assessment =
                            self.quality.assess(&request.feature, &second.response.recipe);
                        if second_assessment.overall > assessment.overall {
                            chosen = second;
                            quality = Some(second_assessment);
                        } else {
                            quality = Some(assessment);
                        }
                    }
                    Err(e) => {
                        warn!(
                            request_id = %request_id,
                            "Quality retry failed, keeping first result: {}",
                            e
                        );
                        if let GovernanceError::AllBackendsFailed { attempts: failed } = &e {
                            attempts.extend(failed.iter().cloned());
                        }
                        quality = Some(assessment);
                    }
                }
            } else {
                quality = Some(assessment);
            }
        }

        for generation in &billed {
            self.ledger.record_usage(&UsageRecord {
                tenant_id: request.tenant_id.clone(),
                backend: generation.backend.clone(),
                feature: request.feature.clone(),
                cost: generation.cost,
                units: generation.units,
            });
        }
        stages.push(PipelineStage::Recorded);

        let units: u64 = billed.iter().map(|b| b.units).sum();
        if units > 0 {
            let quota = self.limiter.consume_quota(&request.tenant_id, units);
            if quota.exceeded && quota.used.saturating_sub(units) < quota.quota {
                self.alerts.check_rate_limit_violation(
                    &request.tenant_id,
                    LimitTier::Quota,
                    quota.used,
                    quota.quota,
                );
            }
        }

        let latency_ms = started.elapsed().as_millis() as u64;
        self.stats.completed(latency_ms);

        self.alerts.check_cost_thresholds(&self.ledger.get_alerts());
        if let Some(assessment) = &quality {
            self.alerts
                .check_quality(&request.feature, assessment.overall, self.quality.min_score());
        }
        self.check_system();

        let cacheable = chosen.source != GenerationSource::LocalSynthesis
            && quality.as_ref().is_none_or(|q| q.passed);
        if let (Some(cache), true) = (&self.cache, cacheable) {
            cache
                .set(&key, chosen.response.recipe.clone(), self.config.cache.ttl())
                .await;
        }

        info!(
            request_id = %request_id,
            tenant = %request.tenant_id,
            feature = %request.feature,
            backend = %chosen.source.backend(),
            score = quality.as_ref().map(|q| q.overall),
            retried,
            latency_ms,
            "Request completed"
        );

        Ok(GovernedResponse {
            request_id,
            recipe: chosen.response.recipe,
            confidence: chosen.source.confidence(),
            source: chosen.source,
            quality,
            retried,
            billed,
            attempts,
            stages,
            latency_ms,
        })
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        deadline: tokio::time::Instant,
        cancel: &CancellationToken,
    ) -> Result<Generation> {
        let outcome = self
            .orchestrator
            .generate_until(request, deadline, cancel)
            .await?;
        let (source, response, attempts) = outcome.into_result()?;
        match source {
            GenerationSource::Fallback { .. } => self.stats.fallback(),
            GenerationSource::LocalSynthesis => self.stats.local_synthesis(),
            _ => {}
        }
        Ok(Generation {
            source,
            response,
            attempts,
        })
    }

    /// Price a generation against the backend that actually produced it
    fn bill(&self, request: &GenerationRequest, generation: &Generation) -> BilledGeneration {
        if generation.source == GenerationSource::LocalSynthesis {
            return BilledGeneration {
                backend: LOCAL_BACKEND.to_string(),
                units: 0,
                cost: 0.0,
            };
        }
        let backend = generation.source.backend();
        let units = generation.response.units_used;
        let estimate =
            self.ledger
                .estimate_cost(backend, &request.feature, &request.tenant_id, units);
        BilledGeneration {
            backend: backend.to_string(),
            units,
            cost: estimate.cost,
        }
    }

    fn system_snapshot(&self) -> SystemSnapshot {
        let stats = self.stats.snapshot();
        SystemSnapshot {
            error_rate: stats.error_rate(),
            avg_latency_ms: stats.avg_latency_ms(),
            total_requests: stats.requests,
        }
    }

    fn check_system(&self) {
        let stats = self.stats.snapshot();
        if stats.completed.saturating_sub(stats.cache_hits) + stats.failures
            < SYSTEM_CHECK_MIN_REQUESTS
        {
            return;
        }
        self.alerts.check_system(&self.system_snapshot());
    }
}
