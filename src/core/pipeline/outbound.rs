//! Operations exposed to callers such as an HTTP layer

use super::governor::Governor;
use super::stats::PipelineStatsSnapshot;
use crate::config::GovernanceConfig;
use crate::core::budget::{BudgetLedger, BudgetStatus, CostEstimate, SpendReport, UsageRecord};
use crate::core::cache::ResponseCache;
use crate::core::quality::{QualityAssessment, QualityGate};
use crate::core::rate_limiter::{QuotaSnapshot, RateLimiter, TenantStatus};
use crate::core::router::FallbackOrchestrator;
use crate::core::types::Recipe;
use crate::monitoring::alerts::AlertManager;
use crate::monitoring::health::{HealthInputs, HealthReport};
use crate::monitoring::types::{Alert, AlertSeverity};
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

impl Governor {
    /// Start the notification worker and the limiter cleanup task
    pub fn start(&self, cancel: CancellationToken) -> Vec<JoinHandle<()>> {
        vec![
            self.alerts.start(cancel.clone()),
            self.limiter.start_cleanup_task(cancel),
        ]
    }

    // ==== Rate limiting ====

    /// Check and count one request for the tenant
    pub fn allow(&self, tenant_id: &str) -> bool {
        self.limiter.check(tenant_id).is_allowed()
    }

    pub fn tenant_status(&self, tenant_id: &str) -> TenantStatus {
        self.limiter.status(tenant_id)
    }

    pub fn consume_quota(&self, tenant_id: &str, units: u64) -> QuotaSnapshot {
        self.limiter.consume_quota(tenant_id, units)
    }

    // ==== Budget ====

    pub fn estimate(
        &self,
        backend: &str,
        feature: &str,
        tenant_id: &str,
        units: u64,
    ) -> CostEstimate {
        self.ledger.estimate_cost(backend, feature, tenant_id, units)
    }

    /// Record usage made outside the pipeline and evaluate cost thresholds
    pub fn record(&self, record: &UsageRecord) -> Vec<Alert> {
        self.ledger.record_usage(record);
        self.alerts.check_cost_thresholds(&self.ledger.get_alerts())
    }

    pub fn budget_status(&self) -> BudgetStatus {
        self.ledger.status()
    }

    pub fn spend_report(&self) -> SpendReport {
        self.ledger.report()
    }

    // ==== Quality ====

    /// Score a recipe, alerting when it falls below the minimum
    pub fn assess(&self, feature: &str, recipe: &Recipe) -> QualityAssessment {
        let assessment = self.quality.assess(feature, recipe);
        self.alerts
            .check_quality(feature, assessment.overall, self.quality.min_score());
        assessment
    }

    // ==== Alerts ====

    pub fn raise(
        &self,
        alert_type: &str,
        severity: AlertSeverity,
        title: impl Into<String>,
        message: impl Into<String>,
        source: &str,
        metadata: serde_json::Value,
    ) -> Alert {
        self.alerts
            .raise(alert_type, severity, title, message, source, metadata)
    }

    pub fn resolve(&self, alert_id: &str, actor: &str) -> Result<Alert> {
        self.alerts.resolve(alert_id, actor)
    }

    pub fn acknowledge(&self, alert_id: &str, actor: &str) -> Result<Alert> {
        self.alerts.acknowledge(alert_id, actor)
    }

    // ==== Health and statistics ====

    pub fn health_check(&self) -> HealthReport {
        self.health.check(HealthInputs {
            limiter: &self.limiter,
            ledger: &self.ledger,
            quality: &self.quality,
            alerts: &self.alerts,
            backends: self.orchestrator.backend_stats(),
            pipeline: self.stats.snapshot(),
        })
    }

    pub fn stats(&self) -> PipelineStatsSnapshot {
        self.stats.snapshot()
    }

    // ==== Components ====

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn ledger(&self) -> &BudgetLedger {
        &self.ledger
    }

    pub fn quality(&self) -> &QualityGate {
        &self.quality
    }

    pub fn orchestrator(&self) -> &FallbackOrchestrator {
        &self.orchestrator
    }

    pub fn alerts(&self) -> &AlertManager {
        &self.alerts
    }

    pub fn cache(&self) -> Option<&Arc<dyn ResponseCache>> {
        self.cache.as_ref()
    }
}
