//! Core health checker implementation

use super::components;
use super::types::{ComponentHealth, HealthReport, HealthState, HealthSummary};
use crate::core::budget::BudgetLedger;
use crate::core::pipeline::PipelineStatsSnapshot;
use crate::core::quality::QualityGate;
use crate::core::rate_limiter::RateLimiter;
use crate::core::router::BackendStats;
use crate::monitoring::alerts::AlertManager;
use chrono::Utc;
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

/// Borrowed view of everything the checker inspects
pub struct HealthInputs<'a> {
    pub limiter: &'a RateLimiter,
    pub ledger: &'a BudgetLedger,
    pub quality: &'a QualityGate,
    pub alerts: &'a AlertManager,
    pub backends: HashMap<String, BackendStats>,
    pub pipeline: PipelineStatsSnapshot,
}

/// Health checker for the governance components
#[derive(Debug, Clone)]
pub struct HealthChecker {
    started_at: Instant,
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthChecker {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }

    /// Check all components
    pub fn check(&self, inputs: HealthInputs<'_>) -> HealthReport {
        debug!("Running health check");

        let error_rate_warning = inputs.alerts.config().system.error_rate_warning;
        let components = vec![
            components::rate_limiter(inputs.limiter),
            components::budget(inputs.ledger),
            components::quality(inputs.quality),
            components::alerts(inputs.alerts),
            components::generation(&inputs.backends, &inputs.pipeline, error_rate_warning),
        ];

        Self::rollup(components, self.started_at.elapsed().as_secs())
    }

    fn rollup(components: Vec<ComponentHealth>, uptime_seconds: u64) -> HealthReport {
        let healthy = components.iter().filter(|c| c.is_healthy()).count();
        let status = components
            .iter()
            .map(|c| c.status)
            .max()
            .unwrap_or(HealthState::Healthy);

        HealthReport {
            status,
            checked_at: Utc::now(),
            uptime_seconds,
            summary: HealthSummary {
                total_components: components.len(),
                healthy_components: healthy,
                warning_components: components.len() - healthy,
            },
            components,
        }
    }
}
