//! Per-component health checks

use super::types::ComponentHealth;
use crate::core::budget::BudgetLedger;
use crate::core::pipeline::PipelineStatsSnapshot;
use crate::core::quality::QualityGate;
use crate::core::rate_limiter::RateLimiter;
use crate::core::router::BackendStats;
use crate::monitoring::alerts::AlertManager;
use crate::monitoring::types::AlertSeverity;
use std::collections::HashMap;

/// Denial share above which the limiter reports a warning
pub const DENIAL_RATE_WARNING: f64 = 0.5;
/// Budget utilization above which the ledger reports a warning
pub const BUDGET_UTILIZATION_WARNING: f64 = 0.9;
/// Failure share above which a backend is flagged
pub const BACKEND_FAILURE_WARNING: f64 = 0.5;
/// Attempts needed before a backend's failure share is judged
const MIN_BACKEND_ATTEMPTS: u64 = 5;

pub(super) fn rate_limiter(limiter: &RateLimiter) -> ComponentHealth {
    let stats = limiter.stats();
    let decisions = stats.allowed_total + stats.denied_total;
    let denial_rate = if decisions == 0 {
        0.0
    } else {
        stats.denied_total as f64 / decisions as f64
    };

    let warning = (denial_rate > DENIAL_RATE_WARNING)
        .then(|| format!("{:.0}% of requests denied", denial_rate * 100.0));

    ComponentHealth::new("rate_limiter")
        .metric("tracked_tenants", stats.tracked_tenants as f64)
        .metric("blocked_tenants", stats.blocked_tenants as f64)
        .metric("allowed_total", stats.allowed_total as f64)
        .metric("denied_total", stats.denied_total as f64)
        .metric("denial_rate", denial_rate)
        .metric("evicted_total", stats.evicted_total as f64)
        .verdict(warning, "Rate limiter operational")
}

pub(super) fn budget(ledger: &BudgetLedger) -> ComponentHealth {
    let status = ledger.status();
    let mut health = ComponentHealth::new("budget")
        .metric("daily_spend", status.daily_spend)
        .metric("monthly_spend", status.monthly_spend)
        .metric("tracked_tenants", status.tracked_tenants as f64);

    let mut warnings = Vec::new();
    for (period, utilization) in [
        ("daily", status.daily_utilization),
        ("monthly", status.monthly_utilization),
    ] {
        if let Some(utilization) = utilization {
            health = health.metric(&format!("{}_utilization", period), utilization);
            if utilization >= BUDGET_UTILIZATION_WARNING {
                warnings.push(format!(
                    "{} budget at {:.0}%",
                    period,
                    utilization * 100.0
                ));
            }
        }
    }

    let warning = (!warnings.is_empty()).then(|| warnings.join(", "));
    health.verdict(warning, "Spend within budget")
}

pub(super) fn quality(gate: &QualityGate) -> ComponentHealth {
    let metrics = gate.all_metrics();
    let assessed: u64 = metrics.values().map(|m| m.count).sum();
    let below: u64 = metrics.values().map(|m| m.below_threshold).sum();

    let mut failing: Vec<&str> = metrics
        .iter()
        .filter(|(_, m)| m.count > 0 && m.ema < gate.min_score())
        .map(|(feature, _)| feature.as_str())
        .collect();
    failing.sort();

    let warning = (!failing.is_empty()).then(|| {
        format!(
            "Average quality below {:.2} for: {}",
            gate.min_score(),
            failing.join(", ")
        )
    });

    ComponentHealth::new("quality")
        .metric("features", metrics.len() as f64)
        .metric("assessments", assessed as f64)
        .metric(
            "below_threshold_rate",
            if assessed == 0 {
                0.0
            } else {
                below as f64 / assessed as f64
            },
        )
        .verdict(warning, "Quality gate operational")
}

pub(super) fn alerts(manager: &AlertManager) -> ComponentHealth {
    let stats = manager.stats();
    let active = manager.active_alerts();
    let severe = active
        .iter()
        .filter(|a| a.severity >= AlertSeverity::Critical)
        .count();

    let warning = if severe > 0 {
        Some(format!("{} critical alert(s) active", severe))
    } else if stats.dropped_notifications > 0 {
        Some(format!(
            "{} notification(s) dropped",
            stats.dropped_notifications
        ))
    } else {
        None
    };

    ComponentHealth::new("alerts")
        .metric("active_alerts", active.len() as f64)
        .metric("critical_alerts", severe as f64)
        .metric("total_alerts", stats.total_alerts as f64)
        .metric("failed_notifications", stats.failed_notifications as f64)
        .metric("dropped_notifications", stats.dropped_notifications as f64)
        .metric("queue_depth", manager.queue().len() as f64)
        .verdict(warning, "Alerting operational")
}

pub(super) fn generation(
    backends: &HashMap<String, BackendStats>,
    pipeline: &PipelineStatsSnapshot,
    error_rate_warning: f64,
) -> ComponentHealth {
    let mut flagged: Vec<&str> = backends
        .iter()
        .filter(|(_, s)| {
            s.attempts >= MIN_BACKEND_ATTEMPTS && s.failure_rate() > BACKEND_FAILURE_WARNING
        })
        .map(|(name, _)| name.as_str())
        .collect();
    flagged.sort();

    let error_rate = pipeline.error_rate();
    let warning = if error_rate > error_rate_warning {
        Some(format!("Request error rate {:.1}%", error_rate * 100.0))
    } else if !flagged.is_empty() {
        Some(format!("Backends failing: {}", flagged.join(", ")))
    } else {
        None
    };

    let mut health = ComponentHealth::new("generation")
        .metric("requests", pipeline.requests as f64)
        .metric("error_rate", error_rate)
        .metric("fallbacks", pipeline.fallbacks as f64)
        .metric("local_syntheses", pipeline.local_syntheses as f64)
        .metric("avg_latency_ms", pipeline.avg_latency_ms());
    for (name, stats) in backends {
        health = health.metric(&format!("{}_failure_rate", name), stats.failure_rate());
    }
    health.verdict(warning, "Generation backends operational")
}
