//! Threshold producers wrapping `raise`

use super::manager::AlertManager;
use super::types::alert_types;
use crate::core::budget::ThresholdAlert;
use crate::core::rate_limiter::LimitTier;
use crate::monitoring::types::{Alert, AlertSeverity};
use serde::Serialize;
use serde_json::json;

/// Share of the minimum quality below which a quality alert is critical
pub const QUALITY_CRITICAL_RATIO: f64 = 0.7;

/// Pipeline-wide health numbers fed to the system producer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SystemSnapshot {
    /// Failed requests over total requests
    pub error_rate: f64,
    pub avg_latency_ms: f64,
    pub total_requests: u64,
}

impl AlertManager {
    /// One alert per breached {period, threshold}, not re-raised while active
    pub fn check_cost_thresholds(&self, breaches: &[ThresholdAlert]) -> Vec<Alert> {
        if !self.config.enabled {
            return Vec::new();
        }

        breaches
            .iter()
            .filter_map(|breach| {
                let severity = if breach.threshold >= 1.0 {
                    AlertSeverity::Critical
                } else if breach.threshold >= 0.9 {
                    AlertSeverity::Warning
                } else {
                    AlertSeverity::Info
                };
                self.raise_unless_active(
                    alert_types::COST_THRESHOLD,
                    severity,
                    format!(
                        "{} budget {:.0}% threshold reached",
                        capitalize(&breach.period.to_string()),
                        breach.threshold * 100.0
                    ),
                    format!(
                        "Spent {:.4} of {:.4} ({:.1}% of the {} budget)",
                        breach.spent,
                        breach.limit,
                        breach.utilization * 100.0,
                        breach.period
                    ),
                    &breach.key(),
                    json!({
                        "period": breach.period,
                        "threshold": breach.threshold,
                        "spent": breach.spent,
                        "limit": breach.limit,
                        "utilization": breach.utilization,
                    }),
                )
            })
            .collect()
    }

    /// Alert when a feature's score falls below the minimum
    pub fn check_quality(&self, feature: &str, score: f64, min_score: f64) -> Option<Alert> {
        if !self.config.enabled || score >= min_score {
            return None;
        }

        let severity = if score < QUALITY_CRITICAL_RATIO * min_score {
            AlertSeverity::Critical
        } else {
            AlertSeverity::Warning
        };
        Some(self.raise(
            alert_types::QUALITY_THRESHOLD,
            severity,
            format!("Low quality output for {}", feature),
            format!("Quality score {:.2} is below the minimum {:.2}", score, min_score),
            "quality_gate",
            json!({
                "feature": feature,
                "score": score,
                "min_score": min_score,
            }),
        ))
    }

    /// Alert on a rate-limit denial
    pub fn check_rate_limit_violation(
        &self,
        tenant_id: &str,
        tier: LimitTier,
        current: u64,
        limit: u64,
    ) -> Option<Alert> {
        if !self.config.enabled {
            return None;
        }

        let severity = if current >= limit || tier == LimitTier::Quota {
            AlertSeverity::Critical
        } else {
            AlertSeverity::Warning
        };
        Some(self.raise(
            alert_types::RATE_LIMIT_VIOLATION,
            severity,
            format!("Rate limit violation ({})", tier),
            format!(
                "Tenant {} hit the {} limit: {} of {}",
                tenant_id, tier, current, limit
            ),
            "rate_limiter",
            json!({
                "tenant_id": tenant_id,
                "tier": tier,
                "current": current,
                "limit": limit,
            }),
        ))
    }

    /// Error-rate and latency alerts, each deduplicated while active
    pub fn check_system(&self, snapshot: &SystemSnapshot) -> Vec<Alert> {
        if !self.config.enabled {
            return Vec::new();
        }
        let thresholds = self.config.system.clone();
        let mut raised = Vec::new();

        let error_severity = if snapshot.error_rate > thresholds.error_rate_critical {
            Some(AlertSeverity::Critical)
        } else if snapshot.error_rate > thresholds.error_rate_warning {
            Some(AlertSeverity::Warning)
        } else {
            None
        };
        if let Some(severity) = error_severity {
            raised.extend(self.raise_unless_active(
                alert_types::SYSTEM_ERROR_RATE,
                severity,
                "High error rate",
                format!(
                    "Error rate {:.1}% over {} requests",
                    snapshot.error_rate * 100.0,
                    snapshot.total_requests
                ),
                "pipeline",
                json!({ "error_rate": snapshot.error_rate, "total_requests": snapshot.total_requests }),
            ));
        }

        let latency_severity = if snapshot.avg_latency_ms > thresholds.latency_critical_ms as f64 {
            Some(AlertSeverity::Critical)
        } else if snapshot.avg_latency_ms > thresholds.latency_warning_ms as f64 {
            Some(AlertSeverity::Warning)
        } else {
            None
        };
        if let Some(severity) = latency_severity {
            raised.extend(self.raise_unless_active(
                alert_types::SYSTEM_LATENCY,
                severity,
                "High generation latency",
                format!("Average latency {:.0}ms", snapshot.avg_latency_ms),
                "pipeline",
                json!({ "avg_latency_ms": snapshot.avg_latency_ms }),
            ));
        }
        raised
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
