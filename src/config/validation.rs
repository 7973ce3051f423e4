//! Configuration validation

use crate::config::models::*;
use std::collections::HashSet;

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl Validate for BackendsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.primary.trim().is_empty() {
            return Err("Primary backend name cannot be empty".to_string());
        }

        let mut seen = HashSet::new();
        for name in self.chain() {
            if name == LOCAL_BACKEND {
                return Err(format!(
                    "Backend name '{}' is reserved for local synthesis",
                    LOCAL_BACKEND
                ));
            }
            if !seen.insert(name.clone()) {
                return Err(format!("Backend '{}' appears more than once", name));
            }
        }

        if self.timeout_secs == 0 {
            return Err("Backend timeout must be greater than 0".to_string());
        }

        if let Some((name, _)) = self.timeouts.iter().find(|(_, secs)| **secs == 0) {
            return Err(format!("Timeout for backend '{}' must be greater than 0", name));
        }

        if self.request_deadline_secs == 0 {
            return Err("Request deadline must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for RateLimitConfig {
    fn validate(&self) -> Result<(), String> {
        if !(self.approaching_threshold > 0.0 && self.approaching_threshold <= 1.0) {
            return Err("Approaching-limit threshold must be in (0, 1]".to_string());
        }

        if self.max_tenants == 0 {
            return Err("Maximum tracked tenants must be greater than 0".to_string());
        }

        if self.cleanup_interval_secs == 0 {
            return Err("Cleanup interval must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for RateCard {
    fn validate(&self) -> Result<(), String> {
        let prices = [
            ("input_cost_per_1k", self.input_cost_per_1k),
            ("output_cost_per_1k", self.output_cost_per_1k),
            ("fixed_per_request", self.fixed_per_request),
            ("minimum_charge", self.minimum_charge),
        ];
        for (field, value) in prices {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number", field));
            }
        }

        for discount in &self.volume_discounts {
            if !(0.0..1.0).contains(&discount.discount) {
                return Err(format!(
                    "Discount at {} units must be in [0, 1)",
                    discount.threshold_units
                ));
            }
        }

        Ok(())
    }
}

impl Validate for BudgetConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(t) = self
            .alert_thresholds
            .iter()
            .find(|t| !t.is_finite() || **t <= 0.0)
        {
            return Err(format!("Alert threshold {} must be greater than 0", t));
        }

        self.default_rate_card
            .validate()
            .map_err(|e| format!("default rate card: {}", e))?;

        for (backend, card) in &self.rate_cards {
            card.validate()
                .map_err(|e| format!("rate card '{}': {}", backend, e))?;
        }

        if self.max_tenants == 0 {
            return Err("Maximum tracked tenants must be greater than 0".to_string());
        }

        if self.history_days == 0 {
            return Err("History days must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for QualityConfig {
    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err("Minimum quality score must be between 0 and 1".to_string());
        }

        if self.weights.values().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("Quality weights must be non-negative".to_string());
        }

        if self.enabled && !self.weights.values().any(|w| *w > 0.0) {
            return Err("At least one quality weight must be positive".to_string());
        }

        if self.history_cap == 0 {
            return Err("Quality history cap must be greater than 0".to_string());
        }

        if !(self.ema_alpha > 0.0 && self.ema_alpha <= 1.0) {
            return Err("EMA alpha must be in (0, 1]".to_string());
        }

        Ok(())
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.ttl_secs == 0 {
            return Err("Cache TTL must be greater than 0".to_string());
        }

        if self.enabled && self.max_entries == 0 {
            return Err("Cache max entries must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for AlertingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.queue_capacity == 0 {
            return Err("Notification queue capacity must be greater than 0".to_string());
        }

        if let Some(slack) = &self.channels.slack {
            validate_http_url(&slack.webhook_url).map_err(|e| format!("slack: {}", e))?;
        }

        let mut names = HashSet::new();
        for webhook in &self.channels.webhooks {
            if webhook.name.trim().is_empty() {
                return Err("Webhook name cannot be empty".to_string());
            }
            if !names.insert(webhook.name.as_str()) {
                return Err(format!("Webhook '{}' is configured twice", webhook.name));
            }
            validate_http_url(&webhook.url)
                .map_err(|e| format!("webhook '{}': {}", webhook.name, e))?;
        }

        let system = &self.system;
        if system.error_rate_warning > system.error_rate_critical {
            return Err("Warning error rate must not exceed critical error rate".to_string());
        }
        if system.latency_warning_ms > system.latency_critical_ms {
            return Err("Warning latency must not exceed critical latency".to_string());
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        tracing_subscriber::EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| format!("invalid level '{}': {}", self.level, e))
    }
}

/// Check that a notification endpoint is an absolute http(s) URL
pub fn validate_http_url(raw: &str) -> Result<(), String> {
    let parsed = url::Url::parse(raw).map_err(|e| format!("invalid URL '{}': {}", raw, e))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported URL scheme '{}'", other)),
    }

    if parsed.host_str().is_none() {
        return Err(format!("URL '{}' has no host", raw));
    }

    Ok(())
}
