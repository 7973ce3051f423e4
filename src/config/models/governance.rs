//! Top-level governance configuration

use super::*;
use crate::utils::error::{GovernanceError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Prefix shared by all environment overrides
pub const ENV_PREFIX: &str = "GOVERNOR_";

/// Complete governance pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GovernanceConfig {
    #[serde(default)]
    pub backends: BackendsConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub alerting: AlertingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GovernanceConfig {
    /// Build configuration from defaults plus environment overrides
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let vars: HashMap<String, String> = std::env::vars()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect();

        let mut config = Self::default();
        config.apply_env(&vars)?;
        Ok(config)
    }

    /// Apply `GOVERNOR_*` overrides from the given variable map
    pub fn apply_env(&mut self, vars: &HashMap<String, String>) -> Result<()> {
        let get = |name: &str| vars.get(&format!("{}{}", ENV_PREFIX, name));

        if let Some(primary) = get("PRIMARY_BACKEND") {
            self.backends.primary = primary.trim().to_string();
        }
        if let Some(fallbacks) = get("FALLBACK_BACKENDS") {
            self.backends.fallbacks = fallbacks
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = get("BACKEND_TIMEOUT_SECS") {
            self.backends.timeout_secs = parse_var("BACKEND_TIMEOUT_SECS", v)?;
        }
        if let Some(v) = get("DAILY_BUDGET") {
            self.budget.daily_limit = parse_var("DAILY_BUDGET", v)?;
        }
        if let Some(v) = get("MONTHLY_BUDGET") {
            self.budget.monthly_limit = parse_var("MONTHLY_BUDGET", v)?;
        }
        if let Some(v) = get("ALERT_THRESHOLDS") {
            self.budget.alert_thresholds = v
                .split(',')
                .map(|part| parse_var("ALERT_THRESHOLDS", part.trim()))
                .collect::<Result<Vec<f64>>>()?;
        }
        if let Some(v) = get("RATE_LIMIT_ENABLED") {
            self.rate_limit.enabled = parse_var("RATE_LIMIT_ENABLED", v)?;
        }
        if let Some(v) = get("TENANT_PER_MINUTE") {
            self.rate_limit.tenant.per_minute = parse_var("TENANT_PER_MINUTE", v)?;
        }
        if let Some(v) = get("TENANT_PER_HOUR") {
            self.rate_limit.tenant.per_hour = parse_var("TENANT_PER_HOUR", v)?;
        }
        if let Some(v) = get("TENANT_PER_DAY") {
            self.rate_limit.tenant.per_day = parse_var("TENANT_PER_DAY", v)?;
        }
        if let Some(v) = get("MONTHLY_QUOTA") {
            self.rate_limit.tenant.monthly_quota = parse_var("MONTHLY_QUOTA", v)?;
        }
        if let Some(v) = get("QUALITY_ENABLED") {
            self.quality.enabled = parse_var("QUALITY_ENABLED", v)?;
        }
        if let Some(v) = get("MIN_QUALITY") {
            self.quality.min_score = parse_var("MIN_QUALITY", v)?;
        }
        if let Some(v) = get("CACHE_ENABLED") {
            self.cache.enabled = parse_var("CACHE_ENABLED", v)?;
        }
        if let Some(v) = get("CACHE_TTL_SECS") {
            self.cache.ttl_secs = parse_var("CACHE_TTL_SECS", v)?;
        }
        if let Some(v) = get("ALERTS_ENABLED") {
            self.alerting.enabled = parse_var("ALERTS_ENABLED", v)?;
        }
        if let Some(url) = get("SLACK_WEBHOOK") {
            let slack = self
                .alerting
                .channels
                .slack
                .get_or_insert_with(|| SlackChannelConfig {
                    webhook_url: String::new(),
                    channel: None,
                    username: None,
                    min_severity: crate::monitoring::types::AlertSeverity::Warning,
                });
            slack.webhook_url = url.trim().to_string();
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.logging.level = level.trim().to_string();
        }
        if let Some(v) = get("LOG_JSON") {
            self.logging.json = parse_var("LOG_JSON", v)?;
        }

        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        GovernanceError::config(format!(
            "Invalid value '{}' for {}{}",
            value, ENV_PREFIX, name
        ))
    })
}
