//! Alerting configuration

use super::*;
use crate::monitoring::types::AlertSeverity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Alert engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertingConfig {
    /// Enable alert producers and notification dispatch
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Capacity of the notification queue; the oldest entry is dropped when full
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Optional cap on alert history, unbounded when absent
    #[serde(default)]
    pub history_limit: Option<usize>,
    /// Notification channels
    #[serde(default)]
    pub channels: ChannelsConfig,
    /// Thresholds of the system-metrics producer
    #[serde(default)]
    pub system: SystemThresholds,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            queue_capacity: default_queue_capacity(),
            history_limit: None,
            channels: ChannelsConfig::default(),
            system: SystemThresholds::default(),
        }
    }
}

/// Notification channel configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelsConfig {
    /// Write notifications to the tracing log
    #[serde(default)]
    pub log: LogChannelConfig,
    /// Slack incoming webhook
    #[serde(default)]
    pub slack: Option<SlackChannelConfig>,
    /// Generic JSON webhooks
    #[serde(default)]
    pub webhooks: Vec<WebhookChannelConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogChannelConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub min_severity: AlertSeverity,
}

impl Default for LogChannelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_severity: AlertSeverity::Info,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackChannelConfig {
    pub webhook_url: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default = "default_slack_severity")]
    pub min_severity: AlertSeverity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookChannelConfig {
    pub name: String,
    pub url: String,
    /// Shared secret used to sign the payload with HMAC-SHA256
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default = "default_webhook_severity")]
    pub min_severity: AlertSeverity,
}

/// Error-rate and latency thresholds for system alerts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemThresholds {
    #[serde(default = "default_error_rate_warning")]
    pub error_rate_warning: f64,
    #[serde(default = "default_error_rate_critical")]
    pub error_rate_critical: f64,
    #[serde(default = "default_latency_warning_ms")]
    pub latency_warning_ms: u64,
    #[serde(default = "default_latency_critical_ms")]
    pub latency_critical_ms: u64,
}

impl Default for SystemThresholds {
    fn default() -> Self {
        Self {
            error_rate_warning: default_error_rate_warning(),
            error_rate_critical: default_error_rate_critical(),
            latency_warning_ms: default_latency_warning_ms(),
            latency_critical_ms: default_latency_critical_ms(),
        }
    }
}

fn default_queue_capacity() -> usize {
    1000
}

fn default_slack_severity() -> AlertSeverity {
    AlertSeverity::Warning
}

fn default_webhook_severity() -> AlertSeverity {
    AlertSeverity::Info
}

fn default_error_rate_warning() -> f64 {
    0.05
}

fn default_error_rate_critical() -> f64 {
    0.15
}

fn default_latency_warning_ms() -> u64 {
    10_000
}

fn default_latency_critical_ms() -> u64 {
    30_000
}
