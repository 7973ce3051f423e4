//! Notification channel implementations

use crate::config::{AlertingConfig, SlackChannelConfig, WebhookChannelConfig};
use crate::monitoring::types::{Alert, AlertSeverity};
use crate::utils::error::{GovernanceError, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook payload signature
pub const SIGNATURE_HEADER: &str = "X-Governor-Signature";

const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Notification channel trait
#[async_trait::async_trait]
pub trait NotificationChannel: Send + Sync + std::fmt::Debug {
    /// Send a notification
    async fn send(&self, alert: &Alert) -> Result<()>;

    /// Get channel name
    fn name(&self) -> &str;

    /// Check if channel supports severity level
    fn supports_severity(&self, severity: AlertSeverity) -> bool;
}

/// Build every channel enabled in config
pub fn build_channels(config: &AlertingConfig) -> Result<Vec<Arc<dyn NotificationChannel>>> {
    let mut channels: Vec<Arc<dyn NotificationChannel>> = Vec::new();
    let client = reqwest::Client::builder()
        .timeout(NOTIFICATION_TIMEOUT)
        .build()?;

    if config.channels.log.enabled {
        channels.push(Arc::new(LogChannel::new(config.channels.log.min_severity)));
    }
    if let Some(slack) = &config.channels.slack {
        channels.push(Arc::new(SlackChannel::new(client.clone(), slack.clone())));
    }
    for webhook in &config.channels.webhooks {
        channels.push(Arc::new(WebhookChannel::new(client.clone(), webhook.clone())));
    }
    Ok(channels)
}

/// Writes alerts to the tracing log
#[derive(Debug)]
pub struct LogChannel {
    min_severity: AlertSeverity,
}

impl LogChannel {
    pub fn new(min_severity: AlertSeverity) -> Self {
        Self { min_severity }
    }
}

#[async_trait::async_trait]
impl NotificationChannel for LogChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
        match alert.severity {
            AlertSeverity::Info | AlertSeverity::Warning => info!(
                alert_id = %alert.id,
                alert_type = %alert.alert_type,
                severity = %alert.severity,
                source = %alert.source,
                "{}: {}",
                alert.title,
                alert.message
            ),
            AlertSeverity::Critical | AlertSeverity::Emergency => error!(
                alert_id = %alert.id,
                alert_type = %alert.alert_type,
                severity = %alert.severity,
                source = %alert.source,
                "{}: {}",
                alert.title,
                alert.message
            ),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }

    fn supports_severity(&self, severity: AlertSeverity) -> bool {
        severity >= self.min_severity
    }
}

/// Slack notification channel
#[derive(Debug)]
pub struct SlackChannel {
    client: reqwest::Client,
    config: SlackChannelConfig,
}

impl SlackChannel {
    pub fn new(client: reqwest::Client, config: SlackChannelConfig) -> Self {
        Self { client, config }
    }

    fn payload(&self, alert: &Alert) -> serde_json::Value {
        let color = match alert.severity {
            AlertSeverity::Info => "#36a64f",
            AlertSeverity::Warning => "#ff9500",
            AlertSeverity::Critical => "#ff0000",
            AlertSeverity::Emergency => "#8b0000",
        };

        serde_json::json!({
            "username": self.config.username.as_deref().unwrap_or("Governor Alert"),
            "channel": self.config.channel,
            "attachments": [{
                "color": color,
                "title": alert.title,
                "text": alert.message,
                "fields": [
                    {
                        "title": "Severity",
                        "value": alert.severity.to_string(),
                        "short": true
                    },
                    {
                        "title": "Type",
                        "value": alert.alert_type,
                        "short": true
                    },
                    {
                        "title": "Source",
                        "value": alert.source,
                        "short": true
                    },
                    {
                        "title": "Time",
                        "value": alert.triggered_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                        "short": true
                    }
                ],
                "footer": "Governance Gateway",
                "ts": alert.triggered_at.timestamp()
            }]
        })
    }
}

#[async_trait::async_trait]
impl NotificationChannel for SlackChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(&self.payload(alert))
            .send()
            .await
            .map_err(|e| {
                GovernanceError::alert(format!("Failed to send Slack notification: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(GovernanceError::alert(format!(
                "Slack webhook returned status: {}",
                response.status()
            )));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "slack"
    }

    fn supports_severity(&self, severity: AlertSeverity) -> bool {
        severity >= self.config.min_severity
    }
}

/// Generic JSON webhook, optionally signed with HMAC-SHA256
#[derive(Debug)]
pub struct WebhookChannel {
    client: reqwest::Client,
    config: WebhookChannelConfig,
}

impl WebhookChannel {
    pub fn new(client: reqwest::Client, config: WebhookChannelConfig) -> Self {
        Self { client, config }
    }
}

/// `sha256=<hex>` signature of `body`
pub fn sign_payload(body: &[u8], secret: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| GovernanceError::internal(format!("HMAC key error: {}", e)))?;
    mac.update(body);
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

#[async_trait::async_trait]
impl NotificationChannel for WebhookChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
        let body = serde_json::to_vec(&serde_json::json!({
            "event": "alert",
            "alert": alert,
        }))?;

        let mut request = self
            .client
            .post(&self.config.url)
            .header("Content-Type", "application/json")
            .header("User-Agent", "governance-gateway/0.1");
        for (key, value) in &self.config.headers {
            request = request.header(key, value);
        }
        if let Some(secret) = &self.config.secret {
            request = request.header(SIGNATURE_HEADER, sign_payload(&body, secret)?);
        }

        let response = request.body(body).send().await.map_err(|e| {
            GovernanceError::alert(format!(
                "Failed to send webhook '{}': {}",
                self.config.name, e
            ))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(webhook = %self.config.name, status = status.as_u16(), "Webhook rejected alert");
            return Err(GovernanceError::alert(format!(
                "Webhook '{}' returned status: {}",
                self.config.name, status
            )));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn supports_severity(&self, severity: AlertSeverity) -> bool {
        severity >= self.config.min_severity
    }
}
