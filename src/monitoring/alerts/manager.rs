//! Alert manager implementation

use super::channels::{NotificationChannel, build_channels};
use super::dispatch::NotificationQueue;
use super::types::{AlertStats, AlertStorage, SuppressionRule};
use crate::config::AlertingConfig;
use crate::monitoring::types::{Alert, AlertSeverity, NotificationAttempt};
use crate::utils::error::{GovernanceError, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Raises, deduplicates, suppresses and retires alerts
#[derive(Debug, Clone)]
pub struct AlertManager {
    pub(super) config: AlertingConfig,
    pub(super) storage: Arc<RwLock<AlertStorage>>,
    pub(super) queue: Arc<NotificationQueue>,
    pub(super) channels: Arc<Vec<Arc<dyn NotificationChannel>>>,
}

impl AlertManager {
    /// Create a manager with the channels enabled in config
    pub fn new(config: AlertingConfig) -> Result<Self> {
        let channels = build_channels(&config)?;
        Ok(Self::with_channels(config, channels))
    }

    /// Create a manager with explicit channels
    pub fn with_channels(
        config: AlertingConfig,
        channels: Vec<Arc<dyn NotificationChannel>>,
    ) -> Self {
        info!(channels = channels.len(), "Alert manager initialized");
        Self {
            queue: Arc::new(NotificationQueue::new(config.queue_capacity)),
            config,
            storage: Arc::new(RwLock::new(AlertStorage::default())),
            channels: Arc::new(channels),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &AlertingConfig {
        &self.config
    }

    pub fn queue(&self) -> &NotificationQueue {
        &self.queue
    }

    /// Raise an alert
    ///
    /// A matching suppression rule keeps it out of the active set and skips
    /// notification; it is still recorded in history.
    pub fn raise(
        &self,
        alert_type: &str,
        severity: AlertSeverity,
        title: impl Into<String>,
        message: impl Into<String>,
        source: &str,
        metadata: serde_json::Value,
    ) -> Alert {
        let mut alert = Alert::new(alert_type, severity, title, message, source, metadata);
        self.admit(&mut self.storage.write(), &mut alert);
        self.dispatch(&alert);
        alert
    }

    /// Raise unless an alert of the same type and source is already active
    pub fn raise_unless_active(
        &self,
        alert_type: &str,
        severity: AlertSeverity,
        title: impl Into<String>,
        message: impl Into<String>,
        source: &str,
        metadata: serde_json::Value,
    ) -> Option<Alert> {
        let mut alert = Alert::new(alert_type, severity, title, message, source, metadata);
        {
            let mut storage = self.storage.write();
            if storage.find_active(alert_type, source).is_some() {
                debug!(
                    alert_type = %alert_type,
                    source = %source,
                    "Alert already active, not raising again"
                );
                return None;
            }
            self.admit(&mut storage, &mut alert);
        }
        self.dispatch(&alert);
        Some(alert)
    }

    /// Apply suppression, update stats and store; caller holds the lock
    fn admit(&self, storage: &mut AlertStorage, alert: &mut Alert) {
        let now = alert.triggered_at;
        alert.suppressed = storage
            .suppressions
            .iter()
            .any(|rule| rule.matches(&alert.alert_type, now));
        alert.active = !alert.suppressed;

        let stats = &mut storage.stats;
        stats.total_alerts += 1;
        *stats
            .alerts_by_severity
            .entry(alert.severity.as_str().to_string())
            .or_insert(0) += 1;
        *stats
            .alerts_by_source
            .entry(alert.source.clone())
            .or_insert(0) += 1;
        stats.last_alert = Some(now);
        if alert.suppressed {
            stats.suppressed_alerts += 1;
        }

        if alert.active {
            storage.active.insert(alert.id.clone(), alert.clone());
        }
        storage.history.push_back(alert.clone());
        if let Some(limit) = self.config.history_limit {
            while storage.history.len() > limit {
                storage.history.pop_front();
            }
        }
    }

    fn dispatch(&self, alert: &Alert) {
        if alert.suppressed {
            info!(
                alert_id = %alert.id,
                alert_type = %alert.alert_type,
                "Alert suppressed: {}",
                alert.title
            );
            return;
        }
        debug!("Raised alert: {} - {}", alert.severity, alert.title);
        if self.config.enabled {
            self.queue.push(alert.clone());
        }
    }

    /// Remove an alert from the active set and stamp its resolution
    pub fn resolve(&self, id: &str, actor: &str) -> Result<Alert> {
        self.resolve_at(id, actor, Utc::now())
    }

    pub(super) fn resolve_at(&self, id: &str, actor: &str, now: DateTime<Utc>) -> Result<Alert> {
        let mut storage = self.storage.write();
        let mut alert = storage
            .active
            .remove(id)
            .ok_or_else(|| GovernanceError::not_found(format!("active alert {}", id)))?;

        alert.active = false;
        alert.resolved_at = Some(now);
        alert.resolved_by = Some(actor.to_string());
        if let Some(entry) = storage.history_entry_mut(id) {
            *entry = alert.clone();
        }
        storage.stats.resolved_alerts += 1;

        info!(alert_id = %id, actor = %actor, "Alert resolved");
        Ok(alert)
    }

    /// Stamp an acknowledgement without removing the alert
    pub fn acknowledge(&self, id: &str, actor: &str) -> Result<Alert> {
        let now = Utc::now();
        let mut storage = self.storage.write();
        let alert = storage
            .active
            .get_mut(id)
            .ok_or_else(|| GovernanceError::not_found(format!("active alert {}", id)))?;

        alert.acknowledged_at = Some(now);
        alert.acknowledged_by = Some(actor.to_string());
        let alert = alert.clone();
        if let Some(entry) = storage.history_entry_mut(id) {
            *entry = alert.clone();
        }

        info!(alert_id = %id, actor = %actor, "Alert acknowledged");
        Ok(alert)
    }

    pub(super) fn record_notifications(&self, id: &str, attempts: Vec<NotificationAttempt>) {
        if attempts.is_empty() {
            return;
        }
        let sent = attempts.iter().filter(|a| a.success).count() as u64;
        let failed = attempts.len() as u64 - sent;

        let mut storage = self.storage.write();
        storage.stats.notifications_sent += sent;
        storage.stats.failed_notifications += failed;
        if let Some(alert) = storage.active.get_mut(id) {
            alert.notifications.extend(attempts.iter().cloned());
        }
        if let Some(alert) = storage.history_entry_mut(id) {
            alert.notifications.extend(attempts);
        }
    }

    /// Active alerts, newest first
    pub fn active_alerts(&self) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self.storage.read().active.values().cloned().collect();
        alerts.sort_by(|a, b| b.triggered_at.cmp(&a.triggered_at));
        alerts
    }

    /// Alert history, newest first
    pub fn history(&self, limit: Option<usize>) -> Vec<Alert> {
        let storage = self.storage.read();
        let limit = limit.unwrap_or(100);
        storage.history.iter().rev().take(limit).cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<Alert> {
        let storage = self.storage.read();
        storage
            .active
            .get(id)
            .cloned()
            .or_else(|| storage.history.iter().rev().find(|a| a.id == id).cloned())
    }

    pub fn find_active(&self, alert_type: &str, source: &str) -> Option<Alert> {
        self.storage.read().find_active(alert_type, source).cloned()
    }

    /// Add a suppression rule; returns its id
    pub fn add_suppression(&self, rule: SuppressionRule) -> String {
        info!(
            pattern = %rule.pattern,
            until = %rule.ends_at,
            "Adding suppression rule: {}",
            rule.reason
        );
        let id = rule.id.clone();
        self.storage.write().suppressions.push(rule);
        id
    }

    pub fn remove_suppression(&self, id: &str) -> bool {
        let mut storage = self.storage.write();
        let before = storage.suppressions.len();
        storage.suppressions.retain(|r| r.id != id);
        before != storage.suppressions.len()
    }

    /// Rules still in force or scheduled; expired ones are pruned
    pub fn suppressions(&self) -> Vec<SuppressionRule> {
        let now = Utc::now();
        let mut storage = self.storage.write();
        storage.suppressions.retain(|r| !r.is_expired(now));
        storage.suppressions.clone()
    }

    pub fn stats(&self) -> AlertStats {
        let mut stats = self.storage.read().stats.clone();
        stats.dropped_notifications = self.queue.dropped();
        stats
    }
}
