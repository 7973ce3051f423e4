//! Alert types and data structures

use crate::monitoring::types::Alert;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Alert type names used by the built-in producers
pub mod alert_types {
    pub const COST_THRESHOLD: &str = "cost_threshold";
    pub const QUALITY_THRESHOLD: &str = "quality_threshold";
    pub const RATE_LIMIT_VIOLATION: &str = "rate_limit_violation";
    pub const SYSTEM_ERROR_RATE: &str = "system_error_rate";
    pub const SYSTEM_LATENCY: &str = "system_latency";
}

/// Pattern that matches every alert type
pub const WILDCARD: &str = "*";

/// Time-boxed rule keeping matching alerts out of the active set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuppressionRule {
    pub id: String,
    /// Exact alert type or `*`
    pub pattern: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub reason: String,
    pub active: bool,
}

impl SuppressionRule {
    /// Rule valid from now for `duration`
    pub fn new(
        pattern: impl Into<String>,
        duration: chrono::Duration,
        reason: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self::window(pattern, now, now + duration, reason)
    }

    /// Rule valid within `[starts_at, ends_at)`
    pub fn window(
        pattern: impl Into<String>,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            pattern: pattern.into(),
            starts_at,
            ends_at,
            reason: reason.into(),
            active: true,
        }
    }

    /// Whether this rule suppresses `alert_type` at `now`
    pub fn matches(&self, alert_type: &str, now: DateTime<Utc>) -> bool {
        self.active
            && self.starts_at <= now
            && now < self.ends_at
            && (self.pattern == WILDCARD || self.pattern == alert_type)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.ends_at
    }
}

/// Consolidated alert storage - single lock for related data
#[derive(Debug, Default)]
pub(super) struct AlertStorage {
    /// Active alerts by id
    pub active: HashMap<String, Alert>,
    /// Every alert ever raised, oldest first
    pub history: VecDeque<Alert>,
    pub suppressions: Vec<SuppressionRule>,
    pub stats: AlertStats,
}

impl AlertStorage {
    pub fn find_active(&self, alert_type: &str, source: &str) -> Option<&Alert> {
        self.active
            .values()
            .find(|a| a.alert_type == alert_type && a.source == source)
    }

    pub fn history_entry_mut(&mut self, id: &str) -> Option<&mut Alert> {
        self.history.iter_mut().rev().find(|a| a.id == id)
    }
}

/// Alert statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct AlertStats {
    /// Total alerts raised, suppressed ones included
    pub total_alerts: u64,
    pub suppressed_alerts: u64,
    pub resolved_alerts: u64,
    pub alerts_by_severity: HashMap<String, u64>,
    pub alerts_by_source: HashMap<String, u64>,
    pub notifications_sent: u64,
    pub failed_notifications: u64,
    /// Notifications discarded because the queue was full
    pub dropped_notifications: u64,
    pub last_alert: Option<DateTime<Utc>>,
}

/// Counts for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub total: u64,
    pub by_severity: BTreeMap<String, u64>,
}

/// Aggregate view over alert history
#[derive(Debug, Clone, Serialize)]
pub struct AlertSummary {
    pub total: u64,
    pub active: u64,
    pub by_type: BTreeMap<String, u64>,
    pub by_severity: BTreeMap<String, u64>,
    /// Last seven days, oldest first
    pub trend: Vec<TrendPoint>,
}
