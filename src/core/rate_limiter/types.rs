//! Rate limiter types and data structures

use super::windows::{WindowCounter, WindowKind};
use crate::config::TenantLimits;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// The limit that denied a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimitTier {
    #[serde(rename = "blocked")]
    Blocked,
    #[serde(rename = "global_second")]
    GlobalSecond,
    #[serde(rename = "global_minute")]
    GlobalMinute,
    #[serde(rename = "global_hour")]
    GlobalHour,
    #[serde(rename = "global_day")]
    GlobalDay,
    #[serde(rename = "minute")]
    TenantMinute,
    #[serde(rename = "hour")]
    TenantHour,
    #[serde(rename = "day")]
    TenantDay,
    #[serde(rename = "quota")]
    Quota,
    /// The tenant registry is full and no tenant can be reclaimed
    #[serde(rename = "capacity")]
    Capacity,
}

impl LimitTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitTier::Blocked => "blocked",
            LimitTier::GlobalSecond => "global_second",
            LimitTier::GlobalMinute => "global_minute",
            LimitTier::GlobalHour => "global_hour",
            LimitTier::GlobalDay => "global_day",
            LimitTier::TenantMinute => "minute",
            LimitTier::TenantHour => "hour",
            LimitTier::TenantDay => "day",
            LimitTier::Quota => "quota",
            LimitTier::Capacity => "capacity",
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(
            self,
            LimitTier::GlobalSecond
                | LimitTier::GlobalMinute
                | LimitTier::GlobalHour
                | LimitTier::GlobalDay
        )
    }
}

impl std::fmt::Display for LimitTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, PartialEq)]
pub enum RateLimitDecision {
    Allowed,
    Denied {
        tier: LimitTier,
        reason: String,
        /// Current count in the violated window (quota units for `Quota`)
        current: u64,
        /// Ceiling of the violated window, 0 for blocks
        limit: u64,
        retry_after: Duration,
    },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed)
    }

    pub fn tier(&self) -> Option<LimitTier> {
        match self {
            RateLimitDecision::Allowed => None,
            RateLimitDecision::Denied { tier, .. } => Some(*tier),
        }
    }
}

/// Monthly unit quota state after an update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotaSnapshot {
    pub used: u64,
    /// Configured quota, 0 = unlimited
    pub quota: u64,
    pub remaining: Option<u64>,
    pub exceeded: bool,
    pub resets_at: DateTime<Utc>,
}

/// Utilization of one window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowUtilization {
    pub window: WindowKind,
    pub count: u64,
    /// Configured ceiling, 0 = unlimited
    pub limit: u64,
    /// count / limit, 0 when unlimited
    pub utilization: f64,
    pub resets_at: DateTime<Utc>,
}

/// Advisory view of a tenant's limits
#[derive(Debug, Clone, Serialize)]
pub struct TenantStatus {
    pub tenant_id: String,
    pub windows: Vec<WindowUtilization>,
    pub quota: QuotaSnapshot,
    pub blocked: bool,
    pub block_reason: Option<String>,
    pub blocked_until: Option<DateTime<Utc>>,
    /// Any window or the quota is above the approaching-limit fraction
    pub approaching_limit: bool,
}

/// Limiter-wide counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LimiterStats {
    pub tracked_tenants: usize,
    pub blocked_tenants: usize,
    pub allowed_total: u64,
    pub denied_total: u64,
    pub evicted_total: u64,
}

/// Per-tenant counters
#[derive(Debug, Clone)]
pub(super) struct TenantCounter {
    pub(super) minute: WindowCounter,
    pub(super) hour: WindowCounter,
    pub(super) day: WindowCounter,
    pub(super) quota: WindowCounter,
    pub(super) blocked_until: Option<DateTime<Utc>>,
    pub(super) block_reason: Option<String>,
    pub(super) last_seen: DateTime<Utc>,
}

impl TenantCounter {
    pub(super) fn new(now: DateTime<Utc>) -> Self {
        Self {
            minute: WindowCounter::new(WindowKind::Minute, now),
            hour: WindowCounter::new(WindowKind::Hour, now),
            day: WindowCounter::new(WindowKind::Day, now),
            quota: WindowCounter::new(WindowKind::Month, now),
            blocked_until: None,
            block_reason: None,
            last_seen: now,
        }
    }

    pub(super) fn roll(&mut self, now: DateTime<Utc>) {
        self.minute.roll(now);
        self.hour.roll(now);
        self.day.roll(now);
        self.quota.roll(now);
    }

    /// Active block, clearing it first if it has expired
    pub(super) fn active_block(&mut self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.blocked_until {
            Some(until) if until > now => Some(until),
            Some(_) => {
                self.blocked_until = None;
                self.block_reason = None;
                None
            }
            None => None,
        }
    }

    pub(super) fn is_blocked(&self, now: DateTime<Utc>) -> bool {
        self.blocked_until.is_some_and(|until| until > now)
    }

    /// Whether dropping these counters loses no count that `limits` enforce
    pub(super) fn is_reclaimable(&mut self, now: DateTime<Utc>, limits: &TenantLimits) -> bool {
        if self.is_blocked(now) {
            return false;
        }
        self.roll(now);
        [
            (&self.minute, u64::from(limits.per_minute)),
            (&self.hour, u64::from(limits.per_hour)),
            (&self.day, u64::from(limits.per_day)),
            (&self.quota, limits.monthly_quota),
        ]
        .iter()
        .all(|(counter, limit)| *limit == 0 || counter.count == 0)
    }
}

/// System-wide counters
#[derive(Debug, Clone)]
pub(super) struct GlobalCounter {
    pub(super) second: WindowCounter,
    pub(super) minute: WindowCounter,
    pub(super) hour: WindowCounter,
    pub(super) day: WindowCounter,
}

impl GlobalCounter {
    pub(super) fn new(now: DateTime<Utc>) -> Self {
        Self {
            second: WindowCounter::new(WindowKind::Second, now),
            minute: WindowCounter::new(WindowKind::Minute, now),
            hour: WindowCounter::new(WindowKind::Hour, now),
            day: WindowCounter::new(WindowKind::Day, now),
        }
    }

    pub(super) fn roll(&mut self, now: DateTime<Utc>) {
        self.second.roll(now);
        self.minute.roll(now);
        self.hour.roll(now);
        self.day.roll(now);
    }
}

/// Bounded per-tenant counter map
#[derive(Debug, Default)]
pub(super) struct TenantRegistry {
    pub(super) tenants: HashMap<String, TenantCounter>,
    pub(super) evicted_total: u64,
}

impl TenantRegistry {
    /// Get or create a tenant's counters within capacity
    ///
    /// Returns `None` when the registry is full and every tracked tenant
    /// still holds live counts.
    pub(super) fn get_or_insert(
        &mut self,
        tenant_id: &str,
        now: DateTime<Utc>,
        limits: &TenantLimits,
        max_tenants: usize,
    ) -> Option<&mut TenantCounter> {
        if self.tenants.len() >= max_tenants
            && !self.tenants.contains_key(tenant_id)
            && !self.reclaim_one(now, limits)
        {
            return None;
        }
        Some(self.track(tenant_id, now))
    }

    /// Get or create a tenant's counters, exceeding capacity if nothing can be reclaimed
    pub(super) fn get_or_track(
        &mut self,
        tenant_id: &str,
        now: DateTime<Utc>,
        limits: &TenantLimits,
        max_tenants: usize,
    ) -> &mut TenantCounter {
        if self.tenants.len() >= max_tenants && !self.tenants.contains_key(tenant_id) {
            self.reclaim_one(now, limits);
        }
        self.track(tenant_id, now)
    }

    fn track(&mut self, tenant_id: &str, now: DateTime<Utc>) -> &mut TenantCounter {
        let tenant = self
            .tenants
            .entry(tenant_id.to_string())
            .or_insert_with(|| TenantCounter::new(now));
        tenant.last_seen = now;
        tenant
    }

    /// Evict the least recently seen reclaimable tenant
    fn reclaim_one(&mut self, now: DateTime<Utc>, limits: &TenantLimits) -> bool {
        let victim = self
            .tenants
            .iter_mut()
            .filter_map(|(id, counter)| {
                counter
                    .is_reclaimable(now, limits)
                    .then_some((id, counter.last_seen))
            })
            .min_by_key(|(_, last_seen)| *last_seen)
            .map(|(id, _)| id.clone());

        match victim {
            Some(id) => {
                self.tenants.remove(&id);
                self.evicted_total += 1;
                debug!(tenant = %id, "Evicted least recently seen tenant");
                true
            }
            None => false,
        }
    }

    /// Drop reclaimable tenants idle for longer than `ttl`
    pub(super) fn evict_idle(
        &mut self,
        now: DateTime<Utc>,
        ttl: chrono::Duration,
        limits: &TenantLimits,
    ) -> usize {
        let before = self.tenants.len();
        self.tenants.retain(|_, counter| {
            now - counter.last_seen <= ttl || !counter.is_reclaimable(now, limits)
        });
        let evicted = before - self.tenants.len();
        self.evicted_total += evicted as u64;
        evicted
    }
}
