//! Core rate limiter implementation

use super::types::{
    GlobalCounter, LimitTier, QuotaSnapshot, RateLimitDecision, TenantRegistry,
};
use super::windows::{WindowCounter, WindowKind, until};
use crate::config::RateLimitConfig;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Mutable limiter state, guarded by a single lock
#[derive(Debug)]
pub(super) struct LimiterState {
    pub(super) global: GlobalCounter,
    pub(super) registry: TenantRegistry,
    pub(super) allowed_total: u64,
    pub(super) denied_total: u64,
}

/// Multi-tier rate limiter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Rate limit configuration
    pub(super) config: RateLimitConfig,
    /// Global and per-tenant counters
    pub(super) state: Arc<Mutex<LimiterState>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(LimiterState {
                global: GlobalCounter::new(Utc::now()),
                registry: TenantRegistry::default(),
                allowed_total: 0,
                denied_total: 0,
            })),
        }
    }

    /// Check if rate limiting is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Atomically check every tier and count the request if allowed
    ///
    /// Tiers are evaluated in order: block, global second/minute/hour/day,
    /// tenant minute/hour/day, monthly quota. The first violation wins and
    /// nothing is counted.
    pub fn check(&self, tenant_id: &str) -> RateLimitDecision {
        self.check_at(tenant_id, Utc::now())
    }

    /// [`check`](Self::check) against an explicit clock
    pub fn check_at(&self, tenant_id: &str, now: DateTime<Utc>) -> RateLimitDecision {
        if !self.config.enabled {
            return RateLimitDecision::Allowed;
        }

        let mut guard = self.state.lock();
        let state = &mut *guard;
        let tracked = state.registry.tenants.len();
        let Some(tenant) = state.registry.get_or_insert(
            tenant_id,
            now,
            &self.config.tenant,
            self.config.max_tenants,
        ) else {
            state.denied_total += 1;
            warn!(
                tenant = tenant_id,
                tracked,
                max_tenants = self.config.max_tenants,
                "Request denied: tenant registry full"
            );
            let minute = WindowKind::Minute.truncate(now);
            return RateLimitDecision::Denied {
                tier: LimitTier::Capacity,
                reason: format!("tenant registry full ({} tenants tracked)", tracked),
                current: tracked as u64,
                limit: self.config.max_tenants as u64,
                retry_after: until(WindowKind::Minute.next_boundary(minute), now)
                    .max(Duration::from_secs(1)),
            };
        };
        tenant.roll(now);

        if let Some(blocked_until) = tenant.active_block(now) {
            let reason = tenant
                .block_reason
                .clone()
                .unwrap_or_else(|| "tenant is blocked".to_string());
            state.denied_total += 1;
            debug!(tenant = tenant_id, %reason, "Request denied: tenant blocked");
            return RateLimitDecision::Denied {
                tier: LimitTier::Blocked,
                reason,
                current: 0,
                limit: 0,
                retry_after: until(blocked_until, now).max(Duration::from_secs(1)),
            };
        }

        state.global.roll(now);
        let global = &self.config.global;
        let limits = &self.config.tenant;

        let tiers: [(LimitTier, &WindowCounter, u64); 7] = [
            (LimitTier::GlobalSecond, &state.global.second, global.per_second.into()),
            (LimitTier::GlobalMinute, &state.global.minute, global.per_minute.into()),
            (LimitTier::GlobalHour, &state.global.hour, global.per_hour.into()),
            (LimitTier::GlobalDay, &state.global.day, global.per_day.into()),
            (LimitTier::TenantMinute, &tenant.minute, limits.per_minute.into()),
            (LimitTier::TenantHour, &tenant.hour, limits.per_hour.into()),
            (LimitTier::TenantDay, &tenant.day, limits.per_day.into()),
        ];

        let violation = tiers
            .iter()
            .chain(std::iter::once(&(
                LimitTier::Quota,
                &tenant.quota,
                limits.monthly_quota,
            )))
            .find(|(_, counter, limit)| counter.would_exceed(*limit))
            .map(|(tier, counter, limit)| (*tier, counter.count, *limit, counter.retry_after(now)));

        if let Some((tier, current, limit, retry_after)) = violation {
            state.denied_total += 1;
            let reason = match tier {
                LimitTier::Quota => format!("monthly quota of {} units exhausted", limit),
                _ => format!(
                    "{} of {} requests used in the current {} window",
                    current,
                    limit,
                    window_name(tier)
                ),
            };
            debug!(tenant = tenant_id, tier = %tier, current, limit, "Rate limit exceeded");
            return RateLimitDecision::Denied {
                tier,
                reason,
                current,
                limit,
                retry_after,
            };
        }

        for counter in [
            &mut state.global.second,
            &mut state.global.minute,
            &mut state.global.hour,
            &mut state.global.day,
            &mut tenant.minute,
            &mut tenant.hour,
            &mut tenant.day,
            &mut tenant.quota,
        ] {
            counter.count += 1;
        }
        state.allowed_total += 1;

        RateLimitDecision::Allowed
    }

    /// Charge `amount` units against the tenant's monthly quota
    ///
    /// The units are always recorded; the snapshot reports whether the
    /// quota is now exhausted.
    pub fn consume_quota(&self, tenant_id: &str, amount: u64) -> QuotaSnapshot {
        self.consume_quota_at(tenant_id, amount, Utc::now())
    }

    pub fn consume_quota_at(
        &self,
        tenant_id: &str,
        amount: u64,
        now: DateTime<Utc>,
    ) -> QuotaSnapshot {
        let mut state = self.state.lock();
        let tenant = state.registry.get_or_track(
            tenant_id,
            now,
            &self.config.tenant,
            self.config.max_tenants,
        );
        tenant.quota.roll(now);
        tenant.quota.count = tenant.quota.count.saturating_add(amount);

        let snapshot = quota_snapshot(&tenant.quota, self.config.tenant.monthly_quota);
        if snapshot.exceeded {
            warn!(
                tenant = tenant_id,
                used = snapshot.used,
                quota = snapshot.quota,
                "Monthly quota exhausted"
            );
        }
        snapshot
    }

    /// Block a tenant for `duration`, bypassing window logic
    pub fn block_tenant(&self, tenant_id: &str, duration: Duration, reason: impl Into<String>) {
        self.block_tenant_at(tenant_id, duration, reason, Utc::now())
    }

    pub fn block_tenant_at(
        &self,
        tenant_id: &str,
        duration: Duration,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        let reason = reason.into();
        let blocked_until = chrono::Duration::from_std(duration)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut state = self.state.lock();
        let tenant = state.registry.get_or_track(
            tenant_id,
            now,
            &self.config.tenant,
            self.config.max_tenants,
        );
        tenant.blocked_until = Some(blocked_until);
        tenant.block_reason = Some(reason.clone());

        info!(tenant = tenant_id, until = %blocked_until, %reason, "Tenant blocked");
    }

    /// Clear a tenant's block; returns whether a block was present
    pub fn unblock_tenant(&self, tenant_id: &str) -> bool {
        let mut state = self.state.lock();
        let Some(tenant) = state.registry.tenants.get_mut(tenant_id) else {
            return false;
        };

        let was_blocked = tenant.blocked_until.take().is_some();
        tenant.block_reason = None;
        if was_blocked {
            info!(tenant = tenant_id, "Tenant unblocked");
        }
        was_blocked
    }
}

fn window_name(tier: LimitTier) -> &'static str {
    match tier {
        LimitTier::GlobalSecond => "second",
        LimitTier::GlobalMinute | LimitTier::TenantMinute => "minute",
        LimitTier::GlobalHour | LimitTier::TenantHour => "hour",
        LimitTier::GlobalDay | LimitTier::TenantDay => "day",
        LimitTier::Quota => "month",
        LimitTier::Blocked => "block",
        LimitTier::Capacity => "registry",
    }
}

pub(super) fn quota_snapshot(counter: &WindowCounter, quota: u64) -> QuotaSnapshot {
    QuotaSnapshot {
        used: counter.count,
        quota,
        remaining: (quota > 0).then(|| quota.saturating_sub(counter.count)),
        exceeded: quota > 0 && counter.count >= quota,
        resets_at: counter.resets_at(),
    }
}
