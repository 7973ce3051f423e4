//! Status queries and tenant reclamation

use super::limiter::{RateLimiter, quota_snapshot};
use super::types::{LimiterStats, TenantCounter, TenantStatus, WindowUtilization};
use super::windows::WindowCounter;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

impl RateLimiter {
    /// Current utilization of every tenant window and the quota
    ///
    /// Advisory only: nothing is counted and nothing is denied.
    pub fn status(&self, tenant_id: &str) -> TenantStatus {
        self.status_at(tenant_id, Utc::now())
    }

    pub fn status_at(&self, tenant_id: &str, now: DateTime<Utc>) -> TenantStatus {
        let mut tenant = {
            let state = self.state.lock();
            state
                .registry
                .tenants
                .get(tenant_id)
                .cloned()
                .unwrap_or_else(|| TenantCounter::new(now))
        };
        tenant.roll(now);

        let limits = &self.config.tenant;
        let windows: Vec<WindowUtilization> = [
            (&tenant.minute, u64::from(limits.per_minute)),
            (&tenant.hour, u64::from(limits.per_hour)),
            (&tenant.day, u64::from(limits.per_day)),
        ]
        .into_iter()
        .map(|(counter, limit)| utilization(counter, limit))
        .collect();

        let quota = quota_snapshot(&tenant.quota, limits.monthly_quota);
        let threshold = self.config.approaching_threshold;
        let approaching_limit = windows.iter().any(|w| w.utilization > threshold)
            || tenant.quota.utilization(limits.monthly_quota) > threshold;

        let blocked = tenant.is_blocked(now);
        TenantStatus {
            tenant_id: tenant_id.to_string(),
            windows,
            quota,
            blocked,
            block_reason: blocked.then(|| tenant.block_reason.clone()).flatten(),
            blocked_until: blocked.then_some(tenant.blocked_until).flatten(),
            approaching_limit,
        }
    }

    /// Whether a check right now would pass, without counting it
    pub fn would_allow(&self, tenant_id: &str) -> bool {
        if !self.config.enabled {
            return true;
        }
        let status = self.status(tenant_id);
        !status.blocked
            && status
                .windows
                .iter()
                .all(|w| w.limit == 0 || w.count < w.limit)
            && !status.quota.exceeded
    }

    /// Limiter-wide counters
    pub fn stats(&self) -> LimiterStats {
        let now = Utc::now();
        let state = self.state.lock();
        LimiterStats {
            tracked_tenants: state.registry.tenants.len(),
            blocked_tenants: state
                .registry
                .tenants
                .values()
                .filter(|t| t.is_blocked(now))
                .count(),
            allowed_total: state.allowed_total,
            denied_total: state.denied_total,
            evicted_total: state.registry.evicted_total,
        }
    }

    /// Reclaim tenants idle longer than the configured TTL
    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Utc::now())
    }

    pub fn evict_idle_at(&self, now: DateTime<Utc>) -> usize {
        let ttl = chrono::Duration::seconds(self.config.idle_ttl_secs as i64);
        let evicted = self
            .state
            .lock()
            .registry
            .evict_idle(now, ttl, &self.config.tenant);
        if evicted > 0 {
            debug!(evicted, "Evicted idle tenants");
        }
        evicted
    }

    /// Start background eviction task
    pub fn start_cleanup_task(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        let period = Duration::from_secs(self.config.cleanup_interval_secs.max(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("Rate limiter cleanup task stopped");
                        break;
                    }
                    _ = interval.tick() => {
                        limiter.evict_idle();
                    }
                }
            }
        })
    }
}

fn utilization(counter: &WindowCounter, limit: u64) -> WindowUtilization {
    WindowUtilization {
        window: counter.kind,
        count: counter.count,
        limit,
        utilization: counter.utilization(limit),
        resets_at: counter.resets_at(),
    }
}
