//! Spend ledger implementation

use super::pricing::PricingTable;
use super::types::{
    BudgetCheck, BudgetPeriod, BudgetStatus, CostBucket, CostEstimate, DailyCost, TenantSpend,
    ThresholdAlert, UsageRecord,
};
use crate::config::BudgetConfig;
use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, info};

/// Mutable ledger state, guarded by a single lock
#[derive(Debug)]
pub(super) struct LedgerState {
    pub(super) daily_spend: f64,
    pub(super) monthly_spend: f64,
    pub(super) requests_today: u64,
    /// Local calendar day the daily totals belong to
    pub(super) day: NaiveDate,
    /// First local day of the month the monthly totals belong to
    pub(super) month: NaiveDate,
    pub(super) last_daily_reset: DateTime<Utc>,
    pub(super) last_monthly_reset: DateTime<Utc>,
    pub(super) tenants: HashMap<String, TenantSpend>,
    pub(super) by_backend: HashMap<String, CostBucket>,
    pub(super) by_feature: HashMap<String, CostBucket>,
    /// Completed days, oldest first
    pub(super) daily_history: VecDeque<DailyCost>,
}

impl LedgerState {
    fn new(now: DateTime<Utc>) -> Self {
        let local = now.with_timezone(&Local).date_naive();
        Self {
            daily_spend: 0.0,
            monthly_spend: 0.0,
            requests_today: 0,
            day: local,
            month: first_of_month(local),
            last_daily_reset: now,
            last_monthly_reset: now,
            tenants: HashMap::new(),
            by_backend: HashMap::new(),
            by_feature: HashMap::new(),
            daily_history: VecDeque::new(),
        }
    }

    /// Reset daily and monthly totals once the local clock has crossed a boundary
    pub(super) fn roll(&mut self, now: DateTime<Utc>, history_days: usize) {
        let today = now.with_timezone(&Local).date_naive();

        if today != self.day {
            if today > self.day {
                self.daily_history.push_back(DailyCost {
                    date: self.day,
                    cost: self.daily_spend,
                    requests: self.requests_today,
                });
                while self.daily_history.len() > history_days {
                    self.daily_history.pop_front();
                }
            }

            debug!(previous = %self.day, spend = self.daily_spend, "Daily budget reset");
            self.daily_spend = 0.0;
            self.requests_today = 0;
            self.day = today;
            self.last_daily_reset = now;
            for tenant in self.tenants.values_mut() {
                tenant.daily_spend = 0.0;
                tenant.requests_today = 0;
            }
        }

        let month = first_of_month(today);
        if month != self.month {
            info!(previous = %self.month, spend = self.monthly_spend, "Monthly budget reset");
            self.monthly_spend = 0.0;
            self.month = month;
            self.last_monthly_reset = now;
            self.by_backend.clear();
            self.by_feature.clear();
            for tenant in self.tenants.values_mut() {
                tenant.monthly_spend = 0.0;
                tenant.requests_this_month = 0;
                tenant.units_this_month = 0;
            }
        }
    }

    fn check(&self, config: &BudgetConfig, pending: f64) -> BudgetCheck {
        let periods = [
            (BudgetPeriod::Daily, self.daily_spend, config.daily_ceiling()),
            (BudgetPeriod::Monthly, self.monthly_spend, config.monthly_ceiling()),
        ];

        for (period, spent, ceiling) in periods {
            let Some(limit) = ceiling else { continue };
            let exceeded = if pending > 0.0 {
                spent + pending > limit
            } else {
                spent >= limit
            };
            if exceeded {
                return BudgetCheck::Exceeded {
                    period,
                    spent,
                    limit,
                };
            }
        }
        BudgetCheck::Ok
    }

    fn record(&mut self, record: &UsageRecord, now: DateTime<Utc>, max_tenants: usize) {
        self.daily_spend += record.cost;
        self.monthly_spend += record.cost;
        self.requests_today += 1;

        self.by_backend
            .entry(record.backend.clone())
            .or_default()
            .add(record.cost, record.units);
        self.by_feature
            .entry(record.feature.clone())
            .or_default()
            .add(record.cost, record.units);

        if self.tenants.len() >= max_tenants && !self.tenants.contains_key(&record.tenant_id) {
            self.evict_least_recent_tenant();
        }
        let tenant = self.tenants.entry(record.tenant_id.clone()).or_default();
        tenant.daily_spend += record.cost;
        tenant.monthly_spend += record.cost;
        tenant.requests_today += 1;
        tenant.requests_this_month += 1;
        tenant.units_this_month += record.units;
        tenant.cumulative_units = tenant.cumulative_units.saturating_add(record.units);
        tenant.last_seen = Some(now);
    }

    fn evict_least_recent_tenant(&mut self) {
        let victim = self
            .tenants
            .iter()
            .min_by_key(|(_, spend)| spend.last_seen)
            .map(|(id, _)| id.clone());
        if let Some(id) = victim {
            self.tenants.remove(&id);
            debug!(tenant = %id, "Evicted tenant from budget ledger");
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Global and per-tenant spend ledger
#[derive(Debug, Clone)]
pub struct BudgetLedger {
    pub(super) config: BudgetConfig,
    pub(super) pricing: Arc<PricingTable>,
    pub(super) state: Arc<Mutex<LedgerState>>,
}

impl BudgetLedger {
    /// Create a new ledger
    pub fn new(config: BudgetConfig) -> Self {
        let pricing = PricingTable::new(
            config.rate_cards.clone(),
            config.default_rate_card.clone(),
        );
        Self {
            config,
            pricing: Arc::new(pricing),
            state: Arc::new(Mutex::new(LedgerState::new(Utc::now()))),
        }
    }

    pub fn config(&self) -> &BudgetConfig {
        &self.config
    }

    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    /// Price a request from the backend's rate card and the tenant's history
    pub fn estimate_cost(
        &self,
        backend: &str,
        feature: &str,
        tenant_id: &str,
        units: u64,
    ) -> CostEstimate {
        let cumulative = self
            .state
            .lock()
            .tenants
            .get(tenant_id)
            .map_or(0, |t| t.cumulative_units);
        self.pricing.estimate(backend, feature, units, cumulative)
    }

    /// Compare running totals against the ceilings; 0 ceilings never trip
    pub fn check_budget(&self) -> BudgetCheck {
        self.check_budget_at(Utc::now())
    }

    pub fn check_budget_at(&self, now: DateTime<Utc>) -> BudgetCheck {
        let mut state = self.state.lock();
        state.roll(now, self.config.history_days);
        state.check(&self.config, 0.0)
    }

    /// Add usage to the global and tenant totals
    pub fn record_usage(&self, record: &UsageRecord) {
        self.record_usage_at(record, Utc::now())
    }

    pub fn record_usage_at(&self, record: &UsageRecord, now: DateTime<Utc>) {
        let mut state = self.state.lock();
        state.roll(now, self.config.history_days);
        state.record(record, now, self.config.max_tenants);
        debug!(
            tenant = %record.tenant_id,
            backend = %record.backend,
            cost = record.cost,
            units = record.units,
            "Usage recorded"
        );
    }

    /// Record usage only if it fits under both ceilings, in one critical section
    pub fn check_and_record(&self, record: &UsageRecord) -> BudgetCheck {
        self.check_and_record_at(record, Utc::now())
    }

    pub fn check_and_record_at(&self, record: &UsageRecord, now: DateTime<Utc>) -> BudgetCheck {
        let mut state = self.state.lock();
        state.roll(now, self.config.history_days);
        let check = state.check(&self.config, record.cost);
        if check.is_ok() {
            state.record(record, now, self.config.max_tenants);
        }
        check
    }

    /// Every {threshold, period} combination whose share of the ceiling is reached
    ///
    /// Pure read: deduplication belongs to the alert engine.
    pub fn get_alerts(&self) -> Vec<ThresholdAlert> {
        self.get_alerts_at(Utc::now())
    }

    pub fn get_alerts_at(&self, now: DateTime<Utc>) -> Vec<ThresholdAlert> {
        let mut state = self.state.lock();
        state.roll(now, self.config.history_days);
        let periods = [
            (BudgetPeriod::Daily, state.daily_spend, self.config.daily_ceiling()),
            (BudgetPeriod::Monthly, state.monthly_spend, self.config.monthly_ceiling()),
        ];

        let mut alerts = Vec::new();
        for &threshold in &self.config.alert_thresholds {
            for (period, spent, ceiling) in periods {
                let Some(limit) = ceiling else { continue };
                if spent >= threshold * limit {
                    alerts.push(ThresholdAlert {
                        period,
                        threshold,
                        spent,
                        limit,
                        utilization: spent / limit,
                    });
                }
            }
        }
        alerts
    }

    /// Running totals for one tenant
    pub fn tenant_spend(&self, tenant_id: &str) -> Option<TenantSpend> {
        self.tenant_spend_at(tenant_id, Utc::now())
    }

    pub fn tenant_spend_at(&self, tenant_id: &str, now: DateTime<Utc>) -> Option<TenantSpend> {
        let mut state = self.state.lock();
        state.roll(now, self.config.history_days);
        state.tenants.get(tenant_id).cloned()
    }

    /// Current totals and utilization
    pub fn status(&self) -> BudgetStatus {
        self.status_at(Utc::now())
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> BudgetStatus {
        let mut state = self.state.lock();
        state.roll(now, self.config.history_days);
        let daily_limit = self.config.daily_ceiling();
        let monthly_limit = self.config.monthly_ceiling();
        BudgetStatus {
            daily_spend: state.daily_spend,
            monthly_spend: state.monthly_spend,
            daily_limit,
            monthly_limit,
            daily_utilization: daily_limit.map(|l| state.daily_spend / l),
            monthly_utilization: monthly_limit.map(|l| state.monthly_spend / l),
            last_daily_reset: state.last_daily_reset,
            last_monthly_reset: state.last_monthly_reset,
            tracked_tenants: state.tenants.len(),
        }
    }
}
