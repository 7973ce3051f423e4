//! Budget ledger types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Budget reset period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPeriod {
    Daily,
    Monthly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Daily => "daily",
            BudgetPeriod::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of comparing running totals against the ceilings
#[derive(Debug, Clone, PartialEq)]
pub enum BudgetCheck {
    Ok,
    Exceeded {
        period: BudgetPeriod,
        spent: f64,
        limit: f64,
    },
}

impl BudgetCheck {
    pub fn is_ok(&self) -> bool {
        matches!(self, BudgetCheck::Ok)
    }
}

/// Priced request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEstimate {
    pub backend: String,
    pub feature: String,
    pub units: u64,
    pub input_units: f64,
    pub output_units: f64,
    /// Cost before the minimum charge and discounts
    pub base_cost: f64,
    /// Product of (1 - discount) over every applied break
    pub discount_multiplier: f64,
    /// Final charge
    pub cost: f64,
    pub minimum_applied: bool,
}

/// One unit of usage to record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub tenant_id: String,
    pub backend: String,
    pub feature: String,
    pub cost: f64,
    pub units: u64,
}

/// A ceiling crossed by current spend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdAlert {
    pub period: BudgetPeriod,
    /// Configured fraction, e.g. 0.9
    pub threshold: f64,
    pub spent: f64,
    pub limit: f64,
    /// spent / limit
    pub utilization: f64,
}

impl ThresholdAlert {
    /// Stable identity of the {period, threshold} combination
    pub fn key(&self) -> String {
        format!("budget:{}:{:.2}", self.period, self.threshold)
    }
}

/// Per-tenant running totals
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TenantSpend {
    pub daily_spend: f64,
    pub monthly_spend: f64,
    pub requests_today: u64,
    pub requests_this_month: u64,
    pub units_this_month: u64,
    /// Units since the tenant was first seen, used for volume discounts
    pub cumulative_units: u64,
    #[serde(skip)]
    pub(super) last_seen: Option<DateTime<Utc>>,
}

/// Cost aggregate
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostBucket {
    pub cost: f64,
    pub requests: u64,
    pub units: u64,
}

impl CostBucket {
    pub(super) fn add(&mut self, cost: f64, units: u64) {
        self.cost += cost;
        self.requests += 1;
        self.units += units;
    }
}

/// Current ledger totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub daily_spend: f64,
    pub monthly_spend: f64,
    pub daily_limit: Option<f64>,
    pub monthly_limit: Option<f64>,
    pub daily_utilization: Option<f64>,
    pub monthly_utilization: Option<f64>,
    pub last_daily_reset: DateTime<Utc>,
    pub last_monthly_reset: DateTime<Utc>,
    pub tracked_tenants: usize,
}

/// A tenant's share of monthly spend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantShare {
    pub tenant_id: String,
    pub spend: f64,
    /// Percentage of total monthly spend, 0-100
    pub percentage: f64,
    pub requests: u64,
    pub units: u64,
}

/// Naive linear spend projection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendProjection {
    pub daily_rate: f64,
    pub next_day: f64,
    pub next_week: f64,
    pub next_month: f64,
    pub confidence: f64,
}

/// Cost of one local calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCost {
    pub date: NaiveDate,
    pub cost: f64,
    pub requests: u64,
}

/// Spend breakdown report
#[derive(Debug, Clone, Serialize)]
pub struct SpendReport {
    pub generated_at: DateTime<Utc>,
    pub status: BudgetStatus,
    pub by_backend: Vec<(String, CostBucket)>,
    pub by_feature: Vec<(String, CostBucket)>,
    pub top_tenants: Vec<TenantShare>,
    pub projection: SpendProjection,
    pub daily_costs: Vec<DailyCost>,
}
