//! Spend reporting

use super::ledger::BudgetLedger;
use super::types::{CostBucket, DailyCost, SpendProjection, SpendReport, TenantShare};
use chrono::{DateTime, Datelike, Local, Utc};
use std::collections::HashMap;

/// Stated confidence of the linear projection
pub const PROJECTION_CONFIDENCE: f64 = 0.75;

impl BudgetLedger {
    /// Breakdown by backend, feature and tenant with a naive projection
    pub fn report(&self) -> SpendReport {
        self.report_at(Utc::now())
    }

    pub fn report_at(&self, now: DateTime<Utc>) -> SpendReport {
        let status = self.status_at(now);
        let state = self.state.lock();

        let total = state.monthly_spend;
        let mut top_tenants: Vec<TenantShare> = state
            .tenants
            .iter()
            .map(|(id, spend)| TenantShare {
                tenant_id: id.clone(),
                spend: spend.monthly_spend,
                percentage: if total > 0.0 {
                    spend.monthly_spend / total * 100.0
                } else {
                    0.0
                },
                requests: spend.requests_this_month,
                units: spend.units_this_month,
            })
            .collect();
        top_tenants.sort_by(|a, b| {
            b.spend
                .total_cmp(&a.spend)
                .then_with(|| a.tenant_id.cmp(&b.tenant_id))
        });
        top_tenants.truncate(self.config.top_tenants);

        let day_of_month = now.with_timezone(&Local).day().max(1) as f64;
        let daily_rate = if state.daily_spend > 0.0 {
            state.daily_spend
        } else {
            state.monthly_spend / day_of_month
        };

        let mut daily_costs: Vec<DailyCost> = state.daily_history.iter().cloned().collect();
        daily_costs.push(DailyCost {
            date: state.day,
            cost: state.daily_spend,
            requests: state.requests_today,
        });

        SpendReport {
            generated_at: now,
            status,
            by_backend: sorted_buckets(&state.by_backend),
            by_feature: sorted_buckets(&state.by_feature),
            top_tenants,
            projection: project(daily_rate),
            daily_costs,
        }
    }
}

fn project(daily_rate: f64) -> SpendProjection {
    SpendProjection {
        daily_rate,
        next_day: daily_rate,
        next_week: daily_rate * 7.0,
        next_month: daily_rate * 30.0,
        confidence: PROJECTION_CONFIDENCE,
    }
}

fn sorted_buckets(buckets: &HashMap<String, CostBucket>) -> Vec<(String, CostBucket)> {
    let mut sorted: Vec<(String, CostBucket)> = buckets
        .iter()
        .map(|(name, bucket)| (name.clone(), bucket.clone()))
        .collect();
    sorted.sort_by(|a, b| b.1.cost.total_cmp(&a.1.cost).then_with(|| a.0.cmp(&b.0)));
    sorted
}
