//! Budget ledger and cost estimation
//!
//! Tracks global and per-tenant spend against daily and monthly ceilings,
//! prices requests from backend rate cards, and produces spend reports.

mod ledger;
mod pricing;
mod reports;
mod types;


pub use crate::config::{RateCard, VolumeDiscount};
pub use ledger::BudgetLedger;
pub use pricing::{INPUT_SHARE, OUTPUT_SHARE, PricingTable};
pub use types::{
    BudgetCheck, BudgetPeriod, BudgetStatus, CostBucket, CostEstimate, DailyCost,
    SpendProjection, SpendReport, TenantShare, TenantSpend, ThresholdAlert, UsageRecord,
};
