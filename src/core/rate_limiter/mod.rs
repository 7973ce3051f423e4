//! Multi-tier rate limiting
//!
//! Fixed calendar windows per tenant (minute, hour, day) plus a monthly unit
//! quota, layered under global ceilings (second, minute, hour, day) shared by
//! all tenants. Check and increment happen in one critical section.

mod limiter;
mod types;
mod utils;
mod windows;


pub use limiter::RateLimiter;
pub use types::{
    LimitTier, LimiterStats, QuotaSnapshot, RateLimitDecision, TenantStatus, WindowUtilization,
};
pub use windows::WindowKind;
