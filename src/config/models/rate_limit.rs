//! Rate limiting configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Rate limiting configuration
///
/// Every ceiling treats 0 as unlimited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// System-wide ceilings shared by all tenants
    #[serde(default)]
    pub global: GlobalLimits,
    /// Per-tenant ceilings
    #[serde(default)]
    pub tenant: TenantLimits,
    /// Utilization fraction above which a tenant is reported as approaching a limit
    #[serde(default = "default_approaching_threshold")]
    pub approaching_threshold: f64,
    /// Maximum number of tenants tracked at once
    #[serde(default = "default_max_tenants")]
    pub max_tenants: usize,
    /// Idle time after which an unblocked tenant's counters are reclaimed
    #[serde(default = "default_idle_ttl")]
    pub idle_ttl_secs: u64,
    /// Interval of the background eviction task
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            global: GlobalLimits::default(),
            tenant: TenantLimits::default(),
            approaching_threshold: default_approaching_threshold(),
            max_tenants: default_max_tenants(),
            idle_ttl_secs: default_idle_ttl(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

/// Global request ceilings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GlobalLimits {
    #[serde(default)]
    pub per_second: u32,
    #[serde(default)]
    pub per_minute: u32,
    #[serde(default)]
    pub per_hour: u32,
    #[serde(default)]
    pub per_day: u32,
}

/// Per-tenant request ceilings and monthly unit quota
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TenantLimits {
    #[serde(default = "default_tenant_per_minute")]
    pub per_minute: u32,
    #[serde(default = "default_tenant_per_hour")]
    pub per_hour: u32,
    #[serde(default = "default_tenant_per_day")]
    pub per_day: u32,
    /// Units a tenant may consume per calendar month
    #[serde(default)]
    pub monthly_quota: u64,
}

impl Default for TenantLimits {
    fn default() -> Self {
        Self {
            per_minute: default_tenant_per_minute(),
            per_hour: default_tenant_per_hour(),
            per_day: default_tenant_per_day(),
            monthly_quota: 0,
        }
    }
}

fn default_tenant_per_minute() -> u32 {
    60
}

fn default_tenant_per_hour() -> u32 {
    1000
}

fn default_tenant_per_day() -> u32 {
    10000
}

fn default_approaching_threshold() -> f64 {
    0.8
}

fn default_max_tenants() -> usize {
    100_000
}

fn default_idle_ttl() -> u64 {
    35 * 24 * 3600
}

fn default_cleanup_interval() -> u64 {
    300
}
