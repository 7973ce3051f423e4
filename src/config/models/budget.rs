//! Budget and pricing configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Spend ceilings, alert thresholds and backend rate cards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Daily ceiling in currency minor units, 0 = unlimited
    #[serde(default)]
    pub daily_limit: u64,
    /// Monthly ceiling in currency minor units, 0 = unlimited
    #[serde(default)]
    pub monthly_limit: u64,
    /// Fractions of a ceiling at which threshold alerts are reported
    #[serde(default = "default_alert_thresholds")]
    pub alert_thresholds: Vec<f64>,
    /// Rate card per backend name
    #[serde(default)]
    pub rate_cards: HashMap<String, RateCard>,
    /// Rate card used for backends without an entry
    #[serde(default)]
    pub default_rate_card: RateCard,
    /// Maximum number of tenants tracked by the ledger
    #[serde(default = "default_max_tenants")]
    pub max_tenants: usize,
    /// Number of days kept in the daily cost table
    #[serde(default = "default_history_days")]
    pub history_days: usize,
    /// Number of tenants listed in spend reports
    #[serde(default = "default_top_tenants")]
    pub top_tenants: usize,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            daily_limit: 0,
            monthly_limit: 0,
            alert_thresholds: default_alert_thresholds(),
            rate_cards: HashMap::new(),
            default_rate_card: RateCard::default(),
            max_tenants: default_max_tenants(),
            history_days: default_history_days(),
            top_tenants: default_top_tenants(),
        }
    }
}

impl BudgetConfig {
    /// Daily ceiling in major currency units, `None` when unlimited
    pub fn daily_ceiling(&self) -> Option<f64> {
        minor_to_major(self.daily_limit)
    }

    /// Monthly ceiling in major currency units, `None` when unlimited
    pub fn monthly_ceiling(&self) -> Option<f64> {
        minor_to_major(self.monthly_limit)
    }
}

fn minor_to_major(minor: u64) -> Option<f64> {
    (minor > 0).then(|| minor as f64 / 100.0)
}

/// Pricing of one backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateCard {
    /// Cost per 1000 input units
    #[serde(default)]
    pub input_cost_per_1k: f64,
    /// Cost per 1000 output units
    #[serde(default)]
    pub output_cost_per_1k: f64,
    /// Flat cost added to every request
    #[serde(default)]
    pub fixed_per_request: f64,
    /// Floor applied to every estimate
    #[serde(default)]
    pub minimum_charge: f64,
    /// Volume discount breaks, evaluated against cumulative tenant units
    #[serde(default)]
    pub volume_discounts: Vec<VolumeDiscount>,
}

impl Default for RateCard {
    fn default() -> Self {
        Self {
            input_cost_per_1k: 0.002,
            output_cost_per_1k: 0.004,
            fixed_per_request: 0.0,
            minimum_charge: 0.001,
            volume_discounts: Vec::new(),
        }
    }
}

/// A (threshold, discount) volume break
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VolumeDiscount {
    /// Cumulative units at which the break applies
    pub threshold_units: u64,
    /// Fraction taken off the price, in [0, 1)
    pub discount: f64,
}

fn default_alert_thresholds() -> Vec<f64> {
    vec![0.7, 0.9, 1.0]
}

fn default_max_tenants() -> usize {
    100_000
}

fn default_history_days() -> usize {
    30
}

fn default_top_tenants() -> usize {
    10
}
