//! Rate card pricing

use super::types::CostEstimate;
use crate::config::{LOCAL_BACKEND, RateCard};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Share of total units priced at the input rate
pub const INPUT_SHARE: f64 = 0.7;
/// Share of total units priced at the output rate
pub const OUTPUT_SHARE: f64 = 0.3;

/// Rate cards by backend name
#[derive(Debug)]
pub struct PricingTable {
    cards: HashMap<String, RateCard>,
    default_card: RateCard,
    zero_card: RateCard,
    warned: Mutex<HashSet<String>>,
}

impl PricingTable {
    pub fn new(cards: HashMap<String, RateCard>, default_card: RateCard) -> Self {
        Self {
            cards,
            default_card,
            zero_card: RateCard {
                input_cost_per_1k: 0.0,
                output_cost_per_1k: 0.0,
                fixed_per_request: 0.0,
                minimum_charge: 0.0,
                volume_discounts: Vec::new(),
            },
            warned: Mutex::new(HashSet::new()),
        }
    }

    /// Rate card for `backend`
    ///
    /// Local synthesis is free. Unknown backends are priced with the default
    /// card and logged once.
    pub fn card_for(&self, backend: &str) -> &RateCard {
        if backend == LOCAL_BACKEND {
            return &self.zero_card;
        }
        match self.cards.get(backend) {
            Some(card) => card,
            None => {
                if self.warned.lock().insert(backend.to_string()) {
                    warn!(backend, "No rate card for backend, using default pricing");
                }
                &self.default_card
            }
        }
    }

    pub fn has_card(&self, backend: &str) -> bool {
        backend == LOCAL_BACKEND || self.cards.contains_key(backend)
    }

    /// Price `units` on `backend` for a tenant with `cumulative_units` of history
    pub fn estimate(
        &self,
        backend: &str,
        feature: &str,
        units: u64,
        cumulative_units: u64,
    ) -> CostEstimate {
        let card = self.card_for(backend);
        let input_units = units as f64 * INPUT_SHARE;
        let output_units = units as f64 * OUTPUT_SHARE;

        let base_cost = input_units / 1000.0 * card.input_cost_per_1k
            + output_units / 1000.0 * card.output_cost_per_1k
            + card.fixed_per_request;

        let floored = base_cost.max(card.minimum_charge);
        let discount_multiplier = discount_multiplier(card, cumulative_units);
        let cost = (floored * discount_multiplier).max(card.minimum_charge);

        CostEstimate {
            backend: backend.to_string(),
            feature: feature.to_string(),
            units,
            input_units,
            output_units,
            base_cost,
            discount_multiplier,
            cost,
            minimum_applied: base_cost < card.minimum_charge
                || floored * discount_multiplier < card.minimum_charge,
        }
    }
}

/// Every break whose threshold is met applies, compounding
pub fn discount_multiplier(card: &RateCard, cumulative_units: u64) -> f64 {
    card.volume_discounts
        .iter()
        .filter(|d| cumulative_units >= d.threshold_units)
        .fold(1.0, |acc, d| acc * (1.0 - d.discount))
}
