//! Test fixtures and data factories

use governance_gateway::config::{GovernanceConfig, RateCard, VolumeDiscount};
use governance_gateway::{
    Config, GenerationBackend, GenerationRequest, GenerationResponse, Governor, Ingredient, Recipe,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Rate card used by every remote backend in the fixtures
pub fn openai_card() -> RateCard {
    RateCard {
        input_cost_per_1k: 0.003,
        output_cost_per_1k: 0.006,
        fixed_per_request: 0.1,
        minimum_charge: 0.01,
        volume_discounts: Vec::new(),
    }
}

/// `openai_card` with two compounding volume breaks
pub fn discounted_card() -> RateCard {
    RateCard {
        volume_discounts: vec![
            VolumeDiscount {
                threshold_units: 1_000,
                discount: 0.1,
            },
            VolumeDiscount {
                threshold_units: 2_000,
                discount: 0.2,
            },
        ],
        ..openai_card()
    }
}

/// Three-backend chain, clarity-only quality at 0.7, cache off
pub fn config() -> GovernanceConfig {
    let mut config = GovernanceConfig::default();
    config.backends.primary = "primary".to_string();
    config.backends.fallbacks = vec!["secondary".to_string(), "tertiary".to_string()];
    config.quality.weights = HashMap::from([("clarity".to_string(), 1.0)]);
    config.quality.min_score = 0.7;
    config.cache.enabled = false;
    for name in ["primary", "secondary", "tertiary"] {
        config.budget.rate_cards.insert(name.to_string(), openai_card());
    }
    config
}

pub fn governor<B>(config: GovernanceConfig, backends: Vec<Arc<B>>) -> Governor
where
    B: GenerationBackend + 'static,
{
    let mut builder = Governor::builder(Config { governance: config }).channels(Vec::new());
    for backend in backends {
        builder = builder.backend(backend);
    }
    builder.build().expect("fixture config is valid")
}

pub fn request(tenant: &str) -> GenerationRequest {
    GenerationRequest::new(tenant, "weeknight", "A warming tomato soup")
}

pub fn response(recipe: Recipe, units: u64) -> GenerationResponse {
    GenerationResponse {
        recipe,
        units_used: units,
    }
}

/// Recipe whose clarity score is `1.0 - 0.05 * hedges`
pub fn recipe(title: &str, hedges: usize) -> Recipe {
    let mut instructions = vec![
        "Warm the olive oil in a large pot.".to_string(),
        "Add the tomatoes and stir well.".to_string(),
        "Simmer for twenty minutes, then blend.".to_string(),
    ];
    instructions.extend(std::iter::repeat_n(
        "Maybe stir the pot once more.".to_string(),
        hedges,
    ));
    Recipe {
        title: title.to_string(),
        ingredients: vec![Ingredient::new("tomatoes", 800.0, "g")],
        instructions,
        servings: Some(4),
        ..Recipe::default()
    }
}
