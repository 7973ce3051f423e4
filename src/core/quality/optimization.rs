//! Optimization-intent effectiveness scoring

use super::gate::QualityGate;
use super::types::QualityAssessment;
use crate::core::types::Recipe;
use serde::{Deserialize, Serialize};

/// Weight of the base quality score in the blended result
pub const BASE_WEIGHT: f64 = 0.7;
/// Weight of the intent effectiveness in the blended result
pub const EFFECTIVENESS_WEIGHT: f64 = 0.3;

/// What a caller asked the recipe to be optimized for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationIntent {
    Health,
    Cost,
    Time,
    Taste,
}

/// Base assessment blended with intent effectiveness
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationAssessment {
    pub intent: OptimizationIntent,
    pub base: QualityAssessment,
    pub effectiveness: f64,
    pub blended: f64,
}

const HEALTHY_TERMS: &[&str] = &[
    "steamed", "grilled", "baked", "roasted", "whole grain", "whole wheat", "vegetable",
    "spinach", "kale", "lentil", "quinoa", "olive oil",
];
const RICH_TERMS: &[&str] = &["deep fried", "fried", "butter", "heavy cream", "lard", "sugar"];
const BUDGET_TERMS: &[&str] = &[
    "rice", "beans", "lentils", "pasta", "potato", "eggs", "oats", "cabbage", "carrot", "onion",
];
const PREMIUM_TERMS: &[&str] = &["saffron", "truffle", "lobster", "caviar", "wagyu", "foie gras"];
const SEASONING_TERMS: &[&str] = &[
    "salt", "pepper", "garlic", "herb", "lemon", "lime", "ginger", "chili", "cumin", "paprika",
    "basil", "thyme",
];
const TECHNIQUE_TERMS: &[&str] = &["sear", "roast", "caramelize", "toast", "marinate", "simmer"];

fn count_terms(text: &str, terms: &[&str]) -> usize {
    terms.iter().filter(|term| text.contains(*term)).count()
}

impl QualityGate {
    /// Score how well a recipe serves `intent`, blended 70/30 with base quality
    pub fn assess_optimization(
        &self,
        feature: &str,
        recipe: &Recipe,
        intent: OptimizationIntent,
    ) -> OptimizationAssessment {
        let base = self.assess(feature, recipe);
        let effectiveness = effectiveness(recipe, intent);
        let blended =
            (BASE_WEIGHT * base.overall + EFFECTIVENESS_WEIGHT * effectiveness).clamp(0.0, 1.0);

        OptimizationAssessment {
            intent,
            base,
            effectiveness,
            blended,
        }
    }
}

/// Intent-specific heuristic in [0, 1]
pub fn effectiveness(recipe: &Recipe, intent: OptimizationIntent) -> f64 {
    let text = recipe.searchable_text();
    let score = match intent {
        OptimizationIntent::Health => {
            let mut score = 0.3;
            if let Some(info) = &recipe.nutrition {
                if info.calories <= 600.0 {
                    score += 0.3;
                }
                if info.protein_g >= 15.0 {
                    score += 0.2;
                }
                if info.fat_g <= 25.0 {
                    score += 0.2;
                }
            }
            score += (0.1 * count_terms(&text, HEALTHY_TERMS) as f64).min(0.3);
            score -= 0.1 * count_terms(&text, RICH_TERMS) as f64;
            score
        }
        OptimizationIntent::Cost => {
            let mut score = 0.3;
            if recipe.ingredients.len() <= 10 {
                score += 0.3;
            }
            score += (0.1 * count_terms(&text, BUDGET_TERMS) as f64).min(0.3);
            score -= 0.2 * count_terms(&text, PREMIUM_TERMS) as f64;
            score
        }
        OptimizationIntent::Time => {
            let mut score = match recipe.total_time_minutes() {
                Some(t) if t <= 30 => 1.0,
                Some(t) if t <= 45 => 0.8,
                Some(t) if t <= 60 => 0.6,
                Some(_) => 0.3,
                None => 0.4,
            };
            if recipe.instructions.len() > 6 {
                score -= 0.1;
            }
            score
        }
        OptimizationIntent::Taste => {
            0.2 + (0.1 * count_terms(&text, SEASONING_TERMS) as f64).min(0.5)
                + (0.1 * count_terms(&text, TECHNIQUE_TERMS) as f64).min(0.3)
        }
    };
    score.clamp(0.0, 1.0)
}
