//! Recipe domain types shared by generation and quality scoring

use serde::{Deserialize, Serialize};

/// A generated recipe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub prep_time_minutes: Option<u32>,
    #[serde(default)]
    pub cook_time_minutes: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub nutrition: Option<NutritionInfo>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Recipe {
    /// Prep plus cook time, when both are known, saturating at `u32::MAX`
    pub fn total_time_minutes(&self) -> Option<u32> {
        Some(self.prep_time_minutes?.saturating_add(self.cook_time_minutes?))
    }

    /// Lowercased title, description, ingredient names and instructions
    pub fn searchable_text(&self) -> String {
        let mut text = String::new();
        text.push_str(&self.title);
        text.push('\n');
        text.push_str(&self.description);
        for ingredient in &self.ingredients {
            text.push('\n');
            text.push_str(&ingredient.name);
        }
        for step in &self.instructions {
            text.push('\n');
            text.push_str(step);
        }
        text.to_lowercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub unit: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount,
            unit: unit.into(),
        }
    }
}

/// Nutrition per serving
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionInfo {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    #[serde(default)]
    pub fiber_g: Option<f64>,
}
