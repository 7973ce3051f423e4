//! Deterministic offline recipe synthesis
//!
//! Picks a template by keyword match on the prompt. Never fails and never
//! consumes billable units.

use super::backend::{GenerationRequest, GenerationResponse};
use crate::core::types::{Ingredient, NutritionInfo, Recipe};

struct Template {
    keywords: &'static [&'static str],
    title: &'static str,
    description: &'static str,
    ingredients: &'static [(&'static str, f64, &'static str)],
    instructions: &'static [&'static str],
    prep: u32,
    cook: u32,
    nutrition: (f64, f64, f64, f64),
    tags: &'static [&'static str],
}

const TEMPLATES: &[Template] = &[
    Template {
        keywords: &["chicken", "poultry", "turkey"],
        title: "Simple Roast Chicken Thighs",
        description: "Crisp-skinned chicken thighs roasted with garlic and lemon.",
        ingredients: &[
            ("chicken thighs", 800.0, "g"),
            ("garlic", 3.0, "cloves"),
            ("lemon", 1.0, ""),
            ("olive oil", 2.0, "tbsp"),
            ("salt", 1.0, "tsp"),
        ],
        instructions: &[
            "Preheat the oven to 200°C.",
            "Season the chicken thighs with salt, garlic and olive oil.",
            "Roast for 35 minutes until the internal temperature reaches 74°C.",
            "Squeeze the lemon over the chicken and serve.",
        ],
        prep: 10,
        cook: 35,
        nutrition: (420.0, 38.0, 3.0, 28.0),
        tags: &["dinner", "high-protein"],
    },
    Template {
        keywords: &["pasta", "spaghetti", "noodle"],
        title: "Garlic Tomato Pasta",
        description: "A quick pasta tossed in a garlicky tomato sauce.",
        ingredients: &[
            ("spaghetti", 400.0, "g"),
            ("canned tomatoes", 400.0, "g"),
            ("garlic", 2.0, "cloves"),
            ("olive oil", 2.0, "tbsp"),
            ("basil", 10.0, "leaves"),
        ],
        instructions: &[
            "Boil the spaghetti in salted water until al dente.",
            "Heat the olive oil and cook the garlic for one minute.",
            "Add the tomatoes and simmer for 10 minutes.",
            "Toss the drained pasta with the sauce and garnish with basil.",
        ],
        prep: 5,
        cook: 20,
        nutrition: (480.0, 15.0, 85.0, 9.0),
        tags: &["vegetarian", "quick"],
    },
    Template {
        keywords: &["salad", "greens", "light"],
        title: "Crunchy Garden Salad",
        description: "Fresh vegetables with a lemon and olive oil dressing.",
        ingredients: &[
            ("mixed greens", 150.0, "g"),
            ("cucumber", 1.0, ""),
            ("cherry tomatoes", 200.0, "g"),
            ("olive oil", 2.0, "tbsp"),
            ("lemon juice", 1.0, "tbsp"),
        ],
        instructions: &[
            "Rinse and dry the mixed greens.",
            "Slice the cucumber and halve the cherry tomatoes.",
            "Whisk the olive oil with the lemon juice.",
            "Toss everything together and serve immediately.",
        ],
        prep: 15,
        cook: 0,
        nutrition: (180.0, 3.0, 10.0, 14.0),
        tags: &["vegetarian", "vegan", "quick"],
    },
    Template {
        keywords: &["soup", "stew", "broth"],
        title: "Hearty Lentil Soup",
        description: "A warming soup of lentils, carrots and onion.",
        ingredients: &[
            ("red lentils", 250.0, "g"),
            ("carrot", 2.0, ""),
            ("onion", 1.0, ""),
            ("vegetable stock", 1.0, "l"),
            ("cumin", 1.0, "tsp"),
        ],
        instructions: &[
            "Dice the onion and carrots.",
            "Cook the onion in a large pot until soft.",
            "Add the carrots, lentils, cumin and stock.",
            "Simmer for 25 minutes, then blend until smooth and serve.",
        ],
        prep: 10,
        cook: 30,
        nutrition: (320.0, 18.0, 50.0, 4.0),
        tags: &["vegetarian", "vegan"],
    },
];

const DEFAULT_TEMPLATE: Template = Template {
    keywords: &[],
    title: "Vegetable Stir Fry",
    description: "Seasonal vegetables stir-fried with soy sauce and ginger.",
    ingredients: &[
        ("mixed vegetables", 500.0, "g"),
        ("soy sauce", 2.0, "tbsp"),
        ("ginger", 1.0, "tbsp"),
        ("vegetable oil", 1.0, "tbsp"),
        ("rice", 200.0, "g"),
    ],
    instructions: &[
        "Cook the rice according to the packet.",
        "Heat the oil in a wok over high heat.",
        "Stir fry the vegetables and ginger for 5 minutes.",
        "Add the soy sauce, toss well and serve over the rice.",
    ],
    prep: 10,
    cook: 15,
    nutrition: (390.0, 10.0, 70.0, 7.0),
    tags: &["vegetarian", "quick"],
};

const DEFAULT_SERVINGS: u32 = 4;

/// Offline fallback that never fails
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSynthesizer;

impl LocalSynthesizer {
    pub fn new() -> Self {
        Self
    }

    pub fn synthesize(&self, request: &GenerationRequest) -> GenerationResponse {
        let prompt = request.prompt.to_lowercase();
        let template = TEMPLATES
            .iter()
            .find(|t| t.keywords.iter().any(|k| prompt.contains(k)))
            .unwrap_or(&DEFAULT_TEMPLATE);

        let servings = request
            .constraints
            .get("servings")
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_SERVINGS);
        let (calories, protein_g, carbs_g, fat_g) = template.nutrition;

        let recipe = Recipe {
            title: template.title.to_string(),
            description: template.description.to_string(),
            ingredients: template
                .ingredients
                .iter()
                .map(|(name, amount, unit)| Ingredient::new(*name, *amount, *unit))
                .collect(),
            instructions: template.instructions.iter().map(|s| s.to_string()).collect(),
            prep_time_minutes: Some(template.prep),
            cook_time_minutes: Some(template.cook),
            servings: Some(servings),
            nutrition: Some(NutritionInfo {
                calories,
                protein_g,
                carbs_g,
                fat_g,
                fiber_g: None,
            }),
            tags: template.tags.iter().map(|s| s.to_string()).collect(),
        };

        GenerationResponse {
            recipe,
            units_used: 0,
        }
    }
}
