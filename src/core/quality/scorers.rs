//! Per-dimension scoring heuristics
//!
//! Each scorer starts at 1.0, subtracts penalties and clamps to [0, 1].

use super::types::{DimensionScore, IssueSeverity, QualityDimension, QualityIssue};
use crate::core::types::Recipe;
use once_cell::sync::Lazy;
use regex::Regex;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Invalid quality pattern")
}

static HEDGING_PATTERN: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"\b(maybe|perhaps|probably|possibly|might|somewhat|kind of|sort of|i think|roughly|or so)\b",
    )
});

static PROCESS_VERB_PATTERN: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"\b(add|bake|beat|blend|boil|braise|broil|brown|chop|combine|cook|cool|cover|cut|dice|drain|fold|fry|garnish|grate|grill|heat|knead|marinate|melt|mince|mix|place|pour|preheat|reduce|remove|rinse|roast|saute|sauté|season|serve|simmer|slice|spread|sprinkle|steam|stir|strain|toast|toss|transfer|whisk)\b",
    )
});

static UNSAFE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"\b(raw (chicken|poultry|pork|turkey|egg|eggs)|undercooked|rare (chicken|pork|turkey)|pink in the (middle|center)|lukewarm chicken)\b",
    )
});

static PROTEIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"\b(chicken|turkey|duck|poultry|pork|beef|lamb|veal|steak|sausage|bacon|ham|ground meat|meatballs?|fish|salmon|tuna|cod|tilapia|trout|shrimp|prawns?|scallops?|crab|lobster)\b",
    )
});

static TEMPERATURE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    compile(r"(\d+\s*°|\d+\s*degrees|\d+\s*(fahrenheit|celsius)\b|internal temperature)")
});

static STEP_NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| compile(r"^\s*(step\s*)?\d+[.):]\s"));

const MIN_STEP_CHARS: usize = 10;
const MAX_STEP_CHARS: usize = 300;
const MIN_STEPS: usize = 2;
const MAX_STEPS: usize = 20;
const MAX_INGREDIENTS: usize = 25;

fn issue(
    kind: QualityDimension,
    severity: IssueSeverity,
    message: impl Into<String>,
    confidence: f64,
) -> Option<QualityIssue> {
    Some(QualityIssue::new(kind, severity, message, confidence))
}

/// Score one dimension
pub(super) fn score(dimension: QualityDimension, recipe: &Recipe) -> DimensionScore {
    let scored = match dimension {
        QualityDimension::Completeness => completeness(recipe),
        QualityDimension::Clarity => clarity(recipe),
        QualityDimension::Practicality => practicality(recipe),
        QualityDimension::Safety => safety(recipe),
        QualityDimension::Nutrition => nutrition(recipe),
        QualityDimension::Format => format(recipe),
    };
    scored.clamped()
}

fn completeness(recipe: &Recipe) -> DimensionScore {
    use QualityDimension::Completeness as K;
    let mut s = DimensionScore::new();

    let required = [
        (
            recipe.title.trim().is_empty(),
            0.2,
            IssueSeverity::High,
            "Missing title",
            "Add a descriptive title",
        ),
        (
            recipe.description.trim().is_empty(),
            0.1,
            IssueSeverity::Low,
            "Missing description",
            "Add a short description",
        ),
        (
            recipe.ingredients.is_empty(),
            0.3,
            IssueSeverity::Critical,
            "No ingredients listed",
            "List every ingredient with an amount",
        ),
        (
            recipe.instructions.is_empty(),
            0.3,
            IssueSeverity::Critical,
            "No instructions provided",
            "Provide step-by-step instructions",
        ),
        (
            recipe.prep_time_minutes.is_none() || recipe.cook_time_minutes.is_none(),
            0.05,
            IssueSeverity::Low,
            "Prep or cook time missing",
            "State prep and cook times",
        ),
        (
            recipe.servings.is_none(),
            0.05,
            IssueSeverity::Low,
            "Servings missing",
            "State the number of servings",
        ),
    ];
    for (missing, penalty, severity, message, suggestion) in required {
        if missing {
            s.penalize(penalty, issue(K, severity, message, 1.0), Some(suggestion));
        }
    }

    if recipe.nutrition.is_none() {
        s.penalize(0.05, None, Some("Include nutrition information per serving"));
    }

    for ingredient in &recipe.ingredients {
        if ingredient.name.trim().is_empty() {
            s.penalize(
                0.05,
                issue(K, IssueSeverity::Medium, "Ingredient without a name", 1.0),
                None,
            );
        } else if ingredient.amount <= 0.0 {
            s.penalize(
                0.05,
                issue(
                    K,
                    IssueSeverity::Medium,
                    format!("No amount for '{}'", ingredient.name),
                    0.9,
                ),
                Some("Give every ingredient a quantity"),
            );
        }
    }
    s
}

fn clarity(recipe: &Recipe) -> DimensionScore {
    use QualityDimension::Clarity as K;
    let mut s = DimensionScore::new();

    if recipe.instructions.is_empty() {
        s.penalize(1.0, issue(K, IssueSeverity::High, "Nothing to read", 1.0), None);
        return s;
    }

    for (i, step) in recipe.instructions.iter().enumerate() {
        let len = step.trim().chars().count();
        if len < MIN_STEP_CHARS {
            s.penalize(
                0.1,
                issue(
                    K,
                    IssueSeverity::Medium,
                    format!("Step {} is too short to follow", i + 1),
                    0.8,
                ),
                Some("Expand terse steps into complete sentences"),
            );
        } else if len > MAX_STEP_CHARS {
            s.penalize(
                0.1,
                issue(
                    K,
                    IssueSeverity::Low,
                    format!("Step {} is overly long", i + 1),
                    0.8,
                ),
                Some("Split long steps into several shorter ones"),
            );
        }

        let hedges = HEDGING_PATTERN.find_iter(&step.to_lowercase()).count();
        if hedges > 0 {
            s.penalize(
                0.05 * hedges as f64,
                issue(
                    K,
                    IssueSeverity::Low,
                    format!("Step {} uses hedging language", i + 1),
                    0.7,
                ),
                Some("Use precise, confident instructions instead of hedging words"),
            );
        }
    }
    s
}

fn practicality(recipe: &Recipe) -> DimensionScore {
    use QualityDimension::Practicality as K;
    let mut s = DimensionScore::new();
    let steps = recipe.instructions.len();

    if steps < MIN_STEPS {
        s.penalize(
            0.3,
            issue(K, IssueSeverity::Medium, format!("Only {} step(s)", steps), 0.9),
            Some("Break the method into at least two steps"),
        );
    } else if steps > MAX_STEPS {
        s.penalize(
            0.2,
            issue(
                K,
                IssueSeverity::Medium,
                format!("{} steps is hard to follow", steps),
                0.8,
            ),
            Some("Consolidate the method into fewer steps"),
        );
    }

    if recipe.ingredients.len() > MAX_INGREDIENTS {
        s.penalize(
            0.1,
            issue(K, IssueSeverity::Low, "Very long ingredient list", 0.7),
            Some("Trim optional ingredients"),
        );
    }

    for ingredient in &recipe.ingredients {
        if !plausible_amount(ingredient.amount, &ingredient.unit) {
            s.penalize(
                0.15,
                issue(
                    K,
                    IssueSeverity::High,
                    format!(
                        "Implausible quantity: {} {} {}",
                        ingredient.amount, ingredient.unit, ingredient.name
                    ),
                    0.8,
                ),
                Some("Check ingredient quantities and units"),
            );
        }
    }

    if steps > 0 {
        let with_verb = recipe
            .instructions
            .iter()
            .filter(|step| PROCESS_VERB_PATTERN.is_match(&step.to_lowercase()))
            .count();
        if (with_verb as f64) / (steps as f64) < 0.5 {
            s.penalize(
                0.2,
                issue(K, IssueSeverity::Medium, "Few steps name a cooking action", 0.6),
                Some("Start each step with a clear action such as chop, stir or bake"),
            );
        }
    }

    if recipe.total_time_minutes().is_some_and(|t| t > 24 * 60) {
        s.penalize(
            0.1,
            issue(K, IssueSeverity::Low, "Total time exceeds a day", 0.7),
            None,
        );
    }
    s
}

fn plausible_amount(amount: f64, unit: &str) -> bool {
    let max = match unit.trim().to_lowercase().as_str() {
        "kg" | "kilogram" | "kilograms" | "l" | "liter" | "liters" | "litre" | "litres" => 10.0,
        "g" | "gram" | "grams" | "ml" | "milliliter" | "milliliters" => 5000.0,
        "cup" | "cups" => 20.0,
        "tbsp" | "tablespoon" | "tablespoons" | "tsp" | "teaspoon" | "teaspoons" => 30.0,
        "lb" | "lbs" | "pound" | "pounds" => 20.0,
        "oz" | "ounce" | "ounces" => 200.0,
        _ => 1000.0,
    };
    amount <= max
}

fn safety(recipe: &Recipe) -> DimensionScore {
    use QualityDimension::Safety as K;
    let mut s = DimensionScore::new();
    let text = recipe.searchable_text();

    for found in UNSAFE_PATTERN.find_iter(&text) {
        s.penalize(
            0.3,
            issue(
                K,
                IssueSeverity::Critical,
                format!("Unsafe preparation: '{}'", found.as_str()),
                0.9,
            ),
            Some("Cook meat, poultry and eggs through before serving"),
        );
    }

    if let Some(protein) = PROTEIN_PATTERN.find(&text) {
        if !TEMPERATURE_PATTERN.is_match(&text) {
            s.penalize(
                0.4,
                issue(
                    K,
                    IssueSeverity::High,
                    format!("Uses {} without a cooking temperature", protein.as_str()),
                    0.85,
                ),
                Some("State a safe internal cooking temperature for meat, poultry or fish"),
            );
        }
    }
    s
}

fn nutrition(recipe: &Recipe) -> DimensionScore {
    use QualityDimension::Nutrition as K;
    let mut s = DimensionScore::new();

    let Some(info) = &recipe.nutrition else {
        s.penalize(0.5, None, Some("Include nutrition information per serving"));
        return s;
    };

    if !(50.0..=2000.0).contains(&info.calories) {
        s.penalize(
            0.3,
            issue(
                K,
                IssueSeverity::Medium,
                format!("Calories per serving look wrong: {}", info.calories),
                0.8,
            ),
            Some("Recheck calorie calculation"),
        );
    }

    let macros = [
        ("protein", info.protein_g, 200.0),
        ("carbohydrate", info.carbs_g, 400.0),
        ("fat", info.fat_g, 200.0),
    ];
    for (name, grams, max) in macros {
        if !(0.0..=max).contains(&grams) {
            s.penalize(
                0.15,
                issue(
                    K,
                    IssueSeverity::Medium,
                    format!("Implausible {}: {}g", name, grams),
                    0.8,
                ),
                Some("Recheck macronutrient values"),
            );
        }
    }

    let implied = 4.0 * info.protein_g + 4.0 * info.carbs_g + 9.0 * info.fat_g;
    let mismatch = (implied - info.calories).abs() / info.calories;
    if info.calories > 0.0 && implied > 0.0 && mismatch > 0.35 {
        s.penalize(
            0.2,
            issue(K, IssueSeverity::Low, "Macros do not add up to the stated calories", 0.6),
            Some("Make calories consistent with macronutrients"),
        );
    }
    s
}

fn format(recipe: &Recipe) -> DimensionScore {
    use QualityDimension::Format as K;
    let mut s = DimensionScore::new();
    let title = recipe.title.trim();

    if title.is_empty() {
        s.penalize(0.3, issue(K, IssueSeverity::Medium, "Empty title", 1.0), None);
    } else {
        if title.chars().count() > 100 {
            s.penalize(
                0.1,
                issue(K, IssueSeverity::Low, "Title is too long", 0.9),
                Some("Shorten the title"),
            );
        }
        if title.chars().next().is_some_and(|c| c.is_lowercase()) {
            s.penalize(
                0.05,
                issue(K, IssueSeverity::Low, "Title starts in lowercase", 0.9),
                Some("Capitalise the title"),
            );
        }
        let letters: Vec<char> = title.chars().filter(|c| c.is_alphabetic()).collect();
        if letters.len() > 3 && letters.iter().all(|c| c.is_uppercase()) {
            s.penalize(
                0.1,
                issue(K, IssueSeverity::Low, "Title is all caps", 0.9),
                Some("Avoid all-caps titles"),
            );
        }
    }

    let mut seen = std::collections::HashSet::new();
    for ingredient in &recipe.ingredients {
        let key = ingredient.name.trim().to_lowercase();
        if !key.is_empty() && !seen.insert(key) {
            s.penalize(
                0.1,
                issue(
                    K,
                    IssueSeverity::Low,
                    format!("Duplicate ingredient '{}'", ingredient.name),
                    0.9,
                ),
                Some("Merge duplicate ingredients"),
            );
        }
    }

    for (i, step) in recipe.instructions.iter().enumerate() {
        let step = step.trim();
        if step.chars().next().is_some_and(|c| c.is_lowercase()) {
            s.penalize(
                0.05,
                issue(
                    K,
                    IssueSeverity::Low,
                    format!("Step {} starts in lowercase", i + 1),
                    0.8,
                ),
                None,
            );
        }
        if !step.is_empty() && !step.ends_with(['.', '!', '?', ')']) {
            s.penalize(0.02, None, Some("End each step with punctuation"));
        }
        if STEP_NUMBER_PATTERN.is_match(&step.to_lowercase()) {
            s.penalize(
                0.05,
                issue(
                    K,
                    IssueSeverity::Low,
                    format!("Step {} repeats its own number", i + 1),
                    0.7,
                ),
                Some("Drop manual numbering from steps"),
            );
        }
    }
    s
}
