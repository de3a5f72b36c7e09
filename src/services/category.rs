use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Name fragments that mark workshop consumables
const WORKSHOP_KEYWORDS: &[&str] = &["_Ammo", "_Arrow", "Biolab_", "_Bolt", "_Resource_Pack"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    AnimalFood,
    Food,
    Drink,
    Workshop,
    Medicine,
}

impl Category {
    /// Display order for reports
    pub const ALL: [Category; 5] = [
        Category::AnimalFood,
        Category::Food,
        Category::Drink,
        Category::Workshop,
        Category::Medicine,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::AnimalFood => "AnimalFood",
            Category::Food => "Food",
            Category::Drink => "Drink",
            Category::Workshop => "Workshop",
            Category::Medicine => "Medicine",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Category::AnimalFood => "Animal Food",
            Category::Food => "Food",
            Category::Drink => "Drinks",
            Category::Workshop => "Workshop",
            Category::Medicine => "Medicine",
        }
    }

    /// Classify an item by its name and base stats, first rule wins
    pub fn assign(name: &str, stats: &BTreeMap<String, f64>, is_orbital: bool) -> Self {
        let food = stats.get("Food").copied().unwrap_or(0.0);
        let water = stats.get("Water").copied().unwrap_or(0.0);

        if food > 0.0 && (name.contains("Animal") || name.contains("Omni")) {
            Category::AnimalFood
        } else if food > 0.0 {
            Category::Food
        } else if water > 0.0 || name.starts_with("Drink_") {
            Category::Drink
        } else if is_orbital || WORKSHOP_KEYWORDS.iter().any(|kw| name.contains(kw)) {
            Category::Workshop
        } else {
            Category::Medicine
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
