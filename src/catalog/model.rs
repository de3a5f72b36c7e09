use std::collections::BTreeMap;

use serde::Serialize;

use crate::services::{Category, GrowthInfo, ItemOverride, ModifierEffect};
use crate::tier::TierInfo;

/// A recipe input or output with its display name resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedIngredient {
    pub id: String,
    pub display_name: String,
    pub count: u32,
    pub is_generic: bool,
    /// What this item breaks down into, if anything
    pub yields_item: Option<String>,
    pub yields_count: u32,
}

/// A deduplicated recipe ready for output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRecipe {
    pub id: String,
    /// Bench ids, cheapest first
    pub benches: Vec<String>,
    pub bench_names: Vec<String>,
    pub inputs: Vec<ResolvedIngredient>,
    pub outputs: Vec<ResolvedIngredient>,
    pub requirement: Option<String>,
    pub character_req: Option<String>,
    pub session_req: Option<String>,
    pub energy_cost: f64,
    /// Tier of the item as made by this recipe
    pub tier: TierInfo,
}

/// Everything known about one consumable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Consumable {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub category: Category,
    pub base_stats: BTreeMap<String, f64>,
    pub modifiers: Vec<ModifierEffect>,
    pub recipes: Vec<ResolvedRecipe>,
    pub tier: TierInfo,
    pub growth: Option<GrowthInfo>,
    /// Whole item this piece comes from, e.g. a cake for a cake slice
    pub source_item: Option<String>,
    /// Table name -> literal id for every table sharing this concept
    pub source_ids: BTreeMap<String, String>,
    pub yields_item: Option<String>,
    pub yields_count: u32,
    pub yield_multiplier: u32,
    pub is_visible: bool,
    pub is_override: bool,
}

impl Consumable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: String::new(),
            description: String::new(),
            category: Category::Medicine,
            base_stats: BTreeMap::new(),
            modifiers: Vec::new(),
            recipes: Vec::new(),
            tier: TierInfo::harvested(),
            growth: None,
            source_item: None,
            source_ids: BTreeMap::new(),
            yields_item: None,
            yields_count: 1,
            yield_multiplier: 1,
            is_visible: true,
            is_override: false,
        }
    }

    /// Apply a manual override; a tier override only replaces the total
    pub fn apply_override(&mut self, o: &ItemOverride) {
        self.is_override = true;

        if let Some(visible) = o.is_visible {
            self.is_visible = visible;
        }
        if let Some(multiplier) = o.yield_multiplier {
            self.yield_multiplier = multiplier;
        }
        if let Some(tier) = o.tier {
            self.tier.total_tier = tier;
        }
        if let Some(stats) = &o.stats {
            self.base_stats
                .extend(stats.iter().map(|(k, v)| (k.clone(), *v)));
        }
        if let Some(description) = &o.description {
            self.description = description.clone();
        }
        if let Some(name) = &o.display_name {
            self.display_name = name.clone();
        }
    }
}

/// The assembled catalog, in source order
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    pub items: Vec<Consumable>,
}

impl Catalog {
    pub fn get(&self, name: &str) -> Option<&Consumable> {
        self.items
            .iter()
            .find(|c| c.name == name)
            .or_else(|| self.items.iter().find(|c| c.name.eq_ignore_ascii_case(name)))
    }

    pub fn visible(&self) -> impl Iterator<Item = &Consumable> {
        self.items.iter().filter(|c| c.is_visible)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
