//! Composite recipe index
//!
//! Recipes in the export are not consistently keyed by the item id the rest
//! of the data uses, so every recipe is inserted under several keys:
//!
//! - by its own name
//! - by each output item id, raw and with one structural prefix stripped
//! - by every consumable trait whose item set contains the recipe name or
//!   one of its outputs (the trait bridge)
//!
//! Each insertion records which strategy produced it.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::info;

use super::model::Recipe;
use crate::index::IdentifierIndex;
use crate::source::{SourceRow, SourceTable};

/// Prefixes stripped from output ids when indexing
const OUTPUT_PREFIXES: &[&str] = &["Food_", "Item_"];

/// Prefixes tried when an exact lookup misses
const LOOKUP_PREFIXES: &[&str] = &["Item_", "Food_"];

/// Trait -> item links the item table does not express
pub const MANUAL_TRAIT_LINKS: &[(&str, &str)] = &[
    ("Cooked_Prime_Meat", "Cooked_Giant_Steak"),
    ("Dried_Prime_Meat", "Giant_Steak_Dried"),
    ("Prime_Animal_Fat", "Animal_Fat"),
];

/// How a recipe came to be indexed under a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MatchStrategy {
    RecipeName,
    OutputItem,
    TraitBridge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IndexEntry {
    recipe: usize,
    strategy: MatchStrategy,
}

/// Numeric technology rank for crafting benches
pub trait BenchRanking {
    fn bench_rank(&self, bench: &str) -> u8;
}

#[derive(Debug, Default)]
pub struct RecipeIndex {
    recipes: Vec<Recipe>,
    entries: HashMap<String, Vec<IndexEntry>>,
}

impl RecipeIndex {
    /// Build the index over the full recipe and item tables
    pub fn build(recipe_rows: &[SourceRow], items_static: &[SourceRow], ids: &IdentifierIndex) -> Self {
        let bridge = trait_members(items_static, ids);
        let mut index = Self {
            recipes: recipe_rows.iter().map(Recipe::from_row).collect(),
            entries: HashMap::new(),
        };

        index.index_by_name();
        index.index_by_output();
        index.index_by_trait(&bridge);

        // each key lists recipes in table row order; within a row, name before output before trait
        for entries in index.entries.values_mut() {
            entries.sort_by_key(|e| e.recipe);
        }

        info!(
            recipes = index.recipes.len(),
            keys = index.entries.len(),
            traits = bridge.len(),
            "recipe index built"
        );
        index
    }

    fn insert(&mut self, key: &str, recipe: usize, strategy: MatchStrategy) {
        if key.is_empty() {
            return;
        }
        let entries = self.entries.entry(key.to_string()).or_default();
        let entry = IndexEntry { recipe, strategy };
        if !entries.contains(&entry) {
            entries.push(entry);
        }
    }

    fn index_by_name(&mut self) {
        for i in 0..self.recipes.len() {
            let name = self.recipes[i].id.clone();
            self.insert(&name, i, MatchStrategy::RecipeName);
        }
    }

    fn index_by_output(&mut self) {
        for i in 0..self.recipes.len() {
            let outputs: Vec<String> = self.recipes[i].output_ids().map(str::to_string).collect();
            for output in &outputs {
                self.insert(output, i, MatchStrategy::OutputItem);
                self.insert(strip_output_prefix(output), i, MatchStrategy::OutputItem);
            }
        }
    }

    fn index_by_trait(&mut self, bridge: &HashMap<String, HashSet<String>>) {
        // member id -> traits whose set contains it
        let mut member_traits: HashMap<&str, BTreeSet<&str>> = HashMap::new();
        for (trait_id, members) in bridge {
            for member in members {
                member_traits
                    .entry(member.as_str())
                    .or_default()
                    .insert(trait_id.as_str());
            }
        }

        for i in 0..self.recipes.len() {
            let recipe = &self.recipes[i];
            let mut candidates = vec![recipe.id.as_str()];
            for output in recipe.output_ids() {
                candidates.push(output);
                candidates.push(strip_output_prefix(output));
            }

            let traits: BTreeSet<String> = candidates
                .iter()
                .filter_map(|c| member_traits.get(c))
                .flatten()
                .map(|t| t.to_string())
                .collect();

            for trait_id in traits {
                self.insert(&trait_id, i, MatchStrategy::TraitBridge);
            }
        }
    }

    fn lookup(&self, item_id: &str) -> &[IndexEntry] {
        if let Some(entries) = self.entries.get(item_id).filter(|e| !e.is_empty()) {
            return entries;
        }

        let mut variants: Vec<String> = LOOKUP_PREFIXES
            .iter()
            .map(|prefix| format!("{}{}", prefix, item_id))
            .collect();
        variants.extend(
            LOOKUP_PREFIXES
                .iter()
                .filter_map(|prefix| item_id.strip_prefix(prefix))
                .map(str::to_string),
        );

        variants
            .iter()
            .filter_map(|v| self.entries.get(v))
            .find(|e| !e.is_empty())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every recipe indexed for this item, in discovery order
    ///
    /// May contain the same recipe more than once when several strategies
    /// matched it; see [`deduplicate`].
    pub fn recipes_for(&self, item_id: &str) -> Vec<&Recipe> {
        self.lookup(item_id)
            .iter()
            .map(|e| &self.recipes[e.recipe])
            .collect()
    }

    /// Like [`recipes_for`](Self::recipes_for) but tagged with the matching strategy
    pub fn matches_for(&self, item_id: &str) -> Vec<(MatchStrategy, &Recipe)> {
        self.lookup(item_id)
            .iter()
            .map(|e| (e.strategy, &self.recipes[e.recipe]))
            .collect()
    }

    /// Deduplicated recipes for an item with benches sorted by rank
    pub fn resolved_recipes_for(&self, item_id: &str, ranking: &impl BenchRanking) -> Vec<Recipe> {
        deduplicate(self.recipes_for(item_id))
            .into_iter()
            .map(|r| sort_benches(r, ranking))
            .collect()
    }

    /// Exact key membership, without prefix variants
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|e| !e.is_empty())
    }

    /// Distinct bench names across all recipes
    pub fn benches(&self) -> BTreeSet<&str> {
        self.recipes
            .iter()
            .flat_map(|r| r.benches.iter().map(String::as_str))
            .collect()
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

/// Trait id -> item ids that carry the trait (plus manual links)
fn trait_members(items_static: &[SourceRow], ids: &IdentifierIndex) -> HashMap<String, HashSet<String>> {
    let mut bridge: HashMap<String, HashSet<String>> = HashMap::new();

    for row in items_static {
        let Some(trait_id) = row.row_ref("Consumable") else {
            continue;
        };
        let members = bridge.entry(trait_id.to_string()).or_default();
        if !row.name().is_empty() {
            members.insert(row.name().to_string());
        }
        if let Some(itemable) = row.row_ref("Itemable") {
            members.insert(itemable.to_string());
        }
    }

    for (trait_id, item_id) in MANUAL_TRAIT_LINKS {
        bridge
            .entry(trait_id.to_string())
            .or_default()
            .insert(item_id.to_string());
    }

    // The trait's own item-table counterpart, when the names line up
    for (trait_id, members) in bridge.iter_mut() {
        if let Some(static_id) = ids.translate(SourceTable::Consumable, SourceTable::ItemsStatic, trait_id) {
            members.insert(static_id.to_string());
        }
    }

    bridge
}

fn strip_output_prefix(id: &str) -> &str {
    OUTPUT_PREFIXES
        .iter()
        .find_map(|prefix| id.strip_prefix(prefix))
        .unwrap_or(id)
}

type RecipeKey = (Vec<String>, Vec<(String, u32, bool)>, Vec<(String, u32)>);

fn identity_key(recipe: &Recipe) -> RecipeKey {
    let mut benches = recipe.benches.clone();
    benches.sort();

    let mut inputs: Vec<(String, u32, bool)> = recipe
        .inputs
        .iter()
        .map(|i| (i.id.clone(), i.count, i.is_generic))
        .collect();
    inputs.sort();

    let mut outputs: Vec<(String, u32)> = recipe
        .outputs
        .iter()
        .map(|o| (o.id.clone(), o.count))
        .collect();
    outputs.sort();

    (benches, inputs, outputs)
}

/// Keep the first recipe per (benches, inputs, outputs) identity
///
/// Declaration order inside each set does not matter; discovery order of
/// the survivors is preserved.
pub fn deduplicate<'a>(recipes: impl IntoIterator<Item = &'a Recipe>) -> Vec<&'a Recipe> {
    let mut seen = HashSet::new();
    recipes
        .into_iter()
        .filter(|r| seen.insert(identity_key(r)))
        .collect()
}

/// Copy of a recipe with benches ordered cheapest first
pub fn sort_benches(recipe: &Recipe, ranking: &impl BenchRanking) -> Recipe {
    let mut sorted = recipe.clone();
    sorted.benches.sort_by_key(|b| ranking.bench_rank(b));
    sorted
}
