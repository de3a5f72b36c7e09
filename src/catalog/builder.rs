use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use super::model::{Catalog, Consumable, ResolvedIngredient, ResolvedRecipe};
use crate::index::{normalize, IdentifierIndex};
use crate::recipes::{Ingredient, Recipe, RecipeIndex};
use crate::services::{
    parse_base_stats, Category, FarmingService, ModifierService, OverrideService, TagService,
    TranslationService,
};
use crate::source::{nested_row_name, GameData, SourceRow, SourceTable};
use crate::tier::TierCalculator;

/// Assembles catalog records from the indices and lookup services
pub struct CatalogBuilder<'a> {
    pub ids: &'a IdentifierIndex,
    pub recipes: &'a RecipeIndex,
    pub tiers: &'a TierCalculator<'a>,
    pub translations: &'a TranslationService,
    pub tags: &'a TagService,
    pub modifiers: &'a ModifierService,
    pub farming: &'a FarmingService,
    pub overrides: &'a OverrideService,
}

impl CatalogBuilder<'_> {
    pub fn build(&self, data: &GameData) -> Catalog {
        let parents = parent_items(data.rows(SourceTable::ItemsStatic));

        let rows = data.rows(SourceTable::Consumable);
        let mut items: Vec<Consumable> = rows.iter().map(|row| self.build_item(row, &parents)).collect();

        let known: HashSet<String> = rows.iter().map(|r| r.name().to_ascii_lowercase()).collect();
        let mut extras = 0;
        for name in self.overrides.item_names() {
            if known.contains(&name.to_ascii_lowercase()) {
                continue;
            }
            let item = self.build_item(&SourceRow::placeholder(name), &parents);
            if item.is_visible {
                extras += 1;
                items.push(item);
            }
        }

        info!(items = items.len(), override_only = extras, "catalog assembled");
        Catalog { items }
    }

    /// Build one record; overrides are applied last
    pub fn build_item(&self, row: &SourceRow, parents: &HashMap<String, String>) -> Consumable {
        let name = row.name();
        let mut item = Consumable::new(name);

        item.display_name = self.translations.display_name(name);
        item.description = self.translations.description(name);
        item.base_stats = parse_base_stats(row.object("Stats"));
        item.source_item = parents.get(name).cloned();
        item.source_ids = self
            .ids
            .literal_ids(&normalize(name))
            .into_iter()
            .map(|(table, id)| (table.name().to_string(), id.to_string()))
            .collect();
        if let Some((yields, count)) = self.translations.yield_info(name) {
            item.yields_item = Some(yields.to_string());
            item.yields_count = count;
        }

        if let Some(modifier) = row.get("Modifier") {
            if let Some(id) = nested_row_name(modifier, "Modifier") {
                let lifetime = modifier
                    .get("ModifierLifetime")
                    .and_then(|v| v.as_i64())
                    .unwrap_or(0);
                match self.modifiers.effect(id, lifetime) {
                    Some(effect) => item.modifiers.push(effect),
                    None => debug!(item = name, modifier = id, "unknown modifier"),
                }
            }
        }

        let recipes = self.recipes.resolved_recipes_for(name, self.tiers);
        if recipes.is_empty() {
            item.tier = self.tiers.calculate_tier(name, None);
        } else {
            item.recipes = recipes.iter().map(|r| self.resolve_recipe(name, r)).collect();
            // cheapest recipe sets the tier, first one on ties
            if let Some(best) = item
                .recipes
                .iter()
                .map(|r| &r.tier)
                .reduce(|best, t| if t.total_tier < best.total_tier { t } else { best })
            {
                item.tier = best.clone();
            }
        }

        item.category = Category::assign(name, &item.base_stats, item.tier.is_orbital);
        item.growth = self.farming.growth_info(name);

        if let Some(o) = self.overrides.get(name) {
            item.apply_override(o);
        }

        item
    }

    fn resolve_recipe(&self, item: &str, recipe: &Recipe) -> ResolvedRecipe {
        ResolvedRecipe {
            id: recipe.id.clone(),
            bench_names: recipe
                .benches
                .iter()
                .map(|b| self.translations.display_name(b))
                .collect(),
            benches: recipe.benches.clone(),
            inputs: recipe.inputs.iter().map(|i| self.resolve_ingredient(i)).collect(),
            outputs: recipe.outputs.iter().map(|o| self.resolve_ingredient(o)).collect(),
            requirement: recipe.requirement.clone(),
            character_req: recipe.character_req.clone(),
            session_req: recipe.session_req.clone(),
            energy_cost: recipe.energy_cost,
            tier: self.tiers.calculate_tier(item, Some(recipe)),
        }
    }

    fn resolve_ingredient(&self, ingredient: &Ingredient) -> ResolvedIngredient {
        let display_name = if ingredient.is_generic {
            self.tags.display_name(&ingredient.id)
        } else {
            self.translations.display_name(&ingredient.id)
        };
        let (yields_item, yields_count) = match self.translations.yield_info(&ingredient.id) {
            Some((item, count)) => (Some(item.to_string()), count),
            None => (None, 1),
        };

        ResolvedIngredient {
            id: ingredient.id.clone(),
            display_name,
            count: ingredient.count,
            is_generic: ingredient.is_generic,
            yields_item,
            yields_count,
        }
    }
}

/// Consumable piece -> the whole static item that breaks into it
pub fn parent_items(items_static: &[SourceRow]) -> HashMap<String, String> {
    items_static
        .iter()
        .filter_map(|row| {
            let child = row.row_ref("Consumable")?;
            (child != row.name()).then(|| (child.to_string(), row.name().to_string()))
        })
        .collect()
}
