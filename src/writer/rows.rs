//! Flattening of catalog records into table rows

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::catalog::{Catalog, Consumable, ResolvedRecipe};
use crate::schema::TableSchema;
use crate::services::ModifierEffect;

/// A row ready for insertion, keyed by column name
#[derive(Debug, Default)]
pub struct ParsedRow {
    pub values: HashMap<String, SqlValue>,
}

impl ParsedRow {
    fn with(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.values.insert(column.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            SqlValue::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            SqlValue::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            SqlValue::Real(f) => stmt.raw_bind_parameter(idx, f)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
        }
        Ok(())
    }

    fn json(value: &impl Serialize) -> Self {
        serde_json::to_string(value)
            .map(SqlValue::Text)
            .unwrap_or(SqlValue::Null)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<&String> for SqlValue {
    fn from(s: &String) -> Self {
        SqlValue::Text(s.clone())
    }
}

impl From<i64> for SqlValue {
    fn from(i: i64) -> Self {
        SqlValue::Integer(i)
    }
}

impl From<u32> for SqlValue {
    fn from(i: u32) -> Self {
        SqlValue::Integer(i64::from(i))
    }
}

impl From<f64> for SqlValue {
    fn from(f: f64) -> Self {
        SqlValue::Real(f)
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        SqlValue::Integer(if b { 1 } else { 0 })
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// Visible items plus the distinct modifiers and recipes they reference
pub struct CatalogRows<'a> {
    items: Vec<&'a Consumable>,
    modifiers: Vec<&'a ModifierEffect>,
    recipes: Vec<&'a ResolvedRecipe>,
}

impl<'a> CatalogRows<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        let items: Vec<&Consumable> = catalog.visible().collect();

        let mut seen = HashSet::new();
        let modifiers = items
            .iter()
            .copied()
            .flat_map(|i| i.modifiers.iter())
            .filter(|m| seen.insert(m.id.as_str()))
            .collect();

        let mut seen = HashSet::new();
        let recipes = items
            .iter()
            .copied()
            .flat_map(|i| i.recipes.iter())
            .filter(|r| seen.insert(r.id.as_str()))
            .collect();

        Self {
            items,
            modifiers,
            recipes,
        }
    }

    /// Rows for one table; unknown tables yield nothing
    pub fn rows_for(&self, schema: &TableSchema) -> Vec<ParsedRow> {
        match schema.name {
            "items" => self.items.iter().map(|i| item_row(i)).collect(),
            "modifiers" => self.modifiers.iter().map(|m| modifier_row(m)).collect(),
            "modifier_effects" => self
                .modifiers
                .iter()
                .copied()
                .flat_map(|m| {
                    m.effects.iter().map(move |e| {
                        ParsedRow::default()
                            .with("modifier_id", &m.id)
                            .with("stat", &e.name)
                            .with("stat_type", e.stat_type.as_str())
                            .with("value", e.value)
                    })
                })
                .collect(),
            "recipes" => self.recipes.iter().map(|r| recipe_row(r)).collect(),
            "recipe_benches" => self
                .recipes
                .iter()
                .copied()
                .flat_map(|r| {
                    r.benches.iter().zip(&r.bench_names).enumerate().map(move |(pos, (bench, name))| {
                        ParsedRow::default()
                            .with("recipe_id", &r.id)
                            .with("position", pos as i64)
                            .with("bench", bench)
                            .with("bench_name", name)
                    })
                })
                .collect(),
            "recipe_inputs" => self
                .recipes
                .iter()
                .copied()
                .flat_map(|r| {
                    r.inputs.iter().map(move |i| {
                        ParsedRow::default()
                            .with("recipe_id", &r.id)
                            .with("item_id", &i.id)
                            .with("display_name", &i.display_name)
                            .with("count", i.count)
                            .with("is_generic", i.is_generic)
                    })
                })
                .collect(),
            "recipe_outputs" => self
                .recipes
                .iter()
                .copied()
                .flat_map(|r| {
                    r.outputs.iter().map(move |o| {
                        ParsedRow::default()
                            .with("recipe_id", &r.id)
                            .with("item_id", &o.id)
                            .with("display_name", &o.display_name)
                            .with("count", o.count)
                    })
                })
                .collect(),
            "item_modifiers" => self
                .items
                .iter()
                .copied()
                .flat_map(|i| {
                    let mut seen = HashSet::new();
                    i.modifiers
                        .iter()
                        .filter(move |m| seen.insert(m.id.as_str()))
                        .map(move |m| {
                            ParsedRow::default()
                                .with("item_id", &i.name)
                                .with("modifier_id", &m.id)
                        })
                })
                .collect(),
            "item_recipes" => self
                .items
                .iter()
                .copied()
                .flat_map(|i| {
                    i.recipes.iter().map(move |r| {
                        ParsedRow::default()
                            .with("item_id", &i.name)
                            .with("recipe_id", &r.id)
                            .with("total_tier", r.tier.total_tier)
                            .with("anchor_bench", r.tier.anchor_bench.map(|a| a.name()))
                    })
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

fn item_row(item: &Consumable) -> ParsedRow {
    let tier = &item.tier;
    ParsedRow::default()
        .with("id", &item.name)
        .with("display_name", &item.display_name)
        .with("description", &item.description)
        .with("category", item.category.name())
        .with("total_tier", tier.total_tier)
        .with("base_tier", i64::from(tier.base_tier))
        .with("fractional_offset", tier.fractional_offset)
        .with("anchor_bench", tier.anchor_bench.map(|a| a.name()))
        .with("is_harvested", tier.is_harvested)
        .with("is_orbital", tier.is_orbital)
        .with("is_override", item.is_override)
        .with("source_item", item.source_item.as_ref())
        .with("source_ids", SqlValue::json(&item.source_ids))
        .with("base_stats", SqlValue::json(&item.base_stats))
        .with("growth_time", item.growth.map(|g| g.time_seconds))
        .with("harvest_min", item.growth.map(|g| g.yield_min))
        .with("harvest_max", item.growth.map(|g| g.yield_max))
        .with("yields_item", item.yields_item.as_ref())
        .with("yields_count", item.yields_count)
        .with("yield_multiplier", item.yield_multiplier)
}

fn modifier_row(modifier: &ModifierEffect) -> ParsedRow {
    ParsedRow::default()
        .with("id", &modifier.id)
        .with("display_name", &modifier.display_name)
        .with("description", &modifier.description)
        .with("lifetime", modifier.lifetime)
}

fn recipe_row(recipe: &ResolvedRecipe) -> ParsedRow {
    ParsedRow::default()
        .with("id", &recipe.id)
        .with("requirement", recipe.requirement.as_ref())
        .with("character_req", recipe.character_req.as_ref())
        .with("session_req", recipe.session_req.as_ref())
        .with("energy_cost", recipe.energy_cost)
}
