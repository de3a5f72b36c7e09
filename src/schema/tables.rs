//! Table schema definitions for the catalog database

use super::types::*;

// =============================================================================
// Independent Tables (no FK dependencies)
// =============================================================================

pub static ITEMS: TableSchema = TableSchema {
    name: "items",
    description: "Visible consumables with tier, category and stats",
    columns: &[
        Column::required("id", ColumnType::Text),
        Column::required("display_name", ColumnType::Text),
        Column::new("description", ColumnType::Text),
        Column::required("category", ColumnType::Text),
        Column::required("total_tier", ColumnType::Real),
        Column::required("base_tier", ColumnType::Integer),
        Column::required("fractional_offset", ColumnType::Real),
        Column::new("anchor_bench", ColumnType::Text),
        Column::required("is_harvested", ColumnType::Boolean),
        Column::required("is_orbital", ColumnType::Boolean),
        Column::required("is_override", ColumnType::Boolean),
        Column::new("source_item", ColumnType::Text),
        Column::new("source_ids", ColumnType::Json),
        Column::new("base_stats", ColumnType::Json),
        Column::new("growth_time", ColumnType::Integer),
        Column::new("harvest_min", ColumnType::Integer),
        Column::new("harvest_max", ColumnType::Integer),
        Column::new("yields_item", ColumnType::Text),
        Column::required("yields_count", ColumnType::Integer),
        Column::required("yield_multiplier", ColumnType::Integer),
    ],
    foreign_keys: &[],
    child_tables: &[],
};

pub static MODIFIERS: TableSchema = TableSchema {
    name: "modifiers",
    description: "Status effects granted by consumables",
    columns: &[
        Column::required("id", ColumnType::Text),
        Column::required("display_name", ColumnType::Text),
        Column::new("description", ColumnType::Text),
        Column::required("lifetime", ColumnType::Integer),
    ],
    foreign_keys: &[],
    child_tables: &["modifier_effects"],
};

pub static RECIPES: TableSchema = TableSchema {
    name: "recipes",
    description: "Deduplicated crafting recipes",
    columns: &[
        Column::required("id", ColumnType::Text),
        Column::new("requirement", ColumnType::Text),
        Column::new("character_req", ColumnType::Text),
        Column::new("session_req", ColumnType::Text),
        Column::new("energy_cost", ColumnType::Real),
    ],
    foreign_keys: &[],
    child_tables: &["recipe_benches", "recipe_inputs", "recipe_outputs"],
};

// =============================================================================
// Detail Tables
// =============================================================================

pub static MODIFIER_EFFECTS: TableSchema = TableSchema {
    name: "modifier_effects",
    description: "Stat changes per modifier",
    columns: &[
        Column::required("modifier_id", ColumnType::Text),
        Column::required("stat", ColumnType::Text),
        Column::required("stat_type", ColumnType::Text),
        Column::required("value", ColumnType::Real),
    ],
    foreign_keys: &[ForeignKey::new("modifier_id", "modifiers")],
    child_tables: &[],
};

pub static RECIPE_BENCHES: TableSchema = TableSchema {
    name: "recipe_benches",
    description: "Benches a recipe can be crafted at, cheapest first",
    columns: &[
        Column::required("recipe_id", ColumnType::Text),
        Column::required("position", ColumnType::Integer),
        Column::required("bench", ColumnType::Text),
        Column::required("bench_name", ColumnType::Text),
    ],
    foreign_keys: &[ForeignKey::new("recipe_id", "recipes")],
    child_tables: &[],
};

pub static RECIPE_INPUTS: TableSchema = TableSchema {
    name: "recipe_inputs",
    description: "Recipe ingredients; generic inputs name a crafting tag",
    columns: &[
        Column::required("recipe_id", ColumnType::Text),
        Column::required("item_id", ColumnType::Text),
        Column::required("display_name", ColumnType::Text),
        Column::required("count", ColumnType::Integer),
        Column::required("is_generic", ColumnType::Boolean),
    ],
    foreign_keys: &[ForeignKey::new("recipe_id", "recipes")],
    child_tables: &[],
};

pub static RECIPE_OUTPUTS: TableSchema = TableSchema {
    name: "recipe_outputs",
    description: "Recipe products",
    columns: &[
        Column::required("recipe_id", ColumnType::Text),
        Column::required("item_id", ColumnType::Text),
        Column::required("display_name", ColumnType::Text),
        Column::required("count", ColumnType::Integer),
    ],
    foreign_keys: &[ForeignKey::new("recipe_id", "recipes")],
    child_tables: &[],
};

// =============================================================================
// Junction Tables
// =============================================================================

pub static ITEM_MODIFIERS: TableSchema = TableSchema {
    name: "item_modifiers",
    description: "Modifiers applied by each item",
    columns: &[
        Column::required("item_id", ColumnType::Text),
        Column::required("modifier_id", ColumnType::Text),
    ],
    foreign_keys: &[
        ForeignKey::new("item_id", "items"),
        ForeignKey::new("modifier_id", "modifiers"),
    ],
    child_tables: &[],
};

pub static ITEM_RECIPES: TableSchema = TableSchema {
    name: "item_recipes",
    description: "Recipes that produce each item, with the tier they give it",
    columns: &[
        Column::required("item_id", ColumnType::Text),
        Column::required("recipe_id", ColumnType::Text),
        Column::required("total_tier", ColumnType::Real),
        Column::new("anchor_bench", ColumnType::Text),
    ],
    foreign_keys: &[
        ForeignKey::new("item_id", "items"),
        ForeignKey::new("recipe_id", "recipes"),
    ],
    child_tables: &[],
};

/// All tables in dependency order
pub static ALL_TABLES: &[&TableSchema] = &[
    &ITEMS,
    &MODIFIERS,
    &RECIPES,
    &MODIFIER_EFFECTS,
    &RECIPE_BENCHES,
    &RECIPE_INPUTS,
    &RECIPE_OUTPUTS,
    &ITEM_MODIFIERS,
    &ITEM_RECIPES,
];

pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}

pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}
