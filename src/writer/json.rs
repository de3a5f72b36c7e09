//! Split JSON export: items, recipes and modifiers in three files
//!
//! Each item lists only its "primary" recipes, grouped so that recipes with
//! the same consumable outputs at the same benches collapse into one entry
//! whose extra ingredients become `alternate_inputs`.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::catalog::{Catalog, Consumable, ResolvedIngredient, ResolvedRecipe};
use crate::services::{Category, ModifierEffect};

pub const ITEMS_FILE: &str = "consumables_items.json";
pub const RECIPES_FILE: &str = "consumables_recipes.json";
pub const MODIFIERS_FILE: &str = "consumables_modifiers.json";

#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    pub parser_version: String,
    pub game_version: String,
}

#[derive(Debug, Default, Serialize)]
struct Traits {
    #[serde(skip_serializing_if = "is_false")]
    is_harvested: bool,
    #[serde(skip_serializing_if = "is_false")]
    is_orbital: bool,
    #[serde(skip_serializing_if = "is_false")]
    is_override: bool,
}

impl Traits {
    fn is_empty(&self) -> bool {
        !(self.is_harvested || self.is_orbital || self.is_override)
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Serialize)]
struct TierEntry {
    total: f64,
    anchor: &'static str,
}

#[derive(Debug, Serialize)]
struct GrowthEntry {
    growth_time: i64,
    harvest_min: i64,
    harvest_max: i64,
}

#[derive(Debug, Serialize)]
struct ItemEntry<'a> {
    name: &'a str,
    display_name: &'a str,
    category: Category,
    description: &'a str,
    #[serde(skip_serializing_if = "Traits::is_empty")]
    traits: Traits,
    source_item: Option<&'a str>,
    source_ids: &'a BTreeMap<String, String>,
    tier: TierEntry,
    growth_data: Option<GrowthEntry>,
    base_stats: &'a BTreeMap<String, f64>,
    modifiers: Vec<&'a str>,
    recipes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputEntry {
    pub name: String,
    pub count: u32,
    pub display_name: String,
    pub is_generic: bool,
}

impl From<&ResolvedIngredient> for InputEntry {
    fn from(i: &ResolvedIngredient) -> Self {
        Self {
            name: i.id.clone(),
            count: i.count,
            display_name: i.display_name.clone(),
            is_generic: i.is_generic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputEntry {
    pub name: String,
    pub yields_count: Value,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yields_item: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yields_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yields_max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Requirements {
    pub talent: Option<String>,
    pub character: Option<String>,
    pub session: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeGroup {
    pub id: String,
    /// Bench display names, sorted
    pub benches: Vec<String>,
    pub inputs: Vec<InputEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternate_inputs: Vec<InputEntry>,
    pub outputs: Vec<OutputEntry>,
    pub requirements: Requirements,
}

#[derive(Debug, Serialize)]
struct ModifierEntry<'a> {
    id: &'a str,
    display_name: &'a str,
    effects: Map<String, Value>,
    lifetime: i64,
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct StatMetadata {
    label: String,
    categories: Vec<&'static str>,
}

/// Whether a recipe should be listed for `item`
///
/// Harvested items keep every recipe. A multi-output recipe is dropped when
/// another of its exported outputs breaks down into this item.
pub fn is_primary_recipe(item: &Consumable, recipe: &ResolvedRecipe, consumables: &HashSet<&str>) -> bool {
    if item.tier.is_harvested || recipe.outputs.len() == 1 {
        return true;
    }

    !recipe.outputs.iter().any(|out| {
        out.id != item.name
            && out.yields_item.as_deref() == Some(item.name.as_str())
            && consumables.contains(out.id.as_str())
    })
}

struct PendingGroup {
    group: RecipeGroup,
    consumable_outputs: Vec<(String, u32, String, Option<String>)>,
    resource_yields: Vec<(String, Vec<u32>)>,
}

type GroupSignature = (Vec<(String, u32, String, Option<String>)>, Vec<String>);

/// Group an item's primary recipes by (consumable outputs, benches)
pub fn group_recipes(item: &Consumable, consumables: &HashSet<&str>) -> Vec<RecipeGroup> {
    let mut pending: Vec<PendingGroup> = Vec::new();
    let mut signatures: HashMap<GroupSignature, usize> = HashMap::new();

    for recipe in item
        .recipes
        .iter()
        .filter(|r| is_primary_recipe(item, r, consumables))
    {
        let mut consumable_outputs = Vec::new();
        let mut resource_outputs = Vec::new();
        for out in &recipe.outputs {
            if consumables.contains(out.id.as_str()) || out.yields_item.is_some() {
                consumable_outputs.push((
                    out.id.clone(),
                    out.count,
                    out.display_name.clone(),
                    out.yields_item.clone(),
                ));
            } else {
                resource_outputs.push((out.id.clone(), out.count));
            }
        }

        let mut cons_sig = consumable_outputs.clone();
        cons_sig.sort_by(|a, b| a.0.cmp(&b.0));
        let mut benches = recipe.bench_names.clone();
        benches.sort();
        let signature = (cons_sig, benches.clone());

        if let Some(&idx) = signatures.get(&signature) {
            let entry = &mut pending[idx];
            for input in &recipe.inputs {
                let known = entry
                    .group
                    .inputs
                    .iter()
                    .chain(&entry.group.alternate_inputs)
                    .any(|i| i.name == input.id);
                if !known {
                    entry.group.alternate_inputs.push(input.into());
                }
            }
            for (name, count) in resource_outputs {
                match entry.resource_yields.iter_mut().find(|(n, _)| *n == name) {
                    Some((_, counts)) => counts.push(count),
                    None => entry.resource_yields.push((name, vec![count])),
                }
            }
        } else {
            signatures.insert(signature, pending.len());
            pending.push(PendingGroup {
                group: RecipeGroup {
                    id: recipe.id.clone(),
                    benches,
                    inputs: recipe.inputs.iter().map(InputEntry::from).collect(),
                    alternate_inputs: Vec::new(),
                    outputs: Vec::new(),
                    requirements: Requirements {
                        talent: recipe.requirement.clone(),
                        character: recipe.character_req.clone(),
                        session: recipe.session_req.clone(),
                    },
                },
                consumable_outputs,
                resource_yields: resource_outputs
                    .into_iter()
                    .map(|(name, count)| (name, vec![count]))
                    .collect(),
            });
        }
    }

    let multiplier = item.yield_multiplier;
    pending
        .into_iter()
        .map(|p| {
            let mut group = p.group;
            for (name, count, display_name, yields_item) in p.consumable_outputs {
                group.outputs.push(OutputEntry {
                    name,
                    yields_count: Value::from(u64::from(count) * u64::from(multiplier)),
                    display_name,
                    yields_item,
                    yields_min: None,
                    yields_max: None,
                });
            }
            for (name, counts) in p.resource_yields {
                group.outputs.push(resource_output(name, &counts, multiplier));
            }
            group
        })
        .collect()
}

/// Average yield of a resource across grouped recipes, with the range when it varies
fn resource_output(name: String, counts: &[u32], multiplier: u32) -> OutputEntry {
    let scale = f64::from(multiplier);
    let min = counts.iter().copied().min().unwrap_or(0);
    let max = counts.iter().copied().max().unwrap_or(0);
    let avg = counts.iter().map(|c| f64::from(*c)).sum::<f64>() / counts.len().max(1) as f64;
    let (yields_min, yields_max) = if min != max {
        (
            Some(round_to(f64::from(min) * scale, 1)),
            Some(round_to(f64::from(max) * scale, 1)),
        )
    } else {
        (None, None)
    };

    OutputEntry {
        display_name: name.replace('_', " "),
        name,
        yields_count: Value::from(round_to(avg * scale, 1)),
        yields_item: None,
        yields_min,
        yields_max,
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn modifier_entry(modifier: &ModifierEffect) -> ModifierEntry<'_> {
    ModifierEntry {
        id: &modifier.id,
        display_name: &modifier.display_name,
        effects: modifier.effects.iter().map(|e| e.to_json_pair()).collect(),
        lifetime: modifier.lifetime,
        description: &modifier.description,
    }
}

fn stat_metadata(stat: &str) -> StatMetadata {
    StatMetadata {
        label: stat.replace("Base", "").replace('_', " "),
        categories: vec!["Other"],
    }
}

/// Write the three JSON files into `output_dir`
pub fn write_json(catalog: &Catalog, output_dir: &Path, metadata: &Metadata) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let consumables: HashSet<&str> = catalog.items.iter().map(|c| c.name.as_str()).collect();
    let mut items = Vec::new();
    let mut recipes: BTreeMap<String, RecipeGroup> = BTreeMap::new();
    let mut modifiers: BTreeMap<&str, ModifierEntry> = BTreeMap::new();
    let mut used_stats: BTreeMap<&str, StatMetadata> = BTreeMap::new();

    for item in catalog.visible() {
        for modifier in &item.modifiers {
            for effect in &modifier.effects {
                used_stats
                    .entry(effect.name.as_str())
                    .or_insert_with(|| stat_metadata(&effect.name));
            }
            modifiers
                .entry(modifier.id.as_str())
                .or_insert_with(|| modifier_entry(modifier));
        }

        let groups = group_recipes(item, &consumables);
        let recipe_ids = groups.iter().map(|g| g.id.clone()).collect();
        for group in groups {
            recipes.entry(group.id.clone()).or_insert(group);
        }

        items.push(ItemEntry {
            name: &item.name,
            display_name: &item.display_name,
            category: item.category,
            description: &item.description,
            traits: Traits {
                is_harvested: item.tier.is_harvested,
                is_orbital: item.tier.is_orbital,
                is_override: item.is_override,
            },
            source_item: item.source_item.as_deref(),
            source_ids: &item.source_ids,
            tier: TierEntry {
                total: item.tier.total_tier,
                anchor: item.tier.anchor_name(),
            },
            growth_data: item.growth.map(|g| GrowthEntry {
                growth_time: g.time_seconds,
                harvest_min: g.yield_min,
                harvest_max: g.yield_max,
            }),
            base_stats: &item.base_stats,
            modifiers: item.modifiers.iter().map(|m| m.id.as_str()).collect(),
            recipes: recipe_ids,
        });
    }

    let items_path = output_dir.join(ITEMS_FILE);
    write_pretty(&items_path, &serde_json::json!({ "metadata": metadata, "items": items }))?;

    let recipes_path = output_dir.join(RECIPES_FILE);
    write_pretty(&recipes_path, &serde_json::json!({ "metadata": metadata, "recipes": recipes }))?;

    let modifiers_path = output_dir.join(MODIFIERS_FILE);
    write_pretty(
        &modifiers_path,
        &serde_json::json!({
            "metadata": metadata,
            "stat_metadata": used_stats,
            "modifiers": modifiers,
        }),
    )?;

    info!(
        items = items.len(),
        recipes = recipes.len(),
        modifiers = modifiers.len(),
        "json written"
    );
    Ok(vec![items_path, recipes_path, modifiers_path])
}

/// Pretty-print with four-space indentation
fn write_pretty(path: &Path, value: &impl Serialize) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut serializer)
        .with_context(|| format!("Failed to write {:?}", path))?;
    writer.flush()?;
    Ok(())
}
