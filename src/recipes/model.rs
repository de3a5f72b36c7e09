use serde::Serialize;
use serde_json::Value;

use crate::source::{link, nested_row_name, SourceRow};

/// A recipe input or output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ingredient {
    /// Item id, or the tag id for generic ingredients
    pub id: String,
    pub count: u32,
    /// True when any item carrying the tag `id` satisfies this input
    pub is_generic: bool,
}

impl Ingredient {
    pub fn item(id: impl Into<String>, count: u32) -> Self {
        Self {
            id: id.into(),
            count,
            is_generic: false,
        }
    }

    pub fn tag(tag: impl Into<String>, count: u32) -> Self {
        Self {
            id: tag.into(),
            count,
            is_generic: true,
        }
    }
}

/// A crafting recipe from `D_ProcessorRecipes`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub id: String,
    /// Crafting stations, in declaration order
    pub benches: Vec<String>,
    pub inputs: Vec<Ingredient>,
    pub outputs: Vec<Ingredient>,
    /// Talent that must be unlocked
    pub requirement: Option<String>,
    pub character_req: Option<String>,
    pub session_req: Option<String>,
    pub energy_cost: f64,
}

impl Recipe {
    /// Parse a recipe row, skipping links to "None"
    pub fn from_row(row: &SourceRow) -> Self {
        let mut inputs: Vec<Ingredient> = row
            .array("Inputs")
            .iter()
            .filter_map(|i| nested_row_name(i, "Element").map(|id| Ingredient::item(id, count(i))))
            .collect();

        inputs.extend(
            row.array("QueryInputs")
                .iter()
                .filter_map(|q| nested_row_name(q, "Tag").map(|tag| Ingredient::tag(tag, count(q)))),
        );

        let outputs = row
            .array("Outputs")
            .iter()
            .filter_map(|o| nested_row_name(o, "Element").map(|id| Ingredient::item(id, count(o))))
            .collect();

        let mut benches: Vec<String> = Vec::new();
        for bench in row.row_refs("RecipeSets") {
            if !benches.iter().any(|b| b == bench) {
                benches.push(bench.to_string());
            }
        }

        Self {
            id: row.name().to_string(),
            benches,
            inputs,
            outputs,
            requirement: row.row_ref("Requirement").map(str::to_string),
            character_req: row.get("CharacterRequirement").and_then(loose_ref),
            session_req: row.get("SessionRequirement").and_then(loose_ref),
            energy_cost: row.f64_field("RequiredMillijoules").unwrap_or(0.0),
        }
    }

    /// Ids of the items this recipe produces
    pub fn output_ids(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|o| o.id.as_str())
    }
}

fn count(value: &Value) -> u32 {
    value
        .get("Count")
        .and_then(Value::as_u64)
        .and_then(|c| u32::try_from(c).ok())
        .unwrap_or(1)
}

/// A requirement given either as `{RowName: ..}` or as a bare string
fn loose_ref(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => link(s).map(str::to_string),
        Value::Object(_) => crate::source::row_name(value).map(str::to_string),
        _ => None,
    }
}
