use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::localized_text;
use crate::source::SourceRow;

static MODIFIER_STAT_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"Value="(.*?)_(.*?)""#).expect("valid regex"));

static BASE_STAT_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"Base(.*?)(Recovery)?_.*?""#).expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatType {
    Flat,
    Percentage,
    Boolean,
}

impl StatType {
    /// `%` marks a percentage, `?` a boolean
    fn from_suffix(suffix: &str) -> Self {
        if suffix.contains('%') {
            StatType::Percentage
        } else if suffix.contains('?') {
            StatType::Boolean
        } else {
            StatType::Flat
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatType::Flat => "flat",
            StatType::Percentage => "percentage",
            StatType::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatEffect {
    pub name: String,
    pub stat_type: StatType,
    pub value: f64,
}

impl StatEffect {
    /// Key and value as written to the JSON modifier file
    pub fn to_json_pair(&self) -> (String, Value) {
        match self.stat_type {
            StatType::Percentage => (
                format!("{}%", self.name),
                Value::from(round_to(self.value / 100.0, 4)),
            ),
            StatType::Boolean => (self.name.clone(), Value::Bool(self.value != 0.0)),
            StatType::Flat => (self.name.clone(), Value::from(self.value)),
        }
    }
}

/// A status effect applied when an item is consumed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModifierEffect {
    pub id: String,
    pub display_name: String,
    pub description: String,
    /// Duration in seconds
    pub lifetime: i64,
    pub effects: Vec<StatEffect>,
}

#[derive(Debug, Default, Clone)]
pub struct ModifierService {
    modifiers: HashMap<String, SourceRow>,
}

impl ModifierService {
    pub fn new(rows: &[SourceRow]) -> Self {
        Self {
            modifiers: rows
                .iter()
                .map(|r| (r.name().to_string(), r.clone()))
                .collect(),
        }
    }

    pub fn effect(&self, modifier_id: &str, lifetime: i64) -> Option<ModifierEffect> {
        let row = self.modifiers.get(modifier_id)?;

        let display_name = match localized_text(row.str_field("ModifierName").unwrap_or("")) {
            "" => modifier_id.to_string(),
            name => name.to_string(),
        };
        let description = localized_text(row.str_field("ModifierDescription").unwrap_or(""));

        let effects = row
            .object("Stats")
            .map(|stats| {
                stats
                    .iter()
                    .map(|(key, value)| parse_stat_effect(key, value))
                    .collect()
            })
            .unwrap_or_default();

        Some(ModifierEffect {
            id: modifier_id.to_string(),
            display_name,
            description: description.to_string(),
            lifetime,
            effects,
        })
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }
}

fn parse_stat_effect(key: &str, value: &Value) -> StatEffect {
    let value = value
        .as_f64()
        .or_else(|| value.as_bool().map(|b| if b { 1.0 } else { 0.0 }))
        .unwrap_or(0.0);

    match MODIFIER_STAT_KEY.captures(key) {
        Some(caps) => StatEffect {
            name: caps[1].to_string(),
            stat_type: StatType::from_suffix(&caps[2]),
            value,
        },
        None => StatEffect {
            name: key.to_string(),
            stat_type: StatType::Flat,
            value,
        },
    }
}

/// Reduce a consumable's `Stats` object to `{Food: 40.0, Water: 10.0, ..}`
///
/// Keys that don't follow the `Base<Name>[Recovery]_` pattern are kept verbatim.
pub fn parse_base_stats(stats: Option<&serde_json::Map<String, Value>>) -> BTreeMap<String, f64> {
    let Some(stats) = stats else {
        return BTreeMap::new();
    };

    stats
        .iter()
        .filter_map(|(key, value)| {
            let value = value.as_f64()?;
            let name = BASE_STAT_KEY
                .captures(key)
                .map(|caps| caps[1].to_string())
                .unwrap_or_else(|| key.clone());
            Some((name, value))
        })
        .collect()
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
