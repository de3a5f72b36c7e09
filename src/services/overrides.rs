use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{info, warn};

/// Manual corrections for one item
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ItemOverride {
    pub is_visible: Option<bool>,
    /// Fractional values are truncated
    #[serde(deserialize_with = "whole_multiplier")]
    pub yield_multiplier: Option<u32>,
    /// Replaces the computed total tier
    pub tier: Option<f64>,
    /// Merged into the item's base stats
    pub stats: Option<BTreeMap<String, f64>>,
    pub description: Option<String>,
    pub display_name: Option<String>,
}

/// Item overrides merged from every `*.json` file in a directory
#[derive(Debug, Default, Clone)]
pub struct OverrideService {
    overrides: BTreeMap<String, ItemOverride>,
}

impl OverrideService {
    /// Load overrides from `dir`; a missing directory yields no overrides
    ///
    /// Files are read in name order and later files replace earlier entries
    /// for the same item. Unreadable files are skipped with a warning.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut service = Self::default();
        if !dir.is_dir() {
            return Ok(service);
        }

        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("Failed to read overrides directory {:?}", dir))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        for path in &files {
            match read_override_file(path) {
                Ok(entries) => service.overrides.extend(entries),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping override file"),
            }
        }

        info!(items = service.overrides.len(), files = files.len(), "overrides loaded");
        Ok(service)
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, ItemOverride)>) -> Self {
        Self {
            overrides: entries.into_iter().collect(),
        }
    }

    /// Exact match first, then case-insensitive
    pub fn get(&self, item: &str) -> Option<&ItemOverride> {
        self.overrides.get(item).or_else(|| {
            self.overrides
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(item))
                .map(|(_, o)| o)
        })
    }

    pub fn item_names(&self) -> impl Iterator<Item = &str> {
        self.overrides.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

fn whole_multiplier<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Option::<f64>::deserialize(deserializer)?;
    // saturating cast: negatives and NaN become 0
    Ok(value.map(|v| v.trunc() as u32))
}

/// Entries that fail to parse are skipped; the rest of the file still applies
fn read_override_file(path: &Path) -> Result<BTreeMap<String, ItemOverride>> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let raw: BTreeMap<String, Value> =
        serde_json::from_str(&text).with_context(|| format!("Failed to parse {:?}", path))?;

    let mut entries = BTreeMap::new();
    for (item, value) in raw {
        match serde_json::from_value::<ItemOverride>(value) {
            Ok(entry) => {
                entries.insert(item, entry);
            }
            Err(e) => warn!(path = %path.display(), item = %item, error = %e, "skipping override entry"),
        }
    }
    Ok(entries)
}
