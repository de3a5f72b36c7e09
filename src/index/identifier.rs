//! Cross-table identifier index
//!
//! Every literal identifier seen in the indexed tables is reduced to a
//! normalized concept id. The forward map answers "what concept is this
//! literal id", the reverse map answers "what does table X call this concept".
//! Each (concept, table) slot holds at most one literal id and the first
//! registration wins.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::source::{link, GameData, SourceTable, INDEXED_SOURCES};

/// Structural prefixes removed before normalizing; at most one is stripped
pub const STRUCTURAL_PREFIXES: &[&str] = &["Food_", "Drink_", "Item_"];

/// Normalize a literal identifier to its concept id
///
/// Strips at most one structural prefix, lowercases, and drops everything
/// that is not an ASCII letter or digit. `Food_Meat_Stew` and `Meat_Stew`
/// both become `meatstew`.
pub fn normalize(literal_id: &str) -> String {
    let stripped = STRUCTURAL_PREFIXES
        .iter()
        .find_map(|prefix| literal_id.strip_prefix(prefix))
        .unwrap_or(literal_id);

    stripped
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Outcome of a registration attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// First literal id for this concept in this table
    Inserted,
    /// The same literal id was already registered
    AlreadyPresent,
    /// A different literal id already owns this concept in this table
    Rejected { existing: String },
    /// Empty or sentinel identifier
    Ignored,
}

#[derive(Debug, Default, Clone)]
pub struct IdentifierIndex {
    /// (table, literal id) -> normalized id
    forward: HashMap<(SourceTable, String), String>,
    /// normalized id -> table -> literal id
    reverse: HashMap<String, HashMap<SourceTable, String>>,
    collisions: usize,
}

impl IdentifierIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from the `Name` column of every indexed table
    pub fn from_game_data(data: &GameData) -> Self {
        let mut index = Self::new();
        for table in INDEXED_SOURCES {
            for row in data.rows(*table) {
                index.register(*table, row.name());
            }
        }
        info!(
            concepts = index.reverse.len(),
            collisions = index.collisions,
            "identifier index built"
        );
        index
    }

    /// Register a literal id seen in `table`
    ///
    /// The forward mapping is always recorded. The reverse slot for
    /// (concept, table) is only filled when empty; a different literal id
    /// for an occupied slot is rejected and logged.
    pub fn register(&mut self, table: SourceTable, literal_id: &str) -> Registration {
        let Some(literal_id) = link(literal_id) else {
            return Registration::Ignored;
        };

        let normalized = normalize(literal_id);
        self.forward
            .insert((table, literal_id.to_string()), normalized.clone());

        let slots = self.reverse.entry(normalized.clone()).or_default();
        if let Some(existing) = slots.get(&table) {
            if existing == literal_id {
                return Registration::AlreadyPresent;
            }
            warn!(
                normalized = %normalized,
                table = %table,
                existing = %existing,
                rejected = %literal_id,
                "identifier collision, keeping first registration"
            );
            let existing = existing.clone();
            self.collisions += 1;
            return Registration::Rejected { existing };
        }

        slots.insert(table, literal_id.to_string());
        Registration::Inserted
    }

    /// Exact forward lookup; `None` if this literal id was never registered
    pub fn normalized_id_for(&self, table: SourceTable, literal_id: &str) -> Option<&str> {
        self.forward
            .get(&(table, literal_id.to_string()))
            .map(String::as_str)
    }

    /// Literal id that `table` uses for a concept
    pub fn literal_id_in(&self, table: SourceTable, normalized_id: &str) -> Option<&str> {
        self.reverse
            .get(normalized_id)
            .and_then(|slots| slots.get(&table))
            .map(String::as_str)
    }

    /// Every table's literal id for a concept
    pub fn literal_ids(&self, normalized_id: &str) -> BTreeMap<SourceTable, &str> {
        self.reverse
            .get(normalized_id)
            .map(|slots| slots.iter().map(|(t, id)| (*t, id.as_str())).collect())
            .unwrap_or_default()
    }

    /// Translate a literal id from one table's naming to another's
    ///
    /// Unregistered ids fall back to ad hoc normalization.
    pub fn translate(
        &self,
        from_table: SourceTable,
        to_table: SourceTable,
        literal_id: &str,
    ) -> Option<&str> {
        match self.normalized_id_for(from_table, literal_id) {
            Some(normalized) => self.literal_id_in(to_table, normalized),
            None => self.literal_id_in(to_table, &normalize(literal_id)),
        }
    }

    /// Number of distinct concepts
    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }

    /// Number of rejected registrations
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    /// Serializable dump of the reverse map, keyed by concept then table name
    pub fn export_snapshot(&self) -> IndexSnapshot {
        let norm_to_source = self
            .reverse
            .iter()
            .map(|(norm, slots)| {
                let by_table = slots
                    .iter()
                    .map(|(table, id)| (table.name().to_string(), id.clone()))
                    .collect();
                (norm.clone(), by_table)
            })
            .collect();

        IndexSnapshot {
            metadata: SnapshotMetadata {
                generated_by: "IdentifierIndex",
                description: "Maps normalized IDs back to their specific source file IDs.",
            },
            norm_to_source,
        }
    }

    /// Write the snapshot as pretty JSON, creating parent directories
    pub fn write_snapshot(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(&self.export_snapshot())?;
        fs::write(path, json).with_context(|| format!("Failed to write: {:?}", path))?;
        info!(path = ?path, "identifier index exported");
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotMetadata {
    pub generated_by: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexSnapshot {
    pub metadata: SnapshotMetadata,
    pub norm_to_source: BTreeMap<String, BTreeMap<String, String>>,
}
