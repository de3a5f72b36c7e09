use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::row::SourceRow;
use super::tables::{SourceTable, ALL_SOURCES};

/// All rows of every source table, loaded into memory for one run
#[derive(Debug, Default, Clone)]
pub struct GameData {
    tables: HashMap<SourceTable, Vec<SourceRow>>,
}

impl GameData {
    /// Load every known table from an unpacked export directory
    pub fn load(export_dir: &Path) -> Result<Self> {
        if !export_dir.is_dir() {
            bail!("Game data directory not found: {:?}", export_dir);
        }

        let mut data = Self::default();
        for table in ALL_SOURCES {
            let path = export_dir.join(table.relative_path());
            if !path.exists() {
                if table.required() {
                    bail!("Required game data file not found: {:?}", path);
                }
                warn!(table = %table, path = ?path, "optional table missing, treating as empty");
                data.tables.insert(*table, Vec::new());
                continue;
            }

            let rows = load_rows(&path)
                .with_context(|| format!("Failed to load {}", table.name()))?;
            debug!(table = %table, rows = rows.len(), "loaded table");
            data.tables.insert(*table, rows);
        }

        Ok(data)
    }

    /// Build game data from rows already in memory
    pub fn from_tables(tables: impl IntoIterator<Item = (SourceTable, Vec<SourceRow>)>) -> Self {
        Self {
            tables: tables.into_iter().collect(),
        }
    }

    /// Rows of a table; empty when the table was not loaded
    pub fn rows(&self, table: SourceTable) -> &[SourceRow] {
        self.tables.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total row count across all tables
    pub fn row_count(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }
}

/// Parse a `{"Rows": [...]}` table file
pub fn load_rows(path: &Path) -> Result<Vec<SourceRow>> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read: {:?}", path))?;
    parse_rows(&text).with_context(|| format!("Failed to parse JSON in {:?}", path))
}

/// Parse table JSON text, tolerating a leading byte-order mark
pub fn parse_rows(text: &str) -> Result<Vec<SourceRow>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let json: Value = serde_json::from_str(text).context("Failed to parse JSON")?;

    let rows = match json.get("Rows") {
        Some(Value::Array(rows)) => rows.iter().cloned().map(SourceRow::from_value).collect(),
        _ => Vec::new(),
    };

    Ok(rows)
}

/// Paths of every table file expected under an export root
pub fn expected_paths(export_dir: &Path) -> Vec<(SourceTable, PathBuf)> {
    ALL_SOURCES
        .iter()
        .map(|t| (*t, export_dir.join(t.relative_path())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_table(root: &Path, table: SourceTable, body: &str) {
        let path = root.join(table.relative_path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_parse_rows_strips_bom() {
        let rows = parse_rows("\u{feff}{\"Rows\": [{\"Name\": \"Bread\"}]}").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name(), "Bread");
    }

    #[test]
    fn test_parse_rows_without_rows_key() {
        assert!(parse_rows("{\"Other\": 1}").unwrap().is_empty());
        assert!(parse_rows("not json").is_err());
    }

    #[test]
    fn test_missing_required_table_fails() {
        let dir = TempDir::new().unwrap();
        write_table(dir.path(), SourceTable::Consumable, "{\"Rows\": []}");
        let err = GameData::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Required game data file not found"));
    }

    #[test]
    fn test_missing_optional_table_is_empty() {
        let dir = TempDir::new().unwrap();
        for table in ALL_SOURCES.iter().filter(|t| t.required()) {
            write_table(dir.path(), *table, "{\"Rows\": [{\"Name\": \"X\"}]}");
        }
        let data = GameData::load(dir.path()).unwrap();
        assert_eq!(data.rows(SourceTable::Talents).len(), 1);
        assert!(data.rows(SourceTable::WorkshopItems).is_empty());
    }
}
