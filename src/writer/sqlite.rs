use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

use super::rows::{CatalogRows, ParsedRow, SqlValue};
use super::schema_gen::{generate_create_table, generate_indexes, generate_insert};
use crate::catalog::Catalog;
use crate::schema::TableSchema;
use crate::ui::Ui;

const BATCH_SIZE: usize = 1000;

pub struct SqliteWriter {
    conn: Connection,
}

impl SqliteWriter {
    pub fn new(db_path: &Path) -> Result<Self> {
        // Remove existing database if present
        if db_path.exists() {
            std::fs::remove_file(db_path).context("Failed to remove existing database")?;
        }
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let conn = Connection::open(db_path).context("Failed to create database")?;

        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;",
        )?;

        Ok(Self { conn })
    }

    /// Create all tables for the given schemas
    pub fn create_tables(&self, schemas: &[&TableSchema]) -> Result<()> {
        info!(tables = schemas.len(), "creating tables");

        for schema in schemas {
            let sql = generate_create_table(schema);
            self.conn
                .execute(&sql, [])
                .with_context(|| format!("Failed to create table: {}", schema.name))?;

            for index_sql in generate_indexes(schema) {
                self.conn
                    .execute(&index_sql, [])
                    .with_context(|| format!("Failed to create index for: {}", schema.name))?;
            }
        }

        Ok(())
    }

    /// Insert the rows for a single table in one transaction
    pub fn import_table(
        &mut self,
        schema: &TableSchema,
        rows: &[ParsedRow],
        ui: &mut impl Ui,
    ) -> Result<u64> {
        let insert_sql = generate_insert(schema);
        let columns = schema.column_names();
        let total = rows.len() as u64;

        let tx = self.conn.transaction()?;
        let mut count: u64 = 0;

        for batch in rows.chunks(BATCH_SIZE) {
            insert_batch(&tx, &insert_sql, &columns, batch)
                .with_context(|| format!("Failed to insert into {}", schema.name))?;
            count += batch.len() as u64;
            ui.set_progress(count, total, schema.name);
        }

        tx.commit()?;
        ui.log(format!("{}: {} rows", schema.name, count));

        Ok(count)
    }

    /// Finalize the database
    pub fn finalize(self) -> Result<()> {
        self.conn.execute_batch("PRAGMA optimize;")?;
        Ok(())
    }
}

/// Insert a batch of rows into the database
fn insert_batch(
    tx: &rusqlite::Transaction,
    sql: &str,
    columns: &[&str],
    batch: &[ParsedRow],
) -> Result<()> {
    let mut stmt = tx.prepare_cached(sql)?;

    for row in batch {
        for (idx, col_name) in columns.iter().enumerate() {
            let value = row.values.get(*col_name).unwrap_or(&SqlValue::Null);
            value.bind_to(idx + 1, &mut stmt)?;
        }
        stmt.raw_execute()?;
    }

    Ok(())
}

/// Write the catalog into a fresh SQLite database, returning the row count
pub fn write_sqlite(
    catalog: &Catalog,
    output_db: &Path,
    tables: &[&TableSchema],
    ui: &mut impl Ui,
) -> Result<u64> {
    let mut writer = SqliteWriter::new(output_db)?;
    writer.create_tables(tables)?;

    let rows = CatalogRows::new(catalog);
    let mut total_records: u64 = 0;

    for schema in tables {
        total_records += writer.import_table(schema, &rows.rows_for(schema), ui)?;
    }

    ui.clear_progress();
    writer.finalize()?;
    info!(path = ?output_db, rows = total_records, "database written");

    Ok(total_records)
}
