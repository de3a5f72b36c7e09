//! Output writers: split JSON, a Markdown guide and a normalized SQLite database

pub mod json;
pub mod markdown;
pub mod rows;
pub mod schema_gen;
pub mod sqlite;

pub use json::{write_json, Metadata, MODIFIERS_FILE, ITEMS_FILE, RECIPES_FILE};
pub use markdown::{render_markdown, write_markdown, MARKDOWN_FILE};
pub use rows::{CatalogRows, ParsedRow, SqlValue};
pub use sqlite::{write_sqlite, SqliteWriter};
