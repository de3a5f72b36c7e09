//! Lookups the catalog builder uses around the core indices

pub mod category;
pub mod farming;
pub mod modifiers;
pub mod overrides;
pub mod tags;
pub mod translation;

pub use category::*;
pub use farming::*;
pub use modifiers::*;
pub use overrides::*;
pub use tags::*;
pub use translation::*;

use once_cell::sync::Lazy;
use regex::Regex;

static LOC_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"NSLOCTEXT\(".*?",\s*".*?",\s*"(.*?)"\)"#).expect("valid regex"));

/// Extract the display text from an `NSLOCTEXT("ns", "key", "text")` string
///
/// Plain strings are returned unchanged.
pub fn localized_text(raw: &str) -> &str {
    LOC_TEXT
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw)
}
