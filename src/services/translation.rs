use std::collections::HashMap;

use super::localized_text;
use crate::source::SourceRow;

/// Prefixes dropped when building a fallback display name
const CLEANUP_PREFIXES: &[&str] = &["Food_", "Drink_", "Item_", "Kit_", "Dough_"];

/// Display names, descriptions and break-down yields for item ids
#[derive(Debug, Default, Clone)]
pub struct TranslationService {
    names: HashMap<String, String>,
    descriptions: HashMap<String, String>,
    yields: HashMap<String, (String, u32)>,
}

impl TranslationService {
    pub fn new(itemable: &[SourceRow], items_static: &[SourceRow]) -> Self {
        let mut service = Self::default();

        for row in itemable {
            let name = row.name();
            if name.is_empty() {
                continue;
            }
            let display = localized_text(row.str_field("DisplayName").unwrap_or(""));
            let description = localized_text(row.str_field("Description").unwrap_or(""));
            service.names.insert(name.to_string(), display.to_string());
            service
                .descriptions
                .insert(name.to_string(), description.to_string());
        }

        // a whole cake breaks down into its consumable pieces
        for row in items_static {
            let name = row.name();
            if let Some(child) = row.row_ref("Consumable").filter(|c| *c != name) {
                service
                    .yields
                    .insert(name.to_string(), (child.to_string(), 1));
            }
        }

        service
    }

    fn lookup<'a>(map: &'a HashMap<String, String>, id: &str) -> Option<&'a str> {
        map.get(id)
            .or_else(|| map.get(&format!("Item_{}", id)))
            .map(String::as_str)
    }

    /// Localized name, falling back to a cleaned-up id
    pub fn display_name(&self, id: &str) -> String {
        if let Some(name) = Self::lookup(&self.names, id) {
            return name.to_string();
        }

        let stripped = CLEANUP_PREFIXES
            .iter()
            .find_map(|p| id.strip_prefix(p))
            .unwrap_or(id);
        stripped.replace('_', " ")
    }

    /// Localized description, or ""
    pub fn description(&self, id: &str) -> String {
        Self::lookup(&self.descriptions, id)
            .unwrap_or("")
            .to_string()
    }

    /// Item this item breaks down into, and how many
    pub fn yield_info(&self, id: &str) -> Option<(&str, u32)> {
        self.yields.get(id).map(|(item, count)| (item.as_str(), *count))
    }
}
