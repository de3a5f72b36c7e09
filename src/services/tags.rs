use std::collections::HashMap;

use super::localized_text;
use crate::source::SourceRow;

/// Display names for generic crafting tags such as `Any_Vegetable`
#[derive(Debug, Default, Clone)]
pub struct TagService {
    tags: HashMap<String, SourceRow>,
    queries: HashMap<String, SourceRow>,
}

impl TagService {
    pub fn new(crafting_tags: &[SourceRow], tag_queries: &[SourceRow]) -> Self {
        let by_name = |rows: &[SourceRow]| {
            rows.iter()
                .map(|r| (r.name().to_string(), r.clone()))
                .collect::<HashMap<_, _>>()
        };
        Self {
            tags: by_name(crafting_tags),
            queries: by_name(tag_queries),
        }
    }

    pub fn display_name(&self, tag: &str) -> String {
        match self.tags.get(tag).and_then(|t| t.str_field("TagName")) {
            Some(raw) => localized_text(raw).to_string(),
            None => tag.strip_prefix("Any_").unwrap_or(tag).replace('_', " "),
        }
    }

    /// Gameplay tags that satisfy a crafting tag's query
    pub fn satisfying_tags(&self, tag: &str) -> Vec<&str> {
        let Some(query) = self.tags.get(tag).and_then(|t| t.row_ref("Query")) else {
            return Vec::new();
        };
        self.queries
            .get(query)
            .and_then(|q| q.object("Query"))
            .and_then(|q| q.get("TagDictionary"))
            .and_then(|d| d.as_array())
            .map(|tags| {
                tags.iter()
                    .filter_map(|t| t.get("TagName").and_then(|n| n.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }
}
