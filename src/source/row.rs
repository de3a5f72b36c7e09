use serde_json::{Map, Value};

/// The literal "no link" value used by the exporter
pub const NONE_SENTINEL: &str = "None";

/// One row of a source table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRow {
    fields: Map<String, Value>,
}

impl SourceRow {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Build a row from any JSON value; non-objects become an empty row
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    /// A row carrying only a `Name`, used for items that exist only in overrides
    pub fn placeholder(name: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("Name".to_string(), Value::String(name.to_string()));
        Self { fields }
    }

    /// The row's `Name`, or "" when missing
    pub fn name(&self) -> &str {
        self.fields.get("Name").and_then(Value::as_str).unwrap_or("")
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn f64_field(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_f64)
    }

    pub fn i64_field(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_i64)
    }

    /// Resolve a `{RowName: ...}` reference field
    pub fn row_ref(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(row_name)
    }

    /// Resolve an array of `{RowName: ...}` references, skipping empty links
    pub fn row_refs(&self, field: &str) -> Vec<&str> {
        self.array(field).iter().filter_map(row_name).collect()
    }

    /// Array field, or an empty slice when missing or not an array
    pub fn array(&self, field: &str) -> &[Value] {
        self.get(field)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Object field as a map
    pub fn object(&self, field: &str) -> Option<&Map<String, Value>> {
        self.get(field).and_then(Value::as_object)
    }

    /// All gameplay tags from both `Manual_Tags` and `Generated_Tags`
    pub fn gameplay_tags(&self) -> Vec<&str> {
        ["Manual_Tags", "Generated_Tags"]
            .iter()
            .filter_map(|field| self.get(field))
            .filter_map(|tags| tags.get("GameplayTags").and_then(Value::as_array))
            .flatten()
            .filter_map(|tag| tag.get("TagName").and_then(Value::as_str))
            .collect()
    }
}

/// Read the `RowName` of a reference value, treating "None" and "" as no link
pub fn row_name(value: &Value) -> Option<&str> {
    value
        .get("RowName")
        .and_then(Value::as_str)
        .and_then(link)
}

/// Read a nested reference such as `{"Element": {"RowName": ..}}`
pub fn nested_row_name<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value.get(field).and_then(row_name)
}

/// Filter out empty identifiers and the "None" sentinel
pub fn link(id: &str) -> Option<&str> {
    if id.is_empty() || id == NONE_SENTINEL {
        None
    } else {
        Some(id)
    }
}
