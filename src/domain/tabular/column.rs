// ============================================================
// COLUMN DESCRIPTOR
// ============================================================

use serde::{Deserialize, Serialize};

/// Inferred type of a tabular column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Default label for columns whose first cell is neither numeric nor a date
    #[default]
    String,

    /// Well-formed numeric literal
    Number,

    /// Value starting with a `YYYY-MM-DD` date
    Date,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name, inferred type and optional description of one tabular field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,

    #[serde(rename = "type")]
    pub inferred_type: ColumnType,

    #[serde(default)]
    pub description: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inferred_type: ColumnType::String,
            description: None,
        }
    }

    pub fn with_type(mut self, inferred_type: ColumnType) -> Self {
        self.inferred_type = inferred_type;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_serializes_lowercase() {
        let column = ColumnDescriptor::new("revenue").with_type(ColumnType::Number);
        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["type"], "number");
        assert_eq!(json["name"], "revenue");
    }
}
