// ============================================================
// VALUE CLASSIFIER
// ============================================================
// Decide the column type a single raw cell suggests

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::tabular::ColumnType;

// Plain decimal literal with optional sign, fraction and exponent.
// Hex, `inf` and `NaN` spellings are not numeric here.
static NUMERIC_LITERAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").expect("valid numeric pattern")
});

static DATE_PREFIX_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("valid date pattern"));

/// True for a well-formed numeric literal. Surrounding whitespace is ignored;
/// an empty or whitespace-only cell is never numeric.
pub fn is_numeric_literal(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && NUMERIC_LITERAL_PATTERN.is_match(trimmed)
}

/// True when the raw cell starts with `YYYY-MM-DD`
pub fn is_date_prefixed(value: &str) -> bool {
    DATE_PREFIX_PATTERN.is_match(value)
}

/// Numeric first, then date prefix, otherwise the default string label
pub fn classify_cell(value: &str) -> ColumnType {
    if is_numeric_literal(value) {
        ColumnType::Number
    } else if is_date_prefixed(value) {
        ColumnType::Date
    } else {
        ColumnType::String
    }
}
