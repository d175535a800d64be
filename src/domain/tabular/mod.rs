// ============================================================
// TABULAR DOMAIN LAYER
// ============================================================
// Core types and value objects for tabular ingestion
// No I/O, no async

mod column;
mod ingestion_config;
mod ingestion_result;

pub use column::{ColumnDescriptor, ColumnType};
pub use ingestion_config::IngestionConfig;
pub use ingestion_result::{IngestionResult, NumericProfile, TableStats};

use std::collections::HashMap;
pub type FieldMap = HashMap<String, String>;

/// Maximum number of rows a preview carries.
pub const PREVIEW_ROW_LIMIT: usize = 100;
