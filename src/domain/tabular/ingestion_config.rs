// ============================================================
// INGESTION CONFIGURATION
// ============================================================

use serde::{Deserialize, Serialize};

use super::PREVIEW_ROW_LIMIT;

/// Configuration for tabular ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Field delimiter (default: comma)
    pub delimiter: u8,

    /// Number of rows kept in the preview (default and maximum: 100)
    pub preview_limit: usize,

    /// Number of data rows scanned for type inference; `None` scans all rows
    pub sample_rows: Option<usize>,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            preview_limit: PREVIEW_ROW_LIMIT,
            sample_rows: None,
        }
    }
}

impl IngestionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preview_limit(mut self, preview_limit: usize) -> Self {
        self.preview_limit = preview_limit;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.preview_limit == 0 {
            return Err("preview_limit must be > 0".to_string());
        }
        if self.preview_limit > PREVIEW_ROW_LIMIT {
            return Err(format!(
                "preview_limit must not exceed {}",
                PREVIEW_ROW_LIMIT
            ));
        }
        if self.delimiter == b'"' || self.delimiter == b'\n' || self.delimiter == b'\r' {
            return Err("delimiter must not be a quote or line terminator".to_string());
        }
        if self.sample_rows == Some(0) {
            return Err("sample_rows must be > 0 when set".to_string());
        }
        Ok(())
    }
}
