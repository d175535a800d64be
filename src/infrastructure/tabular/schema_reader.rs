// ============================================================
// SCHEMA READER
// ============================================================
// Stream a delimited table once, inferring column types and
// collecting a bounded preview

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use super::value_classifier::{classify_cell, is_numeric_literal};
use crate::domain::error::{AppError, Result};
use crate::domain::tabular::{
    ColumnDescriptor, ColumnType, FieldMap, IngestionConfig, IngestionResult, NumericProfile,
    TableStats,
};

/// Schema inference over delimited streams
pub struct SchemaReader {
    config: IngestionConfig,
}

impl Default for SchemaReader {
    fn default() -> Self {
        Self::new(IngestionConfig::default())
    }
}

impl SchemaReader {
    pub fn new(config: IngestionConfig) -> Self {
        Self { config }
    }

    /// Infer the schema of a table stored on disk
    pub fn infer_file(&self, path: &Path, column_names: &[String]) -> Result<IngestionResult> {
        let file = File::open(path).map_err(|e| {
            AppError::IoError(format!("Failed to open {}: {}", path.display(), e))
        })?;
        self.infer(BufReader::new(file), column_names)
    }

    /// Read `source` as a delimited table with a header row.
    ///
    /// A non-empty `column_names` replaces the header names positionally and
    /// must match the header's width. Each column takes the type of the first
    /// cell it sees and keeps it for the rest of the scan, even when later
    /// rows disagree: a blank first cell pins the column to `string`.
    /// Numeric cells feed a per-column profile over every row, not just the
    /// sampled or previewed ones.
    pub fn infer<R: Read>(&self, source: R, column_names: &[String]) -> Result<IngestionResult> {
        self.config
            .validate()
            .map_err(|e| AppError::ValidationError(format!("Invalid ingestion config: {}", e)))?;

        let mut reader = ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .has_headers(true)
            .flexible(true) // Tolerate short and long rows
            .from_reader(source);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(AppError::UnsupportedFormat(
                "Stream has no header row".to_string(),
            ));
        }

        let names = self.resolve_names(&headers, column_names)?;
        let mut decided: Vec<Option<ColumnType>> = vec![None; names.len()];
        let mut preview: Vec<FieldMap> = Vec::new();
        let mut stats = TableStats::default();
        let mut numeric = vec![NumericProfile::default(); names.len()];

        let mut record = StringRecord::new();
        while reader.read_record(&mut record)? {
            let sampling = self
                .config
                .sample_rows
                .map_or(true, |limit| stats.row_count < limit);
            stats.row_count += 1;

            let keep_row = preview.len() < self.config.preview_limit;
            let mut row = FieldMap::new();

            // Fields past the header width are ignored
            for (idx, name) in names.iter().enumerate() {
                let Some(value) = record.get(idx) else {
                    stats.missing_values += 1;
                    continue;
                };

                if value.trim().is_empty() {
                    stats.missing_values += 1;
                }

                if sampling && decided[idx].is_none() {
                    decided[idx] = Some(classify_cell(value));
                }

                if is_numeric_literal(value) {
                    if let Ok(number) = value.trim().parse::<f64>() {
                        if number.is_finite() {
                            numeric[idx].record(stats.row_count, number);
                        }
                    }
                }

                if keep_row {
                    row.insert(name.clone(), value.to_string());
                }
            }

            if keep_row {
                preview.push(row);
            }
        }

        let columns: Vec<ColumnDescriptor> = names
            .into_iter()
            .zip(decided)
            .map(|(name, inferred)| {
                ColumnDescriptor::new(name).with_type(inferred.unwrap_or_default())
            })
            .collect();

        debug!(
            columns = columns.len(),
            rows = stats.row_count,
            preview_rows = preview.len(),
            "Inferred tabular schema"
        );

        Ok(IngestionResult {
            columns,
            preview,
            stats,
            numeric,
        })
    }

    fn resolve_names(&self, headers: &StringRecord, column_names: &[String]) -> Result<Vec<String>> {
        let raw: Vec<String> = if column_names.is_empty() {
            headers.iter().map(str::to_string).collect()
        } else if column_names.len() == headers.len() {
            column_names.to_vec()
        } else {
            return Err(AppError::UnsupportedFormat(format!(
                "Expected {} columns but the header row has {}",
                column_names.len(),
                headers.len()
            )));
        };

        Ok(dedupe_names(raw))
    }
}

/// Keep names unique while preserving order: a repeated `amount` becomes
/// `amount_2`, then `amount_3`.
fn dedupe_names(names: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(names.len());

    for name in names {
        let mut candidate = name.clone();
        let mut suffix = 2;
        while seen.contains(&candidate) {
            candidate = format!("{}_{}", name, suffix);
            suffix += 1;
        }
        seen.insert(candidate.clone());
        unique.push(candidate);
    }

    unique
}
