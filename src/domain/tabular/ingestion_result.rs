use serde::{Deserialize, Serialize};

use super::{ColumnDescriptor, FieldMap};
use crate::domain::narrative::{SeriesSummary, TrendDirection};

/// Schema and bounded preview produced by one ingestion pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionResult {
    pub columns: Vec<ColumnDescriptor>,
    pub preview: Vec<FieldMap>,
    #[serde(skip)]
    pub stats: TableStats,
    /// One profile per column, in column order
    #[serde(skip)]
    pub numeric: Vec<NumericProfile>,
}

/// Counts gathered while streaming the whole table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStats {
    pub row_count: usize,
    /// Blank cells plus cells missing from short rows
    pub missing_values: usize,
}

/// Running statistics over the numeric cells of one column.
///
/// Rows are 1-based data rows (the header is not counted); cells that are
/// not numeric literals are skipped without shifting later row numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumericProfile {
    pub count: usize,
    pub sum: f64,
    pub first: Option<f64>,
    pub last: Option<f64>,
    /// Largest value and the row it first appears on
    pub peak: Option<(f64, usize)>,
}

impl NumericProfile {
    pub fn record(&mut self, row: usize, value: f64) {
        self.count += 1;
        self.sum += value;
        if self.first.is_none() {
            self.first = Some(value);
        }
        self.last = Some(value);
        match self.peak {
            Some((peak, _)) if value <= peak => {}
            _ => self.peak = Some((value, row)),
        }
    }

    /// Summary with `peak_index` as a data row number; `None` when no
    /// numeric cell was seen
    pub fn summary(&self) -> Option<SeriesSummary> {
        let (first, last, (peak_value, peak_row)) = (self.first?, self.last?, self.peak?);

        Some(SeriesSummary {
            average: self.sum / self.count as f64,
            peak_value,
            peak_index: peak_row,
            trend_direction: if last > first {
                TrendDirection::Up
            } else {
                TrendDirection::FlatOrDown
            },
        })
    }
}
