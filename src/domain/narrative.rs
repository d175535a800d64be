use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

/// Direction of a series, comparing only its last element to its first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    #[serde(rename = "up")]
    Up,
    #[serde(rename = "flat-or-down")]
    FlatOrDown,
}

/// Summary statistics of one numeric series. Derived, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSummary {
    /// Arithmetic mean at full precision; rounding happens only when displayed
    pub average: f64,
    pub peak_value: f64,
    /// 1-based position of the first occurrence of `peak_value`
    pub peak_index: usize,
    pub trend_direction: TrendDirection,
}

impl SeriesSummary {
    /// Summarize a non-empty series.
    ///
    /// The trend is a plain last-versus-first comparison, not a fitted line,
    /// so it says nothing about noise in between.
    pub fn from_series(series: &[f64]) -> Result<Self> {
        let (first, last) = match (series.first(), series.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                return Err(AppError::InsufficientData(
                    "numeric series is empty".to_string(),
                ))
            }
        };

        let sum: f64 = series.iter().sum();
        let average = sum / series.len() as f64;

        let mut peak_value = first;
        let mut peak_position = 0;
        for (position, value) in series.iter().enumerate().skip(1) {
            // strict comparison keeps the first occurrence
            if *value > peak_value {
                peak_value = *value;
                peak_position = position;
            }
        }

        let trend_direction = if last > first {
            TrendDirection::Up
        } else {
            TrendDirection::FlatOrDown
        };

        Ok(Self {
            average,
            peak_value,
            peak_index: peak_position + 1,
            trend_direction,
        })
    }

    /// Average formatted for display, two decimals, exact halves rounded
    /// away from zero
    pub fn display_average(&self) -> String {
        format_two_decimals(self.average)
    }

    /// Peak formatted the way a plain number prints (`20`, `2.5`)
    pub fn display_peak(&self) -> String {
        format!("{}", self.peak_value)
    }
}

// `{:.2}` rounds the exact binary value and breaks exact ties to even.
// A double sits exactly halfway between two hundredths only when it is an
// odd multiple of 1/8, so those are rounded by hand.
fn format_two_decimals(value: f64) -> String {
    let eighths = value * 8.0;
    if eighths.is_finite() && eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        let eighths = eighths as i128;
        let hundredths = (25 * eighths + eighths.signum()) / 2;
        let sign = if hundredths < 0 { "-" } else { "" };
        let magnitude = hundredths.unsigned_abs();
        return format!("{}{}.{:02}", sign, magnitude / 100, magnitude % 100);
    }
    format!("{:.2}", value)
}

/// Templated paragraph plus bullet insights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub title: String,
    pub content: String,
    pub insights: Vec<String>,
}
