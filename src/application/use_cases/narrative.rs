//! Narrative generation over a single numeric series.
//!
//! No model is called: the narrative is one of two fixed templates, filled
//! from [`SeriesSummary`] when a usable series exists and static otherwise.

use serde_json::Value;
use tracing::debug;

use crate::domain::error::Result;
use crate::domain::narrative::{Narrative, SeriesSummary, TrendDirection};

pub const NARRATIVE_TITLE: &str = "Data Analysis Insights";

pub const FALLBACK_CONTENT: &str = "The data shows several interesting patterns that warrant attention. There appears to be a positive trend in the main metrics, with some seasonal variations. Key segments are performing above average, while a few areas may need additional focus.";

pub const FALLBACK_INSIGHTS: [&str; 3] = [
    "Overall positive trend in main performance indicators",
    "Seasonal variations affect metrics with predictable patterns",
    "Some segments consistently outperform others",
];

/// A numeric series picked out of a visualization payload
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSelection {
    pub label: Option<String>,
    pub values: Vec<f64>,
}

/// Pick the first dataset's data array from a chart payload shaped like
/// `{"datasets": [{"label": "...", "data": [..]}]}`.
///
/// Returns `None` when the shape is absent or any entry is not a JSON number.
pub fn select_series(payload: &Value) -> Option<SeriesSelection> {
    let dataset = payload.get("datasets")?.as_array()?.first()?;
    let values = dataset
        .get("data")?
        .as_array()?
        .iter()
        .map(Value::as_f64)
        .collect::<Option<Vec<f64>>>()?;

    let label = dataset
        .get("label")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(SeriesSelection { label, values })
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NarrativeGenerator;

impl NarrativeGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, series: &[f64]) -> Result<SeriesSummary> {
        SeriesSummary::from_series(series)
    }

    /// Data-driven template
    pub fn render(&self, summary: &SeriesSummary, series_label: &str) -> Narrative {
        let average = summary.display_average();
        let peak = summary.display_peak();
        let upward = summary.trend_direction == TrendDirection::Up;

        let mut content = format!(
            "The data analysis reveals an average value of {} across the measured period. ",
            average
        );
        content.push_str(&format!(
            "The peak value of {} was observed at point {}. ",
            peak, summary.peak_index
        ));
        content.push_str(if upward {
            "There is an overall upward trend, indicating positive growth."
        } else {
            "The trend appears to be stable or slightly declining over the period."
        });

        let insights = vec![
            format!("Average value across period: {}", average),
            format!("Peak value of {} at point {}", peak, summary.peak_index),
            if upward {
                "Overall upward trend detected".to_string()
            } else {
                "Trend is stable or slightly declining".to_string()
            },
        ];

        Narrative {
            title: title_for(series_label),
            content,
            insights,
        }
    }

    /// Static template used when no usable series exists
    pub fn fallback(&self, series_label: &str) -> Narrative {
        Narrative {
            title: title_for(series_label),
            content: FALLBACK_CONTENT.to_string(),
            insights: FALLBACK_INSIGHTS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Render `series` or fall back when it is absent or empty. Never fails.
    pub fn generate(&self, series: Option<&[f64]>, series_label: &str) -> Narrative {
        match series.map(|values| self.summarize(values)) {
            Some(Ok(summary)) => self.render(&summary, series_label),
            Some(Err(err)) => {
                debug!(error = %err, "Falling back to default narrative");
                self.fallback(series_label)
            }
            None => self.fallback(series_label),
        }
    }

    /// Narrative for a visualization payload
    pub fn from_visualization(&self, payload: Option<&Value>) -> Narrative {
        match payload.and_then(select_series) {
            Some(selection) => self.generate(
                Some(&selection.values),
                selection.label.as_deref().unwrap_or(""),
            ),
            None => self.fallback(""),
        }
    }
}

fn title_for(series_label: &str) -> String {
    let label = series_label.trim();
    if label.is_empty() {
        NARRATIVE_TITLE.to_string()
    } else {
        format!("{}: {}", NARRATIVE_TITLE, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_declining_series() {
        let generator = NarrativeGenerator::new();
        let narrative = generator.generate(Some(&[10.0, 20.0, 5.0][..]), "");

        assert_eq!(narrative.title, "Data Analysis Insights");
        assert_eq!(
            narrative.content,
            "The data analysis reveals an average value of 11.67 across the measured period. \
             The peak value of 20 was observed at point 2. \
             The trend appears to be stable or slightly declining over the period."
        );
        assert_eq!(
            narrative.insights,
            vec![
                "Average value across period: 11.67",
                "Peak value of 20 at point 2",
                "Trend is stable or slightly declining",
            ]
        );
    }

    #[test]
    fn test_render_rising_series() {
        let narrative = NarrativeGenerator::new().generate(Some(&[1.0, 5.0, 9.0][..]), "Revenue");

        assert_eq!(narrative.title, "Data Analysis Insights: Revenue");
        assert!(narrative.content.contains("average value of 5.00"));
        assert!(narrative.content.contains("peak value of 9 was observed at point 3"));
        assert!(narrative
            .content
            .ends_with("There is an overall upward trend, indicating positive growth."));
        assert_eq!(narrative.insights[2], "Overall upward trend detected");
    }

    #[test]
    fn test_fractional_peak_prints_plainly() {
        let narrative = NarrativeGenerator::new().generate(Some(&[0.5, 2.25][..]), "");
        assert!(narrative.content.contains("peak value of 2.25 "));
    }

    #[test]
    fn test_empty_series_falls_back() {
        let narrative = NarrativeGenerator::new().generate(Some(&[] as &[f64]), "");
        assert_eq!(narrative.content, FALLBACK_CONTENT);
        assert_eq!(narrative.insights, FALLBACK_INSIGHTS.to_vec());
    }

    #[test]
    fn test_absent_series_falls_back() {
        let narrative = NarrativeGenerator::new().generate(None, "");
        assert_eq!(narrative.title, NARRATIVE_TITLE);
        assert_eq!(narrative.content, FALLBACK_CONTENT);
        assert_eq!(narrative.insights.len(), 3);
    }

    #[test]
    fn test_select_first_dataset() {
        let payload = json!({
            "labels": ["Jan", "Feb"],
            "datasets": [
                {"label": "Sales", "data": [3, 4.5]},
                {"label": "Costs", "data": [1, 2]}
            ]
        });
        let selection = select_series(&payload).unwrap();
        assert_eq!(selection.label.as_deref(), Some("Sales"));
        assert_eq!(selection.values, vec![3.0, 4.5]);
    }

    #[test]
    fn test_select_rejects_non_numeric_entries() {
        assert!(select_series(&json!({"datasets": [{"data": [1, "2"]}]})).is_none());
        assert!(select_series(&json!({"datasets": []})).is_none());
        assert!(select_series(&json!({"rows": [1, 2]})).is_none());
    }

    #[test]
    fn test_visualization_without_datasets_falls_back() {
        let generator = NarrativeGenerator::new();
        assert_eq!(
            generator.from_visualization(Some(&json!({"foo": 1}))).content,
            FALLBACK_CONTENT
        );
        assert_eq!(generator.from_visualization(None).content, FALLBACK_CONTENT);
    }

    #[test]
    fn test_visualization_uses_dataset_label() {
        let payload = json!({"datasets": [{"label": "Visits", "data": [2, 8, 4]}]});
        let narrative = NarrativeGenerator::new().from_visualization(Some(&payload));
        assert_eq!(narrative.title, "Data Analysis Insights: Visits");
        assert_eq!(narrative.insights[1], "Peak value of 8 at point 2");
    }
}
