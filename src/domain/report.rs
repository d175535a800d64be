use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::domain::narrative::Narrative;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationKind {
    Bar,
    Line,
    Pie,
    Scatter,
    Area,
    Table,
}

/// One chart of a report. `config` and `data` are opaque to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visualization {
    #[serde(rename = "type")]
    pub kind: VisualizationKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    #[validate(length(min = 1, max = 100, message = "Title must be 1 to 100 characters"))]
    pub title: String,
    #[validate(length(max = 500, message = "Description cannot be more than 500 characters"))]
    pub description: String,
    pub data_sources: Vec<String>,
    pub visualizations: Vec<Visualization>,
    pub narratives: Vec<Narrative>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub data_sources: Vec<String>,
    #[serde(default)]
    pub visualizations: Vec<Visualization>,
    #[serde(default)]
    pub narratives: Vec<Narrative>,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub data_sources: Option<Vec<String>>,
    pub visualizations: Option<Vec<Visualization>>,
    pub narratives: Option<Vec<Narrative>>,
}

impl Report {
    pub fn new(input: ReportInput, user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: input.title.trim().to_string(),
            description: input.description.unwrap_or_default(),
            data_sources: input.data_sources,
            visualizations: input.visualizations,
            narratives: input.narratives,
            user_id: user_id.to_string(),
            created_at: now,
            last_updated: now,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    pub fn apply(&mut self, patch: ReportPatch) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(data_sources) = patch.data_sources {
            self.data_sources = data_sources;
        }
        if let Some(visualizations) = patch.visualizations {
            self.visualizations = visualizations;
        }
        if let Some(narratives) = patch.narratives {
            self.narratives = narratives;
        }
        self.last_updated = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str) -> ReportInput {
        ReportInput {
            title: title.to_string(),
            description: None,
            data_sources: Vec::new(),
            visualizations: Vec::new(),
            narratives: Vec::new(),
        }
    }

    #[test]
    fn test_blank_title_rejected() {
        let report = Report::new(input("   "), "user-1");
        assert!(report.validate().is_err());
    }

    #[test]
    fn test_patch_keeps_absent_fields() {
        let mut report = Report::new(input("Quarterly"), "user-1");
        report.description = "kept".to_string();
        report.apply(ReportPatch {
            title: Some(" Q3 ".to_string()),
            ..Default::default()
        });
        assert_eq!(report.title, "Q3");
        assert_eq!(report.description, "kept");
    }

    #[test]
    fn test_visualization_kind_is_checked() {
        let ok: Visualization = serde_json::from_str(r#"{"type":"line"}"#).unwrap();
        assert_eq!(ok.kind, VisualizationKind::Line);
        assert!(serde_json::from_str::<Visualization>(r#"{"type":"radar"}"#).is_err());
    }
}
