use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::error::{AppError, Result};
use crate::domain::tabular::ColumnDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Csv,
    Json,
    Excel,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Csv => "csv",
            FileType::Json => "json",
            FileType::Excel => "excel",
        }
    }

    /// Resolve the file type from an uploaded file's name
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = std::path::Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(FileType::Csv),
            "json" => Ok(FileType::Json),
            "xls" | "xlsx" | "excel" => Ok(FileType::Excel),
            "" => Err(AppError::ValidationError(format!(
                "File '{}' has no extension",
                file_name
            ))),
            other => Err(AppError::ValidationError(format!(
                "File type '{}' is not supported",
                other
            ))),
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "csv" => Ok(FileType::Csv),
            "json" => Ok(FileType::Json),
            "excel" => Ok(FileType::Excel),
            other => Err(AppError::DatabaseError(format!(
                "Unknown stored file type '{}'",
                other
            ))),
        }
    }
}

/// An uploaded data file and its inferred schema
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub id: String,
    #[validate(length(min = 1, max = 50, message = "Name must be 1 to 50 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "Description cannot be more than 500 characters"))]
    pub description: String,
    pub file_path: String,
    pub file_type: FileType,
    pub columns: Vec<ColumnDescriptor>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl DataSource {
    pub fn new(
        name: &str,
        description: &str,
        file_path: String,
        file_type: FileType,
        user_id: &str,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            description: description.to_string(),
            file_path,
            file_type,
            columns: Vec::new(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Summary counts and insight sentences for one data source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub missing_values: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_type: Option<String>,
    pub summary: AnalysisSummary,
    pub insights: Vec<String>,
}
