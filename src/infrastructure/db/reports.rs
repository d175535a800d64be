use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;

use super::ReportRepository;
use crate::domain::error::{AppError, Result};
use crate::domain::report::Report;

pub struct SqliteReportRepository {
    pool: SqlitePool,
}

impl SqliteReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const REPORT_COLUMNS: &str = "id, title, description, data_sources_json, visualizations_json, narratives_json, user_id, created_at, last_updated";

#[async_trait]
impl ReportRepository for SqliteReportRepository {
    async fn insert(&self, report: &Report) -> Result<()> {
        sqlx::query(
            "INSERT INTO reports (id, title, description, data_sources_json, visualizations_json, narratives_json, user_id, created_at, last_updated)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&report.id)
        .bind(&report.title)
        .bind(&report.description)
        .bind(serde_json::to_string(&report.data_sources)?)
        .bind(serde_json::to_string(&report.visualizations)?)
        .bind(serde_json::to_string(&report.narratives)?)
        .bind(&report.user_id)
        .bind(report.created_at)
        .bind(report.last_updated)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert report: {e}")))?;

        Ok(())
    }

    async fn update(&self, report: &Report) -> Result<()> {
        let result = sqlx::query(
            "UPDATE reports
             SET title = ?, description = ?, data_sources_json = ?, visualizations_json = ?,
                 narratives_json = ?, last_updated = ?
             WHERE id = ?",
        )
        .bind(&report.title)
        .bind(&report.description)
        .bind(serde_json::to_string(&report.data_sources)?)
        .bind(serde_json::to_string(&report.visualizations)?)
        .bind(serde_json::to_string(&report.narratives)?)
        .bind(report.last_updated)
        .bind(&report.id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update report: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Report not found: {}", report.id)));
        }
        Ok(())
    }

    async fn find_by_id(&self, report_id: &str) -> Result<Option<Report>> {
        let entity = sqlx::query_as::<_, ReportEntity>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?"
        ))
        .bind(report_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch report: {e}")))?;

        entity.map(Report::try_from).transpose()
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Report>> {
        sqlx::query_as::<_, ReportEntity>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE user_id = ? ORDER BY created_at ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list reports: {e}")))?
        .into_iter()
        .map(Report::try_from)
        .collect()
    }

    async fn delete(&self, report_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM reports WHERE id = ?")
            .bind(report_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete report: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Report not found: {}", report_id)));
        }
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ReportEntity {
    id: String,
    title: String,
    description: String,
    data_sources_json: String,
    visualizations_json: String,
    narratives_json: String,
    user_id: String,
    created_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
}

fn decode<T: DeserializeOwned>(report_id: &str, field: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| {
        AppError::DatabaseError(format!("Corrupt {field} for report {report_id}: {e}"))
    })
}

impl TryFrom<ReportEntity> for Report {
    type Error = AppError;

    fn try_from(e: ReportEntity) -> Result<Self> {
        let data_sources = decode(&e.id, "data sources", &e.data_sources_json)?;
        let visualizations = decode(&e.id, "visualizations", &e.visualizations_json)?;
        let narratives = decode(&e.id, "narratives", &e.narratives_json)?;

        Ok(Self {
            id: e.id,
            title: e.title,
            description: e.description,
            data_sources,
            visualizations,
            narratives,
            user_id: e.user_id,
            created_at: e.created_at,
            last_updated: e.last_updated,
        })
    }
}
