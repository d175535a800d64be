use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};
use validator::Validate;

use super::narrative::NarrativeGenerator;
use crate::domain::error::{AppError, Result};
use crate::domain::narrative::Narrative;
use crate::domain::report::{Report, ReportInput, ReportPatch};
use crate::infrastructure::db::ReportRepository;

pub struct ReportUseCase {
    repository: Arc<dyn ReportRepository>,
    narratives: NarrativeGenerator,
}

impl ReportUseCase {
    pub fn new(repository: Arc<dyn ReportRepository>) -> Self {
        Self {
            repository,
            narratives: NarrativeGenerator::new(),
        }
    }

    pub async fn create(&self, user_id: &str, input: ReportInput) -> Result<Report> {
        let report = Report::new(input, user_id);
        report.validate()?;
        self.repository.insert(&report).await?;

        info!(report_id = %report.id, user_id, "Report created");
        Ok(report)
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Report>> {
        self.repository.list_by_user(user_id).await
    }

    pub async fn get(&self, user_id: &str, report_id: &str) -> Result<Report> {
        let report = self
            .repository
            .find_by_id(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Report not found".to_string()))?;

        if !report.is_owned_by(user_id) {
            warn!(report_id, user_id, "Report access denied");
            return Err(AppError::Unauthorized(
                "Not authorized to access this report".to_string(),
            ));
        }
        Ok(report)
    }

    pub async fn update(&self, user_id: &str, report_id: &str, patch: ReportPatch) -> Result<Report> {
        let mut report = self.get(user_id, report_id).await?;
        report.apply(patch);
        report.validate()?;
        self.repository.update(&report).await?;
        Ok(report)
    }

    pub async fn delete(&self, user_id: &str, report_id: &str) -> Result<()> {
        self.get(user_id, report_id).await?;
        self.repository.delete(report_id).await?;
        info!(report_id, user_id, "Report deleted");
        Ok(())
    }

    /// Render a narrative for the visualization payload and append it to the report
    pub async fn generate_narrative(
        &self,
        user_id: &str,
        report_id: &str,
        visualization_data: Option<&Value>,
    ) -> Result<Narrative> {
        let mut report = self.get(user_id, report_id).await?;

        let narrative = self.narratives.from_visualization(visualization_data);
        report.narratives.push(narrative.clone());
        report.last_updated = chrono::Utc::now();
        self.repository.update(&report).await?;

        info!(
            report_id,
            narratives = report.narratives.len(),
            "Narrative appended to report"
        );
        Ok(narrative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::narrative::FALLBACK_CONTENT;
    use crate::infrastructure::db::{connect_pool, SqliteReportRepository};
    use serde_json::json;

    async fn use_case() -> ReportUseCase {
        let pool = connect_pool("sqlite::memory:").await.unwrap();
        ReportUseCase::new(Arc::new(SqliteReportRepository::new(pool)))
    }

    fn input(title: &str) -> ReportInput {
        serde_json::from_value(json!({ "title": title })).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let use_case = use_case().await;
        let report = use_case.create("u1", input("Monthly")).await.unwrap();

        let loaded = use_case.get("u1", &report.id).await.unwrap();
        assert_eq!(loaded.title, "Monthly");
        assert!(loaded.narratives.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_long_title() {
        let use_case = use_case().await;
        let err = use_case.create("u1", input(&"t".repeat(101))).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_other_user_is_unauthorized() {
        let use_case = use_case().await;
        let report = use_case.create("u1", input("Monthly")).await.unwrap();

        assert!(matches!(
            use_case.get("u2", &report.id).await.unwrap_err(),
            AppError::Unauthorized(_)
        ));
        assert!(matches!(
            use_case.delete("u2", &report.id).await.unwrap_err(),
            AppError::Unauthorized(_)
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let use_case = use_case().await;
        let report = use_case.create("u1", input("Monthly")).await.unwrap();

        let patch: ReportPatch = serde_json::from_value(json!({"description": "Updated"})).unwrap();
        let updated = use_case.update("u1", &report.id, patch).await.unwrap();
        assert_eq!(updated.description, "Updated");
        assert_eq!(updated.title, "Monthly");

        use_case.delete("u1", &report.id).await.unwrap();
        assert!(matches!(
            use_case.get("u1", &report.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_generate_narrative_appends() {
        let use_case = use_case().await;
        let report = use_case.create("u1", input("Monthly")).await.unwrap();

        let payload = json!({"datasets": [{"data": [10, 20, 5]}]});
        let narrative = use_case
            .generate_narrative("u1", &report.id, Some(&payload))
            .await
            .unwrap();
        assert!(narrative.content.contains("average value of 11.67"));

        let fallback = use_case
            .generate_narrative("u1", &report.id, None)
            .await
            .unwrap();
        assert_eq!(fallback.content, FALLBACK_CONTENT);

        let stored = use_case.get("u1", &report.id).await.unwrap();
        assert_eq!(stored.narratives, vec![narrative, fallback]);
    }

    #[tokio::test]
    async fn test_generate_narrative_missing_report() {
        let use_case = use_case().await;
        let err = use_case
            .generate_narrative("u1", "missing", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
