use std::sync::Arc;

use sqlx::SqlitePool;

use crate::application::{
    DataSourceUseCase, NarrativeGenerator, ReportUseCase, SchemaInferenceUseCase,
};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::{SqliteDataSourceRepository, SqliteReportRepository};
use crate::infrastructure::storage::UploadStore;

/// Use cases shared by every request handler
pub struct AppState {
    pub data_source_use_case: DataSourceUseCase,
    pub report_use_case: ReportUseCase,
    pub schema_inference_use_case: SchemaInferenceUseCase,
    pub narrative_generator: NarrativeGenerator,
}

impl AppState {
    /// Wire the SQLite repositories and the upload store into the use cases
    pub fn new(config: &AppConfig, pool: SqlitePool) -> Self {
        let inference = SchemaInferenceUseCase::new(config.ingestion(), config.read_timeout());

        let data_source_use_case = DataSourceUseCase::new(
            Arc::new(SqliteDataSourceRepository::new(pool.clone())),
            UploadStore::new(config.upload_dir.clone()),
            inference.clone(),
        );
        let report_use_case = ReportUseCase::new(Arc::new(SqliteReportRepository::new(pool)));

        Self {
            data_source_use_case,
            report_use_case,
            schema_inference_use_case: inference,
            narrative_generator: NarrativeGenerator::new(),
        }
    }
}
