// ============================================================
// SCHEMA INFERENCE USE CASE
// ============================================================
// Run the blocking tabular scan off the async runtime, bounded by
// a read timeout

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio::time::timeout;
use tracing::{info, warn};

use crate::domain::error::{AppError, Result};
use crate::domain::tabular::{IngestionConfig, IngestionResult};
use crate::infrastructure::tabular::SchemaReader;

#[derive(Debug, Clone)]
pub struct SchemaInferenceUseCase {
    config: IngestionConfig,
    read_timeout: Duration,
}

impl SchemaInferenceUseCase {
    pub fn new(config: IngestionConfig, read_timeout: Duration) -> Self {
        Self {
            config,
            read_timeout,
        }
    }

    pub async fn infer_file(&self, path: &Path, column_names: &[String]) -> Result<IngestionResult> {
        let path: PathBuf = path.to_path_buf();
        let names = column_names.to_vec();
        let config = self.config.clone();
        let label = path.display().to_string();

        self.run_blocking(label, move || {
            SchemaReader::new(config).infer_file(&path, &names)
        })
        .await
    }

    pub async fn infer_bytes(&self, bytes: Vec<u8>, column_names: &[String]) -> Result<IngestionResult> {
        let names = column_names.to_vec();
        let config = self.config.clone();
        let label = format!("<{} byte upload>", bytes.len());

        self.run_blocking(label, move || {
            SchemaReader::new(config).infer(Cursor::new(bytes), &names)
        })
        .await
    }

    async fn run_blocking<F>(&self, label: String, job: F) -> Result<IngestionResult>
    where
        F: FnOnce() -> Result<IngestionResult> + Send + 'static,
    {
        let start = Instant::now();

        let joined = timeout(self.read_timeout, tokio::task::spawn_blocking(job))
            .await
            .map_err(|_| {
                warn!(source = %label, timeout_secs = self.read_timeout.as_secs(), "Tabular read timed out");
                AppError::Timeout(format!(
                    "Reading {} took longer than {:?}",
                    label, self.read_timeout
                ))
            })?;

        let result = joined
            .map_err(|e| AppError::Internal(format!("Schema inference worker failed: {}", e)))??;

        info!(
            source = %label,
            columns = result.columns.len(),
            rows = result.stats.row_count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Schema inferred"
        );

        Ok(result)
    }
}
