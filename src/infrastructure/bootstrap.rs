use std::sync::Arc;

use tracing::{error, info};

use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::connect_pool;
use crate::infrastructure::storage::UploadStore;
use crate::interfaces::AppState;

/// Prepare the upload directory and database, then wire the use cases
pub async fn setup(config: &AppConfig) -> Result<Arc<AppState>> {
    UploadStore::new(config.upload_dir.clone())
        .ensure_root()
        .map_err(|err| {
            error!(
                error = %err,
                upload_dir = %config.upload_dir.display(),
                "Failed to create upload dir"
            );
            err
        })?;

    let pool = connect_pool(&config.database_url).await.map_err(|err| {
        error!(error = %err, database_url = %config.database_url, "Failed to open database");
        err
    })?;

    info!(
        upload_dir = %config.upload_dir.display(),
        preview_limit = config.preview_limit,
        "Application state ready"
    );

    Ok(Arc::new(AppState::new(config, pool)))
}
