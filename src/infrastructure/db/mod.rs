pub mod data_sources;
pub mod reports;
pub mod sqlite;

use async_trait::async_trait;

use crate::domain::data_source::DataSource;
use crate::domain::error::Result;
use crate::domain::report::Report;

pub use data_sources::SqliteDataSourceRepository;
pub use reports::SqliteReportRepository;
pub use sqlite::connect_pool;

/// Persistence for uploaded data sources; columns are stored with the record
#[async_trait]
pub trait DataSourceRepository: Send + Sync {
    async fn insert(&self, source: &DataSource) -> Result<()>;
    async fn find_by_id(&self, source_id: &str) -> Result<Option<DataSource>>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<DataSource>>;
}

/// Persistence for reports
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn insert(&self, report: &Report) -> Result<()>;
    async fn update(&self, report: &Report) -> Result<()>;
    async fn find_by_id(&self, report_id: &str) -> Result<Option<Report>>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Report>>;
    async fn delete(&self, report_id: &str) -> Result<()>;
}
