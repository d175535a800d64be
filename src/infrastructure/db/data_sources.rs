use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::DataSourceRepository;
use crate::domain::data_source::{DataSource, FileType};
use crate::domain::error::{AppError, Result};
use crate::domain::tabular::ColumnDescriptor;

pub struct SqliteDataSourceRepository {
    pool: SqlitePool,
}

impl SqliteDataSourceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DataSourceRepository for SqliteDataSourceRepository {
    async fn insert(&self, source: &DataSource) -> Result<()> {
        let columns_json = serde_json::to_string(&source.columns)?;

        sqlx::query(
            "INSERT INTO data_sources (id, name, description, file_path, file_type, columns_json, user_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&source.id)
        .bind(&source.name)
        .bind(&source.description)
        .bind(&source.file_path)
        .bind(source.file_type.as_str())
        .bind(columns_json)
        .bind(&source.user_id)
        .bind(source.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert data source: {e}")))?;

        Ok(())
    }

    async fn find_by_id(&self, source_id: &str) -> Result<Option<DataSource>> {
        let entity = sqlx::query_as::<_, DataSourceEntity>(
            "SELECT id, name, description, file_path, file_type, columns_json, user_id, created_at
             FROM data_sources WHERE id = ?",
        )
        .bind(source_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch data source: {e}")))?;

        entity.map(DataSource::try_from).transpose()
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<DataSource>> {
        sqlx::query_as::<_, DataSourceEntity>(
            "SELECT id, name, description, file_path, file_type, columns_json, user_id, created_at
             FROM data_sources WHERE user_id = ? ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list data sources: {e}")))?
        .into_iter()
        .map(DataSource::try_from)
        .collect()
    }
}

// Internal entity for database mapping
#[derive(sqlx::FromRow)]
struct DataSourceEntity {
    id: String,
    name: String,
    description: String,
    file_path: String,
    file_type: String,
    columns_json: String,
    user_id: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<DataSourceEntity> for DataSource {
    type Error = AppError;

    fn try_from(e: DataSourceEntity) -> Result<Self> {
        let columns: Vec<ColumnDescriptor> = serde_json::from_str(&e.columns_json)
            .map_err(|err| AppError::DatabaseError(format!("Corrupt columns for {}: {err}", e.id)))?;

        Ok(Self {
            id: e.id,
            name: e.name,
            description: e.description,
            file_path: e.file_path,
            file_type: FileType::parse(&e.file_type)?,
            columns,
            user_id: e.user_id,
            created_at: e.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tabular::ColumnType;
    use crate::infrastructure::db::connect_pool;

    async fn repository() -> SqliteDataSourceRepository {
        SqliteDataSourceRepository::new(connect_pool("sqlite::memory:").await.unwrap())
    }

    fn source(user: &str) -> DataSource {
        DataSource::new("Sales", "", "data/uploads/1-sales.csv".to_string(), FileType::Csv, user)
    }

    #[tokio::test]
    async fn test_insert_and_fetch() {
        let repo = repository().await;
        let source = source("user-1");
        repo.insert(&source).await.unwrap();

        let loaded = repo.find_by_id(&source.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Sales");
        assert_eq!(loaded.file_type, FileType::Csv);
        assert!(loaded.columns.is_empty());
    }

    #[tokio::test]
    async fn test_columns_round_trip() {
        let repo = repository().await;
        let mut source = source("user-1");
        source.columns = vec![
            ColumnDescriptor::new("date").with_type(ColumnType::Date),
            ColumnDescriptor::new("revenue").with_type(ColumnType::Number),
        ];
        repo.insert(&source).await.unwrap();

        let loaded = repo.find_by_id(&source.id).await.unwrap().unwrap();
        assert_eq!(loaded.columns, source.columns);
    }

    #[tokio::test]
    async fn test_list_filters_by_user() {
        let repo = repository().await;
        repo.insert(&source("user-1")).await.unwrap();
        repo.insert(&source("user-1")).await.unwrap();
        repo.insert(&source("user-2")).await.unwrap();

        assert_eq!(repo.list_by_user("user-1").await.unwrap().len(), 2);
        assert_eq!(repo.list_by_user("user-3").await.unwrap().len(), 0);
    }
}
