use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::domain::error::{AppError, Result};

/// Uploaded files live under one directory, named
/// `{millis}-{record id}-{original name}`
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn ensure_root(&self) -> std::io::Result<()> {
        ensure_dir(&self.root)
    }

    /// Write an uploaded file and return where it was stored
    pub async fn save(&self, record_id: &str, original_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let file_name = sanitize_file_name(original_name)?;
        let path = self.root.join(format!(
            "{}-{}-{}",
            Utc::now().timestamp_millis(),
            record_id,
            file_name
        ));

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::IoError(format!("Failed to store {}: {}", path.display(), e)))?;

        Ok(path)
    }

    pub async fn remove(&self, path: &Path) -> Result<()> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| AppError::IoError(format!("Failed to remove {}: {}", path.display(), e)))
    }
}

/// Keep only the final path component so a client name cannot escape the
/// upload directory
fn sanitize_file_name(original_name: &str) -> Result<String> {
    let name = Path::new(original_name.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_default();

    if name.is_empty() || name == "." || name == ".." {
        return Err(AppError::ValidationError(
            "Please upload a file with a valid name".to_string(),
        ));
    }
    Ok(name)
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("insightboard-test-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_save_prefixes_timestamp_and_id() {
        let root = temp_root();
        let store = UploadStore::new(root.clone());
        let path = store.save("src-1", "sales.csv", b"a,b\n1,2\n").await.unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with("-src-1-sales.csv"));
        assert_eq!(std::fs::read(&path).unwrap(), b"a,b\n1,2\n");

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn test_same_name_does_not_collide() {
        let root = temp_root();
        let store = UploadStore::new(root.clone());
        let first = store.save("id-a", "sales.csv", b"1").await.unwrap();
        let second = store.save("id-b", "sales.csv", b"2").await.unwrap();

        assert_ne!(first, second);
        assert_eq!(std::fs::read(&first).unwrap(), b"1");
        assert_eq!(std::fs::read(&second).unwrap(), b"2");

        store.remove(&first).await.unwrap();
        assert!(!first.exists());
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd").unwrap(), "passwd");
        assert!(sanitize_file_name("").is_err());
        assert!(sanitize_file_name("..").is_err());
    }
}
