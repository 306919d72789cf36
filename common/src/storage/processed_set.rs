use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::AppError;

/// Persisted ledger of source URLs the pipeline has already evaluated.
///
/// Stored as a pretty-printed JSON array of strings in insertion order.
/// URLs are only ever appended, and every append rewrites the whole file
/// before returning.
#[derive(Debug)]
pub struct ProcessedSetStore {
    path: PathBuf,
    urls: Vec<String>,
    index: HashSet<String>,
}

impl ProcessedSetStore {
    /// Load the ledger from `path`.
    ///
    /// A missing or unreadable file starts an empty ledger; the next
    /// `mark_processed` will overwrite it.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let urls = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(urls) => urls,
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "Processed set is not a JSON string array; starting empty"
                    );
                    Vec::new()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "Failed to read processed set; starting empty"
                );
                Vec::new()
            }
        };

        Self::from_urls(path, urls)
    }

    fn from_urls(path: PathBuf, loaded: Vec<String>) -> Self {
        let mut index = HashSet::with_capacity(loaded.len());
        let mut urls = Vec::with_capacity(loaded.len());
        for url in loaded {
            if index.insert(url.clone()) {
                urls.push(url);
            }
        }
        debug!(path = %path.display(), count = urls.len(), "Loaded processed set");

        Self { path, urls, index }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains(url)
    }

    /// Record `url` as evaluated and rewrite the ledger file.
    pub async fn mark_processed(&mut self, url: &str) -> Result<(), AppError> {
        if self.index.insert(url.to_string()) {
            self.urls.push(url.to_string());
        }
        self.persist().await
    }

    /// URLs in the order they were recorded.
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    async fn persist(&self) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(&self.urls)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn read_back(path: &Path) -> Vec<String> {
        let raw = tokio::fs::read_to_string(path).await.expect("read ledger");
        serde_json::from_str(&raw).expect("ledger is a JSON array")
    }

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let dir = tempdir().expect("tempdir");
        let store = ProcessedSetStore::load(dir.path().join("checked.json")).await;
        assert!(store.is_empty());
        assert!(!store.contains("https://cdn.example/a.png"));
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("checked.json");
        tokio::fs::write(&path, "{ not json").await.expect("write");

        let store = ProcessedSetStore::load(&path).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_mark_processed_rewrites_file_each_time() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("checked.json");
        let mut store = ProcessedSetStore::load(&path).await;

        store
            .mark_processed("https://cdn.example/a.png")
            .await
            .expect("mark a");
        assert_eq!(read_back(&path).await, vec!["https://cdn.example/a.png"]);

        store
            .mark_processed("https://cdn.example/b.jpg")
            .await
            .expect("mark b");
        store
            .mark_processed("https://cdn.example/a.png")
            .await
            .expect("mark a again");

        assert_eq!(
            read_back(&path).await,
            vec!["https://cdn.example/a.png", "https://cdn.example/b.jpg"]
        );
        assert_eq!(store.len(), 2);

        let raw = tokio::fs::read_to_string(&path).await.expect("read");
        assert!(raw.contains("\n  \"https://cdn.example/a.png\""));
    }

    #[tokio::test]
    async fn test_reload_keeps_order_and_drops_duplicates() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("checked.json");
        tokio::fs::write(&path, r#"["u1", "u2", "u1", "u3"]"#)
            .await
            .expect("write");

        let store = ProcessedSetStore::load(&path).await;
        assert_eq!(store.urls(), ["u1", "u2", "u3"]);
        assert!(store.contains("u2"));
        assert!(!store.contains("u4"));
    }
}
