//! Local directory backend: the snapshot layout read straight from disk

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::{FetchError, ResourceFetcher};

pub struct LocalFetcher {
    root: PathBuf,
}

impl LocalFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ResourceFetcher for LocalFetcher {
    async fn fetch_bytes(&self, locator: &str) -> Result<Vec<u8>, FetchError> {
        let path = locator
            .split('/')
            .fold(self.root.clone(), |path, part| path.join(part));

        tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                FetchError::NotFound {
                    locator: locator.to_string(),
                }
            } else {
                FetchError::Io {
                    locator: locator.to_string(),
                    source,
                }
            }
        })
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::fetch_json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_text_and_json() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("data/Notes")).unwrap();
        std::fs::write(temp.path().join("data/index.json"), r#"{"apps":["Notes"]}"#).unwrap();
        std::fs::write(temp.path().join("data/Notes/sandbox.txt"), "Sandboxed: Yes\n").unwrap();

        let fetcher = LocalFetcher::new(temp.path());
        let index: serde_json::Value = fetch_json(&fetcher, "data/index.json").await.unwrap();
        assert_eq!(index["apps"][0], "Notes");
        assert_eq!(
            fetcher.fetch_text("data/Notes/sandbox.txt").await.unwrap(),
            "Sandboxed: Yes\n"
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let fetcher = LocalFetcher::new(temp.path());

        let err = fetcher.fetch_bytes("data/index.json").await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("data")).unwrap();
        std::fs::write(temp.path().join("data/index.json"), "{ apps: ").unwrap();

        let fetcher = LocalFetcher::new(temp.path());
        let err = fetch_json::<serde_json::Value, _>(&fetcher, "data/index.json")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("data")).unwrap();
        std::fs::write(temp.path().join("data/blob.txt"), [0x66, 0x6f, 0xff, 0x6f]).unwrap();

        let fetcher = LocalFetcher::new(temp.path());
        assert_eq!(fetcher.fetch_text("data/blob.txt").await.unwrap(), "fo\u{fffd}o");
    }
}
