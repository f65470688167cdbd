//! Resource fetching module
//!
//! Handles:
//! - Loading a single named resource from the snapshot source (HTTP or a local directory)
//! - Interpreting it as raw bytes, lossy UTF-8 text, or JSON
//! - Fan-out over many independent fetches with per-item failure isolation
//!
//! Fetchers never retry and never cache; every call is a fresh read.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

pub mod fanout;
pub mod http;
pub mod local;
pub mod locator;

pub use fanout::join_successes;
pub use http::{HttpFetcher, HttpOptions};
pub use local::LocalFetcher;

/// Why a single resource could not be produced
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request never got a response
    #[error("request for {locator} failed: {source}")]
    Transport {
        locator: String,
        #[source]
        source: reqwest::Error,
    },
    /// Local read failed for a reason other than a missing file
    #[error("failed to read {locator}: {source}")]
    Io {
        locator: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{locator} returned HTTP {status}")]
    Status { locator: String, status: u16 },
    #[error("{locator} not found")]
    NotFound { locator: String },
    #[error("{locator} is not valid JSON: {source}")]
    Parse {
        locator: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid resource name '{0}'")]
    InvalidLocator(String),
}

impl FetchError {
    /// True when no response was obtained at all, as opposed to a response
    /// that was missing, unsuccessful or unparseable
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport { .. } | FetchError::Io { .. })
    }
}

/// Read-only access to the snapshot layout, addressed by locators relative
/// to the source root (see [`locator`])
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch a resource as an opaque byte stream
    async fn fetch_bytes(&self, locator: &str) -> Result<Vec<u8>, FetchError>;

    /// Fetch a resource as text; invalid UTF-8 is replaced, not rejected
    async fn fetch_text(&self, locator: &str) -> Result<String, FetchError> {
        let bytes = self.fetch_bytes(locator).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Human-readable description of where resources come from
    fn describe(&self) -> String;
}

/// Fetch a resource and parse it as JSON
pub async fn fetch_json<T, F>(fetcher: &F, locator: &str) -> Result<T, FetchError>
where
    T: DeserializeOwned,
    F: ResourceFetcher + ?Sized,
{
    let bytes = fetcher.fetch_bytes(locator).await?;
    serde_json::from_slice(&bytes).map_err(|source| FetchError::Parse {
        locator: locator.to_string(),
        source,
    })
}

/// Where the snapshot lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Http(String),
    Local(PathBuf),
}

impl Source {
    /// `http(s)://` locations are fetched over the network, `file://` and
    /// anything else is treated as a local directory
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Source::Http(trimmed.to_string())
        } else if let Some(path) = trimmed.strip_prefix("file://") {
            Source::Local(PathBuf::from(path))
        } else {
            Source::Local(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Http(url) => write!(f, "{}", url),
            Source::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Build the fetcher for a source
pub fn connect(source: &Source, options: &HttpOptions) -> anyhow::Result<Arc<dyn ResourceFetcher>> {
    let fetcher: Arc<dyn ResourceFetcher> = match source {
        Source::Http(url) => Arc::new(HttpFetcher::new(url, options)?),
        Source::Local(root) => Arc::new(LocalFetcher::new(root.clone())),
    };
    log::debug!("Reading snapshot from {}", fetcher.describe());
    Ok(fetcher)
}
