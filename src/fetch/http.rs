//! HTTP backend: plain GETs against a statically hosted snapshot

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::time::Duration;

use super::{FetchError, ResourceFetcher};

/// Client settings taken from configuration
#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
    pub user_agent: Option<String>,
    /// None leaves the platform default in place
    pub timeout: Option<Duration>,
}

pub struct HttpFetcher {
    client: reqwest::Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(base: &str, options: &HttpOptions) -> Result<Self> {
        let base = Url::parse(base).with_context(|| format!("Invalid source URL: {}", base))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("Source URL cannot be used as a base: {}", base);
        }

        let user_agent = options
            .user_agent
            .clone()
            .unwrap_or_else(|| concat!("appdex/", env!("APPDEX_VERSION")).to_string());
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self { client, base })
    }

    /// Append the locator's components to the base path, percent-encoding each
    fn resolve(&self, locator: &str) -> Result<Url, FetchError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidLocator(locator.to_string()))?
            .pop_if_empty()
            .extend(locator.split('/'));
        Ok(url)
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch_bytes(&self, locator: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.resolve(locator)?;
        let transport = |source: reqwest::Error| FetchError::Transport {
            locator: locator.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                locator: locator.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                locator: locator.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        Ok(body.to_vec())
    }

    fn describe(&self) -> String {
        self.base.to_string()
    }
}
