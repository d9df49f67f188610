//! HTTP access to the remote directory: raw file downloads.
//!
//! One [`HttpDirectory`] wraps one `reqwest::Client`, so every request of a
//! reconciliation pass reuses the same connection pool. The listing side
//! lives in [`crate::listing`].

use crate::config::MirrorConfig;
use crate::error::{SyncError, SyncResult};
use crate::types::NameSet;
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

/// Read side of a mirror source: list file names, download one file.
#[async_trait]
pub trait RemoteDirectory: Send + Sync {
    async fn list_names(&self) -> SyncResult<NameSet>;

    async fn fetch(&self, name: &str) -> SyncResult<Vec<u8>>;
}

/// A remote directory served over HTTP.
pub struct HttpDirectory {
    client: Client,
    base_url: String,
}

impl HttpDirectory {
    /// Builds a directory client for `base_url`, which should end with `/`.
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Option<Duration>,
    ) -> SyncResult<Self> {
        Ok(Self {
            client: build_client(user_agent, timeout)?,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &MirrorConfig) -> SyncResult<Self> {
        Self::new(
            config.source_url.clone(),
            &config.user_agent,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of a named file under this directory.
    pub fn file_url(&self, name: &str) -> String {
        format!("{}{}", self.base_url, urlencoding::encode(name))
    }

    /// Downloads the raw bytes of one file.
    pub async fn fetch(&self, name: &str) -> SyncResult<Vec<u8>> {
        let url = self.file_url(name);
        let resp = self.get(&url).await?;

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| SyncError::Fetch(format!("failed to read body of {url}: {e}")))?;

        debug!("fetched {} bytes from {url}", bytes.len());
        Ok(bytes.to_vec())
    }

    /// Issues a GET and requires a success status.
    pub(crate) async fn get(&self, url: &str) -> SyncResult<Response> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SyncError::Fetch(format!("GET {url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SyncError::Fetch(format!("GET {url} returned {status}")));
        }
        Ok(resp)
    }
}

#[async_trait]
impl RemoteDirectory for HttpDirectory {
    async fn list_names(&self) -> SyncResult<NameSet> {
        HttpDirectory::list_names(self).await
    }

    async fn fetch(&self, name: &str) -> SyncResult<Vec<u8>> {
        HttpDirectory::fetch(self, name).await
    }
}

/// Builds the HTTP client shared by every request of one run.
pub(crate) fn build_client(user_agent: &str, timeout: Option<Duration>) -> SyncResult<Client> {
    let mut builder = Client::builder().user_agent(user_agent);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| SyncError::Config(format!("failed to build HTTP client: {e}")))
}
