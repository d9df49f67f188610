//! Append-only JSON snapshot ingestion.
//!
//! Fetches a JSON document from a REST endpoint and stores it under a fresh
//! timestamped key. It never lists, reads or deletes, so it shares nothing
//! with the reconciliation pass beyond [`ObjectStore::put`].

use crate::config::IngestConfig;
use crate::error::{SyncError, SyncResult};
use crate::fetcher::build_client;
use crate::object_store::ObjectStore;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Key for a snapshot taken at `at`: `<prefix>_<YYYYMMDD_HHMMSS>.json` in UTC.
pub fn snapshot_key(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{prefix}_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// One-shot ingestion job writing into its own store.
pub struct SnapshotIngest {
    client: Client,
    api_url: String,
    key_prefix: String,
    store: Arc<dyn ObjectStore>,
}

impl SnapshotIngest {
    pub fn new(config: &IngestConfig, store: Arc<dyn ObjectStore>) -> SyncResult<Self> {
        Ok(Self {
            client: build_client(
                &config.user_agent,
                config.request_timeout_secs.map(Duration::from_secs),
            )?,
            api_url: config.api_url.clone(),
            key_prefix: config.key_prefix.clone(),
            store,
        })
    }

    /// Fetches, stamps and writes one snapshot. Returns the key written.
    pub async fn run(&self) -> SyncResult<String> {
        self.run_at(Utc::now()).await
    }

    /// Like [`run`](Self::run) with an explicit timestamp.
    pub async fn run_at(&self, at: DateTime<Utc>) -> SyncResult<String> {
        let document = self.fetch_document().await?;
        let body = serde_json::to_vec(&document)?;
        let key = snapshot_key(&self.key_prefix, at);

        self.store
            .put(&key, body, Some(JSON_CONTENT_TYPE))
            .await?;

        info!("ingested snapshot {key}");
        Ok(key)
    }

    async fn fetch_document(&self) -> SyncResult<serde_json::Value> {
        let url = &self.api_url;
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

        let body = resp
            .bytes()
            .await
            .map_err(|e| SyncError::Fetch(format!("failed to read body of {url}: {e}")))?;
        Ok(serde_json::from_slice(&body)?)
    }
}
