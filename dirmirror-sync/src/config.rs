//! Mirror and ingestion configuration.

use crate::error::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Client identifier sent with every request to the listing server.
pub const DEFAULT_USER_AGENT: &str = concat!("dirmirror/", env!("CARGO_PKG_VERSION"));

/// Configuration for one mirror target: a listing URL and the bucket it converges.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Directory listing URL. File URLs are formed as `source_url + name`.
    pub source_url: String,

    /// Bucket whose key space mirrors the listing.
    pub bucket: String,

    /// AWS region. `None` resolves it from the environment or profile.
    pub region: Option<String>,

    /// Optional S3 endpoint override (for MinIO and other S3-compatible servers).
    pub endpoint_override: Option<String>,

    /// Value of the `User-Agent` header. Some listing servers reject anonymous clients.
    pub user_agent: String,

    /// Per-request timeout. `None` keeps the HTTP client default.
    pub request_timeout_secs: Option<u64>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            source_url: "https://download.bls.gov/pub/time.series/pr/".to_string(),
            bucket: "rearc-series-data".to_string(),
            region: None,
            endpoint_override: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl MirrorConfig {
    /// Loads a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> SyncResult<Self> {
        read_json(path.as_ref())
    }

    /// Checks the config and normalises `source_url` to end with `/`.
    pub fn validate(mut self) -> SyncResult<Self> {
        check_http_url("source_url", &self.source_url)?;
        if !self.source_url.ends_with('/') {
            self.source_url.push('/');
        }
        check_non_empty("bucket", &self.bucket)?;
        check_non_empty("user_agent", &self.user_agent)?;
        if let Some(ref endpoint) = self.endpoint_override {
            check_http_url("endpoint_override", endpoint)?;
        }
        Ok(self)
    }

    pub fn store_target(&self) -> StoreTarget {
        StoreTarget {
            bucket: self.bucket.clone(),
            region: self.region.clone(),
            endpoint_override: self.endpoint_override.clone(),
        }
    }
}

/// Configuration for the append-only JSON snapshot ingestion job.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// REST endpoint returning the JSON document to snapshot.
    pub api_url: String,

    /// Bucket that receives the snapshots.
    pub bucket: String,

    /// Snapshot keys are `<key_prefix>_<YYYYMMDD_HHMMSS>.json`.
    pub key_prefix: String,

    pub region: Option<String>,

    pub endpoint_override: Option<String>,

    pub user_agent: String,

    pub request_timeout_secs: Option<u64>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            api_url: "https://honolulu-api.datausa.io/tesseract/data.jsonrecords\
                      ?cube=acs_yg_total_population_1&drilldowns=Year%2CNation\
                      &locale=en&measures=Population"
                .to_string(),
            bucket: "honolulu-population-data".to_string(),
            key_prefix: "honolulu-population-data".to_string(),
            region: None,
            endpoint_override: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: Some(15),
        }
    }
}

impl IngestConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> SyncResult<Self> {
        read_json(path.as_ref())
    }

    pub fn validate(self) -> SyncResult<Self> {
        check_http_url("api_url", &self.api_url)?;
        check_non_empty("bucket", &self.bucket)?;
        check_non_empty("key_prefix", &self.key_prefix)?;
        check_non_empty("user_agent", &self.user_agent)?;
        if let Some(ref endpoint) = self.endpoint_override {
            check_http_url("endpoint_override", endpoint)?;
        }
        Ok(self)
    }

    pub fn store_target(&self) -> StoreTarget {
        StoreTarget {
            bucket: self.bucket.clone(),
            region: self.region.clone(),
            endpoint_override: self.endpoint_override.clone(),
        }
    }
}

/// Where an [`S3ObjectStore`](crate::s3_store::S3ObjectStore) points.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreTarget {
    pub bucket: String,
    pub region: Option<String>,
    pub endpoint_override: Option<String>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> SyncResult<T> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| SyncError::Config(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| SyncError::Config(format!("cannot parse {}: {e}", path.display())))
}

fn check_http_url(field: &str, value: &str) -> SyncResult<()> {
    let url = reqwest::Url::parse(value)
        .map_err(|e| SyncError::Config(format!("{field} is not a valid URL ({value}): {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(SyncError::Config(format!(
            "{field} must use http or https, got {other}"
        ))),
    }
}

fn check_non_empty(field: &str, value: &str) -> SyncResult<()> {
    if value.trim().is_empty() {
        return Err(SyncError::Config(format!("{field} must not be empty")));
    }
    Ok(())
}
