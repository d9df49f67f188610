//! Shared fakes and fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use dirmirror_sync::{MemoryObjectStore, NameSet, ObjectStore, RemoteDirectory, SyncError, SyncResult};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Builds an IIS-style listing page with a parent link and the given anchors.
pub fn listing_page(entries: &[&str]) -> String {
    let mut html = String::from(
        "<html><head><title>download.example.org - /pub/</title></head><body><pre>\
         <a href=\"/\">[To Parent Directory]</a><br>",
    );
    for entry in entries {
        html.push_str(&format!(
            "  1/2/2024  8:30 AM        1024 <a href=\"/pub/{entry}\">{entry}</a><br>"
        ));
    }
    html.push_str("</pre></body></html>");
    html
}

/// Remote directory held in memory. Names listed in `failing` fail to fetch.
#[derive(Default)]
pub struct MemoryDirectory {
    files: RwLock<BTreeMap<String, Vec<u8>>>,
    failing: RwLock<BTreeSet<String>>,
    fetches: AtomicUsize,
}

impl MemoryDirectory {
    pub fn with_files<K, V>(files: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        Self {
            files: RwLock::new(files.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
            ..Self::default()
        }
    }

    pub async fn set(&self, name: &str, content: &[u8]) {
        self.files.write().await.insert(name.into(), content.to_vec());
    }

    pub async fn remove(&self, name: &str) {
        self.files.write().await.remove(name);
    }

    pub async fn fail_fetch(&self, name: &str) {
        self.failing.write().await.insert(name.into());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteDirectory for MemoryDirectory {
    async fn list_names(&self) -> SyncResult<NameSet> {
        Ok(self.files.read().await.keys().cloned().collect())
    }

    async fn fetch(&self, name: &str) -> SyncResult<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.read().await.contains(name) {
            return Err(SyncError::Fetch(format!("GET {name} returned 503 Service Unavailable")));
        }
        self.files
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| SyncError::Fetch(format!("GET {name} returned 404 Not Found")))
    }
}

/// Store wrapper whose puts or deletes fail for chosen keys.
pub struct FaultyStore {
    pub inner: Arc<MemoryObjectStore>,
    failing_puts: BTreeSet<String>,
    failing_deletes: BTreeSet<String>,
}

impl FaultyStore {
    pub fn new(inner: Arc<MemoryObjectStore>) -> Self {
        Self {
            inner,
            failing_puts: BTreeSet::new(),
            failing_deletes: BTreeSet::new(),
        }
    }

    pub fn fail_put(mut self, key: &str) -> Self {
        self.failing_puts.insert(key.into());
        self
    }

    pub fn fail_delete(mut self, key: &str) -> Self {
        self.failing_deletes.insert(key.into());
        self
    }
}

#[async_trait]
impl ObjectStore for FaultyStore {
    async fn list_keys(&self) -> SyncResult<NameSet> {
        self.inner.list_keys().await
    }

    async fn get_content(&self, key: &str) -> SyncResult<Vec<u8>> {
        self.inner.get_content(key).await
    }

    async fn put(&self, key: &str, content: Vec<u8>, content_type: Option<&str>) -> SyncResult<()> {
        if self.failing_puts.contains(key) {
            return Err(SyncError::Store(format!("upload failed for {key}: AccessDenied")));
        }
        self.inner.put(key, content, content_type).await
    }

    async fn delete(&self, key: &str) -> SyncResult<()> {
        if self.failing_deletes.contains(key) {
            return Err(SyncError::Store(format!("delete failed for {key}: AccessDenied")));
        }
        self.inner.delete(key).await
    }
}

pub fn names(items: &[&str]) -> NameSet {
    items.iter().map(|s| s.to_string()).collect()
}
