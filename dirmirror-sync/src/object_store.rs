//! Flat key/value object store abstraction.

use crate::error::{SyncError, SyncResult};
use crate::types::NameSet;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Content type used when none is given and none can be guessed from the key.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A flat key namespace of byte objects.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Enumerates every key in the store.
    async fn list_keys(&self) -> SyncResult<NameSet>;

    /// Reads an object. A missing key is [`SyncError::NotFound`].
    async fn get_content(&self, key: &str) -> SyncResult<Vec<u8>>;

    /// Creates or overwrites an object.
    ///
    /// Without an explicit `content_type`, one is guessed from the key.
    async fn put(&self, key: &str, content: Vec<u8>, content_type: Option<&str>) -> SyncResult<()>;

    /// Removes an object. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> SyncResult<()>;
}

/// Guesses a MIME type from the key's extension.
pub fn content_type_for(key: &str) -> &'static str {
    let ext = match key.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return DEFAULT_CONTENT_TYPE,
    };
    match ext.as_str() {
        "txt" | "log" => "text/plain",
        "csv" => "text/csv",
        "tsv" => "text/tab-separated-values",
        "json" => "application/json",
        "xml" => "application/xml",
        "html" | "htm" => "text/html",
        "gz" => "application/gzip",
        "zip" => "application/zip",
        "pdf" => "application/pdf",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// An object held by [`MemoryObjectStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub content: Vec<u8>,
    pub content_type: String,
}

/// In-process object store. Counts mutations so callers can assert on them.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, StoredObject>>,
    puts: AtomicUsize,
    deletes: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with `objects`. Seeding is not counted.
    pub fn with_objects<K, V>(objects: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let objects = objects
            .into_iter()
            .map(|(k, v)| {
                let key = k.into();
                let content_type = content_type_for(&key).to_string();
                (
                    key,
                    StoredObject {
                        content: v.into(),
                        content_type,
                    },
                )
            })
            .collect();
        Self {
            objects: RwLock::new(objects),
            ..Self::default()
        }
    }

    pub async fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        self.objects
            .read()
            .await
            .iter()
            .map(|(k, o)| (k.clone(), o.content.clone()))
            .collect()
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Total puts and deletes since construction.
    pub fn mutation_count(&self) -> usize {
        self.put_count() + self.delete_count()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list_keys(&self) -> SyncResult<NameSet> {
        Ok(self.objects.read().await.keys().cloned().collect())
    }

    async fn get_content(&self, key: &str) -> SyncResult<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| o.content.clone())
            .ok_or_else(|| SyncError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, content: Vec<u8>, content_type: Option<&str>) -> SyncResult<()> {
        let content_type = content_type.unwrap_or_else(|| content_type_for(key)).to_string();
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                content,
                content_type,
            },
        );
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, key: &str) -> SyncResult<()> {
        self.objects.write().await.remove(key);
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
