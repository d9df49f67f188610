//! Directory mirroring for object stores.
//!
//! Converges a flat object store to the contents of an HTTP directory listing:
//! - Listing scraper and file fetcher over one shared HTTP client
//! - Object store abstraction with S3 and in-memory backends
//! - Reconciliation engine (byte-exact diff, uploads before deletes, fail fast)
//! - Append-only JSON snapshot ingestion

pub mod config;
pub mod error;
pub mod fetcher;
pub mod ingest;
pub mod listing;
pub mod object_store;
pub mod reconcile;
pub mod s3_store;
pub mod types;

pub use config::{IngestConfig, MirrorConfig, StoreTarget};
pub use error::{SyncError, SyncErrorKind, SyncResult};
pub use fetcher::{HttpDirectory, RemoteDirectory};
pub use object_store::{MemoryObjectStore, ObjectStore};
pub use reconcile::{PreparedSync, ReconcileEngine};
pub use types::*;
