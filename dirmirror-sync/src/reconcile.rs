//! Reconciliation engine.
//!
//! One pass converges the object store to the remote listing:
//!
//! 1. list stored keys
//! 2. list remote names
//! 3. download every remote file; new names and names whose stored bytes
//!    differ are staged for upload
//! 4. stored keys missing remotely are staged for delete
//! 5. apply all uploads, then all deletes
//!
//! Every remote file is downloaded on every pass. Comparison is byte-exact and
//! never trusts remote size or timestamp metadata.
//!
//! The first failing operation aborts the pass. Nothing is rolled back and
//! nothing is retried. Because uploads precede deletes, an abort never removes
//! a key that still exists remotely.
//!
//! A key deleted in step 5 may have been re-created by another writer since
//! step 1; that delete wins. Concurrent passes against one store are
//! unsupported.

use crate::error::SyncResult;
use crate::fetcher::RemoteDirectory;
use crate::object_store::ObjectStore;
use crate::types::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A computed plan together with the bytes to upload.
///
/// Holding the downloaded content means no file is fetched twice in one pass.
/// Peak memory is the combined size of every new or changed file: on a first
/// sync into an empty bucket that is the whole remote directory.
#[derive(Debug, Default)]
pub struct PreparedSync {
    plan: SyncPlan,
    staged: BTreeMap<String, StagedUpload>,
}

#[derive(Debug)]
struct StagedUpload {
    kind: UploadKind,
    content: Vec<u8>,
}

impl PreparedSync {
    pub fn plan(&self) -> &SyncPlan {
        &self.plan
    }

    pub fn into_plan(self) -> SyncPlan {
        self.plan
    }

    pub fn upload_kind(&self, name: &str) -> Option<UploadKind> {
        self.staged.get(name).map(|s| s.kind)
    }

    fn stage_upload(&mut self, name: &str, kind: UploadKind, content: Vec<u8>) {
        self.plan.to_upload.insert(name.to_string());
        self.staged
            .insert(name.to_string(), StagedUpload { kind, content });
    }
}

/// Mirrors a [`RemoteDirectory`] into an [`ObjectStore`].
pub struct ReconcileEngine {
    directory: Arc<dyn RemoteDirectory>,
    store: Arc<dyn ObjectStore>,
    state: RunState,
}

impl ReconcileEngine {
    pub fn new(directory: Arc<dyn RemoteDirectory>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            directory,
            store,
            state: RunState::NotStarted,
        }
    }

    /// State of the most recent [`run`](Self::run).
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Runs one full pass and reports what changed.
    pub async fn run(&mut self) -> SyncResult<RunSummary> {
        self.state = RunState::InProgress;

        let result = match self.prepare().await {
            Ok(prepared) => self.apply(prepared).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(summary) => {
                self.state = RunState::Converged;
                if !summary.changed() {
                    info!("all files are already in sync, no updates needed");
                }
                Ok(summary)
            }
            Err(e) => {
                self.state = RunState::Aborted;
                warn!("reconciliation aborted: {e}");
                Err(e)
            }
        }
    }

    /// Computes the plan without touching the store.
    pub async fn plan_only(&self) -> SyncResult<SyncPlan> {
        Ok(self.prepare().await?.into_plan())
    }

    /// Lists both sides and diffs them. Reads only.
    pub async fn prepare(&self) -> SyncResult<PreparedSync> {
        let stored_keys = self.store.list_keys().await?;
        let remote_names = self.directory.list_names().await?;
        debug!(
            "{} remote files, {} stored keys",
            remote_names.len(),
            stored_keys.len()
        );

        let mut prepared = PreparedSync::default();

        for name in &remote_names {
            let content = self.directory.fetch(name).await?;

            if !stored_keys.contains(name) {
                prepared.stage_upload(name, UploadKind::New, content);
                continue;
            }

            let existing = self.store.get_content(name).await?;
            if existing != content {
                prepared.stage_upload(name, UploadKind::Update, content);
            }
        }

        prepared.plan.to_delete = stored_keys.difference(&remote_names).cloned().collect();

        debug!(
            "plan: {} uploads, {} deletes",
            prepared.plan.to_upload.len(),
            prepared.plan.to_delete.len()
        );
        Ok(prepared)
    }

    /// Applies a prepared plan: every upload first, then every delete.
    pub async fn apply(&self, prepared: PreparedSync) -> SyncResult<RunSummary> {
        let PreparedSync { plan, staged } = prepared;
        let mut summary = RunSummary::default();

        for (name, upload) in staged {
            self.store.put(&name, upload.content, None).await?;
            match upload.kind {
                UploadKind::New => {
                    info!("uploaded: {name}");
                    summary.created.push(name);
                }
                UploadKind::Update => {
                    info!("updated: {name}");
                    summary.updated.push(name);
                }
            }
        }

        for key in plan.to_delete {
            self.store.delete(&key).await?;
            info!("deleted: {key}");
            summary.deleted.push(key);
        }

        Ok(summary)
    }
}
