//! Shared types for a reconciliation pass.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A set of remote file names or stored object keys.
pub type NameSet = BTreeSet<String>;

/// Uploads and deletes needed to converge the store to the remote listing.
///
/// Derived once per run and consumed immediately.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPlan {
    pub to_upload: NameSet,
    pub to_delete: NameSet,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.to_upload.is_empty() && self.to_delete.is_empty()
    }

    /// Number of store mutations applying this plan performs.
    pub fn mutation_count(&self) -> usize {
        self.to_upload.len() + self.to_delete.len()
    }
}

/// Why a name is being uploaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    /// Key absent from the store.
    New,
    /// Key present with different content.
    Update,
}

/// Lifecycle of one reconciliation pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    InProgress,
    Converged,
    Aborted,
}

/// Outcome of a successful pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub deleted: Vec<String>,
}

impl RunSummary {
    /// Whether any mutation occurred.
    pub fn changed(&self) -> bool {
        !(self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty())
    }

    pub fn uploaded(&self) -> usize {
        self.created.len() + self.updated.len()
    }
}
