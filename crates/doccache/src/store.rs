//! Cache store: the persistence seam between the sync engine and readers.
//!
//! The engine writes through [`CacheStore::upsert`] and readers go through
//! [`CacheStore::find`] / [`CacheStore::find_one`]. Two implementations ship:
//! [`SeaOrmStore`] over a sea-orm connection and [`MemoryStore`] for tests
//! and embedding.

mod errors;
mod memory;
mod sea;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entity::doc_blob::DocSet;
use crate::entity::repo_cache::Topics;
use crate::entity::sync_status::SyncStatus;
use crate::entity::RepoCacheEntry;
use crate::platform::RepoMetadata;

pub use errors::{Result, StoreError};
pub use memory::MemoryStore;
pub use sea::SeaOrmStore;

/// Which columns a listing returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Projection {
    /// Metadata and tracking columns only; the four document blobs are null.
    Summary,
    /// Every column.
    #[default]
    Full,
}

/// Filter for [`CacheStore::find`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    /// Case-insensitive substring matched against name, description and topics.
    pub text: Option<String>,
}

impl EntryFilter {
    /// Filter matching every entry.
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter on free text. Blank text matches everything.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    /// The lowercased search needle, if the filter has a non-blank one.
    pub fn needle(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether `entry` satisfies this filter.
    pub fn matches(&self, entry: &RepoCacheEntry) -> bool {
        let Some(needle) = self.needle() else {
            return true;
        };

        entry.repo_name.to_lowercase().contains(&needle)
            || entry
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
            || entry
                .topics
                .0
                .iter()
                .any(|t| t.to_lowercase().contains(&needle))
    }
}

/// Column changes written by one sync of one repository.
///
/// `None` for `metadata` or `docs` leaves those columns untouched, which is
/// how a failed sync keeps the last good documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPatch {
    pub metadata: Option<RepoMetadata>,
    pub docs: Option<DocSet>,
    pub sync_status: SyncStatus,
    pub sync_error: Option<String>,
    pub last_sync_at: DateTime<Utc>,
}

impl EntryPatch {
    /// A successful sync: fresh metadata, the resolved documents, status `ok`.
    pub fn synced(metadata: RepoMetadata, docs: DocSet, at: DateTime<Utc>) -> Self {
        Self {
            metadata: Some(metadata),
            docs: Some(docs),
            sync_status: SyncStatus::Ok,
            sync_error: None,
            last_sync_at: at,
        }
    }

    /// A failed sync: only status, error and timestamp change.
    pub fn failed(status: SyncStatus, error: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            metadata: None,
            docs: None,
            sync_status: status,
            sync_error: Some(error.into()),
            last_sync_at: at,
        }
    }

    /// Apply this patch to an in-memory entry.
    pub fn apply(self, entry: &mut RepoCacheEntry, now: DateTime<Utc>) {
        if let Some(meta) = self.metadata {
            entry.description = meta.description;
            entry.topics = Topics(meta.topics);
            entry.default_branch = meta.default_branch;
            entry.html_url = meta.html_url;
        }
        if let Some(docs) = self.docs {
            entry.set_docs(docs);
        }
        entry.sync_status = self.sync_status;
        entry.sync_error = self.sync_error;
        entry.last_sync_at = Some(self.last_sync_at);
        entry.updated_at = now;
    }
}

/// Keyed store of [`RepoCacheEntry`] records.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Entries matching `filter`, ordered by repository name.
    async fn find(&self, filter: &EntryFilter, projection: Projection)
    -> Result<Vec<RepoCacheEntry>>;

    /// Point lookup by repository name.
    async fn find_one(&self, repo_name: &str) -> Result<Option<RepoCacheEntry>>;

    /// Insert or update one entry and return its new state.
    ///
    /// Column defaults apply on insert; `created_at` is never overwritten.
    async fn upsert(&self, repo_name: &str, patch: EntryPatch) -> Result<RepoCacheEntry>;
}

fn validate_repo_name(repo_name: &str) -> Result<()> {
    if repo_name.trim().is_empty() {
        return Err(StoreError::InvalidInput {
            message: "repository name must not be empty".to_string(),
        });
    }
    Ok(())
}
