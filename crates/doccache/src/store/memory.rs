use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::errors::{Result, StoreError};
use super::{CacheStore, EntryFilter, EntryPatch, Projection, validate_repo_name};
use crate::entity::RepoCacheEntry;
use crate::entity::doc_blob::DocSet;

/// In-process [`CacheStore`] keyed by repository name.
///
/// Semantics match [`SeaOrmStore`](super::SeaOrmStore): name-ordered
/// listings, case-insensitive text filter, summary projection without blobs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, RepoCacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Seed an entry directly, bypassing patch semantics.
    pub async fn insert(&self, entry: RepoCacheEntry) {
        self.entries
            .write()
            .await
            .insert(entry.repo_name.clone(), entry);
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn find(
        &self,
        filter: &EntryFilter,
        projection: Projection,
    ) -> Result<Vec<RepoCacheEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .values()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .map(|mut entry| {
                if projection == Projection::Summary {
                    entry.set_docs(DocSet::default());
                }
                entry
            })
            .collect())
    }

    async fn find_one(&self, repo_name: &str) -> Result<Option<RepoCacheEntry>> {
        Ok(self.entries.read().await.get(repo_name).cloned())
    }

    async fn upsert(&self, repo_name: &str, patch: EntryPatch) -> Result<RepoCacheEntry> {
        validate_repo_name(repo_name)?;

        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let entry = entries
            .entry(repo_name.to_string())
            .or_insert_with(|| RepoCacheEntry::new_idle(repo_name, now));
        patch.apply(entry, now);

        entries
            .get(repo_name)
            .cloned()
            .ok_or_else(|| StoreError::not_found(repo_name))
    }
}
