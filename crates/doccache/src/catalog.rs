//! Read surface over the cache, with on-demand sync.
//!
//! Readers never talk to the remote host directly. They read cached entries
//! and only trigger a sync when asked to refresh or when an entry is missing.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::entity::RepoCacheEntry;
use crate::entity::doc_blob::{DocBlob, DocKind};
use crate::platform::RemoteClient;
use crate::store::{CacheStore, EntryFilter, Projection, StoreError};
use crate::sync::{
    DEFAULT_CONCURRENCY, DEFAULT_ORG, ProgressCallback, SyncError, SyncOptions, SyncOutcome,
    SyncRequest, sync_batch, sync_repo,
};

/// Errors returned by [`Catalog`] operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Repo {repo} not found in cache")]
    NotFound { repo: String },

    #[error("{kind} not available for {repo}")]
    DocumentUnavailable { repo: String, kind: DocKind },

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Organization and fan-out used when the catalog triggers a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub org: String,
    pub concurrency: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            org: DEFAULT_ORG.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Document kinds to return in full from a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeSet(HashSet<DocKind>);

impl IncludeSet {
    /// Parse a comma-separated list such as `readme,openapi`.
    ///
    /// Tokens are trimmed and case-insensitive; unknown tokens are ignored.
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .filter(|token| !token.trim().is_empty())
                .filter_map(|token| token.parse().ok())
                .collect(),
        )
    }

    pub fn contains(&self, kind: DocKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<DocKind> for IncludeSet {
    fn from_iter<I: IntoIterator<Item = DocKind>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parameters of [`Catalog::list`].
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Case-insensitive text matched against name, description and topics.
    pub q: Option<String>,
    /// Documents to include. Empty lists metadata only.
    pub include: IncludeSet,
    /// Run a full sync before listing.
    pub refresh: bool,
}

/// Cached documentation catalog for one organization.
pub struct Catalog<C: ?Sized, S: ?Sized> {
    client: Arc<C>,
    store: Arc<S>,
    settings: SyncSettings,
    on_progress: Option<Arc<ProgressCallback>>,
}

impl<C, S> Catalog<C, S>
where
    C: RemoteClient + ?Sized + 'static,
    S: CacheStore + ?Sized + 'static,
{
    pub fn new(client: Arc<C>, store: Arc<S>, settings: SyncSettings) -> Self {
        Self {
            client,
            store,
            settings,
            on_progress: None,
        }
    }

    /// Report sync progress to `callback`.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// List cached entries ordered by repository name.
    ///
    /// Without an include set the four document blobs are not loaded.
    /// With one, only the named documents are returned.
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<RepoCacheEntry>> {
        if query.refresh {
            self.sync(SyncRequest::all()).await?;
        }

        let filter = EntryFilter {
            text: query.q.clone(),
        };
        let projection = if query.include.is_empty() {
            Projection::Summary
        } else {
            Projection::Full
        };

        let mut entries = self.store.find(&filter, projection).await?;
        if !query.include.is_empty() {
            for entry in &mut entries {
                entry.retain_docs(|kind| query.include.contains(kind));
            }
        }
        Ok(entries)
    }

    /// Full detail for one repository.
    ///
    /// A missing entry triggers one sync of that repository before giving up.
    pub async fn get(&self, repo: &str, refresh: bool) -> Result<RepoCacheEntry> {
        if refresh {
            self.sync_one(repo).await?;
        }

        if let Some(entry) = self.store.find_one(repo).await? {
            return Ok(entry);
        }

        tracing::debug!(repo = %repo, "Cache miss, syncing repository");
        self.sync_one(repo).await?;

        self.store
            .find_one(repo)
            .await?
            .ok_or_else(|| CatalogError::NotFound {
                repo: repo.to_string(),
            })
    }

    /// One cached document of a repository.
    pub async fn document(&self, repo: &str, kind: DocKind, refresh: bool) -> Result<DocBlob> {
        let entry = self.get(repo, refresh).await?;
        entry
            .doc(kind)
            .cloned()
            .ok_or_else(|| CatalogError::DocumentUnavailable {
                repo: repo.to_string(),
                kind,
            })
    }

    /// Run a sync batch.
    pub async fn sync(&self, request: SyncRequest) -> Result<SyncOutcome> {
        let options = SyncOptions::default()
            .with_concurrency(self.settings.concurrency)
            .with_force(request.force);

        let outcome = sync_batch(
            Arc::clone(&self.client),
            Arc::clone(&self.store),
            &self.settings.org,
            request.repos,
            &options,
            self.on_progress.clone(),
        )
        .await?;
        Ok(outcome)
    }

    /// Sync a single repository. Transient failures are recorded, not raised.
    async fn sync_one(&self, repo: &str) -> Result<()> {
        sync_repo(
            self.client.as_ref(),
            self.store.as_ref(),
            &self.settings.org,
            repo,
            false,
            self.on_progress.as_deref(),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn include_set_parses_known_tokens() {
        let include = IncludeSet::parse(" README, openapi ,metadata,,bogus");
        assert!(include.contains(DocKind::Readme));
        assert!(include.contains(DocKind::ApiSpec));
        assert!(include.contains(DocKind::ServiceMetadata));
        assert!(!include.contains(DocKind::Runbook));
    }

    #[test]
    fn include_set_empty_input() {
        assert!(IncludeSet::parse("").is_empty());
        assert!(IncludeSet::parse(" , ").is_empty());
        assert!(IncludeSet::parse("changelog").is_empty());
    }

    #[test]
    fn catalog_error_messages() {
        let err = CatalogError::DocumentUnavailable {
            repo: "payments".to_string(),
            kind: DocKind::Runbook,
        };
        assert_eq!(err.to_string(), "runbook not available for payments");

        let err = CatalogError::NotFound {
            repo: "ghost".to_string(),
        };
        assert_eq!(err.to_string(), "Repo ghost not found in cache");
    }

    #[test]
    fn default_settings() {
        let settings = SyncSettings::default();
        assert_eq!(settings.org, "Ngx-Workshop");
        assert_eq!(settings.concurrency, 3);
    }
}
