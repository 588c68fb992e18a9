//! Per-repository sync pipeline.

use chrono::Utc;

use super::errors::Result;
use super::progress::{ProgressCallback, SyncProgress, emit};
use super::resolve::Resolver;
use super::types::RepoOutcome;
use crate::entity::doc_blob::{DocKind, DocSet};
use crate::platform::{RemoteClient, short_error_message};
use crate::store::{CacheStore, EntryPatch};

/// Sync one repository and write exactly one entry update.
///
/// Transient failures are persisted as `failed` and reported as
/// [`RepoOutcome::Failed`]. A rate-limit failure is persisted as
/// `rate_limited` and returned as an error so the batch can stop.
#[tracing::instrument(skip(client, store, on_progress), fields(org = %org))]
pub async fn sync_repo<C, S>(
    client: &C,
    store: &S,
    org: &str,
    repo: &str,
    force: bool,
    on_progress: Option<&ProgressCallback>,
) -> Result<RepoOutcome>
where
    C: RemoteClient + ?Sized,
    S: CacheStore + ?Sized,
{
    let err = match fetch_and_store(client, store, org, repo, force, on_progress).await {
        Ok(documents) => {
            tracing::debug!(repo = %repo, documents, "Repository synced");
            emit(
                on_progress,
                SyncProgress::RepoSynced {
                    repo: repo.to_string(),
                    documents,
                },
            );
            return Ok(RepoOutcome::Synced { documents });
        }
        Err(err) => err,
    };

    let class = err.class();
    let reason = short_error_message(&err);
    tracing::warn!(repo = %repo, status = %class.sync_status(), "Sync failed: {}", reason);

    let patch = EntryPatch::failed(class.sync_status(), reason.clone(), Utc::now());
    if let Err(store_err) = store.upsert(repo, patch).await {
        tracing::warn!(repo = %repo, error = %store_err, "Failed to record sync failure");
    }

    emit(
        on_progress,
        SyncProgress::RepoFailed {
            repo: repo.to_string(),
            error: reason.clone(),
            rate_limited: class.is_rate_limited(),
        },
    );

    if class.is_rate_limited() {
        Err(err)
    } else {
        Ok(RepoOutcome::Failed { reason })
    }
}

/// Fetch metadata, resolve all four documents and upsert the entry.
///
/// Returns the number of documents present after the sync.
async fn fetch_and_store<C, S>(
    client: &C,
    store: &S,
    org: &str,
    repo: &str,
    force: bool,
    on_progress: Option<&ProgressCallback>,
) -> Result<usize>
where
    C: RemoteClient + ?Sized,
    S: CacheStore + ?Sized,
{
    let metadata = client.get_repo_metadata(org, repo).await?;
    let existing = store.find_one(repo).await?;

    let resolver = Resolver::new(client, org, repo, force);
    let mut docs = DocSet::default();
    for kind in DocKind::ALL {
        let cached = existing.as_ref().and_then(|entry| entry.doc(kind));
        let resolution = resolver.resolve(kind, cached).await?;

        emit(
            on_progress,
            SyncProgress::DocumentResolved {
                repo: repo.to_string(),
                kind,
                present: resolution.is_present(),
                unchanged: resolution.is_unchanged(),
            },
        );
        docs.set(kind, resolution.into_blob());
    }

    let documents = docs.present();
    store
        .upsert(repo, EntryPatch::synced(metadata, docs, Utc::now()))
        .await?;
    Ok(documents)
}
