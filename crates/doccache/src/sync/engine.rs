//! Batch orchestration: bounded fan-out over the per-repository pipeline.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use super::discover::discover_repos;
use super::errors::Result;
use super::pipeline::sync_repo;
use super::progress::{ProgressCallback, SyncProgress, emit};
use super::types::{RepoOutcome, SyncOptions, SyncOutcome};
use crate::platform::RemoteClient;
use crate::store::CacheStore;

/// How one spawned pipeline ended.
enum TaskOutcome {
    /// Never started: the batch had already hit a rate limit.
    Skipped,
    Finished(Result<RepoOutcome>),
}

/// Trim names, drop blanks and duplicates, keep first-seen order.
fn normalize_names(repos: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    repos
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect()
}

/// Sync a batch of repositories.
///
/// With `repos` set to `None` the organization is listed first; a listing
/// failure is returned as [`SyncError::Discovery`](super::SyncError::Discovery) before any entry is
/// written. Every other failure is captured into the outcome.
///
/// At most `options.concurrency` pipelines run at once. Once a pipeline
/// reports a rate limit, pipelines that have not started yet are skipped.
/// Pipelines already running are awaited, so every write has landed when
/// this returns.
#[tracing::instrument(skip_all, fields(org = %org))]
pub async fn sync_batch<C, S>(
    client: Arc<C>,
    store: Arc<S>,
    org: &str,
    repos: Option<Vec<String>>,
    options: &SyncOptions,
    on_progress: Option<Arc<ProgressCallback>>,
) -> Result<SyncOutcome>
where
    C: RemoteClient + ?Sized + 'static,
    S: CacheStore + ?Sized + 'static,
{
    let start = Instant::now();

    let repo_names = match repos {
        Some(repos) => normalize_names(repos),
        None => discover_repos(client.as_ref(), org, on_progress.as_deref()).await?,
    };

    let mut outcome = SyncOutcome {
        total: repo_names.len(),
        ..SyncOutcome::default()
    };

    if repo_names.is_empty() {
        tracing::info!("No repositories to sync");
        outcome.duration_ms = elapsed_ms(start);
        return Ok(outcome);
    }

    let concurrency = options.concurrency.clamp(1, repo_names.len());
    emit(
        on_progress.as_deref(),
        SyncProgress::SyncingRepos {
            count: repo_names.len(),
            concurrency,
        },
    );

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let stop = Arc::new(AtomicBool::new(false));
    let org: Arc<str> = Arc::from(org);
    let force = options.force;

    let mut handles: Vec<(String, JoinHandle<TaskOutcome>)> = Vec::with_capacity(repo_names.len());

    for repo in repo_names {
        let client = Arc::clone(&client);
        let store = Arc::clone(&store);
        let semaphore = Arc::clone(&semaphore);
        let stop = Arc::clone(&stop);
        let org = Arc::clone(&org);
        let on_progress = on_progress.clone();
        let task_repo = repo.clone();

        let handle = tokio::spawn(async move {
            let _permit = match semaphore.acquire().await {
                Ok(permit) => permit,
                Err(_) => return TaskOutcome::Skipped,
            };

            if stop.load(Ordering::SeqCst) {
                return TaskOutcome::Skipped;
            }

            emit(
                on_progress.as_deref(),
                SyncProgress::RepoStarted {
                    repo: task_repo.clone(),
                },
            );

            let result = sync_repo(
                client.as_ref(),
                store.as_ref(),
                &org,
                &task_repo,
                force,
                on_progress.as_deref(),
            )
            .await;

            if matches!(&result, Err(e) if e.is_rate_limited()) {
                stop.store(true, Ordering::SeqCst);
            }

            TaskOutcome::Finished(result)
        });

        handles.push((repo, handle));
    }

    for (repo, handle) in handles {
        match handle.await {
            Ok(TaskOutcome::Skipped) => {
                outcome.skipped += 1;
                emit(on_progress.as_deref(), SyncProgress::RepoSkipped { repo });
            }
            Ok(TaskOutcome::Finished(Ok(RepoOutcome::Synced { .. }))) => {
                outcome.succeeded += 1;
            }
            Ok(TaskOutcome::Finished(Ok(RepoOutcome::Failed { reason }))) => {
                outcome.record_failure(&repo, reason);
            }
            Ok(TaskOutcome::Finished(Err(e))) if e.is_rate_limited() => {
                outcome.rate_limited = true;
                outcome.record_failure(&repo, "rate limited");
            }
            Ok(TaskOutcome::Finished(Err(e))) => {
                outcome.record_failure(&repo, e);
            }
            Err(e) => {
                tracing::error!(repo = %repo, error = %e, "Sync task panicked");
                outcome.record_failure(&repo, format!("task failed: {e}"));
            }
        }
    }

    outcome.duration_ms = elapsed_ms(start);

    if outcome.rate_limited {
        tracing::warn!(
            skipped = outcome.skipped,
            "Sync stopped early due to rate limit"
        );
    }
    tracing::info!(
        total = outcome.total,
        succeeded = outcome.succeeded,
        failed = outcome.failed,
        skipped = outcome.skipped,
        duration_ms = outcome.duration_ms,
        "Sync batch complete"
    );

    emit(
        on_progress.as_deref(),
        SyncProgress::SyncComplete {
            succeeded: outcome.succeeded,
            failed: outcome.failed,
            skipped: outcome.skipped,
            duration_ms: outcome.duration_ms,
        },
    );

    Ok(outcome)
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_names_drops_blanks_and_duplicates() {
        let names = normalize_names(vec![
            " payments ".to_string(),
            String::new(),
            "inventory".to_string(),
            "payments".to_string(),
            "   ".to_string(),
        ]);
        assert_eq!(names, ["payments", "inventory"]);
    }
}
