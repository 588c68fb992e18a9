//! Progress reporting for sync operations.
//!
//! Sync progress events are turned into structured `tracing` records so a
//! batch reads the same on a terminal and in CI logs.

use doccache::sync::{ProgressCallback, SyncProgress};

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    /// Convert to a ProgressCallback for the library.
    pub fn into_callback(self) -> ProgressCallback {
        Box::new(move |event| self.handle(event))
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::DiscoveringRepos { org } => {
                tracing::info!(org = %org, "Listing repositories");
            }

            SyncProgress::DiscoveryComplete { org, total } => {
                tracing::info!(org = %org, total, "Discovery complete");
            }

            SyncProgress::SyncingRepos { count, concurrency } => {
                tracing::info!(count, concurrency, "Syncing repositories");
            }

            SyncProgress::RepoStarted { repo } => {
                tracing::debug!(repo = %repo, "Sync started");
            }

            SyncProgress::DocumentResolved {
                repo,
                kind,
                present,
                unchanged,
            } => {
                tracing::debug!(repo = %repo, kind = %kind, present, unchanged, "Document resolved");
            }

            SyncProgress::RepoSynced { repo, documents } => {
                tracing::info!(repo = %repo, documents, "Synced");
            }

            SyncProgress::RepoFailed {
                repo,
                error,
                rate_limited,
            } => {
                if rate_limited {
                    tracing::warn!(repo = %repo, error = %error, "Rate limited");
                } else {
                    tracing::warn!(repo = %repo, error = %error, "Sync failed");
                }
            }

            SyncProgress::RepoSkipped { repo } => {
                tracing::debug!(repo = %repo, "Skipped after rate limit");
            }

            SyncProgress::SyncComplete {
                succeeded,
                failed,
                skipped,
                duration_ms,
            } => {
                tracing::info!(succeeded, failed, skipped, duration_ms, "Sync complete");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
