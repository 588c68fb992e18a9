//! Progress reporting types for sync batches.

use crate::entity::doc_blob::DocKind;

/// Progress events emitted during a sync batch.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// Listing the organization's repositories.
    DiscoveringRepos {
        /// The organization being listed.
        org: String,
    },

    /// Discovery finished.
    DiscoveryComplete {
        org: String,
        /// Number of repository names found.
        total: usize,
    },

    /// Starting the per-repository fan-out.
    SyncingRepos {
        /// Number of repositories in the batch.
        count: usize,
        /// Maximum pipelines in flight.
        concurrency: usize,
    },

    /// A pipeline acquired a slot and started.
    RepoStarted { repo: String },

    /// One document kind was resolved.
    DocumentResolved {
        repo: String,
        kind: DocKind,
        /// Whether a document is present after resolution.
        present: bool,
        /// Whether the cached blob was kept because its fingerprint matched.
        unchanged: bool,
    },

    /// A repository was written with status `ok`.
    RepoSynced {
        repo: String,
        /// Number of document kinds present.
        documents: usize,
    },

    /// A repository failed and was written as `failed` or `rate_limited`.
    RepoFailed {
        repo: String,
        error: String,
        rate_limited: bool,
    },

    /// A repository was never started because the batch stopped early.
    RepoSkipped { repo: String },

    /// The batch finished.
    SyncComplete {
        succeeded: usize,
        failed: usize,
        skipped: usize,
        duration_ms: u64,
    },
}

/// Callback for progress updates during sync operations.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
///
/// # Example
///
/// ```ignore
/// use doccache::sync::{emit, SyncProgress, ProgressCallback};
///
/// fn report(on_progress: Option<&ProgressCallback>) {
///     emit(on_progress, SyncProgress::RepoStarted { repo: "payments".into() });
/// }
/// ```
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_with_callback() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        let callback: ProgressCallback = Box::new(move |_event| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        emit(
            Some(&callback),
            SyncProgress::RepoStarted {
                repo: "payments".to_string(),
            },
        );
        emit(
            Some(&callback),
            SyncProgress::RepoSynced {
                repo: "payments".to_string(),
                documents: 2,
            },
        );

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_emit_without_callback() {
        emit(
            None,
            SyncProgress::DiscoveringRepos {
                org: "acme".to_string(),
            },
        );
    }

    #[test]
    fn test_sync_progress_debug() {
        let event = SyncProgress::DocumentResolved {
            repo: "payments".to_string(),
            kind: DocKind::ApiSpec,
            present: true,
            unchanged: false,
        };

        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("payments"));
        assert!(debug_str.contains("ApiSpec"));
    }
}
