//! Sync options, requests and outcomes.

use serde::{Deserialize, Serialize};

/// Default number of per-repository pipelines in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 3;

/// Organization synced when none is configured.
pub const DEFAULT_ORG: &str = "Ngx-Workshop";

/// Clamp a configured concurrency to a usable value.
///
/// Anything that is not a positive integer falls back to
/// [`DEFAULT_CONCURRENCY`].
pub fn normalize_concurrency(value: Option<i64>) -> usize {
    match value {
        Some(n) if n > 0 => usize::try_from(n).unwrap_or(DEFAULT_CONCURRENCY),
        _ => DEFAULT_CONCURRENCY,
    }
}

/// Options for one sync batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Maximum concurrent per-repository pipelines.
    pub concurrency: usize,
    /// Re-validate and replace documents even when fingerprints match.
    pub force: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            force: false,
        }
    }
}

impl SyncOptions {
    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// Input of the sync operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    /// Repositories to sync. `None` discovers every repository in the org.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repos: Option<Vec<String>>,
    #[serde(default)]
    pub force: bool,
}

impl SyncRequest {
    /// Sync every repository in the organization.
    pub fn all() -> Self {
        Self::default()
    }

    /// Sync only the named repositories.
    pub fn repos<I, S>(repos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            repos: Some(repos.into_iter().map(Into::into).collect()),
            force: false,
        }
    }

    #[must_use]
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Aggregate result of one sync batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    /// Repositories requested (or discovered).
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Repositories never started because the batch stopped on a rate limit.
    pub skipped: usize,
    pub duration_ms: u64,
    /// Whether a rate limit stopped the batch early.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub rate_limited: bool,
    /// `repo: reason` descriptors, one per failed repository.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
}

impl SyncOutcome {
    /// Record a failed repository.
    pub fn record_failure(&mut self, repo: &str, reason: impl std::fmt::Display) {
        self.failed += 1;
        self.failures.push(format!("{repo}: {reason}"));
    }

    /// Whether every requested repository synced.
    pub fn is_complete_success(&self) -> bool {
        self.succeeded == self.total
    }
}

/// Result of a per-repository pipeline that did not stop the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    /// Metadata and documents were written with status `ok`.
    Synced {
        /// Number of document kinds present after the sync.
        documents: usize,
    },
    /// A transient failure was persisted as `failed`.
    Failed { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_concurrency() {
        assert_eq!(normalize_concurrency(Some(8)), 8);
        assert_eq!(normalize_concurrency(Some(1)), 1);
        assert_eq!(normalize_concurrency(Some(0)), DEFAULT_CONCURRENCY);
        assert_eq!(normalize_concurrency(Some(-4)), DEFAULT_CONCURRENCY);
        assert_eq!(normalize_concurrency(None), DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_sync_options_default() {
        let options = SyncOptions::default();
        assert_eq!(options.concurrency, 3);
        assert!(!options.force);
        assert_eq!(options.with_concurrency(0).concurrency, 1);
    }

    #[test]
    fn test_outcome_omits_empty_failures() {
        let outcome = SyncOutcome {
            total: 2,
            succeeded: 2,
            duration_ms: 15,
            ..SyncOutcome::default()
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["durationMs"], 15);
        assert!(value.get("failures").is_none());
        assert!(value.get("rateLimited").is_none());
    }

    #[test]
    fn test_outcome_records_failures() {
        let mut outcome = SyncOutcome {
            total: 1,
            ..SyncOutcome::default()
        };
        outcome.record_failure("payments", "API error (502): bad gateway");

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["failed"], 1);
        assert_eq!(value["failures"][0], "payments: API error (502): bad gateway");
        assert!(!outcome.is_complete_success());
    }

    #[test]
    fn test_sync_request_deserializes_partial_input() {
        let request: SyncRequest = serde_json::from_str(r#"{"repos":["a","b"]}"#).unwrap();
        assert_eq!(request.repos.as_deref().map(<[String]>::len), Some(2));
        assert!(!request.force);

        let request: SyncRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, SyncRequest::all());
    }
}
