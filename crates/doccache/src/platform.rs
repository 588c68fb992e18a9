//! Host-agnostic access to remote repositories.
//!
//! The sync engine only ever talks to a [`RemoteClient`]; the GitHub binding
//! lives in [`crate::github`] and tests substitute an in-memory fake.
//!
//! # Example
//!
//! ```ignore
//! use doccache::platform::{RemoteClient, RemoteContent};
//!
//! async fn has_runbook<C: RemoteClient>(client: &C, org: &str, repo: &str) -> bool {
//!     matches!(
//!         client.get_content(org, repo, "docs/runbook.md").await,
//!         Ok(RemoteContent::File(_))
//!     )
//! }
//! ```

mod errors;
mod rate_limit;
mod types;

pub use errors::{PlatformError, Result, short_error_message};
pub use rate_limit::{ApiRateLimiter, RateLimitedClient, rate_limits};
pub use types::{RemoteClient, RemoteContent, RemoteFile, RepoListing, RepoMetadata};
