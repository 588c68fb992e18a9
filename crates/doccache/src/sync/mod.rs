//! The sync engine.
//!
//! # Module Structure
//!
//! - [`types`] - Options, requests and outcomes: `SyncOptions`, `SyncOutcome`
//! - [`progress`] - Progress reporting: `SyncProgress`, `ProgressCallback`, `emit()`
//! - [`resolve`] - Candidate path resolution and document validation
//! - [`engine`] - Batch orchestration: `sync_batch()`
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use doccache::store::MemoryStore;
//! use doccache::sync::{SyncOptions, sync_batch};
//!
//! let outcome = sync_batch(
//!     Arc::new(client),
//!     Arc::new(MemoryStore::new()),
//!     "acme",
//!     None,
//!     &SyncOptions::default(),
//!     None,
//! )
//! .await?;
//! println!("{} of {} repositories synced", outcome.succeeded, outcome.total);
//! ```

mod classify;
mod discover;
pub mod engine;
mod errors;
mod fingerprint;
mod pipeline;
mod progress;
pub mod resolve;
mod types;

pub use classify::{FailureClass, classify, classify_parts};
pub use discover::discover_repos;
pub use engine::sync_batch;
pub use errors::{Result, SyncError};
pub use fingerprint::is_unchanged;
pub use pipeline::sync_repo;
pub use progress::{ProgressCallback, SyncProgress, emit};
pub use resolve::{Rejection, Resolution, Resolver, decode_content, validate};
pub use types::{
    DEFAULT_CONCURRENCY, DEFAULT_ORG, RepoOutcome, SyncOptions, SyncOutcome, SyncRequest,
    normalize_concurrency,
};
