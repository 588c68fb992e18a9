//! SeaORM entity definitions for the documentation cache schema.

pub mod doc_blob;
pub mod prelude;
pub mod repo_cache;
pub mod sync_status;

/// A cached repository record as returned by the cache store.
pub type RepoCacheEntry = repo_cache::Model;
