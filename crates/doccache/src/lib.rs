//! Doccache - a local cache of per-repository documentation.
//!
//! Mirrors each repository's README, API specification, runbook and service
//! metadata from a code host into a queryable store, so a catalog can answer
//! reads without calling the host every time.
//!
//! # Features
//!
//! - `github` - GitHub [`RemoteClient`] implementation on octocrab.
//! - `sqlite` / `postgres` - sea-orm database backends.
//! - `migrate` - Enables database migration support. When enabled, you can use
//!   [`connect_and_migrate`] to create the schema on connection.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use doccache::{Catalog, SeaOrmStore, SyncSettings, connect_and_migrate};
//! use doccache::github::GitHubClient;
//! use doccache::sync::SyncRequest;
//!
//! let db = connect_and_migrate("sqlite://doccache.db?mode=rwc").await?;
//! let catalog = Catalog::new(
//!     Arc::new(GitHubClient::new(&token)?),
//!     Arc::new(SeaOrmStore::new(db)),
//!     SyncSettings::default(),
//! );
//!
//! let outcome = catalog.sync(SyncRequest::all()).await?;
//! let runbook = catalog.document("payments", DocKind::Runbook, false).await?;
//! ```

pub mod catalog;
pub mod db;
pub mod entity;
pub mod platform;
pub mod store;
pub mod sync;

#[cfg(feature = "github")]
pub mod retry;

#[cfg(feature = "github")]
pub mod github;

#[cfg(feature = "migrate")]
pub mod migration;

pub use catalog::{Catalog, CatalogError, IncludeSet, ListQuery, SyncSettings};
pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use platform::{
    ApiRateLimiter, PlatformError, RateLimitedClient, RemoteClient, RemoteContent, RemoteFile,
    RepoListing, RepoMetadata, rate_limits,
};
pub use store::{CacheStore, EntryFilter, EntryPatch, MemoryStore, Projection, SeaOrmStore, StoreError};
pub use sync::{SyncError, SyncOptions, SyncOutcome, SyncRequest};
