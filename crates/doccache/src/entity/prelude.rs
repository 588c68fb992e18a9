//! Common re-exports for convenient entity usage.

pub use super::RepoCacheEntry;
pub use super::doc_blob::{DocBlob, DocFormat, DocKind, DocSet};
pub use super::repo_cache::{
    ActiveModel as RepoCacheActiveModel, Column as RepoCacheColumn, Entity as RepoCache,
    Model as RepoCacheModel, Topics,
};
pub use super::sync_status::SyncStatus;
