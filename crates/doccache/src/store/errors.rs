use sea_orm::DbErr;
use thiserror::Error;

/// Errors that can occur during cache store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sea-orm.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Entry vanished between write and read-back.
    #[error("Cache entry not found: {repo}")]
    NotFound { repo: String },

    /// Invalid input data.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl StoreError {
    /// Create a NotFound error for a repository name.
    pub fn not_found(repo: impl Into<String>) -> Self {
        Self::NotFound { repo: repo.into() }
    }
}

/// Result type alias for cache store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
