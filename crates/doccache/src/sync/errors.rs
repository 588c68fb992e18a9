use thiserror::Error;

use super::classify::{FailureClass, classify, classify_parts};
use crate::platform::PlatformError;
use crate::store::StoreError;

/// Errors raised by the sync engine.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Remote host failure.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// Cache store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The organization listing failed; no repository was touched.
    #[error("Failed to list repositories for org {org}: {source}")]
    Discovery {
        org: String,
        #[source]
        source: PlatformError,
    },
}

impl SyncError {
    /// Failure class of this error.
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Platform(e) | Self::Discovery { source: e, .. } => classify(e),
            Self::Store(e) => classify_parts(None, &e.to_string()),
        }
    }

    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        self.class().is_rate_limited()
    }
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
