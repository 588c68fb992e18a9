//! GitHub API error types.

use thiserror::Error;

use crate::platform::PlatformError;

/// Errors that can occur when interacting with the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<GitHubError> for PlatformError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::Api(octocrab::Error::GitHub { source, .. }) => {
                let status = source.status_code.as_u16();
                if status == 404 {
                    PlatformError::not_found(source.message)
                } else {
                    PlatformError::api(status, source.message)
                }
            }
            GitHubError::Api(e @ (octocrab::Error::Hyper { .. } | octocrab::Error::Service { .. })) => {
                PlatformError::network(e.to_string())
            }
            GitHubError::Api(e) => PlatformError::internal(e.to_string()),
            GitHubError::Internal(msg) => PlatformError::internal(msg),
        }
    }
}
