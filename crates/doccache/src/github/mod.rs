//! GitHub binding for the [`RemoteClient`](crate::platform::RemoteClient) trait.
//!
//! ```ignore
//! use doccache::github::GitHubClient;
//! use doccache::platform::{RateLimitedClient, rate_limits};
//!
//! let client = GitHubClient::new(&token)?;
//! let client = RateLimitedClient::new(client, rate_limits::GITHUB_DEFAULT_RPS);
//! ```

mod client;
mod error;

pub use client::{GitHubClient, create_client};
pub use error::GitHubError;
