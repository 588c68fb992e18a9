use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

use super::errors::Result;
use super::types::{RemoteClient, RemoteContent, RemoteFile, RepoListing, RepoMetadata};

/// Type alias for the governor rate limiter.
type GovernorRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Default request pacing (requests per second).
pub mod rate_limits {
    /// GitHub: 5000 requests/hour = ~1.4/sec, we use 10/sec to allow bursts.
    pub const GITHUB_DEFAULT_RPS: u32 = 10;
}

fn quota_for(requests_per_second: u32) -> Quota {
    let rps = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
    Quota::per_second(rps)
}

/// A standalone API rate limiter using the governor crate.
///
/// # Example
///
/// ```ignore
/// use doccache::platform::ApiRateLimiter;
///
/// let limiter = ApiRateLimiter::new(10); // 10 requests per second
///
/// // Before each API call:
/// limiter.wait().await;
/// client.get_readme(org, repo).await?;
/// ```
#[derive(Clone)]
pub struct ApiRateLimiter {
    inner: Arc<GovernorRateLimiter>,
}

impl ApiRateLimiter {
    /// Create a new rate limiter with the specified requests per second.
    ///
    /// A value of 0 is treated as 1.
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            inner: Arc::new(RateLimiter::direct(quota_for(requests_per_second))),
        }
    }

    /// Wait (asynchronously) until the limiter allows another request.
    pub async fn wait(&self) {
        self.inner.until_ready().await;
    }
}

/// A paced wrapper around any `RemoteClient`.
///
/// Every trait method waits for the limiter before delegating, so a whole
/// batch shares one request budget no matter how many pipelines run.
///
/// # Example
///
/// ```ignore
/// use doccache::platform::{RateLimitedClient, rate_limits};
/// use doccache::github::GitHubClient;
///
/// let client = GitHubClient::new(&token)?;
/// let client = RateLimitedClient::new(client, rate_limits::GITHUB_DEFAULT_RPS);
/// ```
pub struct RateLimitedClient<C> {
    inner: C,
    limiter: ApiRateLimiter,
}

impl<C> RateLimitedClient<C> {
    /// Wrap `inner` with a limiter allowing `requests_per_second`.
    pub fn new(inner: C, requests_per_second: u32) -> Self {
        Self {
            inner,
            limiter: ApiRateLimiter::new(requests_per_second),
        }
    }

    /// Get a reference to the inner client.
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: Clone> Clone for RateLimitedClient<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            limiter: self.limiter.clone(),
        }
    }
}

#[async_trait]
impl<C: RemoteClient> RemoteClient for RateLimitedClient<C> {
    async fn list_org_repos(&self, org: &str) -> Result<Vec<RepoListing>> {
        self.limiter.wait().await;
        self.inner.list_org_repos(org).await
    }

    async fn get_repo_metadata(&self, org: &str, repo: &str) -> Result<RepoMetadata> {
        self.limiter.wait().await;
        self.inner.get_repo_metadata(org, repo).await
    }

    async fn get_readme(&self, org: &str, repo: &str) -> Result<RemoteFile> {
        self.limiter.wait().await;
        self.inner.get_readme(org, repo).await
    }

    async fn get_content(&self, org: &str, repo: &str, path: &str) -> Result<RemoteContent> {
        self.limiter.wait().await;
        self.inner.get_content(org, repo, path).await
    }
}
