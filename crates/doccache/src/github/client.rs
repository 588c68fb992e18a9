//! Octocrab-backed [`RemoteClient`] implementation.

use std::sync::Arc;

use async_trait::async_trait;
use octocrab::Octocrab;
use octocrab::models::repos::Content;

use super::error::GitHubError;
use crate::platform::{
    self, PlatformError, RemoteClient, RemoteContent, RemoteFile, RepoListing, RepoMetadata,
};
use crate::retry::with_retry;

/// Maximum page size accepted by the GitHub REST API.
const PAGE_SIZE: u8 = 100;

/// Create an authenticated Octocrab instance from a GitHub token.
pub fn create_client(token: &str) -> Result<Octocrab, GitHubError> {
    Octocrab::builder()
        .personal_token(token.to_string())
        .build()
        .map_err(GitHubError::Api)
}

/// GitHub client implementing the [`RemoteClient`] capability set.
///
/// Transient failures (5xx, dropped connections) are retried with
/// exponential backoff. Everything else, rate limits included, is returned
/// as a [`PlatformError`] carrying the HTTP status.
#[derive(Clone)]
pub struct GitHubClient {
    inner: Arc<Octocrab>,
}

impl GitHubClient {
    /// Create a new GitHub client from an authentication token.
    pub fn new(token: &str) -> Result<Self, GitHubError> {
        Ok(Self::from_octocrab(create_client(token)?))
    }

    /// Create an unauthenticated client (public repositories only, low quota).
    pub fn anonymous() -> Result<Self, GitHubError> {
        let client = Octocrab::builder().build().map_err(GitHubError::Api)?;
        Ok(Self::from_octocrab(client))
    }

    /// Create a GitHub client from an existing Octocrab instance.
    pub fn from_octocrab(client: Octocrab) -> Self {
        Self {
            inner: Arc::new(client),
        }
    }
}

fn to_platform(err: octocrab::Error) -> PlatformError {
    GitHubError::Api(err).into()
}

/// Convert a content item into a file, rejecting items without a body.
fn into_remote_file(item: Content) -> platform::Result<RemoteFile> {
    let content = item.content.ok_or_else(|| {
        PlatformError::from(GitHubError::Internal(format!(
            "no content returned for {}",
            item.path
        )))
    })?;

    Ok(RemoteFile {
        fingerprint: item.sha,
        content,
    })
}

/// Interpret a contents response for `path`.
///
/// A file comes back as a single item of type `file` at exactly that path.
/// Anything else is a directory listing (or a submodule/symlink), which is
/// not a document.
fn classify_items(path: &str, mut items: Vec<Content>) -> platform::Result<RemoteContent> {
    let is_single_file =
        items.len() == 1 && items[0].r#type == "file" && items[0].path == path.trim_matches('/');

    match items.pop() {
        Some(item) if is_single_file => Ok(RemoteContent::File(into_remote_file(item)?)),
        _ => Ok(RemoteContent::Directory),
    }
}

#[async_trait]
impl RemoteClient for GitHubClient {
    async fn list_org_repos(&self, org: &str) -> platform::Result<Vec<RepoListing>> {
        let mut listings = Vec::new();
        let mut page = 1u32;

        loop {
            let label = format!("{org}?page={page}");
            let page_result = with_retry(
                || async move {
                    self.inner
                        .orgs(org)
                        .list_repos()
                        .per_page(PAGE_SIZE)
                        .page(page)
                        .send()
                        .await
                        .map_err(to_platform)
                },
                PlatformError::is_retryable,
                &label,
            )
            .await?;

            let count = page_result.items.len();
            listings.extend(
                page_result
                    .items
                    .into_iter()
                    .map(|repo| RepoListing { name: repo.name }),
            );

            tracing::debug!(org = %org, page, count, "Fetched repository page");

            // A short page is the last one.
            if count < usize::from(PAGE_SIZE) {
                break;
            }
            page += 1;
        }

        Ok(listings)
    }

    async fn get_repo_metadata(&self, org: &str, repo: &str) -> platform::Result<RepoMetadata> {
        let label = format!("{org}/{repo}");
        let model = with_retry(
            || async move {
                self.inner
                    .repos(org, repo)
                    .get()
                    .await
                    .map_err(to_platform)
            },
            PlatformError::is_retryable,
            &label,
        )
        .await?;

        Ok(RepoMetadata {
            description: model.description,
            topics: model.topics.unwrap_or_default(),
            default_branch: model.default_branch,
            html_url: model.html_url.map(|url| url.to_string()),
        })
    }

    async fn get_readme(&self, org: &str, repo: &str) -> platform::Result<RemoteFile> {
        let label = format!("{org}/{repo}:README");
        let item = with_retry(
            || async move {
                self.inner
                    .repos(org, repo)
                    .get_readme()
                    .send()
                    .await
                    .map_err(to_platform)
            },
            PlatformError::is_retryable,
            &label,
        )
        .await?;

        into_remote_file(item)
    }

    async fn get_content(
        &self,
        org: &str,
        repo: &str,
        path: &str,
    ) -> platform::Result<RemoteContent> {
        let label = format!("{org}/{repo}:{path}");
        let items = with_retry(
            || async move {
                self.inner
                    .repos(org, repo)
                    .get_content()
                    .path(path)
                    .send()
                    .await
                    .map_err(to_platform)
            },
            PlatformError::is_retryable,
            &label,
        )
        .await?;

        classify_items(path, items.items)
    }
}
