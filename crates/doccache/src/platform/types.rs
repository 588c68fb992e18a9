use async_trait::async_trait;

use super::errors::Result;

/// One entry of an organization's repository listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoListing {
    /// Repository name. May be empty if the host omitted it.
    pub name: String,
}

/// Descriptive metadata for a single repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoMetadata {
    pub description: Option<String>,
    pub topics: Vec<String>,
    pub default_branch: Option<String>,
    /// Canonical browser URL.
    pub html_url: Option<String>,
}

/// A file as returned by the host's content endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Opaque content identity (git blob SHA on GitHub).
    pub fingerprint: String,
    /// Base64-encoded file body, possibly wrapped across lines.
    pub content: String,
}

/// Result of looking up an arbitrary path in a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteContent {
    File(RemoteFile),
    /// The path names a directory (or another non-file object).
    Directory,
}

/// Capability set the sync engine needs from a code host.
///
/// # Implementation Notes
///
/// Implementors should:
/// - Handle pagination internally for list operations
/// - Report a missing org, repository or path as `PlatformError::NotFound`
/// - Preserve the HTTP status of other failures in `PlatformError::Api` so
///   rate limits can be recognized
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// List every repository in an organization, all pages flattened.
    async fn list_org_repos(&self, org: &str) -> Result<Vec<RepoListing>>;

    /// Fetch descriptive metadata for one repository.
    async fn get_repo_metadata(&self, org: &str, repo: &str) -> Result<RepoMetadata>;

    /// Fetch the repository's canonical README.
    async fn get_readme(&self, org: &str, repo: &str) -> Result<RemoteFile>;

    /// Fetch whatever lives at `path` in the repository's default branch.
    async fn get_content(&self, org: &str, repo: &str, path: &str) -> Result<RemoteContent>;
}
