//! In-memory fake code host shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use doccache::platform::{
    PlatformError, RemoteClient, RemoteContent, RemoteFile, RepoListing, RepoMetadata, Result,
};

/// A canned failure, rebuilt into a fresh `PlatformError` on every call.
#[derive(Debug, Clone)]
pub enum FakeError {
    /// HTTP status with message (404 becomes `NotFound`).
    Status(u16, String),
    /// Transport failure without a status.
    Network(String),
}

impl FakeError {
    fn to_platform(&self, resource: &str) -> PlatformError {
        match self {
            FakeError::Status(404, _) => PlatformError::not_found(resource),
            FakeError::Status(status, message) => PlatformError::api(*status, message.clone()),
            FakeError::Network(message) => PlatformError::network(message.clone()),
        }
    }
}

#[derive(Debug, Clone)]
enum Entry {
    File { fingerprint: String, content: String },
    Directory,
    Error(FakeError),
}

/// Remote client backed by hash maps.
///
/// Unknown repositories and paths answer 404. Every call is recorded so
/// tests can assert on probe order.
#[derive(Debug, Default)]
pub struct FakeRemote {
    listing: Vec<String>,
    listing_error: Option<FakeError>,
    metadata: HashMap<String, RepoMetadata>,
    metadata_errors: HashMap<String, FakeError>,
    readmes: HashMap<String, Entry>,
    files: HashMap<(String, String), Entry>,
    calls: Mutex<Vec<String>>,
}

pub fn encode(content: &str) -> String {
    // Hosts wrap base64 at 60 columns.
    let encoded = STANDARD.encode(content);
    encoded
        .as_bytes()
        .chunks(60)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository with metadata derived from its name.
    pub fn repo(mut self, name: &str) -> Self {
        self.listing.push(name.to_string());
        self.metadata.insert(
            name.to_string(),
            RepoMetadata {
                description: Some(format!("The {name} service")),
                topics: vec!["service".to_string()],
                default_branch: Some("main".to_string()),
                html_url: Some(format!("https://github.com/acme/{name}")),
            },
        );
        self
    }

    /// Add a raw name to the org listing without registering the repository.
    pub fn listed(mut self, name: &str) -> Self {
        self.listing.push(name.to_string());
        self
    }

    pub fn listing_error(mut self, error: FakeError) -> Self {
        self.listing_error = Some(error);
        self
    }

    pub fn metadata_error(mut self, repo: &str, error: FakeError) -> Self {
        self.metadata_errors.insert(repo.to_string(), error);
        self
    }

    pub fn readme(mut self, repo: &str, fingerprint: &str, content: &str) -> Self {
        self.readmes.insert(
            repo.to_string(),
            Entry::File {
                fingerprint: fingerprint.to_string(),
                content: encode(content),
            },
        );
        self
    }

    pub fn readme_error(mut self, repo: &str, error: FakeError) -> Self {
        self.readmes.insert(repo.to_string(), Entry::Error(error));
        self
    }

    pub fn file(mut self, repo: &str, path: &str, fingerprint: &str, content: &str) -> Self {
        self.files.insert(
            (repo.to_string(), path.to_string()),
            Entry::File {
                fingerprint: fingerprint.to_string(),
                content: encode(content),
            },
        );
        self
    }

    pub fn directory(mut self, repo: &str, path: &str) -> Self {
        self.files
            .insert((repo.to_string(), path.to_string()), Entry::Directory);
        self
    }

    pub fn file_error(mut self, repo: &str, path: &str, error: FakeError) -> Self {
        self.files
            .insert((repo.to_string(), path.to_string()), Entry::Error(error));
        self
    }

    /// Recorded calls, e.g. `content:payments:docs/openapi.yaml`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Recorded content probes for one repository, in order.
    pub fn content_probes(&self, repo: &str) -> Vec<String> {
        let prefix = format!("content:{repo}:");
        self.calls()
            .into_iter()
            .filter_map(|call| call.strip_prefix(&prefix).map(String::from))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl RemoteClient for FakeRemote {
    async fn list_org_repos(&self, org: &str) -> Result<Vec<RepoListing>> {
        self.record(format!("list:{org}"));
        if let Some(error) = &self.listing_error {
            return Err(error.to_platform(org));
        }
        Ok(self
            .listing
            .iter()
            .map(|name| RepoListing { name: name.clone() })
            .collect())
    }

    async fn get_repo_metadata(&self, org: &str, repo: &str) -> Result<RepoMetadata> {
        self.record(format!("metadata:{repo}"));
        let resource = format!("{org}/{repo}");
        if let Some(error) = self.metadata_errors.get(repo) {
            return Err(error.to_platform(&resource));
        }
        self.metadata
            .get(repo)
            .cloned()
            .ok_or_else(|| PlatformError::not_found(resource))
    }

    async fn get_readme(&self, org: &str, repo: &str) -> Result<RemoteFile> {
        self.record(format!("readme:{repo}"));
        let resource = format!("{org}/{repo}/README");
        match self.readmes.get(repo) {
            Some(Entry::File {
                fingerprint,
                content,
            }) => Ok(RemoteFile {
                fingerprint: fingerprint.clone(),
                content: content.clone(),
            }),
            Some(Entry::Error(error)) => Err(error.to_platform(&resource)),
            Some(Entry::Directory) | None => Err(PlatformError::not_found(resource)),
        }
    }

    async fn get_content(&self, org: &str, repo: &str, path: &str) -> Result<RemoteContent> {
        self.record(format!("content:{repo}:{path}"));
        let resource = format!("{org}/{repo}/{path}");
        match self.files.get(&(repo.to_string(), path.to_string())) {
            Some(Entry::File {
                fingerprint,
                content,
            }) => Ok(RemoteContent::File(RemoteFile {
                fingerprint: fingerprint.clone(),
                content: content.clone(),
            })),
            Some(Entry::Directory) => Ok(RemoteContent::Directory),
            Some(Entry::Error(error)) => Err(error.to_platform(&resource)),
            None => Err(PlatformError::not_found(resource)),
        }
    }
}
