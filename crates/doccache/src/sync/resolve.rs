//! Candidate path resolution and document validation.
//!
//! For each document kind the resolver walks the ordered candidate paths and
//! returns the first document that passes validation. Missing paths,
//! directories and invalid documents fall through to the next candidate;
//! any other transport error aborts the resolution.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;

use super::fingerprint::is_unchanged;
use crate::entity::doc_blob::{DocBlob, DocFormat, DocKind};
use crate::platform::{self, RemoteClient, RemoteContent, RemoteFile};

/// Top-level key that identifies an API specification document.
pub const API_SPEC_MARKER: &str = "openapi";

/// Why a fetched document was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("content is not valid base64")]
    Undecodable,
    #[error("content is empty")]
    Empty,
    #[error("content does not parse as {0}")]
    Unparseable(DocFormat),
    #[error("missing top-level `openapi` key")]
    MissingMarker,
}

/// Decode a base64 body, ignoring the line wrapping hosts insert.
pub fn decode_content(encoded: &str) -> Result<String, Rejection> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|_| Rejection::Undecodable)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn yaml_has_marker(content: &str) -> Result<bool, Rejection> {
    let value: serde_yaml_ng::Value =
        serde_yaml_ng::from_str(content).map_err(|_| Rejection::Unparseable(DocFormat::Yaml))?;
    Ok(value
        .as_mapping()
        .is_some_and(|map| map.contains_key(API_SPEC_MARKER)))
}

/// Everything but null, false, zero and the empty string.
fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

fn json_has_marker(content: &str) -> Result<bool, Rejection> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|_| Rejection::Unparseable(DocFormat::Json))?;
    Ok(value.get(API_SPEC_MARKER).is_some_and(is_truthy))
}

/// Validate decoded content for a document of the given format.
///
/// - Blank content is always rejected.
/// - Strict kinds must parse and carry the [`API_SPEC_MARKER`] key. A YAML
///   mapping only needs the key; a JSON object needs a truthy value.
/// - Other YAML/JSON documents must parse.
/// - Markdown and undetermined formats are not inspected further.
pub fn validate(content: &str, format: DocFormat, strict: bool) -> Result<(), Rejection> {
    if content.trim().is_empty() {
        return Err(Rejection::Empty);
    }

    if !format.is_structured() {
        return if strict {
            Err(Rejection::Unparseable(format))
        } else {
            Ok(())
        };
    }

    let has_marker = if format == DocFormat::Yaml {
        yaml_has_marker(content)?
    } else {
        json_has_marker(content)?
    };

    if strict && !has_marker {
        return Err(Rejection::MissingMarker);
    }
    Ok(())
}

/// What happened to one document kind during a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The cached blob was kept because its fingerprint matched.
    Unchanged(DocBlob),
    /// A new document was accepted.
    Fetched(DocBlob),
    /// No candidate produced an acceptable document.
    Absent,
}

impl Resolution {
    /// The blob to store for this kind.
    pub fn into_blob(self) -> Option<DocBlob> {
        match self {
            Self::Unchanged(blob) | Self::Fetched(blob) => Some(blob),
            Self::Absent => None,
        }
    }

    #[inline]
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged(_))
    }

    #[inline]
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

/// Resolves the documents of a single repository.
pub struct Resolver<'a, C: ?Sized> {
    client: &'a C,
    org: &'a str,
    repo: &'a str,
    force: bool,
}

impl<'a, C: RemoteClient + ?Sized> Resolver<'a, C> {
    pub fn new(client: &'a C, org: &'a str, repo: &'a str, force: bool) -> Self {
        Self {
            client,
            org,
            repo,
            force,
        }
    }

    /// Resolve one document kind against its cached blob.
    pub async fn resolve(
        &self,
        kind: DocKind,
        existing: Option<&DocBlob>,
    ) -> platform::Result<Resolution> {
        match kind {
            DocKind::Readme => self.resolve_readme(existing).await,
            _ => {
                self.resolve_paths(
                    kind.candidate_paths(),
                    existing,
                    kind.is_strict_schema(),
                )
                .await
            }
        }
    }

    /// Fetch the README through the host's dedicated endpoint.
    async fn resolve_readme(&self, existing: Option<&DocBlob>) -> platform::Result<Resolution> {
        let file = match self.client.get_readme(self.org, self.repo).await {
            Ok(file) => file,
            Err(e) if e.is_not_found() => return Ok(Resolution::Absent),
            Err(e) => return Err(e),
        };

        Ok(self
            .accept(file, existing, DocFormat::Markdown, false, "README")
            .unwrap_or(Resolution::Absent))
    }

    /// Walk `paths` in order and return the first acceptable document.
    pub async fn resolve_paths(
        &self,
        paths: &[&str],
        existing: Option<&DocBlob>,
        strict: bool,
    ) -> platform::Result<Resolution> {
        for path in paths {
            let file = match self.client.get_content(self.org, self.repo, path).await {
                Ok(RemoteContent::File(file)) => file,
                Ok(RemoteContent::Directory) => {
                    tracing::debug!(repo = %self.repo, path = %path, "Path is a directory, trying next");
                    continue;
                }
                Err(e) if e.is_not_found() => {
                    tracing::debug!(repo = %self.repo, path = %path, "Path not found, trying next");
                    continue;
                }
                Err(e) => return Err(e),
            };

            if let Some(resolution) =
                self.accept(file, existing, DocFormat::from_path(path), strict, path)
            {
                return Ok(resolution);
            }
        }

        Ok(Resolution::Absent)
    }

    /// Gate on the fingerprint, then decode and validate.
    ///
    /// Returns `None` when the document is rejected.
    fn accept(
        &self,
        file: RemoteFile,
        existing: Option<&DocBlob>,
        format: DocFormat,
        strict: bool,
        path: &str,
    ) -> Option<Resolution> {
        if is_unchanged(existing, &file.fingerprint, self.force) {
            tracing::debug!(repo = %self.repo, path = %path, "Fingerprint unchanged, keeping cached document");
            return existing.cloned().map(Resolution::Unchanged);
        }

        let checked =
            decode_content(&file.content).and_then(|content| {
                validate(&content, format, strict).map(|()| content)
            });

        match checked {
            Ok(content) => Some(Resolution::Fetched(DocBlob {
                content,
                fingerprint: file.fingerprint,
                fetched_at: Utc::now(),
                format,
            })),
            Err(rejection) => {
                tracing::debug!(repo = %self.repo, path = %path, %rejection, "Rejected document, trying next");
                None
            }
        }
    }
}
