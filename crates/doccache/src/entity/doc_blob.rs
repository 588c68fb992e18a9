//! Cached document blobs and the document kinds they belong to.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Candidate locations for an API specification, highest priority first.
pub const API_SPEC_PATHS: &[&str] = &[
    "docs/openapi.yaml",
    "docs/openapi.yml",
    "docs/openapi.json",
    "openapi.yaml",
    "openapi.yml",
    "openapi.json",
];

/// Candidate locations for an operational runbook, highest priority first.
pub const RUNBOOK_PATHS: &[&str] = &["docs/runbook.md", "runbook.md"];

/// Candidate locations for service metadata, highest priority first.
pub const SERVICE_METADATA_PATHS: &[&str] = &[
    "docs/service.yaml",
    "service.yaml",
    "docs/service.json",
    "service.json",
];

/// Serialization format of a cached document, derived from its path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocFormat {
    Yaml,
    Json,
    Markdown,
    #[default]
    Undetermined,
}

impl DocFormat {
    /// Derive the format from a file path's extension.
    ///
    /// `.yaml`/`.yml` map to YAML, `.json` to JSON and `.md` to Markdown.
    /// Anything else is undetermined.
    pub fn from_path(path: &str) -> Self {
        if path.ends_with(".yaml") || path.ends_with(".yml") {
            Self::Yaml
        } else if path.ends_with(".json") {
            Self::Json
        } else if path.ends_with(".md") {
            Self::Markdown
        } else {
            Self::Undetermined
        }
    }

    /// Whether documents in this format must parse before being accepted.
    #[inline]
    pub fn is_structured(self) -> bool {
        matches!(self, Self::Yaml | Self::Json)
    }
}

impl fmt::Display for DocFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocFormat::Yaml => write!(f, "yaml"),
            DocFormat::Json => write!(f, "json"),
            DocFormat::Markdown => write!(f, "markdown"),
            DocFormat::Undetermined => write!(f, "undetermined"),
        }
    }
}

/// The four documents tracked per repository.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocKind {
    Readme,
    ApiSpec,
    Runbook,
    ServiceMetadata,
}

impl DocKind {
    /// All kinds, in the order a sync resolves them.
    pub const ALL: [DocKind; 4] = [
        DocKind::Readme,
        DocKind::ApiSpec,
        DocKind::Runbook,
        DocKind::ServiceMetadata,
    ];

    /// Ordered candidate paths for this kind.
    ///
    /// The README has none: it is fetched through the host's dedicated
    /// README endpoint instead of by path.
    pub fn candidate_paths(self) -> &'static [&'static str] {
        match self {
            DocKind::Readme => &[],
            DocKind::ApiSpec => API_SPEC_PATHS,
            DocKind::Runbook => RUNBOOK_PATHS,
            DocKind::ServiceMetadata => SERVICE_METADATA_PATHS,
        }
    }

    /// Whether acceptance requires a structural marker beyond parseability.
    ///
    /// Only the API specification is strict.
    #[inline]
    pub fn is_strict_schema(self) -> bool {
        matches!(self, DocKind::ApiSpec)
    }

    /// Stable snake_case name, matching the storage column.
    pub fn as_str(self) -> &'static str {
        match self {
            DocKind::Readme => "readme",
            DocKind::ApiSpec => "api_spec",
            DocKind::Runbook => "runbook",
            DocKind::ServiceMetadata => "service_metadata",
        }
    }
}

impl fmt::Display for DocKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown document kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown document kind: {0} (expected readme, openapi, runbook or metadata)")]
pub struct UnknownDocKind(pub String);

impl FromStr for DocKind {
    type Err = UnknownDocKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "readme" => Ok(DocKind::Readme),
            "openapi" | "api_spec" | "api-spec" | "apispec" => Ok(DocKind::ApiSpec),
            "runbook" => Ok(DocKind::Runbook),
            "metadata" | "service_metadata" | "service-metadata" | "servicemetadata" => {
                Ok(DocKind::ServiceMetadata)
            }
            other => Err(UnknownDocKind(other.to_string())),
        }
    }
}

/// A validated document as fetched from the remote host.
///
/// Stored as a JSON column. A blob is only ever written after it has passed
/// validation for its kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct DocBlob {
    /// Decoded document text.
    pub content: String,
    /// Opaque content identity reported by the host (a git blob SHA on GitHub).
    pub fingerprint: String,
    /// When this content was fetched and validated.
    pub fetched_at: DateTime<Utc>,
    /// Format derived from the path the document was found at.
    pub format: DocFormat,
}

/// The resolved set of documents for one repository.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocSet {
    pub readme: Option<DocBlob>,
    pub api_spec: Option<DocBlob>,
    pub runbook: Option<DocBlob>,
    pub service_metadata: Option<DocBlob>,
}

impl DocSet {
    pub fn get(&self, kind: DocKind) -> Option<&DocBlob> {
        match kind {
            DocKind::Readme => self.readme.as_ref(),
            DocKind::ApiSpec => self.api_spec.as_ref(),
            DocKind::Runbook => self.runbook.as_ref(),
            DocKind::ServiceMetadata => self.service_metadata.as_ref(),
        }
    }

    pub fn set(&mut self, kind: DocKind, blob: Option<DocBlob>) {
        match kind {
            DocKind::Readme => self.readme = blob,
            DocKind::ApiSpec => self.api_spec = blob,
            DocKind::Runbook => self.runbook = blob,
            DocKind::ServiceMetadata => self.service_metadata = blob,
        }
    }

    /// Number of kinds with a document present.
    pub fn present(&self) -> usize {
        DocKind::ALL
            .iter()
            .filter(|kind| self.get(**kind).is_some())
            .count()
    }
}
