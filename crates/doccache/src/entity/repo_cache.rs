//! RepoCache entity - one cached documentation record per repository.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::doc_blob::{DocBlob, DocKind, DocSet};
use crate::entity::sync_status::SyncStatus;

/// Repository topics (stored as a JSON array for cross-database compatibility).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Topics(pub Vec<String>);

impl From<Vec<String>> for Topics {
    fn from(topics: Vec<String>) -> Self {
        Self(topics)
    }
}

/// RepoCache model - the latest accepted documents and metadata for a repository.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "repo_cache")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Repository name, unique within the configured organization.
    #[sea_orm(primary_key, auto_increment = false)]
    pub repo_name: String,

    // ─── Metadata ────────────────────────────────────────────────────────────
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Json")]
    pub topics: Topics,
    pub default_branch: Option<String>,
    /// Canonical browser URL of the repository.
    #[sea_orm(column_type = "Text", nullable)]
    pub html_url: Option<String>,

    // ─── Documents ───────────────────────────────────────────────────────────
    #[sea_orm(column_type = "Json", nullable)]
    pub readme: Option<DocBlob>,
    #[sea_orm(column_type = "Json", nullable)]
    pub api_spec: Option<DocBlob>,
    #[sea_orm(column_type = "Json", nullable)]
    pub runbook: Option<DocBlob>,
    #[sea_orm(column_type = "Json", nullable)]
    pub service_metadata: Option<DocBlob>,

    // ─── Tracking ────────────────────────────────────────────────────────────
    /// When a sync last finished for this repository, successfully or not.
    pub last_sync_at: Option<DateTimeUtc>,
    pub sync_status: SyncStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub sync_error: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// A freshly inserted entry with column defaults applied.
    pub fn new_idle(repo_name: impl Into<String>, now: DateTimeUtc) -> Self {
        Self {
            repo_name: repo_name.into(),
            description: None,
            topics: Topics::default(),
            default_branch: None,
            html_url: None,
            readme: None,
            api_spec: None,
            runbook: None,
            service_metadata: None,
            last_sync_at: None,
            sync_status: SyncStatus::Idle,
            sync_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The cached document of the given kind, if any.
    pub fn doc(&self, kind: DocKind) -> Option<&DocBlob> {
        match kind {
            DocKind::Readme => self.readme.as_ref(),
            DocKind::ApiSpec => self.api_spec.as_ref(),
            DocKind::Runbook => self.runbook.as_ref(),
            DocKind::ServiceMetadata => self.service_metadata.as_ref(),
        }
    }

    /// Copy of all four cached documents.
    pub fn docs(&self) -> DocSet {
        DocSet {
            readme: self.readme.clone(),
            api_spec: self.api_spec.clone(),
            runbook: self.runbook.clone(),
            service_metadata: self.service_metadata.clone(),
        }
    }

    /// Replace all four documents at once.
    pub fn set_docs(&mut self, docs: DocSet) {
        self.readme = docs.readme;
        self.api_spec = docs.api_spec;
        self.runbook = docs.runbook;
        self.service_metadata = docs.service_metadata;
    }

    /// Drop every document whose kind is not accepted by `keep`.
    pub fn retain_docs(&mut self, keep: impl Fn(DocKind) -> bool) {
        let mut docs = self.docs();
        for kind in DocKind::ALL {
            if !keep(kind) {
                docs.set(kind, None);
            }
        }
        self.set_docs(docs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::entity::doc_blob::DocFormat;

    fn blob(content: &str) -> DocBlob {
        DocBlob {
            content: content.to_string(),
            fingerprint: format!("sha-{content}"),
            fetched_at: Utc::now(),
            format: DocFormat::Markdown,
        }
    }

    #[test]
    fn new_idle_applies_defaults() {
        let model = Model::new_idle("payments", Utc::now());
        assert_eq!(model.repo_name, "payments");
        assert_eq!(model.sync_status, SyncStatus::Idle);
        assert!(model.topics.0.is_empty());
        assert!(model.last_sync_at.is_none());
        assert_eq!(model.docs().present(), 0);
    }

    #[test]
    fn retain_docs_blanks_excluded_kinds() {
        let mut model = Model::new_idle("payments", Utc::now());
        model.readme = Some(blob("readme"));
        model.runbook = Some(blob("runbook"));

        model.retain_docs(|kind| kind == DocKind::Runbook);

        assert!(model.readme.is_none());
        assert_eq!(model.doc(DocKind::Runbook).map(|b| b.content.as_str()), Some("runbook"));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let model = Model::new_idle("inventory", Utc::now());
        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value["repoName"], "inventory");
        assert_eq!(value["syncStatus"], "idle");
        assert!(value["topics"].as_array().unwrap().is_empty());
    }
}
