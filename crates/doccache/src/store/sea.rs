use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LikeExpr, OnConflict, SimpleExpr};
use sea_orm::{
    ActiveModelBehavior, Condition, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};

use super::errors::{Result, StoreError};
use super::{CacheStore, EntryFilter, EntryPatch, Projection, validate_repo_name};
use crate::entity::RepoCacheEntry;
use crate::entity::repo_cache::{ActiveModel, Column, Entity as RepoCache, Topics};

/// Columns every projection returns.
const SUMMARY_COLUMNS: [Column; 10] = [
    Column::RepoName,
    Column::Description,
    Column::Topics,
    Column::DefaultBranch,
    Column::HtmlUrl,
    Column::LastSyncAt,
    Column::SyncStatus,
    Column::SyncError,
    Column::CreatedAt,
    Column::UpdatedAt,
];

/// Blob columns replaced by NULL in a summary projection.
const BLOB_COLUMNS: [&str; 4] = ["readme", "api_spec", "runbook", "service_metadata"];

/// [`CacheStore`] backed by the `repo_cache` table.
#[derive(Debug)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Get a reference to the underlying connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Escape LIKE wildcards so user text is matched literally.
fn escaped_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('!', "!!")
        .replace('%', "!%")
        .replace('_', "!_");
    format!("%{escaped}%")
}

fn lower_like(expr: impl Into<SimpleExpr>, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(expr.into())).like(LikeExpr::new(escaped_pattern(needle)).escape('!'))
}

/// Match `needle` against each element of the JSON `topics` array.
fn topic_condition(backend: DbBackend, needle: &str) -> SimpleExpr {
    let sql = match backend {
        DbBackend::Postgres => {
            r#"EXISTS (SELECT 1 FROM json_array_elements_text("repo_cache"."topics"::json) AS "topic"("value") WHERE LOWER("topic"."value") LIKE ? ESCAPE '!')"#
        }
        _ => {
            r#"EXISTS (SELECT 1 FROM json_each("repo_cache"."topics") AS "topic" WHERE LOWER("topic"."value") LIKE ? ESCAPE '!')"#
        }
    };
    Expr::cust_with_values(sql, [escaped_pattern(needle)])
}

/// Case-insensitive substring match over name, description and topics.
fn text_condition(backend: DbBackend, needle: &str) -> Condition {
    Condition::any()
        .add(lower_like(Expr::col(Column::RepoName), needle))
        .add(lower_like(Expr::col(Column::Description), needle))
        .add(topic_condition(backend, needle))
}

fn apply_projection(query: Select<RepoCache>, projection: Projection) -> Select<RepoCache> {
    match projection {
        Projection::Full => query,
        Projection::Summary => BLOB_COLUMNS.iter().fold(
            query.select_only().columns(SUMMARY_COLUMNS),
            |query, column| query.column_as(Expr::cust("NULL"), *column),
        ),
    }
}

/// Build the insert model and the set of columns the conflict branch updates.
///
/// Only the patch's own columns are touched on update, so a failed sync keeps
/// cached metadata and documents. `created_at` is set for inserts only.
pub(crate) fn build_upsert(repo_name: &str, patch: EntryPatch) -> (ActiveModel, Vec<Column>) {
    let now = Utc::now();
    let mut model = ActiveModel::new();
    model.repo_name = Set(repo_name.to_string());
    model.sync_status = Set(patch.sync_status);
    model.sync_error = Set(patch.sync_error);
    model.last_sync_at = Set(Some(patch.last_sync_at));
    model.created_at = Set(now);
    model.updated_at = Set(now);

    let mut columns = vec![
        Column::SyncStatus,
        Column::SyncError,
        Column::LastSyncAt,
        Column::UpdatedAt,
    ];

    if let Some(meta) = patch.metadata {
        model.description = Set(meta.description);
        model.topics = Set(Topics(meta.topics));
        model.default_branch = Set(meta.default_branch);
        model.html_url = Set(meta.html_url);
        columns.extend([
            Column::Description,
            Column::Topics,
            Column::DefaultBranch,
            Column::HtmlUrl,
        ]);
    }

    if let Some(docs) = patch.docs {
        model.readme = Set(docs.readme);
        model.api_spec = Set(docs.api_spec);
        model.runbook = Set(docs.runbook);
        model.service_metadata = Set(docs.service_metadata);
        columns.extend([
            Column::Readme,
            Column::ApiSpec,
            Column::Runbook,
            Column::ServiceMetadata,
        ]);
    }

    (model, columns)
}

#[async_trait]
impl CacheStore for SeaOrmStore {
    async fn find(
        &self,
        filter: &EntryFilter,
        projection: Projection,
    ) -> Result<Vec<RepoCacheEntry>> {
        let mut query = RepoCache::find().order_by_asc(Column::RepoName);
        if let Some(needle) = filter.needle() {
            query = query.filter(text_condition(self.db.get_database_backend(), &needle));
        }

        let entries = apply_projection(query, projection)
            .into_model::<RepoCacheEntry>()
            .all(&self.db)
            .await?;
        Ok(entries)
    }

    async fn find_one(&self, repo_name: &str) -> Result<Option<RepoCacheEntry>> {
        Ok(RepoCache::find_by_id(repo_name.to_string())
            .one(&self.db)
            .await?)
    }

    async fn upsert(&self, repo_name: &str, patch: EntryPatch) -> Result<RepoCacheEntry> {
        validate_repo_name(repo_name)?;

        let (model, columns) = build_upsert(repo_name, patch);
        RepoCache::insert(model)
            .on_conflict(
                OnConflict::column(Column::RepoName)
                    .update_columns(columns)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        self.find_one(repo_name)
            .await?
            .ok_or_else(|| StoreError::not_found(repo_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    use crate::entity::doc_blob::DocSet;
    use crate::entity::sync_status::SyncStatus;
    use crate::platform::RepoMetadata;

    // `Column` is generated by `DeriveEntityModel` without `PartialEq`;
    // the assertions below need it for `contains`.
    impl PartialEq for Column {
        fn eq(&self, other: &Self) -> bool {
            std::mem::discriminant(self) == std::mem::discriminant(other)
        }
    }

    #[test]
    fn failed_patch_only_updates_tracking_columns() {
        let patch = EntryPatch::failed(SyncStatus::Failed, "boom", Utc::now());
        let (model, columns) = build_upsert("payments", patch);

        assert_eq!(columns.len(), 4);
        assert!(!columns.contains(&Column::Readme));
        assert!(!columns.contains(&Column::CreatedAt));
        assert!(model.readme.is_not_set());
        assert!(model.topics.is_not_set());
    }

    #[test]
    fn synced_patch_updates_metadata_and_documents() {
        let patch = EntryPatch::synced(RepoMetadata::default(), DocSet::default(), Utc::now());
        let (_, columns) = build_upsert("payments", patch);

        assert_eq!(columns.len(), 12);
        assert!(columns.contains(&Column::ServiceMetadata));
        assert!(columns.contains(&Column::Topics));
        assert!(!columns.contains(&Column::CreatedAt));
    }

    #[test]
    fn summary_projection_selects_null_blobs() {
        let sql = apply_projection(RepoCache::find(), Projection::Summary)
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains("NULL AS \"readme\""), "{sql}");
        assert!(sql.contains("NULL AS \"service_metadata\""), "{sql}");
        assert!(!sql.contains("\"repo_cache\".\"readme\""), "{sql}");
    }

    #[test]
    fn text_filter_escapes_wildcards() {
        let sql = RepoCache::find()
            .filter(text_condition(DbBackend::Sqlite, "50%_off"))
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains("LOWER"), "{sql}");
        assert!(sql.contains("50!%!_off"), "{sql}");
        assert!(sql.contains("ESCAPE"), "{sql}");
    }

    #[test]
    fn topic_filter_matches_array_elements() {
        let sql = RepoCache::find()
            .filter(text_condition(DbBackend::Sqlite, "api"))
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains("json_each(\"repo_cache\".\"topics\")"), "{sql}");
        assert!(!sql.contains("CAST"), "{sql}");

        let sql = RepoCache::find()
            .filter(text_condition(DbBackend::Postgres, "api"))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains("json_array_elements_text"), "{sql}");
        assert!(sql.contains("'%api%'"), "{sql}");
    }
}
