//! Initial migration creating the repository documentation cache table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RepoCache::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RepoCache::RepoName)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    // Metadata
                    .col(ColumnDef::new(RepoCache::Description).text().null())
                    .col(
                        ColumnDef::new(RepoCache::Topics)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .col(ColumnDef::new(RepoCache::DefaultBranch).string().null())
                    .col(ColumnDef::new(RepoCache::HtmlUrl).text().null())
                    // Documents
                    .col(ColumnDef::new(RepoCache::Readme).json().null())
                    .col(ColumnDef::new(RepoCache::ApiSpec).json().null())
                    .col(ColumnDef::new(RepoCache::Runbook).json().null())
                    .col(ColumnDef::new(RepoCache::ServiceMetadata).json().null())
                    // Tracking
                    .col(
                        ColumnDef::new(RepoCache::LastSyncAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RepoCache::SyncStatus)
                            .string()
                            .not_null()
                            .default("idle"),
                    )
                    .col(ColumnDef::new(RepoCache::SyncError).text().null())
                    .col(
                        ColumnDef::new(RepoCache::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(RepoCache::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_repo_cache_sync_status")
                    .table(RepoCache::Table)
                    .col(RepoCache::SyncStatus)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_repo_cache_last_sync_at")
                    .table(RepoCache::Table)
                    .col(RepoCache::LastSyncAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RepoCache::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
#[sea_orm(iden = "repo_cache")]
enum RepoCache {
    Table,
    RepoName,
    Description,
    Topics,
    DefaultBranch,
    HtmlUrl,
    Readme,
    ApiSpec,
    Runbook,
    ServiceMetadata,
    LastSyncAt,
    SyncStatus,
    SyncError,
    CreatedAt,
    UpdatedAt,
}
