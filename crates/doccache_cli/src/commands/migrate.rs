use doccache::migration::{Migrator, MigratorTrait};
use doccache::{CacheStore, EntryFilter, Projection, SeaOrmStore, db};

use crate::MigrateAction;

/// Number of cached repositories, or zero when the table does not exist yet.
async fn cached_repos(store: &SeaOrmStore) -> usize {
    store
        .find(&EntryFilter::default(), Projection::Summary)
        .await
        .map(|entries| entries.len())
        .unwrap_or_default()
}

fn status_line(name: &str, applied: bool) -> String {
    let state = if applied { "applied" } else { "pending" };
    format!("  {state:<8} {name}")
}

pub(crate) async fn handle_migrate(
    action: MigrateAction,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = SeaOrmStore::new(db::connect(database_url).await?);
    let db = store.connection();

    match action {
        MigrateAction::Up => {
            let pending = Migrator::get_pending_migrations(db).await?;
            if pending.is_empty() {
                println!("Cache schema is up to date.");
                return Ok(());
            }
            Migrator::up(db, None).await?;
            println!("Applied {} migration(s) to {database_url}.", pending.len());
        }
        MigrateAction::Down => {
            Migrator::down(db, Some(1)).await?;
            println!("Rolled back the last migration. Run `doccache migrate up` before syncing.");
        }
        MigrateAction::Status => {
            let applied = Migrator::get_applied_migrations(db).await?;
            let pending = Migrator::get_pending_migrations(db).await?;

            println!("Migrations for {database_url}:");
            for migration in &applied {
                println!("{}", status_line(migration.name(), true));
            }
            for migration in &pending {
                println!("{}", status_line(migration.name(), false));
            }

            if pending.is_empty() {
                println!("{} repositories cached.", cached_repos(&store).await);
            }
        }
        MigrateAction::Fresh => {
            let dropped = cached_repos(&store).await;
            Migrator::fresh(db).await?;
            tracing::warn!(dropped, "Cache schema recreated");
            println!("Recreated the cache schema; {dropped} cached repositories were dropped.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lines_align_states() {
        assert_eq!(
            status_line("m20261019_000001_create_repo_cache", true),
            "  applied  m20261019_000001_create_repo_cache"
        );
        assert_eq!(status_line("m2", false), "  pending  m2");
    }

    #[tokio::test]
    async fn cached_repos_is_zero_before_migrating() {
        let store = SeaOrmStore::new(db::connect("sqlite::memory:").await.unwrap());
        assert_eq!(cached_repos(&store).await, 0);
    }
}
