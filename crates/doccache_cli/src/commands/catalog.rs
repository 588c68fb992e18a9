use std::io::Write;
use std::sync::Arc;

use doccache::github::GitHubClient;
use doccache::{
    Catalog, DocKind, IncludeSet, ListQuery, RateLimitedClient, RemoteClient, RepoCacheEntry,
    SeaOrmStore, connect_and_migrate,
};

use crate::RemoteOptions;
use crate::config::Config;
use crate::progress::LoggingReporter;

/// Catalog as wired by the CLI: GitHub (optionally paced) over the database store.
pub(crate) type CliCatalog = Catalog<dyn RemoteClient, SeaOrmStore>;

/// Build the remote client, open the database and assemble the catalog.
pub(crate) async fn open_catalog(
    config: &Config,
    database_url: &str,
    remote: &RemoteOptions,
) -> Result<CliCatalog, Box<dyn std::error::Error>> {
    let github = match config.github_token() {
        Some(token) => GitHubClient::new(&token)?,
        None => {
            tracing::warn!(
                "No GitHub token configured (DOCCACHE_GITHUB_TOKEN); using anonymous access"
            );
            GitHubClient::anonymous()?
        }
    };

    let client: Arc<dyn RemoteClient> = if remote.no_pacing || !config.sync.pacing {
        Arc::new(github)
    } else {
        Arc::new(RateLimitedClient::new(github, config.sync.rps))
    };

    let db = connect_and_migrate(database_url).await?;
    let store = Arc::new(SeaOrmStore::new(db));
    let settings = config.sync_settings(remote.org.clone(), remote.concurrency);
    tracing::debug!(org = %settings.org, concurrency = settings.concurrency, "Catalog ready");

    Ok(Catalog::new(client, store, settings).with_progress(LoggingReporter::new().into_callback()))
}

/// One row of the `list` table.
#[derive(Debug, Clone, tabled::Tabled)]
pub(crate) struct EntryRow {
    #[tabled(rename = "Repository")]
    pub repo: String,
    #[tabled(rename = "Description")]
    pub description: String,
    #[tabled(rename = "Topics")]
    pub topics: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Last Sync")]
    pub last_sync: String,
    #[tabled(rename = "Documents")]
    pub documents: String,
}

/// Longest description shown in a table cell.
const DESCRIPTION_WIDTH: usize = 48;

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let head: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

impl From<&RepoCacheEntry> for EntryRow {
    fn from(entry: &RepoCacheEntry) -> Self {
        let documents: Vec<&str> = DocKind::ALL
            .into_iter()
            .filter(|kind| entry.doc(*kind).is_some())
            .map(DocKind::as_str)
            .collect();

        Self {
            repo: entry.repo_name.clone(),
            description: truncate(
                entry.description.as_deref().unwrap_or_default(),
                DESCRIPTION_WIDTH,
            ),
            topics: entry.topics.0.join(", "),
            status: entry.sync_status.to_string(),
            last_sync: entry
                .last_sync_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "never".to_string()),
            documents: if documents.is_empty() {
                "-".to_string()
            } else {
                documents.join(", ")
            },
        }
    }
}

pub(crate) async fn handle_list(
    catalog: &CliCatalog,
    q: Option<String>,
    include: Option<&str>,
    refresh: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let query = ListQuery {
        q,
        include: include.map(IncludeSet::parse).unwrap_or_default(),
        refresh,
    };
    let entries = catalog.list(&query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No cached repositories. Run `doccache sync` first.");
        return Ok(());
    }

    let rows: Vec<EntryRow> = entries.iter().map(EntryRow::from).collect();
    let mut table = tabled::Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    println!("{}", table);
    Ok(())
}

pub(crate) async fn handle_show(
    catalog: &CliCatalog,
    repo: &str,
    refresh: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let entry = catalog.get(repo, refresh).await?;
    println!("{}", serde_json::to_string_pretty(&entry)?);
    Ok(())
}

pub(crate) async fn handle_doc(
    catalog: &CliCatalog,
    repo: &str,
    kind: DocKind,
    refresh: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let blob = catalog.document(repo, kind, refresh).await?;
    tracing::debug!(
        repo = %repo,
        kind = %kind,
        format = %blob.format,
        fetched_at = %blob.fetched_at,
        "Serving cached document"
    );

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(blob.content.as_bytes())?;
    if !blob.content.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use doccache::{DocBlob, DocFormat, SyncStatus, Topics};

    #[test]
    fn truncate_long_descriptions() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn entry_row_lists_present_documents() {
        let mut entry = RepoCacheEntry::new_idle("payments", Utc::now());
        entry.topics = Topics(vec!["api".to_string(), "billing".to_string()]);
        entry.sync_status = SyncStatus::Ok;
        entry.runbook = Some(DocBlob {
            content: "# Runbook".to_string(),
            fingerprint: "fp".to_string(),
            fetched_at: Utc::now(),
            format: DocFormat::Markdown,
        });

        let row = EntryRow::from(&entry);
        assert_eq!(row.repo, "payments");
        assert_eq!(row.topics, "api, billing");
        assert_eq!(row.status, "ok");
        assert_eq!(row.last_sync, "never");
        assert_eq!(row.documents, "runbook");
    }

    #[test]
    fn entry_row_without_documents() {
        let entry = RepoCacheEntry::new_idle("inventory", Utc::now());
        let row = EntryRow::from(&entry);
        assert_eq!(row.documents, "-");
        assert_eq!(row.description, "");
    }
}
