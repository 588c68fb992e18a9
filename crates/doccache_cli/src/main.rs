//! Doccache CLI - command-line interface for the repository documentation cache.

mod commands;
mod config;
mod progress;

use clap::{Args, Parser, Subcommand};
use doccache::DocKind;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "doccache")]
#[command(version)]
#[command(about = "A local cache of per-repository documentation")]
#[command(
    long_about = "Doccache mirrors each repository's README, API specification, runbook and \
service metadata from a GitHub organization into a local database, so documentation can be \
listed and read without calling GitHub every time."
)]
#[command(after_long_help = r#"EXAMPLES
    Sync every repository in the configured organization:
        $ doccache sync

    Re-fetch two repositories even if nothing changed:
        $ doccache sync payments inventory --force

    List repositories mentioning "pay", with their READMEs:
        $ doccache list -q pay -i readme --json

    Print a cached runbook:
        $ doccache doc payments runbook

CONFIGURATION
    Doccache reads configuration from:
      1. ~/.config/doccache/config.toml (or $XDG_CONFIG_HOME/doccache/config.toml)
      2. ./doccache.toml
      3. Environment variables (DOCCACHE_* prefix, e.g., DOCCACHE_GITHUB_TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    DOCCACHE_DATABASE_URL      Database connection string (default: ~/.local/state/doccache/doccache.db)
    DOCCACHE_GITHUB_TOKEN      GitHub personal access token
    DOCCACHE_GITHUB_ORG        Organization to cache (default: Ngx-Workshop)
    DOCCACHE_SYNC_CONCURRENCY  Repositories synced at once (default: 3)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options controlling how the catalog reaches GitHub.
#[derive(Debug, Clone, Args)]
struct RemoteOptions {
    /// Organization to sync (default from config or Ngx-Workshop)
    #[arg(short, long)]
    org: Option<String>,

    /// Maximum repositories synced at once (default from config or 3)
    #[arg(short, long)]
    concurrency: Option<i64>,

    /// Disable proactive request pacing
    #[arg(short = 'R', long)]
    no_pacing: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync repositories into the cache
    Sync {
        /// Repositories to sync (default: every repository in the organization)
        repos: Vec<String>,

        /// Replace cached documents even when their fingerprints match
        #[arg(short, long)]
        force: bool,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        remote: RemoteOptions,
    },
    /// List cached repositories
    List {
        /// Case-insensitive text matched against name, description and topics
        #[arg(short, long = "query")]
        q: Option<String>,

        /// Documents to include, comma separated (readme,openapi,runbook,metadata)
        #[arg(short, long)]
        include: Option<String>,

        /// Sync every repository before listing
        #[arg(short, long)]
        refresh: bool,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        remote: RemoteOptions,
    },
    /// Show one cached repository as JSON
    Show {
        /// Repository name
        repo: String,

        /// Sync the repository before reading
        #[arg(short, long)]
        refresh: bool,

        #[command(flatten)]
        remote: RemoteOptions,
    },
    /// Print one cached document
    Doc {
        /// Repository name
        repo: String,

        /// Document kind: readme, openapi, runbook or metadata
        kind: DocKind,

        /// Sync the repository before reading
        #[arg(short, long)]
        refresh: bool,

        #[command(flatten)]
        remote: RemoteOptions,
    },
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so JSON and document output stay pipeable.
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("doccache=info,doccache_cli=info"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        commands::meta::handle_completions(*shell)?;
        return Ok(());
    }

    let database_url = config
        .database_url()
        .ok_or("Failed to determine database URL; set DOCCACHE_DATABASE_URL")?;

    // Ensure the database directory exists for SQLite
    if database_url.starts_with("sqlite://") {
        let db_path = database_url.trim_start_matches("sqlite://");
        // Strip query parameters (e.g., ?mode=rwc) before path operations
        let db_path = db_path.split('?').next().unwrap_or(db_path);
        let db_path = std::path::Path::new(db_path);

        if db_path.is_relative() && !db_path.as_os_str().is_empty() {
            tracing::warn!(
                "Database path '{}' is relative - behavior depends on current directory. \
                 Consider using an absolute path.",
                db_path.display()
            );
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
    }

    match cli.command {
        Commands::Sync {
            repos,
            force,
            json,
            remote,
        } => {
            let catalog = commands::catalog::open_catalog(&config, &database_url, &remote).await?;
            commands::sync::handle_sync(&catalog, repos, force, json).await?;
        }
        Commands::List {
            q,
            include,
            refresh,
            json,
            remote,
        } => {
            let catalog = commands::catalog::open_catalog(&config, &database_url, &remote).await?;
            commands::catalog::handle_list(&catalog, q, include.as_deref(), refresh, json).await?;
        }
        Commands::Show {
            repo,
            refresh,
            remote,
        } => {
            let catalog = commands::catalog::open_catalog(&config, &database_url, &remote).await?;
            commands::catalog::handle_show(&catalog, &repo, refresh).await?;
        }
        Commands::Doc {
            repo,
            kind,
            refresh,
            remote,
        } => {
            let catalog = commands::catalog::open_catalog(&config, &database_url, &remote).await?;
            commands::catalog::handle_doc(&catalog, &repo, kind, refresh).await?;
        }
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
