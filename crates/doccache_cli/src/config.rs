//! Configuration file support for doccache.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `DOCCACHE_`, e.g., `DOCCACHE_DATABASE_URL`)
//! 3. Config file (./doccache.toml, then ~/.config/doccache/config.toml)
//! 4. Built-in defaults
//!
//! The database URL defaults to `sqlite://~/.local/state/doccache/doccache.db` on Linux
//! (using the XDG state directory) if not explicitly configured.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite://~/.local/state/doccache/doccache.db"  # optional, this is the default
//!
//! [github]
//! token = "ghp_..."      # or use DOCCACHE_GITHUB_TOKEN env var
//! org = "Ngx-Workshop"   # organization whose repositories are cached
//!
//! [sync]
//! concurrency = 3
//! rps = 10
//! pacing = true
//! ```

use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use doccache::SyncSettings;
use doccache::rate_limits::GITHUB_DEFAULT_RPS;
use doccache::sync::{DEFAULT_CONCURRENCY, DEFAULT_ORG, normalize_concurrency};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// GitHub configuration.
    pub github: GitHubConfig,
    /// Default sync options.
    pub sync: SyncConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL.
    /// Supports sqlite:// and postgres:// schemes.
    pub url: Option<String>,
}

/// GitHub configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token.
    /// Can also be set via DOCCACHE_GITHUB_TOKEN environment variable.
    pub token: Option<String>,
    /// Organization whose repositories are cached.
    pub org: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            org: DEFAULT_ORG.to_string(),
        }
    }
}

/// Default sync options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Maximum concurrent per-repository pipelines. Non-positive values fall
    /// back to the default.
    pub concurrency: i64,
    /// Proactive request pacing in requests per second.
    pub rps: u32,
    /// Whether to pace requests at all.
    pub pacing: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY as i64,
            rps: GITHUB_DEFAULT_RPS,
            pacing: true,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/doccache/config.toml)
    /// 3. Local config file (./doccache.toml)
    /// 4. Environment variables with DOCCACHE_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("doccache.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./doccache.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // DOCCACHE_DATABASE_URL -> database.url
        builder = builder.add_source(
            Environment::with_prefix("DOCCACHE")
                .separator("_")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the database URL, falling back to the default state directory path.
    ///
    /// The fallback carries `mode=rwc` so SQLite creates the file on first use.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("doccache.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// Get the GitHub token.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .filter(|token| !token.trim().is_empty())
    }

    /// Sync settings for the catalog, with CLI overrides applied.
    pub fn sync_settings(&self, org: Option<String>, concurrency: Option<i64>) -> SyncSettings {
        let org = org
            .filter(|o| !o.trim().is_empty())
            .unwrap_or_else(|| self.github.org.clone());
        SyncSettings {
            org,
            concurrency: normalize_concurrency(concurrency.or(Some(self.sync.concurrency))),
        }
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "doccache").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/doccache` or `~/.local/state/doccache`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "doccache").map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(content: &str) -> Config {
        ConfigBuilder::builder()
            .add_source(config::File::from_str(content, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.database.url.is_none());
        assert!(config.github.token.is_none());
        assert_eq!(config.github.org, "Ngx-Workshop");
        assert_eq!(config.sync.concurrency, 3);
        assert_eq!(config.sync.rps, 10);
        assert!(config.sync.pacing);
    }

    #[test]
    fn test_full_config_parsing() {
        let config = from_toml(
            r#"
            [database]
            url = "sqlite:///tmp/test.db"

            [github]
            token = "ghp_test123"
            org = "acme"

            [sync]
            concurrency = 8
            rps = 2
            pacing = false
        "#,
        );

        assert_eq!(
            config.database.url,
            Some("sqlite:///tmp/test.db".to_string())
        );
        assert_eq!(config.github_token(), Some("ghp_test123".to_string()));
        assert_eq!(config.github.org, "acme");
        assert_eq!(config.sync.concurrency, 8);
        assert_eq!(config.sync.rps, 2);
        assert!(!config.sync.pacing);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = from_toml(
            r#"
            [sync]
            concurrency = 5
        "#,
        );

        assert_eq!(config.sync.concurrency, 5);
        assert_eq!(config.sync.rps, 10);
        assert_eq!(config.github.org, "Ngx-Workshop");
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let config = from_toml(
            r#"
            [github]
            token = "  "
        "#,
        );
        assert!(config.github_token().is_none());
    }

    #[test]
    fn test_sync_settings_normalizes_concurrency() {
        let config = from_toml(
            r#"
            [sync]
            concurrency = -2
        "#,
        );

        let settings = config.sync_settings(None, None);
        assert_eq!(settings.concurrency, 3);
        assert_eq!(settings.org, "Ngx-Workshop");

        let settings = config.sync_settings(Some("acme".to_string()), Some(7));
        assert_eq!(settings.concurrency, 7);
        assert_eq!(settings.org, "acme");

        let settings = config.sync_settings(Some(" ".to_string()), Some(0));
        assert_eq!(settings.concurrency, 3);
        assert_eq!(settings.org, "Ngx-Workshop");
    }

    #[test]
    fn test_database_url_defaults_to_state_dir() {
        let config = Config::default();
        if let Some(url) = config.database_url() {
            assert!(url.starts_with("sqlite://"));
            assert!(url.contains("doccache.db"));
            assert!(url.ends_with("?mode=rwc"));
        }
    }

    #[test]
    fn test_database_url_respects_configured_value() {
        let config = from_toml(
            r#"
            [database]
            url = "postgres://localhost/doccache"
        "#,
        );
        assert_eq!(
            config.database_url(),
            Some("postgres://localhost/doccache".to_string())
        );
    }

    #[test]
    fn test_config_invalid_toml() {
        let result = ConfigBuilder::builder()
            .add_source(config::File::from_str("[sync\nconcurrency = 3", FileFormat::Toml))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_unknown_fields_ignored() {
        let config = from_toml(
            r#"
            [sync]
            concurrency = 4
            unknown_field = "should be ignored"
        "#,
        );
        assert_eq!(config.sync.concurrency, 4);
    }
}
