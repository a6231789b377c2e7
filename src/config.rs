//! Configuration for the artifact catalog.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (MUSICAL_ARTIFACTS_HOME, MUSICAL_ARTIFACTS_DB)
//! 2. Config file (.musical-artifacts/config.yaml)
//! 3. Defaults (~/.musical-artifacts)
//!
//! Config file discovery:
//! - Searches current directory and parents for .musical-artifacts/config.yaml
//! - Paths in config file are relative to the .musical-artifacts/ directory
//!
//! The resolved configuration is loaded once by the binary and passed to
//! whatever needs it; nothing here is cached globally.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the per-project configuration directory
pub const CONFIG_DIR: &str = ".musical-artifacts";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .musical-artifacts/)
    pub home: Option<String>,
    /// Catalog database file (relative to home)
    pub database: Option<String>,
}

/// Site settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Public host name, used to build download URLs
    pub hostname: String,

    pub site_name: String,

    /// Embedded comment widget
    pub comments: CommentSettings,

    /// Requests allowed per client per minute on the public API
    pub api_throttle_per_minute: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hostname: "localhost:3000".to_string(),
            site_name: "Musical Artifacts".to_string(),
            comments: CommentSettings::default(),
            api_throttle_per_minute: 60,
        }
    }
}

impl Settings {
    /// Base URL of the site, without a trailing slash
    pub fn base_url(&self) -> String {
        let host = self.hostname.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentSettings {
    pub site_key: Option<String>,
    pub server_url: Option<String>,
    pub include_css: bool,
    pub order: CommentOrder,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentOrder {
    #[default]
    Latest,
    Earliest,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// State directory
    pub home: PathBuf,
    /// Catalog database file
    pub database: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub settings: Settings,
}

/// Find config file by searching `start` and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Load configuration from all sources, starting discovery at the current
/// directory
pub fn load_config() -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(CONFIG_DIR);

    load_config_from(
        &cwd,
        default_home,
        std::env::var("MUSICAL_ARTIFACTS_HOME").ok(),
        std::env::var("MUSICAL_ARTIFACTS_DB").ok(),
    )
}

fn load_config_from(
    start: &Path,
    default_home: PathBuf,
    env_home: Option<String>,
    env_db: Option<String>,
) -> Result<ResolvedConfig> {
    let config_file = find_config_file(start);

    let (home, database, settings) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;
        let config_dir = config_path.parent().unwrap_or(Path::new("."));

        let home = if let Some(env_home) = env_home {
            PathBuf::from(env_home)
        } else if let Some(ref home_path) = config.paths.home {
            resolve_path(config_dir, home_path)
        } else {
            default_home
        };

        let database = if let Some(env_db) = env_db {
            PathBuf::from(env_db)
        } else if let Some(ref db_path) = config.paths.database {
            resolve_path(&home, db_path)
        } else {
            home.join("catalog.sqlite3")
        };

        (home, database, config.settings)
    } else {
        let home = env_home.map(PathBuf::from).unwrap_or(default_home);
        let database = env_db
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join("catalog.sqlite3"));

        (home, database, Settings::default())
    };

    Ok(ResolvedConfig {
        home,
        database,
        config_file,
        settings,
    })
}
