//! # Stockpile Configuration
//!
//! Configuration for the local store, the remote transport and the
//! repository's flow policies.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKPILE_REMOTE_URL=http://10.0.0.5:8080/                         │
//! │     STOCKPILE_WORKERS=8                                                │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/stockpile/stockpile.toml (Linux)                         │
//! │     ~/Library/Application Support/com.stockpile.stockpile/ (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/var/lib/stockpile/stockpile.db"
//! max_connections = 5
//!
//! [remote]
//! base_url = "http://localhost:8080/"
//! products_path = "products"
//! timeout_secs = 15
//!
//! [repository]
//! workers = 4
//! refresh_errors = "swallow"  # swallow | report
//! empty_body = "ignore"       # ignore | fail | echo_request
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use stockpile_db::DbConfig;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Flow Policies
// =============================================================================

/// What `fetch_all` does when the remote refresh fails.
///
/// ```text
/// SWALLOW (Default)                    REPORT
/// ─────────────────                    ──────
/// warn! in the log                     warn! in the log
/// listener: snapshot, snapshot         listener: snapshot, on_failure, snapshot
/// ```
///
/// Either way the second snapshot is the unchanged local data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshErrorPolicy {
    /// Best-effort refresh: the read never fails because of the remote.
    #[default]
    Swallow,

    /// Also hand the refresh error to `LoadListener::on_failure`.
    Report,
}

impl std::fmt::Display for RefreshErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshErrorPolicy::Swallow => write!(f, "swallow"),
            RefreshErrorPolicy::Report => write!(f, "report"),
        }
    }
}

impl std::str::FromStr for RefreshErrorPolicy {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "swallow" => Ok(RefreshErrorPolicy::Swallow),
            "report" => Ok(RefreshErrorPolicy::Report),
            other => Err(SyncError::InvalidConfig(format!(
                "Unknown refresh error policy: '{}'. Valid options: swallow, report",
                other
            ))),
        }
    }
}

/// What `save` does when the remote confirms with an empty body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyBodyPolicy {
    /// Nothing is persisted and no callback fires.
    #[default]
    Ignore,

    /// Report `SaveFailure::EmptyBody`.
    Fail,

    /// Persist the product that was sent, as if the remote had echoed it.
    EchoRequest,
}

impl std::fmt::Display for EmptyBodyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmptyBodyPolicy::Ignore => write!(f, "ignore"),
            EmptyBodyPolicy::Fail => write!(f, "fail"),
            EmptyBodyPolicy::EchoRequest => write!(f, "echo_request"),
        }
    }
}

impl std::str::FromStr for EmptyBodyPolicy {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ignore" => Ok(EmptyBodyPolicy::Ignore),
            "fail" => Ok(EmptyBodyPolicy::Fail),
            "echo_request" => Ok(EmptyBodyPolicy::EchoRequest),
            other => Err(SyncError::InvalidConfig(format!(
                "Unknown empty body policy: '{}'. Valid options: ignore, fail, echo_request",
                other
            ))),
        }
    }
}

// =============================================================================
// Database Settings
// =============================================================================

/// Local store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseSettings {
    /// Resolves the database file, falling back to `<data dir>/stockpile.db`.
    pub fn resolve_path(&self) -> SyncResult<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }

        let dirs = directories::ProjectDirs::from("com", "stockpile", "stockpile").ok_or_else(
            || SyncError::InvalidConfig("Could not determine app data directory".into()),
        )?;

        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        Ok(data_dir.join("stockpile.db"))
    }

    /// Builds the pool configuration for `stockpile-db`.
    pub fn to_db_config(&self) -> SyncResult<DbConfig> {
        Ok(DbConfig::new(self.resolve_path()?).max_connections(self.max_connections))
    }
}

// =============================================================================
// Remote Settings
// =============================================================================

/// Remote source of truth settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Base URL of the remote API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Collection path under `base_url`, used for both list and save.
    #[serde(default = "default_products_path")]
    pub products_path: String,

    /// Whole-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080/".to_string()
}

fn default_products_path() -> String {
    "products".to_string()
}

fn default_timeout() -> u64 {
    15
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            base_url: default_base_url(),
            products_path: default_products_path(),
            timeout_secs: default_timeout(),
        }
    }
}

impl RemoteSettings {
    /// Settings pointing at `base_url` with every other field defaulted.
    pub fn new(base_url: impl Into<String>) -> Self {
        RemoteSettings {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// =============================================================================
// Repository Settings
// =============================================================================

/// Settings for [`StockRepository`](crate::StockRepository).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    /// Maximum number of repository stages running at once.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Behavior when the read-path refresh fails.
    #[serde(default)]
    pub refresh_errors: RefreshErrorPolicy,

    /// Behavior when a save is confirmed without a body.
    #[serde(default)]
    pub empty_body: EmptyBodyPolicy,
}

fn default_workers() -> usize {
    4
}

impl Default for RepositorySettings {
    fn default() -> Self {
        RepositorySettings {
            workers: default_workers(),
            refresh_errors: RefreshErrorPolicy::default(),
            empty_body: EmptyBodyPolicy::default(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete Stockpile configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockpileConfig {
    /// Local store settings.
    #[serde(default)]
    pub database: DatabaseSettings,

    /// Remote transport settings.
    #[serde(default)]
    pub remote: RemoteSettings,

    /// Repository flow settings.
    #[serde(default)]
    pub repository: RepositorySettings,
}

impl StockpileConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (stockpile.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        let url = url::Url::parse(&self.remote.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SyncError::InvalidUrl(format!(
                "Remote URL must start with http:// or https://, got: {}",
                self.remote.base_url
            )));
        }

        if self.remote.products_path.trim_matches('/').is_empty() {
            return Err(SyncError::InvalidConfig(
                "products_path must not be empty".into(),
            ));
        }

        if self.remote.timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.repository.workers == 0 {
            return Err(SyncError::InvalidConfig(
                "workers must be greater than 0".into(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(SyncError::InvalidConfig(
                "max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("STOCKPILE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Ok(url) = std::env::var("STOCKPILE_REMOTE_URL") {
            debug!(url = %url, "Overriding remote URL from environment");
            self.remote.base_url = url;
        }

        if let Ok(timeout) = std::env::var("STOCKPILE_REMOTE_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(t) => self.remote.timeout_secs = t,
                Err(_) => warn!(timeout = %timeout, "Ignoring invalid remote timeout in environment"),
            }
        }

        if let Ok(workers) = std::env::var("STOCKPILE_WORKERS") {
            match workers.parse::<usize>() {
                Ok(w) => self.repository.workers = w,
                Err(_) => warn!(workers = %workers, "Ignoring invalid worker count in environment"),
            }
        }

        if let Ok(policy) = std::env::var("STOCKPILE_REFRESH_ERRORS") {
            match policy.parse() {
                Ok(p) => self.repository.refresh_errors = p,
                Err(e) => warn!(error = %e, "Ignoring refresh error policy from environment"),
            }
        }

        if let Ok(policy) = std::env::var("STOCKPILE_EMPTY_BODY") {
            match policy.parse() {
                Ok(p) => self.repository.empty_body = p,
                Err(e) => warn!(error = %e, "Ignoring empty body policy from environment"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockpile", "stockpile")
            .map(|dirs| dirs.config_dir().join("stockpile.toml"))
    }
}
