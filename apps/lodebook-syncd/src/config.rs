//! Daemon configuration loaded from environment variables.
//!
//! Fail-fast loading: required variables must be present and valid or the
//! process exits with a clear error before anything is wired up.

use std::env;

use thiserror::Error;

/// Default minimum fresh-roster size before a diff is attempted.
const DEFAULT_MIN_ROSTER_SIZE: usize = 10;

/// Default seconds between reconciliation cycles (the original job ran
/// every five minutes).
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 300;

/// Default Lodestone community API base URL.
const DEFAULT_LODESTONE_API_URL: &str = "https://xivapi.com";

/// Default ordered rank hierarchy, lowest first. Deployments override it
/// with `RANK_TABLE_PATH` or `RANK_HIERARCHY`.
const DEFAULT_RANK_HIERARCHY: &[&str] = &[
    "Sprout",
    "Mandragora",
    "Coeurl Hunter",
    "Storm Captain",
    "Grand Master",
];

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    /// A variable is set but could not be parsed.
    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string (`DATABASE_URL`).
    pub database_url: String,
    /// Lodestone community API base URL (`LODESTONE_API_URL`).
    pub lodestone_api_url: String,
    /// Free Company id to track (`FREE_COMPANY_ID`).
    pub free_company_id: String,
    /// Optional Lodestone API key (`LODESTONE_API_KEY`).
    pub lodestone_api_key: Option<String>,
    /// Webhook endpoint receiving events (`EVENT_WEBHOOK_URL`).
    pub webhook_url: String,
    /// Pre-shared webhook API key (`EVENT_WEBHOOK_API_KEY`).
    pub webhook_api_key: String,
    /// Minimum fresh-roster size (`MIN_ROSTER_SIZE`).
    pub min_roster_size: usize,
    /// Seconds between cycles (`SYNC_INTERVAL_SECS`).
    pub sync_interval_secs: u64,
    /// Ordered rank hierarchy, lowest first (`RANK_TABLE_PATH` JSON file,
    /// else `RANK_HIERARCHY` comma-separated, else the built-in default).
    pub rank_hierarchy: Vec<String>,
    /// Default log filter (`RUST_LOG` still takes precedence).
    pub log_filter: String,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            lodestone_api_url: optional("LODESTONE_API_URL")
                .unwrap_or_else(|| DEFAULT_LODESTONE_API_URL.to_string()),
            free_company_id: required("FREE_COMPANY_ID")?,
            lodestone_api_key: optional("LODESTONE_API_KEY"),
            webhook_url: required("EVENT_WEBHOOK_URL")?,
            webhook_api_key: required("EVENT_WEBHOOK_API_KEY")?,
            min_roster_size: parsed("MIN_ROSTER_SIZE", DEFAULT_MIN_ROSTER_SIZE)?,
            sync_interval_secs: parsed("SYNC_INTERVAL_SECS", DEFAULT_SYNC_INTERVAL_SECS)?,
            rank_hierarchy: rank_hierarchy()?,
            log_filter: optional("LOG_FILTER").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match optional(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            message: e.to_string(),
        }),
    }
}

/// Resolve the ordered rank list: a JSON file of strings wins, then the
/// comma-separated variable, then the built-in default.
fn rank_hierarchy() -> Result<Vec<String>, ConfigError> {
    if let Some(path) = optional("RANK_TABLE_PATH") {
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::Invalid {
            name: "RANK_TABLE_PATH",
            message: format!("cannot read {path}: {e}"),
        })?;
        let ranks: Vec<String> =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Invalid {
                name: "RANK_TABLE_PATH",
                message: format!("{path} is not a JSON array of strings: {e}"),
            })?;
        if ranks.is_empty() {
            return Err(ConfigError::Invalid {
                name: "RANK_TABLE_PATH",
                message: format!("{path} contains no ranks"),
            });
        }
        return Ok(ranks);
    }

    if let Some(raw) = optional("RANK_HIERARCHY") {
        let ranks: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if ranks.is_empty() {
            return Err(ConfigError::Invalid {
                name: "RANK_HIERARCHY",
                message: "contains no ranks".to_string(),
            });
        }
        return Ok(ranks);
    }

    Ok(DEFAULT_RANK_HIERARCHY
        .iter()
        .map(|s| s.to_string())
        .collect())
}
