//! Environment-driven runtime configuration.
//!
//! # Responsibility
//! - Resolve store path, log settings and default feed page size from
//!   `CHIRP_*` variables.
//! - Keep fallback policy in one place for CLI and API callers.
//!
//! # Invariants
//! - Blank variables behave as unset.
//! - Page size is always within `1..=MAX_PAGE_SIZE`.

use crate::logging::default_log_level;
use ::config::{Config, Environment, Map};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Prefix shared by every chirp environment variable.
pub const ENV_PREFIX: &str = "CHIRP";
pub const ENV_DB_PATH: &str = "CHIRP_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "CHIRP_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CHIRP_LOG_DIR";
pub const ENV_PAGE_SIZE: &str = "CHIRP_PAGE_SIZE";

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 50;
const DEFAULT_DB_FILE_NAME: &str = "chirp.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    /// A variable is present but does not fit its setting.
    Source(::config::ConfigError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source(err) => write!(f, "invalid {ENV_PREFIX}_* setting: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Source(err) => Some(err),
        }
    }
}

impl From<::config::ConfigError> for ConfigError {
    fn from(value: ::config::ConfigError) -> Self {
        Self::Source(value)
    }
}

/// Raw `CHIRP_*` values after prefix stripping.
#[derive(Debug, Default, Deserialize)]
struct EnvSettings {
    db_path: Option<String>,
    log_level: Option<String>,
    log_dir: Option<String>,
    page_size: Option<u32>,
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Logging stays disabled when unset.
    pub log_dir: Option<PathBuf>,
    pub page_size: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl CoreConfig {
    /// Loads settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads settings from an explicit variable set instead of the process
    /// environment. Keys use the same `CHIRP_*` names.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: Map<String, String> = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self::load(Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }

    fn load(environment: Environment) -> Result<Self, ConfigError> {
        let settings: EnvSettings = Config::builder()
            .add_source(environment.try_parsing(true).ignore_empty(true))
            .build()?
            .try_deserialize()?;

        let defaults = Self::default();
        Ok(Self {
            db_path: non_blank(settings.db_path)
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            log_level: non_blank(settings.log_level).unwrap_or(defaults.log_level),
            log_dir: non_blank(settings.log_dir).map(PathBuf::from),
            page_size: normalize_page_size(settings.page_size),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

/// Normalizes a requested page size: unset or zero falls back to the
/// default, anything above the cap is clamped.
pub fn normalize_page_size(page_size: Option<u32>) -> u32 {
    match page_size {
        Some(0) | None => DEFAULT_PAGE_SIZE,
        Some(value) if value > MAX_PAGE_SIZE => MAX_PAGE_SIZE,
        Some(value) => value,
    }
}
