//! TOML configuration -- layered model with compiled-in defaults,
//! environment variable override for the config file path, and a standard
//! filesystem location.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::flapping::{DEFAULT_MIN_TRANSITIONS, DEFAULT_TIME_THRESHOLD_MINUTES};
use crate::analysis::stability::DEFAULT_TIME_WINDOW_HOURS;
use crate::store::DEFAULT_QUERY_LIMIT;

/// Root configuration for the iftriage process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Try to load configuration from, in order:
    /// 1. The path specified by the `IFTRIAGE_CONFIG` environment variable.
    /// 2. `/etc/iftriage/iftriage.toml`.
    /// 3. Fall back to compiled-in defaults.
    pub fn load_or_default() -> Self {
        if let Ok(env_path) = std::env::var("IFTRIAGE_CONFIG") {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "IFTRIAGE_CONFIG set but file could not be loaded, trying fallback"
                    );
                }
            }
        }

        let system_path = Path::new("/etc/iftriage/iftriage.toml");
        if system_path.exists() {
            match Self::load(system_path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %system_path.display(),
                        error = %e,
                        "system config file exists but could not be loaded, using defaults"
                    );
                }
            }
        }

        debug!("no config file found, using compiled-in defaults");
        Self::default()
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address and port for the API listener.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Event store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the SQLite event database.
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: "data/iftriage.db".to_string(),
        }
    }
}

/// Analysis tunables. These are the only knobs the analytics core takes;
/// the core itself holds no process-wide state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Maximum minutes between state changes to count as a rapid transition.
    pub time_threshold_minutes: u32,
    /// Minimum rapid transitions before an interface is reported flapping.
    pub min_transitions: u32,
    /// Analysis window cap in hours for stability scoring.
    pub time_window_hours: u32,
    /// Maximum records fetched per analysis request.
    pub query_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            time_threshold_minutes: DEFAULT_TIME_THRESHOLD_MINUTES,
            min_transitions: DEFAULT_MIN_TRANSITIONS,
            time_window_hours: DEFAULT_TIME_WINDOW_HOURS,
            query_limit: DEFAULT_QUERY_LIMIT,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum tracing level (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
