//! Configuration file handling for the `fieldwatch` binary.
//!
//! The file is TOML with one table per concern:
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8000
//!
//! [client]
//! base_url = "http://localhost:8000"
//! timeout_secs = 10
//!
//! [sync]
//! reconcile_interval_secs = 10
//! forced_reconcile_delay_secs = 2
//! user_id = "scanner-user"
//! detection_method = "PLANT_SCANNER"
//!
//! [detection]
//! min_confidence = 0.9
//! location_timeout_secs = 10
//!
//! [log]
//! level = "info,fieldwatch=debug"
//! ```
//!
//! Every key is optional. `FIELDWATCH_API_BASE_URL` and `FIELDWATCH_PORT`
//! override the file.

use fieldwatch_api::ServerConfig;
use fieldwatch_client::ClientConfig;
use fieldwatch_core::{DEFAULT_MIN_CONFIDENCE, LocationRequest, types};
use fieldwatch_sync::{
    DEFAULT_FORCED_RECONCILE_DELAY, DEFAULT_RECONCILE_INTERVAL, DEFAULT_USER_ID, SyncConfig,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Error, Result};

/// Name used for the config directory and environment prefix.
pub const PROJECT_NAME: &str = "fieldwatch";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "FIELDWATCH_CONFIG";

/// Environment variable overriding `client.base_url`.
pub const BASE_URL_ENV: &str = "FIELDWATCH_API_BASE_URL";

/// Environment variable overriding `server.port`.
pub const PORT_ENV: &str = "FIELDWATCH_PORT";

/// Log filter used when neither `RUST_LOG` nor `log.level` is set.
pub const DEFAULT_LOG_FILTER: &str = "info,fieldwatch=debug";

/// Reconciliation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSection {
    /// Seconds between scheduled reconciliations.
    pub reconcile_interval_secs: u64,
    /// Seconds between an insert and its forced reconciliation.
    pub forced_reconcile_delay_secs: u64,
    /// Reporter stamped on detections.
    pub user_id: String,
    /// Origin tag stamped on detections.
    pub detection_method: String,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            reconcile_interval_secs: DEFAULT_RECONCILE_INTERVAL.as_secs(),
            forced_reconcile_delay_secs: DEFAULT_FORCED_RECONCILE_DELAY.as_secs(),
            user_id: DEFAULT_USER_ID.to_string(),
            detection_method: types::DEFAULT_DETECTION_METHOD.to_string(),
        }
    }
}

/// Detection gate and position settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSection {
    /// Minimum classifier confidence for a detection to be reported.
    pub min_confidence: f64,
    /// Upper bound on the wait for a position fix.
    pub location_timeout_secs: u64,
}

impl Default for DetectionSection {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            location_timeout_secs: LocationRequest::default().timeout.as_secs(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Filter directives used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Complete `fieldwatch` configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldwatchConfig {
    /// Persistence server listener.
    pub server: ServerConfig,
    /// Persistence client.
    pub client: ClientConfig,
    /// Reconciliation.
    pub sync: SyncSection,
    /// Detection gate and position lookup.
    pub detection: DetectionSection,
    /// Logging.
    pub log: LogSection,
}

impl FieldwatchConfig {
    /// Default config file location, `<config dir>/fieldwatch/config.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(PROJECT_NAME).join("config.toml"))
    }

    /// Resolves the config file to use.
    ///
    /// Order: explicit path, then `FIELDWATCH_CONFIG`, then the default path.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        resolve_path(explicit, std::env::var(CONFIG_ENV).ok())
    }

    /// Loads the resolved config file and applies environment overrides.
    ///
    /// A missing file yields the defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(config_path) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                log::debug!("No config file at {}, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        log::debug!("Loaded config from {}", path.display());
        toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Applies environment overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.client.base_url = url;
        }
        if let Some(port) = lookup(PORT_ENV).filter(|v| !v.trim().is_empty()) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| Error::config(format!("{PORT_ENV}={port} is not a valid port")))?;
        }
        Ok(())
    }

    /// Checks values that the engine would reject later.
    pub fn validate(&self) -> Result<()> {
        self.sync_config()?.validate()?;
        if !self.client.base_url.starts_with("http://")
            && !self.client.base_url.starts_with("https://")
        {
            return Err(Error::config(format!(
                "client.base_url must be an http(s) URL, got '{}'",
                self.client.base_url
            )));
        }
        Ok(())
    }

    /// Engine settings derived from the `sync` and `detection` tables.
    pub fn sync_config(&self) -> Result<SyncConfig> {
        if self.sync.reconcile_interval_secs == 0 {
            return Err(Error::config("sync.reconcile_interval_secs must be at least 1"));
        }
        let location = LocationRequest {
            timeout: Duration::from_secs(self.detection.location_timeout_secs),
            ..LocationRequest::default()
        };
        Ok(SyncConfig::default()
            .with_reconcile_interval(Duration::from_secs(self.sync.reconcile_interval_secs))
            .with_forced_reconcile_delay(Duration::from_secs(
                self.sync.forced_reconcile_delay_secs,
            ))
            .with_user_id(self.sync.user_id.clone())
            .with_detection_method(self.sync.detection_method.clone())
            .with_min_confidence(self.detection.min_confidence)
            .with_location(location))
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flattens the configuration into `FIELDWATCH_<TABLE>_<KEY>` pairs.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value = toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten(&PROJECT_NAME.to_uppercase(), &value, &mut vars);
        Ok(vars)
    }
}

fn resolve_path(explicit: Option<&str>, from_env: Option<String>) -> Option<PathBuf> {
    explicit
        .map(PathBuf::from)
        .or_else(|| from_env.filter(|v| !v.is_empty()).map(PathBuf::from))
        .or_else(FieldwatchConfig::default_config_path)
}

fn flatten(prefix: &str, value: &toml::Value, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, child) in table {
                flatten(&format!("{prefix}_{}", key.to_uppercase()), child, out);
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}
