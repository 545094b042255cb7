// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime configuration management.
//!
//! Configuration is stored in `<state dir>/config.toml` (or the file named by
//! `FLOORSYNC_CONFIG`) and includes:
//! - `[api]`: where the REST executors send queued actions
//! - `[realtime]`: the push channel endpoint and reconnect schedule
//! - `[sync]`: retry budget and polling intervals
//! - `[session]`: tenant and user the queued actions are tagged with
//!
//! A missing file means every default applies. The bearer credential is
//! never read from this file; it comes from `FLOORSYNC_TOKEN`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "floorsync.db";

/// Runtime configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub realtime: RealtimeConfig,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub session: SessionConfig,
}

/// REST endpoint used by the action executors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL; executor paths are appended to it.
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds (default: 15).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Real-time push channel settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// WebSocket URL of the push hub.
    #[serde(default = "default_realtime_url")]
    pub url: String,
    /// Delay before each reconnect attempt in milliseconds.
    /// The last entry repeats for every later attempt.
    #[serde(default = "default_reconnect_delays_ms")]
    pub reconnect_delays_ms: Vec<u64>,
}

/// Offline queue settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Failed attempts allowed before an action is evicted (default: 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Seconds between re-checks of a non-empty queue while online
    /// (default: 30). 0 = only retry on connectivity changes.
    #[serde(default = "default_auto_retry_interval_secs")]
    pub auto_retry_interval_secs: u64,
    /// Seconds between reachability probes (default: 10).
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
}

/// The caller's session; stamped onto every queued action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_tenant_id")]
    pub tenant_id: String,
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// Real-time group (e.g. department) to join after connecting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

fn default_api_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_realtime_url() -> String {
    "ws://localhost:7891/hub".to_string()
}

fn default_reconnect_delays_ms() -> Vec<u64> {
    vec![0, 2_000, 5_000, 10_000, 30_000]
}

fn default_max_retries() -> u32 {
    3
}

fn default_auto_retry_interval_secs() -> u64 {
    30
}

fn default_probe_interval_secs() -> u64 {
    10
}

fn default_tenant_id() -> String {
    "default".to_string()
}

fn default_user_id() -> String {
    "local".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        RealtimeConfig {
            url: default_realtime_url(),
            reconnect_delays_ms: default_reconnect_delays_ms(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            max_retries: default_max_retries(),
            auto_retry_interval_secs: default_auto_retry_interval_secs(),
            probe_interval_secs: default_probe_interval_secs(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            tenant_id: default_tenant_id(),
            user_id: default_user_id(),
            group: None,
        }
    }
}

impl RealtimeConfig {
    /// Reconnect schedule as durations.
    pub fn reconnect_delays(&self) -> Vec<Duration> {
        self.reconnect_delays_ms
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect()
    }

    /// Validates that the URL is a WebSocket URL.
    ///
    /// Returns an error message if the URL is invalid.
    pub fn validate_url(&self) -> Option<String> {
        if self.url.starts_with("ws://") || self.url.starts_with("wss://") {
            return None;
        }
        Some(format!(
            "invalid realtime URL '{}': must be ws:// or wss://",
            self.url
        ))
    }
}

impl SyncSettings {
    /// Periodic re-check interval, `None` when disabled.
    pub fn auto_retry_interval(&self) -> Option<Duration> {
        (self.auto_retry_interval_secs > 0)
            .then(|| Duration::from_secs(self.auto_retry_interval_secs))
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs.max(1))
    }
}

impl Config {
    /// Loads configuration from a file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Config::default());
            }
            Err(e) => return Err(Error::Config(format!("failed to read config: {}", e))),
        };
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a file, creating the parent directory.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Checks values that would otherwise fail later at runtime.
    pub fn validate(&self) -> Result<()> {
        if let Some(msg) = self.realtime.validate_url() {
            return Err(Error::Config(msg));
        }
        if self.session.tenant_id.trim().is_empty() || self.session.user_id.trim().is_empty() {
            return Err(Error::Config(
                "session tenant_id and user_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Config file location for a state directory.
pub fn config_path(state_dir: &Path) -> PathBuf {
    crate::env::config_path_override().unwrap_or_else(|| state_dir.join(CONFIG_FILE_NAME))
}

/// Durable store location for a state directory.
pub fn db_path(state_dir: &Path) -> PathBuf {
    state_dir.join(DB_FILE_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
