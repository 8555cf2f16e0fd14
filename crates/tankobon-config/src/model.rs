// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so unrecognized keys
//! are rejected at startup with an actionable diagnostic.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with
/// `TANKOBON_*` environment variable overrides. Every section is
/// optional and defaults to sensible values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TankobonConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Backup source settings.
    #[serde(default)]
    pub backup: BackupConfig,

    /// HTTP query server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Thumbnail cache settings.
    #[serde(default)]
    pub thumbnail: ThumbnailConfig,

    /// Plugin lifecycle settings.
    #[serde(default)]
    pub plugins: PluginsConfig,
}

impl Default for TankobonConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            backup: BackupConfig::default(),
            server: ServerConfig::default(),
            thumbnail: ThumbnailConfig::default(),
            plugins: PluginsConfig::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Backup source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackupConfig {
    /// Directory watched for `*.json.gz` exports.
    #[serde(default = "default_backup_dir")]
    pub dir: String,

    /// Explicit backup file. When set, the directory watch is disabled
    /// and this file is loaded once at startup.
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            dir: default_backup_dir(),
            file: None,
        }
    }
}

fn default_backup_dir() -> String {
    "./backups".to_string()
}

/// HTTP query server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds the server may spend draining in-flight connections
    /// after shutdown is requested.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout_secs() -> u64 {
    5
}

/// Thumbnail cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ThumbnailConfig {
    /// Whether the thumbnail plugin is registered at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory holding cached thumbnail files.
    #[serde(default = "default_thumbnail_dir")]
    pub dir: String,

    /// URL path the server serves cached files under; also the prefix
    /// of resolved thumbnail URLs in responses.
    #[serde(default = "default_thumbnail_path")]
    pub path: String,

    /// Hours between best-effort cache refreshes.
    #[serde(default = "default_refresh_interval_hours")]
    pub refresh_interval_hours: u64,
}

impl ThumbnailConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_hours * 60 * 60)
    }
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            dir: default_thumbnail_dir(),
            path: default_thumbnail_path(),
            refresh_interval_hours: default_refresh_interval_hours(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_thumbnail_dir() -> String {
    "./thumbnails".to_string()
}

fn default_thumbnail_path() -> String {
    "/thumbnails".to_string()
}

fn default_refresh_interval_hours() -> u64 {
    24
}

/// Plugin lifecycle configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    /// Capabilities every registered plugin must provide
    /// (`schema`, `snapshot`, `committed`, `worker`). Startup fails if
    /// any plugin is missing one of these.
    #[serde(default)]
    pub required: Vec<String>,
}
