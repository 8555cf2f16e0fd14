// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation.
//!
//! Semantic constraints serde attributes cannot express. All failures
//! are collected before returning so one startup attempt surfaces every
//! problem.

use std::str::FromStr;

use tankobon_core::Capability;

use crate::diagnostic::ConfigError;
use crate::model::TankobonConfig;

/// Validate a deserialized configuration.
///
/// Returns every collected error rather than failing fast.
pub fn validate_config(config: &TankobonConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let addr = config.server.bind_address.trim();
    if addr.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.bind_address must not be empty".to_string(),
        });
    } else {
        let is_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_ip && !is_hostname {
            errors.push(ConfigError::Validation {
                message: format!(
                    "server.bind_address `{addr}` is not a valid IP address or hostname"
                ),
            });
        }
    }

    if config.server.shutdown_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "server.shutdown_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.backup.dir.trim().is_empty() && config.backup.file.is_none() {
        errors.push(ConfigError::Validation {
            message: "backup.dir must not be empty unless backup.file is set".to_string(),
        });
    }

    if config.thumbnail.enabled {
        if config.thumbnail.dir.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "thumbnail.dir must not be empty".to_string(),
            });
        }
        // Root and trailing-slash paths cannot be nested as a route.
        let path = config.thumbnail.path.as_str();
        if !path.starts_with('/') || path.trim_end_matches('/').is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("thumbnail.path must start with `/` and not be `/`, got `{path}`"),
            });
        } else if path.ends_with('/') {
            errors.push(ConfigError::Validation {
                message: format!("thumbnail.path must not end with `/`, got `{path}`"),
            });
        }
        if config.thumbnail.refresh_interval_hours == 0 {
            errors.push(ConfigError::Validation {
                message: "thumbnail.refresh_interval_hours must be at least 1".to_string(),
            });
        }
    }

    for name in &config.plugins.required {
        if Capability::from_str(name).is_err() {
            errors.push(ConfigError::Validation {
                message: format!(
                    "plugins.required contains unknown capability `{name}` \
                     (valid: schema, snapshot, committed, worker)"
                ),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The required-capability list as parsed values.
///
/// Call after [`validate_config`]; unknown names are skipped here.
pub fn required_capabilities(config: &TankobonConfig) -> Vec<Capability> {
    config
        .plugins
        .required
        .iter()
        .filter_map(|name| Capability::from_str(name).ok())
        .collect()
}
