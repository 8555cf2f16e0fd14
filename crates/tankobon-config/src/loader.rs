// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-based layered loading.
//!
//! Hierarchy: `./tankobon.toml` > `~/.config/tankobon/tankobon.toml` >
//! `/etc/tankobon/tankobon.toml`, with `TANKOBON_*` environment
//! variable overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;

use crate::model::TankobonConfig;

/// Load from the standard hierarchy with env overrides.
///
/// Merge order, later overrides earlier:
/// 1. Compiled defaults
/// 2. `/etc/tankobon/tankobon.toml`
/// 3. `~/.config/tankobon/tankobon.toml`
/// 4. `./tankobon.toml`
/// 5. `TANKOBON_*` environment variables
pub fn load_config() -> Result<TankobonConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TankobonConfig::default()))
        .merge(Toml::file("/etc/tankobon/tankobon.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("tankobon/tankobon.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("tankobon.toml"))
        .merge(env_provider())
        .extract()
}

/// Load from an explicit file path, still honoring env overrides.
pub fn load_config_from_path(path: &Path) -> Result<TankobonConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TankobonConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Load from a TOML string only. Used in tests and for `check --stdin`
/// style invocations.
pub fn load_config_from_str(toml_content: &str) -> Result<TankobonConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TankobonConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Environment provider mapping `TANKOBON_SECTION_KEY` to
/// `section.key`.
///
/// Uses explicit `map()` rather than `Env::split("_")`: keys themselves
/// contain underscores, so `TANKOBON_SERVER_BIND_ADDRESS` must become
/// `server.bind_address`, not `server.bind.address`.
fn env_provider() -> Env {
    Env::prefixed("TANKOBON_").map(|key| {
        // Figment hands over the key in the variable's original case.
        let key = key.as_str().to_ascii_lowercase();
        key.replacen("backup_", "backup.", 1)
            .replacen("server_", "server.", 1)
            .replacen("thumbnail_", "thumbnail.", 1)
            .replacen("plugins_", "plugins.", 1)
            .into()
    })
}
