// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Tankobon snapshot server.

use thiserror::Error;

use crate::types::Capability;

/// The primary error type used across the Tankobon workspace.
#[derive(Debug, Error)]
pub enum TankobonError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// A plugin does not provide a capability the host declared required.
    #[error("plugin `{plugin}` is missing required capability `{capability}`")]
    MissingCapability {
        plugin: String,
        capability: Capability,
    },

    /// A plugin rejected a candidate snapshot during the validate phase.
    #[error("snapshot rejected by plugin `{plugin}`: {source}")]
    Validation {
        plugin: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A plugin's background worker failed.
    #[error("worker `{plugin}` failed: {source}")]
    Worker {
        plugin: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No backup exists at the configured location.
    #[error("backup not found: {0}")]
    BackupNotFound(String),

    /// A backup exists but could not be decoded.
    #[error("malformed backup `{path}`: {source}")]
    BackupMalformed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A thumbnail could not be fetched or persisted.
    #[error("thumbnail fetch failed for `{url}`: {message}")]
    Thumbnail { url: String, message: String },

    /// Filesystem errors.
    #[error("i/o error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
