// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backup loading.
//!
//! Backups are gzip-compressed JSON exports named `<anything>.json.gz`.
//! A missing file or an empty directory is reported as
//! [`TankobonError::BackupNotFound`] so the host can choose fail-fast
//! (explicit file at startup) vs log-and-retry (directory watch seeing
//! a transiently missing file); decode failures are
//! [`TankobonError::BackupMalformed`].

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::debug;

use tankobon_core::TankobonError;

use crate::model::Backup;

/// File suffix a backup export must carry to be picked up from a directory.
pub const BACKUP_SUFFIX: &str = ".json.gz";

/// Load a backup from a single gzip-compressed JSON file.
pub fn load_backup(path: &Path) -> Result<Backup, TankobonError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TankobonError::BackupNotFound(path.display().to_string()),
        _ => TankobonError::Io { source: e },
    })?;

    let backup: Backup =
        serde_json::from_reader(GzDecoder::new(file)).map_err(|e| TankobonError::BackupMalformed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

    debug!(
        path = %path.display(),
        manga = backup.manga.len(),
        "backup loaded"
    );
    Ok(backup)
}

/// Load the most recent backup from a directory.
///
/// Exports carry sortable timestamped names, so "most recent" is the
/// lexicographically greatest `*.json.gz` entry. An empty or missing
/// directory is a not-found error.
pub fn load_latest(dir: &Path) -> Result<Backup, TankobonError> {
    let entries = std::fs::read_dir(dir).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TankobonError::BackupNotFound(dir.display().to_string()),
        _ => TankobonError::Io { source: e },
    })?;

    let mut latest: Option<String> = None;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(BACKUP_SUFFIX) {
            continue;
        }
        if latest.as_deref().is_none_or(|l| name.as_str() > l) {
            latest = Some(name);
        }
    }

    match latest {
        Some(name) => load_backup(&dir.join(name)),
        None => Err(TankobonError::BackupNotFound(format!(
            "no {BACKUP_SUFFIX} file in {}",
            dir.display()
        ))),
    }
}
