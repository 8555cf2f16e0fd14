// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tankobon check` command implementation.
//!
//! The configuration has already been loaded and validated by the time
//! this runs; what remains is probing the backup source so operators
//! can verify a deployment without starting the server.

use std::path::Path;

use tankobon_backup::{load_backup, load_latest};
use tankobon_config::TankobonConfig;
use tankobon_core::TankobonError;

pub fn run_check(config: &TankobonConfig) -> Result<(), TankobonError> {
    println!("config: ok");

    let backup = match &config.backup.file {
        Some(file) => {
            println!("backup source: file {file}");
            load_backup(Path::new(file))?
        }
        None => {
            println!("backup source: directory {}", config.backup.dir);
            load_latest(Path::new(&config.backup.dir))?
        }
    };

    println!(
        "backup: ok ({} manga, {} categories, {} sources)",
        backup.manga.len(),
        backup.categories.len(),
        backup.sources.len()
    );

    if config.thumbnail.enabled {
        println!(
            "thumbnails: enabled, cache dir {}, refresh every {}h",
            config.thumbnail.dir, config.thumbnail.refresh_interval_hours
        );
    } else {
        println!("thumbnails: disabled");
    }

    println!("server: would bind {}", config.server.addr());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn check_passes_with_valid_backup_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json.gz");
        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder
            .write_all(br#"{"manga":[{"title":"Alpha"}]}"#)
            .unwrap();
        encoder.finish().unwrap();

        let mut config = TankobonConfig::default();
        config.backup.file = Some(path.display().to_string());
        run_check(&config).unwrap();
    }

    #[test]
    fn check_fails_on_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = TankobonConfig::default();
        config.backup.dir = dir.path().join("absent").display().to_string();

        let err = run_check(&config).unwrap_err();
        assert!(matches!(err, TankobonError::BackupNotFound(_)));
    }
}
