// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tankobon serve` command implementation.
//!
//! Wires the plugin set (indexer, thumbnail cache, directory watcher,
//! HTTP server), performs the fail-fast initial load, and supervises
//! the workers until shutdown.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use tankobon_backup::{backup_schema, load_backup, load_latest, Backup};
use tankobon_config::{required_capabilities, TankobonConfig};
use tankobon_core::TankobonError;
use tankobon_index::Indexer;
use tankobon_plugin::{CancellationToken, Host, Plugin, PluginSet};
use tankobon_server::ServerPlugin;
use tankobon_thumbnail::{ThumbnailPlugin, ThumbnailStore};
use tankobon_watch::WatchPlugin;

/// Runs the `tankobon serve` command.
pub async fn run_serve(config: TankobonConfig) -> Result<(), TankobonError> {
    init_tracing(&config.log_level);
    info!("starting tankobon serve");

    let indexer = Arc::new(Indexer::new());

    let thumbnail = if config.thumbnail.enabled {
        let store = ThumbnailStore::open(&config.thumbnail.dir)?;
        Some(Arc::new(ThumbnailPlugin::new(
            store,
            config.thumbnail.path.clone(),
            config.thumbnail.refresh_interval(),
        )))
    } else {
        info!("thumbnail cache disabled by configuration");
        None
    };

    let server = Arc::new(ServerPlugin::new(
        config.server.addr(),
        config.thumbnail.path.clone(),
        config.server.shutdown_timeout(),
        Arc::clone(&indexer),
        thumbnail.clone(),
    ));

    let mut plugins: Vec<Arc<dyn Plugin<Backup>>> =
        vec![Arc::clone(&indexer) as Arc<dyn Plugin<Backup>>];
    if let Some(thumbnail) = &thumbnail {
        plugins.push(Arc::clone(thumbnail) as Arc<dyn Plugin<Backup>>);
    }
    if config.backup.file.is_none() {
        plugins.push(Arc::new(WatchPlugin::new(&config.backup.dir)) as Arc<dyn Plugin<Backup>>);
    } else {
        info!("directory watch disabled (explicit backup.file configured)");
    }
    plugins.push(server as Arc<dyn Plugin<Backup>>);

    let required = required_capabilities(&config);
    let set = PluginSet::adapt_all(plugins, &required)?;
    info!(plugins = set.len(), "plugin set adapted");

    let host = Host::new(backup_schema(), set)?;

    // Initial load. An explicit file must exist and validate; in watch
    // mode a still-empty directory is tolerated and the watcher picks
    // up the first export.
    match initial_backup(&config) {
        Ok(backup) => {
            info!(manga = backup.manga.len(), "initial backup loaded");
            host.update(backup).await?;
        }
        Err(TankobonError::BackupNotFound(what)) if config.backup.file.is_none() => {
            warn!(backup = %what, "no backup yet, serving empty until one appears");
        }
        Err(e) => return Err(e),
    }

    let signal = install_signal_handler();
    tokio::spawn({
        let host = host.clone();
        async move {
            signal.cancelled().await;
            host.shutdown();
        }
    });

    host.run_workers().await?;
    info!("tankobon serve shutdown complete");
    Ok(())
}

fn initial_backup(config: &TankobonConfig) -> Result<Backup, TankobonError> {
    match &config.backup.file {
        Some(file) => load_backup(Path::new(file)),
        None => load_latest(Path::new(&config.backup.dir)),
    }
}

/// Installs handlers for SIGTERM and SIGINT (Ctrl+C).
///
/// Returns a token cancelled when either signal arrives.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let handler_token = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => info!("received SIGINT, initiating shutdown"),
                        _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "SIGTERM handler unavailable, handling SIGINT only");
                    let _ = ctrl_c.await;
                    info!("received SIGINT, initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        handler_token.cancel();
    });

    token
}

/// Initializes the tracing subscriber with the configured log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tankobon={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
