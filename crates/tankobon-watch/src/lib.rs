// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backup directory watcher plugin.
//!
//! Watches the backup directory and, on every create or modify event,
//! loads the newest export and pushes it through the host. A failed
//! load or a rejected snapshot is logged and the last-good snapshot
//! stays live; only loss of the watcher itself terminates the worker.

use std::path::PathBuf;

use async_trait::async_trait;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use tankobon_backup::{load_latest, Backup};
use tankobon_core::TankobonError;
use tankobon_plugin::{CancellationToken, Host, Plugin, Worker};

/// The watch plugin.
pub struct WatchPlugin {
    dir: PathBuf,
}

impl WatchPlugin {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn reload(&self, host: &Host<Backup>) {
        let backup = match load_latest(&self.dir) {
            Ok(backup) => backup,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "backup reload failed");
                return;
            }
        };
        match host.update(backup).await {
            Ok(()) => info!(dir = %self.dir.display(), "backup reloaded"),
            Err(e) => warn!(error = %e, "reloaded backup rejected, keeping previous snapshot"),
        }
    }
}

#[async_trait]
impl Worker<Backup> for WatchPlugin {
    async fn run(
        &self,
        lifetime: CancellationToken,
        host: Host<Backup>,
    ) -> Result<(), TankobonError> {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })
        .map_err(|e| TankobonError::Internal(format!("filesystem watcher: {e}")))?;
        watcher
            .watch(&self.dir, RecursiveMode::NonRecursive)
            .map_err(|e| TankobonError::Internal(format!("watch {}: {e}", self.dir.display())))?;

        info!(dir = %self.dir.display(), "watching backup directory");

        loop {
            tokio::select! {
                _ = lifetime.cancelled() => return Ok(()),
                event = rx.recv() => match event {
                    None => {
                        return Err(TankobonError::Internal(
                            "filesystem watcher channel closed".into(),
                        ));
                    }
                    Some(Err(e)) => warn!(error = %e, "filesystem watch event error"),
                    Some(Ok(event)) => {
                        if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                            debug!(paths = ?event.paths, "backup directory changed");
                            self.reload(&host).await;
                        }
                    }
                },
            }
        }
    }
}

impl Plugin<Backup> for WatchPlugin {
    fn name(&self) -> &str {
        "watch"
    }

    fn worker(&self) -> Option<&dyn Worker<Backup>> {
        Some(self)
    }
}
