// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The query server as a plugin worker.
//!
//! Binds on start, serves until the shared lifetime is cancelled, then
//! drains in-flight connections under a worker-owned timeout. A drain
//! that outlives the timeout is reported as the worker's error.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use tankobon_backup::Backup;
use tankobon_core::TankobonError;
use tankobon_index::Indexer;
use tankobon_plugin::{CancellationToken, Host, Plugin, Worker};
use tankobon_thumbnail::ThumbnailPlugin;

use crate::server::{router, ServerState};

pub struct ServerPlugin {
    addr: String,
    thumbnail_path: String,
    shutdown_timeout: Duration,
    indexer: Arc<Indexer>,
    thumbnail: Option<Arc<ThumbnailPlugin>>,
}

impl ServerPlugin {
    pub fn new(
        addr: impl Into<String>,
        thumbnail_path: impl Into<String>,
        shutdown_timeout: Duration,
        indexer: Arc<Indexer>,
        thumbnail: Option<Arc<ThumbnailPlugin>>,
    ) -> Self {
        Self {
            addr: addr.into(),
            thumbnail_path: thumbnail_path.into(),
            shutdown_timeout,
            indexer,
            thumbnail,
        }
    }
}

#[async_trait]
impl Worker<Backup> for ServerPlugin {
    async fn run(
        &self,
        lifetime: CancellationToken,
        host: Host<Backup>,
    ) -> Result<(), TankobonError> {
        let state = ServerState {
            host,
            indexer: Arc::clone(&self.indexer),
            thumbnail: self.thumbnail.clone(),
        };
        let app = router(state, &self.thumbnail_path);

        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .map_err(|e| TankobonError::Internal(format!("bind {}: {e}", self.addr)))?;
        info!(addr = %self.addr, "query server listening");

        let serve = axum::serve(listener, app)
            .with_graceful_shutdown({
                let lifetime = lifetime.clone();
                async move { lifetime.cancelled().await }
            })
            .into_future();
        tokio::pin!(serve);

        tokio::select! {
            res = &mut serve => {
                return res.map_err(|e| TankobonError::Internal(format!("query server: {e}")));
            }
            _ = lifetime.cancelled() => {}
        }

        // Lifetime cancelled; the drain gets a bounded window.
        match tokio::time::timeout(self.shutdown_timeout, serve).await {
            Ok(res) => res.map_err(|e| TankobonError::Internal(format!("query server: {e}"))),
            Err(_) => Err(TankobonError::Internal(format!(
                "query server drain exceeded {:?}",
                self.shutdown_timeout
            ))),
        }
    }
}

impl Plugin<Backup> for ServerPlugin {
    fn name(&self) -> &str {
        "server"
    }

    fn worker(&self) -> Option<&dyn Worker<Backup>> {
        Some(self)
    }
}
