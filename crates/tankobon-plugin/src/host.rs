// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Snapshot coordinator.
//!
//! The [`Host`] owns the single current snapshot reference and performs
//! the two-phase swap: validate every plugin against the staged value,
//! then atomically replace the visible reference, then notify. Readers
//! load the snapshot without locking; the swap is one pointer store.
//!
//! The host is a cheap clonable handle; workers receive a clone so they
//! can read the current snapshot or push a new candidate through
//! [`Host::update`].

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio_util::sync::CancellationToken;
use tracing::info;

use tankobon_core::{SchemaRegistry, TankobonError};

use crate::registry::PluginSet;
use crate::supervisor;

pub struct Host<S> {
    inner: Arc<HostInner<S>>,
}

impl<S> Clone for Host<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct HostInner<S> {
    plugins: PluginSet<S>,
    /// Frozen after construction; plugins extend it via their schema hook.
    schema: SchemaRegistry,
    current: ArcSwapOption<S>,
    /// Serializes updates: validate-then-commit must be observed as atomic.
    update_gate: tokio::sync::Mutex<()>,
    /// The one cancellable lifetime shared by every worker, created once
    /// per host and never recreated.
    lifetime: CancellationToken,
}

impl<S: Send + Sync + 'static> Host<S> {
    /// Build a host over an adapted plugin set.
    ///
    /// Runs every schema hook exactly once, in registry order, before
    /// the schema is frozen. A schema hook error aborts construction.
    pub fn new(mut schema: SchemaRegistry, plugins: PluginSet<S>) -> Result<Self, TankobonError> {
        plugins.broadcast_schema(&mut schema)?;

        Ok(Self {
            inner: Arc::new(HostInner {
                plugins,
                schema,
                current: ArcSwapOption::empty(),
                update_gate: tokio::sync::Mutex::new(()),
                lifetime: CancellationToken::new(),
            }),
        })
    }

    /// The extended, frozen schema.
    pub fn schema(&self) -> &SchemaRegistry {
        &self.inner.schema
    }

    /// The currently committed snapshot, or `None` before the first
    /// successful update. Lock-free; always observes a fully committed
    /// value.
    pub fn current(&self) -> Option<Arc<S>> {
        self.inner.current.load_full()
    }

    /// Two-phase snapshot update.
    ///
    /// 1. Every snapshot validator sees the staged candidate; the first
    ///    error aborts with the visible snapshot unchanged.
    /// 2. The visible reference is swapped in a single atomic store.
    /// 3. Every commit observer is notified; the new snapshot is already
    ///    live when they run.
    ///
    /// Concurrent callers are serialized; the validate phase of one
    /// update never interleaves with the commit of another.
    pub async fn update(&self, candidate: S) -> Result<(), TankobonError> {
        let _serialized = self.inner.update_gate.lock().await;

        let staged = Arc::new(candidate);
        self.inner.plugins.broadcast_snapshot(self, &staged).await?;

        self.inner.current.store(Some(Arc::clone(&staged)));
        self.inner.plugins.broadcast_committed();

        info!("snapshot committed");
        Ok(())
    }

    /// A handle to the shared worker lifetime.
    pub fn lifetime(&self) -> CancellationToken {
        self.inner.lifetime.clone()
    }

    /// Request shutdown: cancels the shared lifetime. One-shot; never
    /// un-triggered.
    pub fn shutdown(&self) {
        self.inner.lifetime.cancel();
    }

    /// Run every plugin worker until all have exited.
    ///
    /// Returns the first worker error observed (after cancelling the
    /// shared lifetime and draining the rest), or `Ok` once every worker
    /// has returned cleanly.
    pub async fn run_workers(&self) -> Result<(), TankobonError> {
        supervisor::supervise(
            self.inner.plugins.plugins(),
            self.inner.lifetime.clone(),
            self.clone(),
        )
        .await
    }

    pub fn plugins(&self) -> &PluginSet<S> {
        &self.inner.plugins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{CommitObserver, Plugin, SnapshotValidator};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Rejects snapshots below a floor; counts commits.
    struct Gate {
        floor: u64,
        commits: AtomicUsize,
    }

    #[async_trait]
    impl SnapshotValidator<u64> for Gate {
        async fn on_snapshot(
            &self,
            _host: &Host<u64>,
            staged: &Arc<u64>,
        ) -> Result<(), TankobonError> {
            if **staged < self.floor {
                return Err(TankobonError::Internal(format!(
                    "candidate {staged} below floor {}",
                    self.floor
                )));
            }
            Ok(())
        }
    }

    impl CommitObserver for Gate {
        fn on_committed(&self) {
            self.commits.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Plugin<u64> for Gate {
        fn name(&self) -> &str {
            "gate"
        }

        fn snapshot_validator(&self) -> Option<&dyn SnapshotValidator<u64>> {
            Some(self)
        }

        fn commit_observer(&self) -> Option<&dyn CommitObserver> {
            Some(self)
        }
    }

    fn gated_host(floor: u64) -> (Host<u64>, Arc<Gate>) {
        let gate = Arc::new(Gate {
            floor,
            commits: AtomicUsize::new(0),
        });
        let plugins =
            PluginSet::adapt_all([Arc::clone(&gate) as Arc<dyn Plugin<u64>>], &[]).unwrap();
        (Host::new(SchemaRegistry::new(), plugins).unwrap(), gate)
    }

    #[tokio::test]
    async fn host_starts_empty() {
        let (host, _) = gated_host(0);
        assert!(host.current().is_none());
    }

    #[tokio::test]
    async fn visible_snapshot_tracks_last_successful_update() {
        let (host, gate) = gated_host(0);

        host.update(1).await.unwrap();
        assert_eq!(*host.current().unwrap(), 1);

        host.update(2).await.unwrap();
        assert_eq!(*host.current().unwrap(), 2);
        assert_eq!(gate.commits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_validation_leaves_prior_state_and_skips_commit() {
        let (host, gate) = gated_host(10);

        // Empty -> rejected candidate keeps the host empty.
        assert!(host.update(5).await.is_err());
        assert!(host.current().is_none());
        assert_eq!(gate.commits.load(Ordering::SeqCst), 0);

        // Active -> rejected candidate keeps the previous value.
        host.update(20).await.unwrap();
        assert!(host.update(3).await.is_err());
        assert_eq!(*host.current().unwrap(), 20);
        assert_eq!(gate.commits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn update_is_idempotent_for_pure_validation() {
        let (host, gate) = gated_host(0);

        host.update(7).await.unwrap();
        host.update(7).await.unwrap();

        assert_eq!(*host.current().unwrap(), 7);
        assert_eq!(gate.commits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn validation_error_names_the_rejecting_plugin() {
        let (host, _) = gated_host(10);
        let err = host.update(1).await.unwrap_err();
        match err {
            TankobonError::Validation { plugin, .. } => assert_eq!(plugin, "gate"),
            other => panic!("expected Validation, got {other}"),
        }
    }

    #[tokio::test]
    async fn shutdown_cancels_the_shared_lifetime() {
        let (host, _) = gated_host(0);
        let lifetime = host.lifetime();
        assert!(!lifetime.is_cancelled());
        host.shutdown();
        assert!(lifetime.is_cancelled());
    }
}
