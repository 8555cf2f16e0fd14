// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Worker supervision.
//!
//! One tokio task per plugin worker, all sharing the host's lifetime
//! token. The first task to fail cancels the token; the remaining
//! workers are expected to observe cancellation cooperatively and
//! return. The supervisor never returns while a task is still running,
//! and exactly one error (the first observed) is propagated -- later
//! failures are logged and discarded.

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use tankobon_core::TankobonError;

use crate::adapter::AdaptedPlugin;
use crate::host::Host;

pub(crate) async fn supervise<S: Send + Sync + 'static>(
    plugins: &[AdaptedPlugin<S>],
    lifetime: CancellationToken,
    host: Host<S>,
) -> Result<(), TankobonError> {
    let mut tasks = JoinSet::new();

    for adapted in plugins {
        // A plugin without a worker capability contributes no task.
        if adapted.plugin().worker().is_none() {
            continue;
        }

        let plugin = Arc::clone(adapted.plugin());
        let name = adapted.name().to_string();
        let token = lifetime.clone();
        let host = host.clone();

        debug!(plugin = name.as_str(), "starting worker");
        tasks.spawn(async move {
            let result = match plugin.worker() {
                Some(worker) => worker.run(token, host).await,
                None => Ok(()),
            };
            (name, result)
        });
    }

    let mut first_error: Option<TankobonError> = None;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((name, Ok(()))) => {
                debug!(plugin = name.as_str(), "worker exited cleanly");
            }
            Ok((name, Err(e))) => {
                if first_error.is_none() {
                    lifetime.cancel();
                    first_error = Some(TankobonError::Worker {
                        plugin: name,
                        source: Box::new(e),
                    });
                } else {
                    warn!(
                        plugin = name.as_str(),
                        error = %e,
                        "worker failed after shutdown began"
                    );
                }
            }
            Err(join_error) => {
                // A panicked worker counts as a failed worker.
                if first_error.is_none() {
                    lifetime.cancel();
                    first_error =
                        Some(TankobonError::Internal(format!("worker panicked: {join_error}")));
                } else {
                    warn!(error = %join_error, "worker panicked after shutdown began");
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Plugin, Worker};
    use crate::registry::PluginSet;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tankobon_core::SchemaRegistry;

    /// Waits for cancellation, then records that it drained cleanly.
    struct Obedient {
        name: &'static str,
        drained: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Worker<()> for Obedient {
        async fn run(
            &self,
            lifetime: CancellationToken,
            _host: Host<()>,
        ) -> Result<(), TankobonError> {
            lifetime.cancelled().await;
            self.drained.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    impl Plugin<()> for Obedient {
        fn name(&self) -> &str {
            self.name
        }

        fn worker(&self) -> Option<&dyn Worker<()>> {
            Some(self)
        }
    }

    /// Fails after a short delay.
    struct Faulty;

    #[async_trait]
    impl Worker<()> for Faulty {
        async fn run(
            &self,
            _lifetime: CancellationToken,
            _host: Host<()>,
        ) -> Result<(), TankobonError> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Err(TankobonError::Internal("boom".into()))
        }
    }

    impl Plugin<()> for Faulty {
        fn name(&self) -> &str {
            "faulty"
        }

        fn worker(&self) -> Option<&dyn Worker<()>> {
            Some(self)
        }
    }

    /// Returns immediately with no error.
    struct OneShot;

    #[async_trait]
    impl Worker<()> for OneShot {
        async fn run(
            &self,
            _lifetime: CancellationToken,
            _host: Host<()>,
        ) -> Result<(), TankobonError> {
            Ok(())
        }
    }

    impl Plugin<()> for OneShot {
        fn name(&self) -> &str {
            "one-shot"
        }

        fn worker(&self) -> Option<&dyn Worker<()>> {
            Some(self)
        }
    }

    fn host_of(plugins: Vec<Arc<dyn Plugin<()>>>) -> Host<()> {
        let set = PluginSet::adapt_all(plugins, &[]).unwrap();
        Host::new(SchemaRegistry::new(), set).unwrap()
    }

    #[tokio::test]
    async fn first_error_cancels_siblings_and_is_returned() {
        let drained = Arc::new(AtomicBool::new(false));
        let host = host_of(vec![
            Arc::new(Obedient {
                name: "obedient",
                drained: Arc::clone(&drained),
            }),
            Arc::new(Faulty),
        ]);

        let err = host.run_workers().await.unwrap_err();
        match err {
            TankobonError::Worker { plugin, .. } => assert_eq!(plugin, "faulty"),
            other => panic!("expected Worker error, got {other}"),
        }

        // The supervisor only returned after the sibling drained.
        assert!(drained.load(Ordering::SeqCst));
        assert!(host.lifetime().is_cancelled());
    }

    #[tokio::test]
    async fn clean_worker_exit_does_not_trigger_cancellation() {
        let drained = Arc::new(AtomicBool::new(false));
        let host = host_of(vec![
            Arc::new(OneShot),
            Arc::new(Obedient {
                name: "obedient",
                drained: Arc::clone(&drained),
            }),
        ]);

        let supervisor = tokio::spawn({
            let host = host.clone();
            async move { host.run_workers().await }
        });

        // Give the one-shot worker time to return; the supervisor must
        // still be waiting on the obedient worker.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!host.lifetime().is_cancelled());
        assert!(!supervisor.is_finished());

        host.shutdown();
        supervisor.await.unwrap().unwrap();
        assert!(drained.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn supervisor_with_no_workers_returns_immediately() {
        let host = host_of(vec![]);
        host.run_workers().await.unwrap();
    }

    #[tokio::test]
    async fn external_shutdown_drains_all_workers() {
        let a = Arc::new(AtomicBool::new(false));
        let b = Arc::new(AtomicBool::new(false));
        let host = host_of(vec![
            Arc::new(Obedient {
                name: "a",
                drained: Arc::clone(&a),
            }),
            Arc::new(Obedient {
                name: "b",
                drained: Arc::clone(&b),
            }),
        ]);

        let supervisor = tokio::spawn({
            let host = host.clone();
            async move { host.run_workers().await }
        });

        host.shutdown();
        supervisor.await.unwrap().unwrap();
        assert!(a.load(Ordering::SeqCst) && b.load(Ordering::SeqCst));
    }
}
