// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits implemented by plugins.
//!
//! A plugin implements any subset of the four capabilities and advertises
//! them through the [`Plugin`] accessor methods. An accessor returning
//! `None` is the inert default: the host skips the plugin for that phase
//! without side effects. The host declares which capabilities are
//! required at adaptation time (see [`crate::adapter::adapt`]).
//!
//! All traits are parameterized by the snapshot type `S` so the same
//! lifecycle serves any immutable root object.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use tankobon_core::{SchemaRegistry, TankobonError};

use crate::host::Host;

/// Extends the schema registry, invoked exactly once after the base
/// schema has been built and before the host accepts any snapshot.
pub trait SchemaExtender: Send + Sync {
    fn on_schema_ready(&self, schema: &mut SchemaRegistry) -> Result<(), TankobonError>;
}

/// Validates or absorbs a staged snapshot during the validate phase of
/// an update.
///
/// An error aborts the update: the staged value is discarded, the
/// visible snapshot is unchanged, and no commit notification follows.
/// Plugins that derive state from the snapshot build it here, keep it
/// staged, and expose it only from [`CommitObserver::on_committed`].
#[async_trait]
pub trait SnapshotValidator<S>: Send + Sync {
    async fn on_snapshot(&self, host: &Host<S>, staged: &Arc<S>) -> Result<(), TankobonError>;
}

/// Observes a commit after the snapshot swap.
///
/// Fire-and-forget: by the time this runs the new snapshot is already
/// live, so cleanup must not assume the old one is still reachable.
pub trait CommitObserver: Send + Sync {
    fn on_committed(&self);
}

/// A long-lived background task supervised for the host's lifetime.
///
/// Workers must re-check `lifetime` at every suspension point and
/// return promptly once it is cancelled. Returning an error cancels the
/// shared lifetime and brings every sibling worker down.
#[async_trait]
pub trait Worker<S>: Send + Sync {
    async fn run(&self, lifetime: CancellationToken, host: Host<S>) -> Result<(), TankobonError>;
}

/// A plugin: a named bundle of capabilities.
///
/// Every accessor defaults to `None`; override only those the plugin
/// actually provides.
pub trait Plugin<S>: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn schema_extender(&self) -> Option<&dyn SchemaExtender> {
        None
    }

    fn snapshot_validator(&self) -> Option<&dyn SnapshotValidator<S>> {
        None
    }

    fn commit_observer(&self) -> Option<&dyn CommitObserver> {
        None
    }

    fn worker(&self) -> Option<&dyn Worker<S>> {
        None
    }
}
