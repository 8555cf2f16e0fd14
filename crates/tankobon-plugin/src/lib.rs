// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin lifecycle coordinator for the Tankobon snapshot server.
//!
//! The coordinator is generic over the snapshot type `S` and glues
//! together four pieces:
//!
//! - capability traits ([`SchemaExtender`], [`SnapshotValidator`],
//!   [`CommitObserver`], [`Worker`]) a plugin may implement in any
//!   subset;
//! - the capability adapter ([`adapt`]) that checks required
//!   capabilities and substitutes inert defaults for missing ones;
//! - the ordered [`PluginSet`] registry with short-circuiting fan-out;
//! - the [`Host`]: a single atomically-swapped snapshot reference with
//!   a validated two-phase update, plus supervised background workers
//!   sharing one cancellable lifetime.

mod adapter;
mod capability;
mod host;
mod registry;
mod supervisor;

pub use adapter::{adapt, AdaptedPlugin};
pub use capability::{CommitObserver, Plugin, SchemaExtender, SnapshotValidator, Worker};
pub use host::Host;
pub use registry::PluginSet;

// Re-exported so plugin crates depend on one lifecycle surface.
pub use tokio_util::sync::CancellationToken;
