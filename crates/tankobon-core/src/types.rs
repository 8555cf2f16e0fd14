// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the plugin lifecycle.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One of the four pluggable behaviors a plugin may provide.
///
/// `Schema` and `Snapshot` may be declared required by the host; the
/// other two always default to an inert no-op when absent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Extend the schema registry once it has been built.
    Schema,
    /// Validate or absorb a staged snapshot before it is committed.
    Snapshot,
    /// Observe a commit after the snapshot swap.
    Committed,
    /// Run a long-lived background task for the host's lifetime.
    Worker,
}
