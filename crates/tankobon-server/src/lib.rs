// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP query server: lookups and listings over the committed snapshot,
//! schema introspection, and cached thumbnail serving.

pub mod handlers;
mod plugin;
pub mod server;

pub use plugin::ServerPlugin;
pub use server::{router, ServerState};
