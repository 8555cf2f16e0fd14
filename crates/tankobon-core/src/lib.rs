// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Tankobon snapshot server.
//!
//! Provides the shared error type, the capability enumeration used by the
//! plugin lifecycle, and the schema registry that plugins may extend.

pub mod error;
pub mod schema;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TankobonError;
pub use schema::{FieldSpec, ObjectType, SchemaRegistry};
pub use types::Capability;
