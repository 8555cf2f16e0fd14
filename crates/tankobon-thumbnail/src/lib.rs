// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thumbnail caching: content-addressed file store and the plugin that
//! keeps it in sync with the committed snapshot.

pub mod plugin;
pub mod store;

pub use plugin::ThumbnailPlugin;
pub use store::{stem, ThumbnailStore};
