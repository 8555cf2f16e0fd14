// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backup snapshot collaborator: data model, loader, and base schema.

pub mod loader;
pub mod model;
pub mod schema;

pub use loader::{load_backup, load_latest, BACKUP_SUFFIX};
pub use model::{Backup, Category, Chapter, History, Manga, ReadingState, Source};
pub use schema::backup_schema;
