// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Indexer plugin: by-title and by-(source, url) lookup tables.
//!
//! Tables are rebuilt from scratch for every staged snapshot during the
//! validate phase and swapped live only at commit, so a reader never
//! observes a half-built index or an index referencing a retired
//! snapshot. Each table holds the snapshot `Arc` it was built from;
//! lookups hand out [`MangaRef`] guards that keep that snapshot alive.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use tracing::debug;

use tankobon_backup::{Backup, Manga};
use tankobon_core::TankobonError;
use tankobon_plugin::{CommitObserver, Host, Plugin, SnapshotValidator};

/// Composite identity of a tracked manga.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MangaKey {
    pub source: i64,
    pub url: String,
}

/// A manga reference that pins the snapshot it was resolved against.
pub struct MangaRef {
    snapshot: Arc<Backup>,
    idx: usize,
}

impl MangaRef {
    /// The snapshot this reference belongs to.
    pub fn snapshot(&self) -> &Arc<Backup> {
        &self.snapshot
    }
}

impl Deref for MangaRef {
    type Target = Manga;

    fn deref(&self) -> &Manga {
        &self.snapshot.manga[self.idx]
    }
}

struct Tables {
    snapshot: Arc<Backup>,
    by_title: HashMap<String, usize>,
    by_key: HashMap<MangaKey, usize>,
}

impl Tables {
    /// Build from scratch. Later entries overwrite earlier ones for both
    /// colliding titles and identical keys.
    fn build(snapshot: &Arc<Backup>) -> Self {
        let mut by_title = HashMap::new();
        let mut by_key = HashMap::new();

        for (idx, manga) in snapshot.manga.iter().enumerate() {
            if let Some(title) = &manga.title {
                by_title.insert(title.clone(), idx);
            }
            if let (Some(source), Some(url)) = (manga.source, &manga.url) {
                by_key.insert(
                    MangaKey {
                        source,
                        url: url.clone(),
                    },
                    idx,
                );
            }
        }

        Self {
            snapshot: Arc::clone(snapshot),
            by_title,
            by_key,
        }
    }
}

/// The indexer plugin.
#[derive(Default)]
pub struct Indexer {
    live: ArcSwapOption<Tables>,
    staged: Mutex<Option<Tables>>,
}

impl Indexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up by exact title over the committed index.
    pub fn by_title(&self, title: &str) -> Option<MangaRef> {
        let tables = self.live.load_full()?;
        let idx = *tables.by_title.get(title)?;
        Some(MangaRef {
            snapshot: Arc::clone(&tables.snapshot),
            idx,
        })
    }

    /// Look up by (source, url) over the committed index.
    pub fn by_key(&self, source: i64, url: &str) -> Option<MangaRef> {
        let tables = self.live.load_full()?;
        let idx = *tables.by_key.get(&MangaKey {
            source,
            url: url.to_string(),
        })?;
        Some(MangaRef {
            snapshot: Arc::clone(&tables.snapshot),
            idx,
        })
    }

    /// The snapshot the committed index was built from.
    pub fn snapshot(&self) -> Option<Arc<Backup>> {
        self.live.load_full().map(|t| Arc::clone(&t.snapshot))
    }
}

#[async_trait]
impl SnapshotValidator<Backup> for Indexer {
    async fn on_snapshot(
        &self,
        _host: &Host<Backup>,
        staged: &Arc<Backup>,
    ) -> Result<(), TankobonError> {
        let tables = Tables::build(staged);
        debug!(
            titles = tables.by_title.len(),
            keys = tables.by_key.len(),
            "index staged"
        );
        *self
            .staged
            .lock()
            .map_err(|_| TankobonError::Internal("index staging lock poisoned".into()))? =
            Some(tables);
        Ok(())
    }
}

impl CommitObserver for Indexer {
    fn on_committed(&self) {
        if let Ok(mut staged) = self.staged.lock()
            && let Some(tables) = staged.take()
        {
            self.live.store(Some(Arc::new(tables)));
        }
    }
}

impl Plugin<Backup> for Indexer {
    fn name(&self) -> &str {
        "indexer"
    }

    fn snapshot_validator(&self) -> Option<&dyn SnapshotValidator<Backup>> {
        Some(self)
    }

    fn commit_observer(&self) -> Option<&dyn CommitObserver> {
        Some(self)
    }
}
