// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thumbnail plugin.
//!
//! Attaches a `thumbnail` field to the `Manga` schema type, populates
//! the cache for every staged snapshot (fail-fast, so a snapshot with
//! an unreachable thumbnail never commits), promotes the identity-to-
//! filename mapping at commit, and re-resolves the mapping on a timer
//! (best-effort, failures are logged and those entries omitted).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use tracing::{debug, warn};

use tankobon_backup::Backup;
use tankobon_core::{FieldSpec, SchemaRegistry, TankobonError};
use tankobon_plugin::{
    CancellationToken, CommitObserver, Host, Plugin, SchemaExtender, SnapshotValidator, Worker,
};

use crate::store::ThumbnailStore;

type FileMap = HashMap<(i64, String), String>;

/// The thumbnail plugin.
pub struct ThumbnailPlugin {
    store: ThumbnailStore,
    url_prefix: String,
    refresh_interval: Duration,
    live: ArcSwapOption<FileMap>,
    staged: Mutex<Option<FileMap>>,
}

impl ThumbnailPlugin {
    pub fn new(store: ThumbnailStore, url_prefix: impl Into<String>, refresh_interval: Duration) -> Self {
        Self {
            store,
            url_prefix: url_prefix.into(),
            refresh_interval,
            live: ArcSwapOption::empty(),
            staged: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &ThumbnailStore {
        &self.store
    }

    /// The committed thumbnail URL for a manga identity, if cached.
    pub fn resolve(&self, source: i64, url: &str) -> Option<String> {
        let map = self.live.load_full()?;
        let file = map.get(&(source, url.to_string()))?;
        Some(format!("{}/{}", self.url_prefix, file))
    }

    /// Resolve every manga in the snapshot to a cached file.
    ///
    /// With `fail_fast` the first fetch error aborts the batch;
    /// otherwise failures are logged and their entries omitted.
    async fn build_map(&self, snapshot: &Backup, fail_fast: bool) -> Result<FileMap, TankobonError> {
        let mut map = FileMap::new();
        for manga in &snapshot.manga {
            let (Some(source), Some(url)) = (manga.source, manga.url.as_deref()) else {
                continue;
            };
            let Some(thumbnail_url) = manga.thumbnail_url.as_deref() else {
                continue;
            };
            match self.store.fetch(source, url, thumbnail_url).await {
                Ok(file) => {
                    map.insert((source, url.to_string()), file);
                }
                Err(e) if fail_fast => return Err(e),
                Err(e) => {
                    warn!(url = %thumbnail_url, error = %e, "thumbnail fetch failed, entry omitted");
                }
            }
        }
        Ok(map)
    }

    /// One best-effort refresh pass against the committed snapshot.
    ///
    /// The rebuilt map is published only if the snapshot it was built
    /// from is still the committed one; a commit that landed while the
    /// rebuild was downloading already promoted a newer map, and the
    /// stale result must not clobber it.
    async fn refresh(&self, host: &Host<Backup>) {
        let Some(snapshot) = host.current() else {
            return;
        };
        match self.build_map(&snapshot, false).await {
            Ok(map) => {
                let still_current = host
                    .current()
                    .is_some_and(|current| Arc::ptr_eq(&current, &snapshot));
                if still_current {
                    debug!(entries = map.len(), "thumbnail mapping refreshed");
                    self.live.store(Some(Arc::new(map)));
                } else {
                    debug!("snapshot replaced during refresh, result dropped");
                }
            }
            Err(e) => warn!(error = %e, "thumbnail refresh failed"),
        }
    }
}

impl SchemaExtender for ThumbnailPlugin {
    fn on_schema_ready(&self, schema: &mut SchemaRegistry) -> Result<(), TankobonError> {
        let manga = schema.type_mut("Manga").ok_or_else(|| {
            TankobonError::Internal("schema has no Manga type to attach thumbnail to".into())
        })?;
        manga.set_field(
            "thumbnail",
            FieldSpec::new("String").with_description("cached thumbnail URL"),
        );
        Ok(())
    }
}

#[async_trait]
impl SnapshotValidator<Backup> for ThumbnailPlugin {
    async fn on_snapshot(
        &self,
        _host: &Host<Backup>,
        staged: &Arc<Backup>,
    ) -> Result<(), TankobonError> {
        let map = self.build_map(staged, true).await?;
        debug!(entries = map.len(), "thumbnail mapping staged");
        *self
            .staged
            .lock()
            .map_err(|_| TankobonError::Internal("thumbnail staging lock poisoned".into()))? =
            Some(map);
        Ok(())
    }
}

impl CommitObserver for ThumbnailPlugin {
    fn on_committed(&self) {
        if let Ok(mut staged) = self.staged.lock()
            && let Some(map) = staged.take()
        {
            self.live.store(Some(Arc::new(map)));
        }
    }
}

#[async_trait]
impl Worker<Backup> for ThumbnailPlugin {
    /// Periodic refresh: re-resolve the mapping against the committed
    /// snapshot so thumbnails changed upstream are re-fetched after
    /// cache eviction and transient failures heal without a new backup.
    async fn run(
        &self,
        lifetime: CancellationToken,
        host: Host<Backup>,
    ) -> Result<(), TankobonError> {
        let mut interval = tokio::time::interval(self.refresh_interval);
        interval.tick().await; // immediate first tick

        loop {
            tokio::select! {
                _ = lifetime.cancelled() => return Ok(()),
                _ = interval.tick() => self.refresh(&host).await,
            }
        }
    }
}

impl Plugin<Backup> for ThumbnailPlugin {
    fn name(&self) -> &str {
        "thumbnail"
    }

    fn schema_extender(&self) -> Option<&dyn SchemaExtender> {
        Some(self)
    }

    fn snapshot_validator(&self) -> Option<&dyn SnapshotValidator<Backup>> {
        Some(self)
    }

    fn commit_observer(&self) -> Option<&dyn CommitObserver> {
        Some(self)
    }

    fn worker(&self) -> Option<&dyn Worker<Backup>> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tankobon_backup::{backup_schema, Manga};
    use tankobon_plugin::PluginSet;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn manga(source: i64, url: &str, thumbnail_url: &str) -> Manga {
        Manga {
            source: Some(source),
            url: Some(url.to_string()),
            thumbnail_url: Some(thumbnail_url.to_string()),
            ..Manga::default()
        }
    }

    fn plugin_in(dir: &std::path::Path) -> Arc<ThumbnailPlugin> {
        Arc::new(ThumbnailPlugin::new(
            ThumbnailStore::open(dir).unwrap(),
            "/thumbnails",
            Duration::from_secs(3600),
        ))
    }

    fn host_with(plugin: &Arc<ThumbnailPlugin>) -> Host<Backup> {
        let plugins = PluginSet::adapt_all(
            [Arc::clone(plugin) as Arc<dyn Plugin<Backup>>],
            &[],
        )
        .unwrap();
        Host::new(backup_schema(), plugins).unwrap()
    }

    #[tokio::test]
    async fn schema_hook_attaches_thumbnail_field() {
        let dir = tempfile::tempdir().unwrap();
        let host = host_with(&plugin_in(dir.path()));
        let manga = host.schema().get("Manga").unwrap();
        assert!(manga.field("thumbnail").is_some());
    }

    #[tokio::test]
    async fn commit_publishes_resolved_urls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/jpeg")
                    .set_body_bytes(b"jpg".to_vec()),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let plugin = plugin_in(dir.path());
        let host = host_with(&plugin);

        assert!(plugin.resolve(1, "/m1").is_none());

        host.update(Backup {
            manga: vec![manga(1, "/m1", &format!("{}/cover", server.uri()))],
            ..Backup::default()
        })
        .await
        .unwrap();

        let resolved = plugin.resolve(1, "/m1").unwrap();
        assert!(resolved.starts_with("/thumbnails/"));
        assert!(resolved.ends_with(".jpg"));
    }

    #[tokio::test]
    async fn unreachable_thumbnail_rejects_the_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let plugin = plugin_in(dir.path());
        let host = host_with(&plugin);

        let err = host
            .update(Backup {
                manga: vec![manga(1, "/m1", &format!("{}/cover", server.uri()))],
                ..Backup::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TankobonError::Validation { .. }));
        assert!(host.current().is_none());
        assert!(plugin.resolve(1, "/m1").is_none());
    }

    /// One failing entry out of five: fail-fast aborts with no partial
    /// map, best-effort yields the other four.
    async fn mixed_batch() -> (MockServer, Backup) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(wiremock::matchers::path("/broken"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(b"png".to_vec()),
            )
            .mount(&server)
            .await;

        let mut entries: Vec<Manga> = (0..4)
            .map(|i| manga(i, &format!("/m{i}"), &format!("{}/cover{i}", server.uri())))
            .collect();
        entries.insert(2, manga(9, "/m9", &format!("{}/broken", server.uri())));

        (
            server,
            Backup {
                manga: entries,
                ..Backup::default()
            },
        )
    }

    #[tokio::test]
    async fn fail_fast_batch_aborts_with_no_partial_map() {
        let (_server, snapshot) = mixed_batch().await;
        let dir = tempfile::tempdir().unwrap();
        let plugin = plugin_in(dir.path());

        let err = plugin.build_map(&snapshot, true).await.unwrap_err();
        assert!(matches!(err, TankobonError::Thumbnail { .. }));
        assert!(plugin.resolve(9, "/m9").is_none());
    }

    #[tokio::test]
    async fn best_effort_batch_omits_only_the_failing_entry() {
        let (_server, snapshot) = mixed_batch().await;
        let dir = tempfile::tempdir().unwrap();
        let plugin = plugin_in(dir.path());

        let map = plugin.build_map(&snapshot, false).await.unwrap();
        assert_eq!(map.len(), 4);
        assert!(!map.contains_key(&(9, "/m9".to_string())));
    }

    #[tokio::test]
    async fn stale_refresh_does_not_clobber_a_newer_commit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(wiremock::matchers::path("/a"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/jpeg")
                    .set_body_bytes(b"jpg".to_vec())
                    .set_delay(Duration::from_millis(400)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(wiremock::matchers::path("/b"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/jpeg")
                    .set_body_bytes(b"jpg".to_vec()),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let plugin = plugin_in(dir.path());
        let host = host_with(&plugin);

        host.update(Backup {
            manga: vec![manga(1, "/a", &format!("{}/a", server.uri()))],
            ..Backup::default()
        })
        .await
        .unwrap();

        // Evict the cache so the refresh has to re-download slowly.
        for entry in std::fs::read_dir(dir.path()).unwrap() {
            std::fs::remove_file(entry.unwrap().path()).unwrap();
        }

        let refresh = {
            let plugin = Arc::clone(&plugin);
            let host = host.clone();
            tokio::spawn(async move { plugin.refresh(&host).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;

        // A new snapshot commits while the rebuild is still in flight.
        host.update(Backup {
            manga: vec![manga(2, "/b", &format!("{}/b", server.uri()))],
            ..Backup::default()
        })
        .await
        .unwrap();
        assert!(plugin.resolve(2, "/b").is_some());

        refresh.await.unwrap();
        assert!(plugin.resolve(2, "/b").is_some());
        assert!(plugin.resolve(1, "/a").is_none());
    }

    #[tokio::test]
    async fn entries_without_thumbnail_url_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let plugin = plugin_in(dir.path());

        let snapshot = Backup {
            manga: vec![Manga {
                source: Some(1),
                url: Some("/m1".to_string()),
                ..Manga::default()
            }],
            ..Backup::default()
        };
        let map = plugin.build_map(&snapshot, true).await.unwrap();
        assert!(map.is_empty());
    }
}
