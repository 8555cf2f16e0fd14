// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content-addressed thumbnail file store.
//!
//! Files are named `<stem><ext>` where the stem is the hex SHA-256 of
//! the manga's composite identity `"{source}:{url}"`. The extension
//! comes from the response content type at download time, so a cache
//! probe matches on the stem alone.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use tankobon_core::TankobonError;

/// Derive the cache filename stem for a manga identity.
pub fn stem(source: i64, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{source}:{url}").as_bytes());
    hex::encode(hasher.finalize())
}

fn extension_for(content_type: &str) -> &'static str {
    // Parameters such as "; charset=..." are not part of the media type.
    let media = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim();
    match media {
        "image/jpeg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "image/avif" => ".avif",
        _ => ".bin",
    }
}

/// Downloads and caches thumbnails under a single directory.
pub struct ThumbnailStore {
    dir: PathBuf,
    client: reqwest::Client,
}

impl ThumbnailStore {
    /// Open a store over `dir`, creating the directory if absent.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, TankobonError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            client: reqwest::Client::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Scan the directory for an already-cached file with this stem.
    pub fn find_cached(&self, stem: &str) -> Result<Option<String>, TankobonError> {
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let file_stem = name.rfind('.').map_or(name.as_str(), |i| &name[..i]);
            if file_stem == stem {
                return Ok(Some(name));
            }
        }
        Ok(None)
    }

    /// Resolve a manga's thumbnail to a cached filename, downloading on
    /// a cache miss. Returns the filename relative to the store dir.
    pub async fn fetch(
        &self,
        source: i64,
        url: &str,
        thumbnail_url: &str,
    ) -> Result<String, TankobonError> {
        let stem = stem(source, url);
        if let Some(name) = self.find_cached(&stem)? {
            return Ok(name);
        }

        let response = self
            .client
            .get(thumbnail_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| TankobonError::Thumbnail {
                url: thumbnail_url.to_string(),
                message: e.to_string(),
            })?;

        let ext = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(extension_for)
            .unwrap_or(".bin");

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TankobonError::Thumbnail {
                url: thumbnail_url.to_string(),
                message: e.to_string(),
            })?;

        let name = format!("{stem}{ext}");
        std::fs::write(self.dir.join(&name), &bytes)?;
        debug!(file = %name, bytes = bytes.len(), "thumbnail cached");
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn stem_is_deterministic_and_identity_sensitive() {
        assert_eq!(stem(1, "/a"), stem(1, "/a"));
        assert_ne!(stem(1, "/a"), stem(2, "/a"));
        assert_ne!(stem(1, "/a"), stem(1, "/b"));
        assert_eq!(stem(1, "/a").len(), 64);
    }

    #[test]
    fn extension_covers_common_image_types() {
        assert_eq!(extension_for("image/jpeg"), ".jpg");
        assert_eq!(extension_for("image/png; charset=utf-8"), ".png");
        assert_eq!(extension_for("application/octet-stream"), ".bin");
    }

    #[tokio::test]
    async fn fetch_downloads_once_then_hits_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cover.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(b"png-bytes".to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = ThumbnailStore::open(dir.path()).unwrap();
        let url = format!("{}/cover.png", server.uri());

        let first = store.fetch(7, "/manga/7", &url).await.unwrap();
        assert!(first.ends_with(".png"));
        assert_eq!(
            std::fs::read(dir.path().join(&first)).unwrap(),
            b"png-bytes"
        );

        let second = store.fetch(7, "/manga/7", &url).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unknown_content_type_falls_back_to_bin() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"??".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = ThumbnailStore::open(dir.path()).unwrap();
        let name = store
            .fetch(1, "/m", &format!("{}/x", server.uri()))
            .await
            .unwrap();
        assert!(name.ends_with(".bin"));
    }

    #[tokio::test]
    async fn http_error_is_a_thumbnail_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = ThumbnailStore::open(dir.path()).unwrap();
        let err = store
            .fetch(1, "/m", &format!("{}/x", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, TankobonError::Thumbnail { .. }));
    }
}
