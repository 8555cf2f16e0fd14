// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the query API.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use tankobon_backup::{Category, Manga, ReadingState, Source};

use crate::server::ServerState;

/// A manga record as served over HTTP: the raw backup fields plus the
/// derived counters, reading state, and resolved thumbnail URL.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MangaView {
    pub source: Option<i64>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub status: Option<i32>,
    pub total_chapters: usize,
    pub read_chapters: usize,
    pub reading_state: ReadingState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl MangaView {
    fn build(state: &ServerState, manga: &Manga) -> Self {
        let thumbnail = match (&state.thumbnail, manga.source, manga.url.as_deref()) {
            (Some(plugin), Some(source), Some(url)) => plugin.resolve(source, url),
            _ => None,
        };
        Self {
            source: manga.source,
            url: manga.url.clone(),
            title: manga.title.clone(),
            thumbnail_url: manga.thumbnail_url.clone(),
            status: manga.status,
            total_chapters: manga.total_chapters(),
            read_chapters: manga.read_chapters(),
            reading_state: manga.current_reading_state(),
            thumbnail,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// GET /health
pub async fn get_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /schema
///
/// Introspection of the extended schema registry, frozen at startup.
pub async fn get_schema(State(state): State<ServerState>) -> Response {
    Json(state.host.schema()).into_response()
}

#[derive(Debug, Deserialize)]
pub struct MangaQuery {
    pub title: Option<String>,
    pub source: Option<i64>,
    pub url: Option<String>,
}

/// GET /manga?title=… or /manga?source=…&url=…
///
/// The two addressing forms are mutually exclusive.
pub async fn get_manga(
    State(state): State<ServerState>,
    Query(query): Query<MangaQuery>,
) -> Response {
    let by_identity = query.source.is_some() || query.url.is_some();
    let hit = match (&query.title, by_identity) {
        (Some(_), true) => {
            return error(
                StatusCode::BAD_REQUEST,
                "title and source+url are mutually exclusive",
            );
        }
        (Some(title), false) => state.indexer.by_title(title),
        (None, true) => {
            let (Some(source), Some(url)) = (query.source, query.url.as_deref()) else {
                return error(StatusCode::BAD_REQUEST, "source and url must be given together");
            };
            state.indexer.by_key(source, url)
        }
        (None, false) => {
            return error(StatusCode::BAD_REQUEST, "query requires title or source+url");
        }
    };

    match hit {
        Some(manga) => Json(MangaView::build(&state, &manga)).into_response(),
        None => error(StatusCode::NOT_FOUND, "no matching manga"),
    }
}

#[derive(Debug, Deserialize)]
pub struct MangasQuery {
    pub source: Option<i64>,
    pub status: Option<i32>,
    pub state: Option<ReadingState>,
}

/// GET /mangas with optional source, status, and reading-state filters.
pub async fn get_mangas(
    State(state): State<ServerState>,
    Query(query): Query<MangasQuery>,
) -> Json<Vec<MangaView>> {
    let Some(snapshot) = state.host.current() else {
        return Json(Vec::new());
    };
    let views = snapshot
        .manga
        .iter()
        .filter(|m| query.source.is_none_or(|s| m.source == Some(s)))
        .filter(|m| query.status.is_none_or(|s| m.status == Some(s)))
        .filter(|m| {
            query
                .state
                .is_none_or(|wanted| m.current_reading_state() == wanted)
        })
        .map(|m| MangaView::build(&state, m))
        .collect();
    Json(views)
}

/// GET /categories
pub async fn get_categories(State(state): State<ServerState>) -> Json<Vec<Category>> {
    Json(
        state
            .host
            .current()
            .map(|s| s.categories.clone())
            .unwrap_or_default(),
    )
}

/// GET /sources
pub async fn get_sources(State(state): State<ServerState>) -> Json<Vec<Source>> {
    Json(
        state
            .host
            .current()
            .map(|s| s.sources.clone())
            .unwrap_or_default(),
    )
}
