// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router and shared handler state for the query server.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use tankobon_backup::Backup;
use tankobon_index::Indexer;
use tankobon_plugin::Host;
use tankobon_thumbnail::ThumbnailPlugin;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct ServerState {
    /// Snapshot coordinator; handlers read the committed snapshot only.
    pub host: Host<Backup>,
    /// Single-record lookups.
    pub indexer: Arc<Indexer>,
    /// Present when the thumbnail plugin is registered; handlers attach
    /// resolved thumbnail URLs to responses when it is.
    pub thumbnail: Option<Arc<ThumbnailPlugin>>,
}

/// Build the router.
///
/// `thumbnail_path` is where cached thumbnail files are served from
/// when the thumbnail plugin is present.
pub fn router(state: ServerState, thumbnail_path: &str) -> Router {
    let mut app = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/schema", get(handlers::get_schema))
        .route("/manga", get(handlers::get_manga))
        .route("/mangas", get(handlers::get_mangas))
        .route("/categories", get(handlers::get_categories))
        .route("/sources", get(handlers::get_sources));

    if let Some(thumbnail) = &state.thumbnail {
        app = app.nest_service(thumbnail_path, ServeDir::new(thumbnail.store().dir()));
    }

    app.with_state(state).layer(TraceLayer::new_for_http())
}
