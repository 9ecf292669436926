//! HTTP handlers
//!
//! Thin wrappers over the service layer: parse and validate the request,
//! call the service, map the outcome to JSON.

pub mod health;
pub mod playlists;
pub mod search;

use axum::Router;

use crate::AppState;

/// Build all API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::health_routes())
        .merge(playlists::playlist_routes())
        .merge(search::search_routes())
}
