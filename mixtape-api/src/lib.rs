//! mixtape-api library interface
//!
//! Exposes the service and database layers for integration testing.

pub mod api;
pub mod db;
pub mod error;
pub mod export;
pub mod search;
pub mod service;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::search::SearchClient;
use crate::service::PlaylistService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Playlist catalog and export operations
    pub playlists: PlaylistService,
    /// Music-data search proxy; `None` when no endpoint is configured
    pub search: Option<SearchClient>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, search: Option<SearchClient>) -> Self {
        Self {
            playlists: PlaylistService::new(db),
            search,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    api::routes().with_state(state)
}
