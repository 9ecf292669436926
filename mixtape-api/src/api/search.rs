//! Music-data search endpoint

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use mixtape_common::model::SongDescription;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub track: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
}

/// POST /search
///
/// Proxies to the configured music-data API and returns hits in the same
/// shape `POST /playlists/{id}/songs` accepts.
pub async fn search_music_data(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<Vec<SongDescription>>> {
    let Some(client) = &state.search else {
        return Err(ApiError::SearchUnavailable);
    };

    if request.track.is_empty() {
        return Err(ApiError::BadRequest("track is required".into()));
    }

    let songs = client
        .search_songs(&request.track, &request.artist, &request.album)
        .await?;
    Ok(Json(songs))
}

/// Build search routes
pub fn search_routes() -> Router<AppState> {
    Router::new().route("/search", post(search_music_data))
}
