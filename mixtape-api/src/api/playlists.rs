//! Playlist endpoints

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::playlist_songs::{SongSortKey, SortOrder};
use crate::error::{ApiError, ApiResult};
use crate::export::{ExportReport, ProviderCredentials};
use crate::AppState;
use mixtape_common::model::{NewPlaylist, Playlist, Song, SongDescription};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SongsQuery {
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteSongsRequest {
    pub songs_id: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct AddSongsResponse {
    pub songs_id: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub provider: String,
    pub access_token: String,
    #[serde(default)]
    pub music_user_token: Option<String>,
    #[serde(default)]
    pub storefront: Option<String>,
}

/// POST /playlists
pub async fn create_playlist(
    State(state): State<AppState>,
    Json(new_playlist): Json<NewPlaylist>,
) -> ApiResult<Json<Playlist>> {
    if new_playlist.name.is_empty() {
        return Err(ApiError::BadRequest("playlist_name is required".into()));
    }
    if new_playlist.user_id.is_empty() {
        return Err(ApiError::BadRequest("user_id is required".into()));
    }

    let playlist = state.playlists.create_playlist(&new_playlist).await?;
    Ok(Json(playlist))
}

/// GET /playlists?user_id=...
pub async fn list_playlists(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Playlist>>> {
    let playlists = state
        .playlists
        .list_playlists(query.user_id.as_deref())
        .await?;
    Ok(Json(playlists))
}

/// GET /playlists/{id}
pub async fn get_playlist(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Playlist>> {
    state
        .playlists
        .get_playlist(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("playlist {}", id)))
}

/// DELETE /playlists/{id}
pub async fn delete_playlist(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    state.playlists.delete_playlist(id).await?;
    Ok(Json(serde_json::json!({ "playlist_id": id })))
}

/// POST /playlists/{id}/songs
pub async fn add_songs(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(songs): Json<Vec<SongDescription>>,
) -> ApiResult<Json<AddSongsResponse>> {
    if songs
        .iter()
        .any(|s| s.name.is_empty() || s.album_name.is_empty() || s.artist_names.is_empty())
    {
        return Err(ApiError::BadRequest(
            "song_name, album_name and a non-empty artist_names list are required for every song"
                .into(),
        ));
    }

    let songs_id = state.playlists.add_songs_to_playlist(id, &songs).await?;
    Ok(Json(AddSongsResponse { songs_id }))
}

/// GET /playlists/{id}/songs?sort_by=...&sort_order=...
pub async fn list_songs(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<SongsQuery>,
) -> ApiResult<Json<Vec<Song>>> {
    let sort = match (query.sort_by.as_deref(), query.sort_order.as_deref()) {
        (None, _) => None,
        (Some(key), order) => {
            let key = SongSortKey::parse(key)
                .ok_or_else(|| ApiError::BadRequest(format!("invalid sort_by '{}'", key)))?;
            let order = match order {
                None => SortOrder::Asc,
                Some(order) => SortOrder::parse(order)
                    .ok_or_else(|| ApiError::BadRequest(format!("invalid sort_order '{}'", order)))?,
            };
            Some((key, order))
        }
    };

    let songs = state.playlists.songs_in_playlist(id, sort).await?;
    Ok(Json(songs))
}

/// DELETE /playlists/{id}/songs
pub async fn delete_songs(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<DeleteSongsRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let removed = state
        .playlists
        .remove_songs_from_playlist(id, &request.songs_id)
        .await?;
    Ok(Json(serde_json::json!({ "removed": removed })))
}

/// POST /playlists/{id}/export
pub async fn export_playlist(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ExportRequest>,
) -> ApiResult<Json<ExportReport>> {
    let credentials = ProviderCredentials {
        access_token: request.access_token,
        music_user_token: request.music_user_token,
        storefront: request.storefront,
    };

    let report = state
        .playlists
        .export_playlist(id, &request.provider, &credentials)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("playlist {}", id)))?;

    Ok(Json(report))
}

/// Build playlist routes
pub fn playlist_routes() -> Router<AppState> {
    Router::new()
        .route("/playlists", post(create_playlist).get(list_playlists))
        .route("/playlists/:id", get(get_playlist).delete(delete_playlist))
        .route(
            "/playlists/:id/songs",
            post(add_songs).get(list_songs).delete(delete_songs),
        )
        .route("/playlists/:id/export", post(export_playlist))
}
