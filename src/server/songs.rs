//! Song endpoints: listing, lyrics, info and mutations.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::error::{ApiError, ApiResponse};
use super::state::GuardedSongStore;
use crate::lyrics::paginate_verses;
use crate::mapping::{SongInfo, SongRecord, SongsQuery};
use crate::song_store::{SongStore, SongStoreError, SongStoreResult};

#[derive(Debug, Serialize, Deserialize)]
pub struct LyricsResponse {
    pub lyrics: String,
}

/// Runs a store call on the blocking pool so the request timeout can still fire
/// while SQLite is busy. A panic in `f` is resumed on the handler task.
pub(super) async fn with_store<T, F>(store: &GuardedSongStore, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn SongStore) -> SongStoreResult<T> + Send + 'static,
{
    let store = Arc::clone(store);
    match tokio::task::spawn_blocking(move || f(store.as_ref())).await {
        Ok(result) => Ok(result?),
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(SongStoreError::Store(anyhow::anyhow!("store task failed: {}", e)).into()),
    }
}

fn query_or_reject(query: Result<Query<SongsQuery>, QueryRejection>) -> Result<SongsQuery, ApiError> {
    query
        .map(|Query(q)| q)
        .map_err(|e| ApiError::InvalidRequest(e.body_text()))
}

fn body_or_reject(body: Result<Json<SongRecord>, JsonRejection>) -> Result<SongRecord, ApiError> {
    body.map(|Json(b)| b)
        .map_err(|e| ApiError::InvalidRequest(e.body_text()))
}

pub async fn list_songs(
    State(store): State<GuardedSongStore>,
    query: Result<Query<SongsQuery>, QueryRejection>,
) -> Result<Json<Vec<SongRecord>>, ApiError> {
    let query = query_or_reject(query)?;
    let filter = query.to_filter()?;
    let pagination = query.pagination();

    let songs = with_store(&store, move |s| s.list(&filter, pagination)).await?;
    debug!(
        "Listed {} songs (limit {}, offset {})",
        songs.len(),
        pagination.limit,
        pagination.offset
    );
    Ok(Json(songs.into_iter().map(SongRecord::from).collect()))
}

pub async fn get_lyrics(
    State(store): State<GuardedSongStore>,
    query: Result<Query<SongsQuery>, QueryRejection>,
) -> Result<Json<LyricsResponse>, ApiError> {
    let query = query_or_reject(query)?;
    let (artist, title) = query.key()?;
    let (artist, title) = (artist.to_string(), title.to_string());
    let pagination = query.pagination();

    let song = with_store(&store, move |s| s.get(&artist, &title)).await?;
    let lyrics = paginate_verses(
        song.lyrics.as_deref().unwrap_or_default(),
        pagination.limit,
        pagination.offset,
    );
    Ok(Json(LyricsResponse { lyrics }))
}

pub async fn song_info(
    State(store): State<GuardedSongStore>,
    query: Result<Query<SongsQuery>, QueryRejection>,
) -> Result<Json<SongInfo>, ApiError> {
    let query = query_or_reject(query)?;
    let (artist, title) = query.key()?;
    let (artist, title) = (artist.to_string(), title.to_string());

    let song = with_store(&store, move |s| s.get(&artist, &title)).await?;
    info!("Song found: {} - {}", song.artist, song.title);
    Ok(Json(SongInfo::from(song)))
}

pub async fn add_song(
    State(store): State<GuardedSongStore>,
    body: Result<Json<SongRecord>, JsonRejection>,
) -> Result<ApiResponse, ApiError> {
    let song = body_or_reject(body)?.into_song()?;

    info!("Adding song: {} - {}", song.artist, song.title);
    with_store(&store, move |s| s.add(&song)).await?;
    Ok(ApiResponse::ok())
}

pub async fn update_song(
    State(store): State<GuardedSongStore>,
    body: Result<Json<SongRecord>, JsonRejection>,
) -> Result<ApiResponse, ApiError> {
    let song = body_or_reject(body)?.into_song()?;

    info!("Updating song: {} - {}", song.artist, song.title);
    with_store(&store, move |s| s.update(&song)).await?;
    Ok(ApiResponse::ok())
}

/// The key may come as a JSON body or, when the body is empty, as query parameters.
pub async fn delete_song(
    State(store): State<GuardedSongStore>,
    query: Result<Query<SongsQuery>, QueryRejection>,
    body: Bytes,
) -> Result<ApiResponse, ApiError> {
    let (artist, title) = if body.iter().all(u8::is_ascii_whitespace) {
        let query = query_or_reject(query)?;
        let (artist, title) = query.key()?;
        (artist.to_string(), title.to_string())
    } else {
        let record: SongRecord = serde_json::from_slice(&body)
            .map_err(|e| ApiError::InvalidRequest(format!("malformed JSON body: {}", e)))?;
        let (artist, title) = record.key()?;
        (artist.to_string(), title.to_string())
    };

    info!("Deleting song: {} - {}", artist, title);
    with_store(&store, move |s| s.delete(&artist, &title)).await?;
    Ok(ApiResponse::ok())
}
