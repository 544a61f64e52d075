use anyhow::{Context, Result};
use std::{any::Any, future::Future, time::Duration};

use tracing::{error, info, warn};

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer};

use super::error::ApiResponse;
use super::metrics::metrics_handler;
use super::songs::{
    add_song, delete_song, get_lyrics, list_songs, song_info, update_song, with_store,
};
use super::{log_requests, state::*, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub songs: Option<usize>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let songs = match with_store(&state.song_store, |s| s.count()).await {
        Ok(count) => Some(count),
        Err(e) => {
            warn!("Could not count songs: {}", e);
            None
        }
    };
    Json(ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        songs,
    })
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!("Handler panicked: {}", detail);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ApiResponse::error("internal error"),
    )
        .into_response()
}

fn make_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(home))
        .route(
            "/songs",
            get(list_songs)
                .post(add_song)
                .put(update_song)
                .delete(delete_song),
        )
        .route("/songs/lyrics", get(get_lyrics))
        .route("/info", get(song_info))
        .with_state(state)
}

pub fn make_app(config: ServerConfig, song_store: GuardedSongStore) -> Result<Router> {
    let state = ServerState::new(config.clone(), song_store);

    let app = make_routes(state.clone())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_sec),
        ))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn_with_state(state, log_requests));

    Ok(app)
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Serves the API and the metrics endpoint until `shutdown` resolves.
pub async fn run_server(
    config: ServerConfig,
    song_store: GuardedSongStore,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = make_app(config.clone(), song_store)?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    let metrics_listener = tokio::net::TcpListener::bind(("0.0.0.0", config.metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", config.metrics_port))?;

    info!("Ready to serve at port {}!", config.port);
    info!("Metrics available at port {}!", config.metrics_port);

    let metrics_server = tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, make_metrics_app()).await {
            error!("Metrics server stopped: {}", e);
        }
    });

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;
    metrics_server.abort();

    info!("Server stopped");
    Ok(result?)
}
