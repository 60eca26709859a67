//! HTTP API over the block store.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use block_store::{BlockStore, StoreError};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

/// Shared state for the API handlers: the store handle, passed explicitly.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<BlockStore>,
}

/// Build the router with all routes and middleware. Split out from
/// [`serve`] so tests can drive it directly.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/block-height", get(get_block_height))
        .route("/all-data", get(get_all_data))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl+C.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Block API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Received shutdown signal, stopping API server");
}

/// GET /block-height: latest row by insertion id. 404 with
/// `{"error":"No data found"}` on an empty store, 500 with the message on
/// store failure.
async fn get_block_height(State(state): State<AppState>) -> Response {
    match state.store.latest_sample().await {
        Ok(row) => (StatusCode::OK, Json(row)).into_response(),
        Err(StoreError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No data found" })),
        )
            .into_response(),
        Err(e) => {
            error!("Latest-sample query failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// GET /all-data: all rows ascending by insertion id, chart order.
async fn get_all_data(State(state): State<AppState>) -> Response {
    match state.store.all_samples().await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => {
            error!("History query failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
