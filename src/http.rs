//! HTTP transport.
//!
//! Requires the `http` feature (enabled by default).
//!
//! | Route | Behavior |
//! |-------|----------|
//! | `GET /` | liveness message |
//! | `POST /mcp/resource` | dispatch `{"resource": "<uri>"}` |
//! | anything else | 404 `{"error": "Not found"}` |

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::backend::Backend;
use crate::dispatch::Dispatcher;

/// Backend handle shared across request tasks.
pub type SharedBackend = Arc<dyn Backend + Send + Sync>;

#[derive(Clone)]
struct AppState {
    dispatcher: Dispatcher,
    backend: SharedBackend,
}

/// Build the application router.
pub fn router(dispatcher: Dispatcher, backend: SharedBackend) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(root_handler))
        .route("/mcp/resource", post(resource_handler))
        .fallback(not_found_handler)
        .layer(cors)
        .with_state(AppState {
            dispatcher,
            backend,
        })
}

/// Serve HTTP on `addr` until Ctrl-C.
///
/// Builds its own runtime so callers stay synchronous.
pub fn serve(
    addr: SocketAddr,
    dispatcher: Dispatcher,
    backend: SharedBackend,
) -> std::io::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "HTTP server listening");
        axum::serve(listener, router(dispatcher, backend))
            .with_graceful_shutdown(shutdown_signal())
            .await
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}

async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({ "message": "Odoo MCP Server is running" }))
}

async fn not_found_handler() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}

/// Dispatch runs on the blocking pool; the backend client is synchronous.
async fn resource_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let outcome = tokio::task::spawn_blocking(move || {
        state.dispatcher.handle(&body, state.backend.as_ref())
    })
    .await;

    match outcome {
        Ok(response) => {
            let status =
                StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(response.body)).into_response()
        }
        Err(e) => {
            error!(error = %e, "dispatch task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Server error: {e}") })),
            )
                .into_response()
        }
    }
}
