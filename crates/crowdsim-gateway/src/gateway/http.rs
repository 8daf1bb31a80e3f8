//! HTTP gateway: POST /simulation → full turn loop → JSON response.
//!
//! Error contract: every failure is a 500 with an `error` field. A
//! model-call failure mid-loop uses a fixed payload; any other failure
//! carries the underlying message (or a fallback string).

use std::sync::Arc;

use anyhow::Result;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tokio::net::TcpListener;

use crate::observability::SimulationEvent;
use crate::simulation::{
    ConversationEntry, RunError, SimulationRecord, SimulationRequest, SimulationRunner,
};

/// Fixed payload message for a model-call failure mid-loop.
pub const MODEL_ERROR_MESSAGE: &str = "Error generating message";
/// Fallback when a processing failure carries no message of its own.
pub const FALLBACK_ERROR_MESSAGE: &str = "failed to process the request";

/// Shared state for the HTTP server: runner plus a display label for health.
#[derive(Clone)]
pub struct GatewayState {
    pub runner: Arc<SimulationRunner>,
    pub model: String,
}

/// Response body on full success.
#[derive(Debug, Serialize)]
pub struct SimulationResponse {
    pub status: &'static str,
    pub simulation: SimulationRecord,
    pub conversation: Vec<ConversationEntry>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Response body for the health endpoint.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: String,
    pub store_backend: &'static str,
    pub turn_delay_ms: u64,
}

fn error_response(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse { error: message }),
    )
        .into_response()
}

async fn handle_simulation(State(state): State<GatewayState>, body: String) -> Response {
    // Parsed by hand so malformed input follows the 500 error contract
    // instead of the framework's 400/422 rejection.
    let request: SimulationRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(error) => {
            tracing::error!(
                event = SimulationEvent::RequestRejected.as_str(),
                %error,
                "invalid simulation request body"
            );
            return error_response(error.to_string());
        }
    };

    match state.runner.run(request).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(SimulationResponse {
                status: "completed",
                simulation: outcome.simulation,
                conversation: outcome.conversation,
            }),
        )
            .into_response(),
        Err(RunError::Model { .. }) => error_response(MODEL_ERROR_MESSAGE.to_string()),
        Err(RunError::Store(source)) => {
            // `{:#}` renders the anyhow context chain.
            let message = format!("{source:#}");
            error_response(if message.is_empty() {
                FALLBACK_ERROR_MESSAGE.to_string()
            } else {
                message
            })
        }
    }
}

async fn handle_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let turn_delay_ms = u64::try_from(state.runner.turn_delay().as_millis()).unwrap_or(u64::MAX);
    Json(HealthResponse {
        status: "healthy",
        model: state.model.clone(),
        store_backend: state.runner.store().backend_name(),
        turn_delay_ms,
    })
}

/// Build the gateway router (POST /simulation, GET /health).
pub fn router(runner: SimulationRunner, model: impl Into<String>) -> Router {
    let state = GatewayState {
        runner: Arc::new(runner),
        model: model.into(),
    };
    Router::new()
        .route("/health", get(handle_health))
        .route("/simulation", post(handle_simulation))
        .with_state(state)
}

/// Run the HTTP server; binds to `bind_addr` (e.g. `0.0.0.0:8080`).
/// Graceful shutdown on Ctrl+C (SIGINT) and SIGTERM (Unix); in-flight runs
/// complete before exit. There is no per-request timeout: a started run
/// proceeds to completion or first model error.
pub async fn run_http(
    runner: SimulationRunner,
    model: impl Into<String>,
    bind_addr: &str,
) -> Result<()> {
    let app = router(runner, model);
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!(
        "gateway listening on {} (Ctrl+C/SIGTERM to stop)",
        bind_addr
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(error) => {
                tracing::warn!(%error, "failed to listen for SIGTERM; Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
