//! HTTP transport — a thin adapter over the engine facade (spec §1, §6.1).
//! Parses requests, calls into `Engine`, encodes the result. No game logic
//! lives here.

pub mod handlers;
pub mod state;
pub mod types;

use crate::engine::Engine;
use axum::routing::{get, post};
use axum::Router;
use state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;

pub async fn run_server(port: u16, engine: Arc<Engine>) {
    let state = AppState { engine };

    let app = Router::new()
        .route("/join", post(handlers::join))
        .route("/state", get(handlers::state_for))
        .route("/action", post(handlers::submit_action))
        .route("/health", get(handlers::health))
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind gateway listener");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, "gateway listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "gateway server error");
        std::process::exit(1);
    }
}
