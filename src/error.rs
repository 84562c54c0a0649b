//! Engine error types.
//!
//! All client-facing rejections are values, never panics: the transport
//! maps every variant but `Invariant` to an HTTP 400 with `{"error": "<msg>"}`.
//! `Invariant` must never reach a client — it marks a debug-assertion
//! failure and drives the round into the terminal `Errored` phase instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    // ---- Schema ----
    #[error("malformed json body")]
    MalformedJson,
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("unknown suit: {0}")]
    UnknownSuit(String),
    #[error("unknown order_type: {0}")]
    UnknownOrderType(String),
    #[error("price must be a positive integer")]
    InvalidPrice,

    // ---- Identity ----
    #[error("unknown player_id")]
    UnknownPlayer,
    #[error("malformed player_id")]
    MalformedPlayerId,

    // ---- Phase ----
    #[error("lobby is full")]
    LobbyFull,
    #[error("round is not accepting joins")]
    NotWaiting,
    #[error("trading not active")]
    NotTrading,

    // ---- Business ----
    #[error("duplicate order")]
    DuplicateOrder,
    #[error("would strike with self")]
    SelfCross,
    #[error("not improving")]
    NotImproving,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("no holdings")]
    NoHoldings,
    #[error("name must not be empty")]
    EmptyName,

    /// Invariant violation. Never surfaced to a client; see module docs.
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        if matches!(self, EngineError::Invariant(_)) {
            // Invariant breaches are a bug, not a client mistake. Do not leak
            // the detail; the sink already received the full message.
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal error" })),
            )
                .into_response();
        }
        (StatusCode::BAD_REQUEST, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
