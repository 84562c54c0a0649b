use super::state::AppState;
use super::types::{self, ActionResponse, JoinResponse, PlayerQuery};
use crate::error::EngineError;
use crate::round::Snapshot;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

pub async fn join(
    State(state): State<AppState>,
    body: axum::body::Bytes,
) -> Result<Json<JoinResponse>, EngineError> {
    let value: Value = serde_json::from_slice(&body).map_err(|_| EngineError::MalformedJson)?;
    let name = types::parse_join_name(&value)?;
    let player_id = state.engine.join(name)?;
    tracing::info!(%player_id, "player joined");
    Ok(Json(JoinResponse { player_id }))
}

pub async fn state_for(
    State(state): State<AppState>,
    Query(query): Query<PlayerQuery>,
) -> Result<Json<Snapshot>, EngineError> {
    let player_id = types::parse_player_id(query.player_id)?;
    let snapshot = state.engine.state_for(player_id)?;
    Ok(Json(snapshot))
}

pub async fn submit_action(
    State(state): State<AppState>,
    Query(query): Query<PlayerQuery>,
    body: axum::body::Bytes,
) -> Result<Json<ActionResponse>, EngineError> {
    let player_id = types::parse_player_id(query.player_id)?;
    let value: Value = serde_json::from_slice(&body).map_err(|_| EngineError::MalformedJson)?;
    let action = types::parse_action(&value)?;
    let result = state.engine.submit_action(player_id, action)?;
    tracing::debug!(%player_id, ?result, "action processed");
    Ok(Json(result.into()))
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
