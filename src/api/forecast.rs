use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{error::ApiError, response::ApiResponse},
    controller::{AppState, SessionForecast},
    forecast::Horizon,
};

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    pub horizon: Horizon,
}

/// POST /sessions
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, ApiResponse<SessionCreated>), ApiError> {
    let session_id = state.sessions.create().await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success(SessionCreated { session_id }),
    ))
}

/// POST /sessions/:id/forecast - run the engine and merge into the session
pub async fn run_forecast(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ForecastRequest>,
) -> Result<ApiResponse<SessionForecast>, ApiError> {
    let started = Instant::now();
    let report = state.run_forecast(id, req.horizon).await?;
    Ok(ApiResponse::success(report).with_duration(started.elapsed()))
}

/// GET /sessions/:id/forecast
pub async fn get_forecast(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<SessionForecast>, ApiError> {
    Ok(ApiResponse::success(state.session_forecast(id).await?))
}

/// DELETE /sessions/:id/forecast
pub async fn reset_forecast(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.reset_session(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /sessions/:id - close the session and free its slot
pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.close_session(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
