use axum::extract::{Query, State};
use serde::Deserialize;

use crate::{
    analytics::{history, HistoryPoint},
    api::{error::ApiError, response::ApiResponse},
    controller::AppState,
    forecast::HistoryWindow,
};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub window: HistoryWindow,
}

/// GET /history?window=24h - observed volumes ending at the last record
pub async fn get_history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Result<ApiResponse<Vec<HistoryPoint>>, ApiError> {
    Ok(ApiResponse::list(history(&state.store, q.window)))
}
