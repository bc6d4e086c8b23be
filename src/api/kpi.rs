use axum::extract::{Path, Query, State};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    analytics::{
        daily_series, DailyMean, DatasetKpis, DateRange, DayComparison, DaySummary,
        SeasonalTrends, WeatherImpact,
    },
    api::{error::ApiError, response::ApiResponse},
    controller::AppState,
};

/// GET /kpi - dataset-wide indicators
pub async fn get_kpis(State(state): State<AppState>) -> ApiResponse<DatasetKpis> {
    ApiResponse::success(DatasetKpis::compute(&state.store))
}

/// GET /kpi/day/:date - one-day summary
pub async fn get_day_summary(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> Result<ApiResponse<DaySummary>, ApiError> {
    DaySummary::compute(&state.store, date)
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::NotFound(format!("no observations on {}", date)))
}

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// GET /kpi/daily?start=&end= - daily mean volume, last 30 days by default
pub async fn get_daily_series(
    State(state): State<AppState>,
    Query(q): Query<DailyQuery>,
) -> Result<ApiResponse<Vec<DailyMean>>, ApiError> {
    let Some(trailing) = DateRange::trailing(&state.store) else {
        return Ok(ApiResponse::list(Vec::new()));
    };
    let range = DateRange {
        start: q.start.unwrap_or(trailing.start),
        end: q.end.unwrap_or(trailing.end),
    };
    if range.start > range.end {
        return Err(ApiError::BadRequest(format!(
            "start {} is after end {}",
            range.start, range.end
        )));
    }
    Ok(ApiResponse::list(daily_series(&state.store, range)))
}

/// GET /kpi/trends - weekday, month and year means
pub async fn get_trends(State(state): State<AppState>) -> ApiResponse<SeasonalTrends> {
    ApiResponse::success(SeasonalTrends::compute(&state.store))
}

/// GET /kpi/weather - volume by weather condition and intensity
pub async fn get_weather_impact(State(state): State<AppState>) -> ApiResponse<WeatherImpact> {
    ApiResponse::success(WeatherImpact::compute(&state.store))
}

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub baseline: NaiveDate,
    pub compared: NaiveDate,
}

/// GET /kpi/compare?baseline=&compared= - two days side by side
pub async fn get_day_comparison(
    State(state): State<AppState>,
    Query(q): Query<CompareQuery>,
) -> Result<ApiResponse<DayComparison>, ApiError> {
    DayComparison::compute(&state.store, q.baseline, q.compared)
        .map(ApiResponse::success)
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "no observations on {} or {}",
                q.baseline, q.compared
            ))
        })
}
