use axum::{extract::State, Json};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    api::{error::ApiError, response::ApiResponse},
    controller::AppState,
    domain::CongestionLevel,
    forecast::{clamp_round, FeatureRecord, ManualInput, WeatherCondition},
};

/// Manual prediction form
#[derive(Debug, Deserialize, Validate)]
pub struct PredictRequest {
    pub date: NaiveDate,
    #[validate(range(max = 23))]
    pub hour: u32,
    #[serde(default)]
    pub holiday: Option<String>,
    /// Celsius
    #[validate(range(min = -20.0, max = 40.0))]
    pub temp: f64,
    pub weather: WeatherCondition,
    #[validate(range(min = 0.0, max = 100.0))]
    pub clouds: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub rain: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub snow: f64,
    #[validate(range(min = 0.0))]
    pub lag_1: Option<f64>,
    #[validate(range(min = 0.0))]
    pub lag_24: Option<f64>,
    #[validate(range(min = 0.0))]
    pub lag_168: Option<f64>,
}

impl PredictRequest {
    fn timestamp(&self) -> Result<NaiveDateTime, ApiError> {
        NaiveTime::from_hms_opt(self.hour, 0, 0)
            .map(|t| self.date.and_time(t))
            .ok_or_else(|| ApiError::BadRequest(format!("invalid hour {}", self.hour)))
    }

    fn into_input(self) -> Result<ManualInput, ApiError> {
        Ok(ManualInput {
            timestamp: self.timestamp()?,
            holiday: self.holiday,
            temp: self.temp,
            condition: self.weather,
            clouds: self.clouds,
            rain: self.rain,
            snow: self.snow,
            lag_1: self.lag_1,
            lag_24: self.lag_24,
            lag_168: self.lag_168,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub timestamp: NaiveDateTime,
    pub weekday: String,
    pub predicted_volume: u32,
    pub congestion: CongestionLevel,
    pub load_ratio: f64,
    pub features: FeatureRecord,
}

/// POST /predict - single prediction from hand-entered conditions
pub async fn predict(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> Result<ApiResponse<PredictResponse>, ApiError> {
    req.validate()?;
    let engine = state.engine()?;
    let input = req.into_input()?;
    let record = input.to_record();

    let output = engine.predictor().predict(std::slice::from_ref(&record))?;
    let raw = output
        .first()
        .copied()
        .ok_or_else(|| ApiError::InternalError("model returned no prediction".to_string()))?;
    let volume = clamp_round(raw)
        .ok_or_else(|| ApiError::InternalError(format!("model returned {}", raw)))?;

    tracing::info!(timestamp = %input.timestamp, volume, "manual prediction");
    Ok(ApiResponse::success(PredictResponse {
        timestamp: input.timestamp,
        weekday: input.weekday_name(),
        predicted_volume: volume,
        congestion: CongestionLevel::from_volume(volume),
        load_ratio: CongestionLevel::load_ratio(volume),
        features: record,
    }))
}
