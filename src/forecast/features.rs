//! Feature assembly for the traffic model
//!
//! Builds the single-row model input from calendar, weather and lag values.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::{LagFeatures, WeatherContext};
use crate::domain::{day_of_week, HistoricalRow};

/// Numeric columns in model order
pub const NUMERIC_FEATURES: [&str; 12] = [
    "temp",
    "rain_1h",
    "snow_1h",
    "clouds_all",
    "hour",
    "day_of_week",
    "month",
    "year",
    "is_weekend",
    "lag_1",
    "lag_24",
    "lag_168",
];

/// Categorical columns in model order
pub const CATEGORICAL_FEATURES: [&str; 3] = ["holiday", "weather_main", "weather_description"];

/// Model input for one hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub holiday: Option<String>,
    /// Temperature (Celsius)
    pub temp: f64,
    pub rain_1h: f64,
    pub snow_1h: f64,
    /// Cloud cover (0-100%)
    pub clouds_all: f64,
    pub weather_main: String,
    pub weather_description: String,
    /// Hour of day (0-23)
    pub hour: f64,
    /// Day of week (0=Monday, 6=Sunday)
    pub day_of_week: f64,
    /// Month (1-12)
    pub month: f64,
    pub year: f64,
    pub is_weekend: bool,
    pub lag_1: f64,
    pub lag_24: f64,
    pub lag_168: f64,
}

impl FeatureRecord {
    /// Values of [`NUMERIC_FEATURES`], in order
    pub fn numeric_values(&self) -> [f64; 12] {
        [
            self.temp,
            self.rain_1h,
            self.snow_1h,
            self.clouds_all,
            self.hour,
            self.day_of_week,
            self.month,
            self.year,
            if self.is_weekend { 1.0 } else { 0.0 },
            self.lag_1,
            self.lag_24,
            self.lag_168,
        ]
    }

    /// Values of [`CATEGORICAL_FEATURES`], in order
    pub fn categorical_values(&self) -> [Option<&str>; 3] {
        [
            self.holiday.as_deref(),
            Some(self.weather_main.as_str()),
            Some(self.weather_description.as_str()),
        ]
    }

    /// Synthesized table row carrying these features and a predicted volume
    pub fn into_row(self, timestamp: NaiveDateTime, traffic_volume: f64) -> HistoricalRow {
        HistoricalRow {
            timestamp,
            traffic_volume,
            temp: self.temp,
            rain_1h: self.rain_1h,
            snow_1h: self.snow_1h,
            clouds_all: self.clouds_all,
            weather_main: self.weather_main,
            weather_description: self.weather_description,
            holiday: self.holiday,
            day_of_week: self.day_of_week as u32,
            month: self.month as u32,
            year: self.year as i32,
            is_weekend: self.is_weekend,
        }
    }
}

/// Assembles [`FeatureRecord`]s. Pure, no validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureRowBuilder;

impl FeatureRowBuilder {
    pub fn build(
        &self,
        timestamp: NaiveDateTime,
        holiday: Option<String>,
        is_weekend: bool,
        weather: &WeatherContext,
        lags: LagFeatures,
    ) -> FeatureRecord {
        FeatureRecord {
            holiday,
            temp: weather.temperature,
            rain_1h: weather.rain,
            snow_1h: weather.snow,
            clouds_all: weather.clouds,
            weather_main: weather.main.clone(),
            weather_description: weather.description.clone(),
            hour: timestamp.hour() as f64,
            day_of_week: day_of_week(&timestamp) as f64,
            month: timestamp.month() as f64,
            year: timestamp.year() as f64,
            is_weekend,
            lag_1: lags.lag_1,
            lag_24: lags.lag_24,
            lag_168: lags.lag_168,
        }
    }
}
