use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::{FeatureRecord, FeatureRowBuilder, LagFeatures, WeatherContext};
use crate::domain::{is_weekend, normalize_holiday};

/// Weather choices offered by the manual prediction form
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum WeatherCondition {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Mist,
    Haze,
    Fog,
    Thunderstorm,
    Snow,
    Squall,
    Smoke,
}

impl WeatherCondition {
    /// `(weather_main, weather_description)` as they appear in the dataset
    pub fn labels(&self) -> (&'static str, &'static str) {
        match self {
            Self::Clear => ("Clear", "sky is clear"),
            Self::Clouds => ("Clouds", "scattered clouds"),
            Self::Rain => ("Rain", "light rain"),
            Self::Drizzle => ("Drizzle", "drizzle"),
            Self::Mist => ("Mist", "mist"),
            Self::Haze => ("Haze", "haze"),
            Self::Fog => ("Fog", "fog"),
            Self::Thunderstorm => ("Thunderstorm", "thunderstorm"),
            Self::Snow => ("Snow", "light snow"),
            Self::Squall => ("Squall", "squalls"),
            Self::Smoke => ("Smoke", "smoke"),
        }
    }
}

/// Typical volume for an hour of the day, used when no lag is supplied
pub fn background_volume(hour: u32) -> f64 {
    match hour {
        0..=5 => 500.0,
        6..=9 => 4500.0,
        10..=15 => 3500.0,
        16..=19 => 5000.0,
        _ => 2000.0,
    }
}

/// Hand-entered conditions for a single prediction
#[derive(Debug, Clone, PartialEq)]
pub struct ManualInput {
    pub timestamp: NaiveDateTime,
    pub holiday: Option<String>,
    pub temp: f64,
    pub condition: WeatherCondition,
    pub clouds: f64,
    pub rain: f64,
    pub snow: f64,
    pub lag_1: Option<f64>,
    pub lag_24: Option<f64>,
    pub lag_168: Option<f64>,
}

impl ManualInput {
    /// Feature record for the model; missing lags use the hourly background
    pub fn to_record(&self) -> FeatureRecord {
        let (main, description) = self.condition.labels();
        let weather = WeatherContext {
            main: main.to_string(),
            description: description.to_string(),
            temperature: self.temp,
            rain: self.rain,
            snow: self.snow,
            clouds: self.clouds,
        };
        let fallback = background_volume(self.timestamp.hour());
        let lags = LagFeatures {
            lag_1: self.lag_1.unwrap_or(fallback),
            lag_24: self.lag_24.unwrap_or(fallback),
            lag_168: self.lag_168.unwrap_or(fallback),
        };
        FeatureRowBuilder.build(
            self.timestamp,
            normalize_holiday(self.holiday.as_deref()),
            is_weekend(&self.timestamp),
            &weather,
            lags,
        )
    }

    pub fn weekday_name(&self) -> String {
        self.timestamp.weekday().to_string()
    }
}
