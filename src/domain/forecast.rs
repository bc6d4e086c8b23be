use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single predicted hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: NaiveDateTime,
    /// Vehicles per hour, clamped and rounded
    pub predicted_volume: u32,
}

impl ForecastPoint {
    pub fn new(timestamp: NaiveDateTime, predicted_volume: u32) -> Self {
        Self {
            timestamp,
            predicted_volume,
        }
    }
}

/// Lifecycle of one forecast run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Totals shown next to a forecast series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ForecastSummary {
    pub total: u64,
    pub peak: u32,
    /// Integer mean (truncated)
    pub mean: u32,
    pub count: usize,
}

impl ForecastSummary {
    pub fn from_points(points: &[ForecastPoint]) -> Self {
        if points.is_empty() {
            return Self::default();
        }
        let total: u64 = points.iter().map(|p| p.predicted_volume as u64).sum();
        let peak = points.iter().map(|p| p.predicted_volume).max().unwrap_or(0);
        Self {
            total,
            peak,
            mean: (total / points.len() as u64) as u32,
            count: points.len(),
        }
    }
}

/// Traffic congestion classification for a single hourly volume
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CongestionLevel {
    /// Free flowing (< 1000 veh/h)
    Light,
    /// 1000-3499 veh/h
    Moderate,
    /// >= 3500 veh/h
    Heavy,
}

/// Volume treated as a fully loaded road when computing the load ratio
pub const FULL_LOAD_VOLUME: f64 = 7000.0;

impl CongestionLevel {
    pub fn from_volume(volume: u32) -> Self {
        if volume < 1000 {
            Self::Light
        } else if volume < 3500 {
            Self::Moderate
        } else {
            Self::Heavy
        }
    }

    /// Share of a fully loaded road (0.0 - 1.0)
    pub fn load_ratio(volume: u32) -> f64 {
        (volume as f64 / FULL_LOAD_VOLUME).min(1.0)
    }
}
