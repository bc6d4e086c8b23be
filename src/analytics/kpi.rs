use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::domain::{normalize_holiday, HistoricalRow};
use crate::forecast::weather::{median, mode};
use crate::forecast::HistoryWindow;
use crate::repo::TimeSeriesStore;

/// Volume above which an hour counts as congested
pub const CONGESTED_VOLUME: f64 = 5000.0;

/// Arithmetic mean. Returns 0.0 if the slice is empty.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// One (timestamp, volume) pair for charts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub timestamp: NaiveDateTime,
    pub traffic_volume: f64,
}

/// History slice ending at the last record
pub fn history(store: &TimeSeriesStore, window: HistoryWindow) -> Vec<HistoryPoint> {
    store
        .tail_window(window.span())
        .iter()
        .map(|r| HistoryPoint {
            timestamp: r.timestamp,
            traffic_volume: r.traffic_volume,
        })
        .collect()
}

/// Mean volume per hour of day, split by day type
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyProfile {
    pub hour: u32,
    pub weekday_mean: f64,
    pub weekend_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetKpis {
    pub rows: usize,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
    pub mean_volume: f64,
    pub peak_volume: f64,
    /// Hours above [`CONGESTED_VOLUME`]
    pub congested_hours: usize,
    pub hourly_profile: Vec<HourlyProfile>,
}

impl DatasetKpis {
    pub fn compute(store: &TimeSeriesStore) -> Self {
        let rows = store.rows();
        let volumes: Vec<f64> = rows.iter().map(|r| r.traffic_volume).collect();
        Self {
            rows: rows.len(),
            first_timestamp: store.first().map(|r| r.timestamp),
            last_timestamp: store.last_timestamp(),
            mean_volume: round2(mean(&volumes)),
            peak_volume: volumes.iter().copied().fold(0.0, f64::max),
            congested_hours: volumes.iter().filter(|v| **v > CONGESTED_VOLUME).count(),
            hourly_profile: hourly_profile(rows),
        }
    }
}

/// Profile for all 24 hours; hours with no rows report 0.0
pub fn hourly_profile(rows: &[HistoricalRow]) -> Vec<HourlyProfile> {
    let mut sums = [[0.0_f64; 2]; 24];
    let mut counts = [[0usize; 2]; 24];
    for r in rows {
        let h = r.hour() as usize;
        let kind = usize::from(r.is_weekend);
        sums[h][kind] += r.traffic_volume;
        counts[h][kind] += 1;
    }
    let avg = |h: usize, k: usize| {
        if counts[h][k] == 0 {
            0.0
        } else {
            round2(sums[h][k] / counts[h][k] as f64)
        }
    };
    (0..24)
        .map(|h| HourlyProfile {
            hour: h as u32,
            weekday_mean: avg(h, 0),
            weekend_mean: avg(h, 1),
        })
        .collect()
}

/// One-day summary for side-by-side comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub weekday: String,
    pub is_weekend: bool,
    pub holiday: Option<String>,
    pub weather_main: Option<String>,
    pub weather_description: Option<String>,
    pub mean_temp: f64,
    pub median_clouds: f64,
    pub rain_total: f64,
    pub snow_total: f64,
    pub volume_total: f64,
    pub volume_max: f64,
    pub volume_mean: f64,
    pub hours: usize,
}

impl DaySummary {
    /// `None` when the day has no rows
    pub fn compute(store: &TimeSeriesStore, date: NaiveDate) -> Option<Self> {
        let rows = store.day(date);
        let first = rows.first()?;
        let volumes: Vec<f64> = rows.iter().map(|r| r.traffic_volume).collect();
        let temps: Vec<f64> = rows.iter().map(|r| r.temp).collect();

        Some(Self {
            date,
            weekday: date.weekday().to_string(),
            is_weekend: first.is_weekend,
            holiday: rows
                .iter()
                .find_map(|r| normalize_holiday(r.holiday.as_deref())),
            weather_main: mode(rows.iter().map(|r| r.weather_main.as_str())).map(str::to_string),
            weather_description: mode(rows.iter().map(|r| r.weather_description.as_str()))
                .map(str::to_string),
            mean_temp: mean(&temps),
            median_clouds: median(rows.iter().map(|r| r.clouds_all).collect()),
            rain_total: rows.iter().map(|r| r.rain_1h).sum(),
            snow_total: rows.iter().map(|r| r.snow_1h).sum(),
            volume_total: volumes.iter().sum(),
            volume_max: volumes.iter().copied().fold(0.0, f64::max),
            volume_mean: mean(&volumes),
            hours: rows.len(),
        })
    }
}

/// Two days side by side, `compared` measured against `baseline`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayComparison {
    pub baseline: DaySummary,
    pub compared: DaySummary,
    /// `compared - baseline` of the daily totals
    pub volume_difference: f64,
    /// Relative to the baseline total; 0.0 when the baseline carried no traffic
    pub percent_difference: f64,
    pub baseline_hourly: Vec<HistoryPoint>,
    pub compared_hourly: Vec<HistoryPoint>,
}

impl DayComparison {
    /// `None` when either day has no rows
    pub fn compute(
        store: &TimeSeriesStore,
        baseline: NaiveDate,
        compared: NaiveDate,
    ) -> Option<Self> {
        let base = DaySummary::compute(store, baseline)?;
        let other = DaySummary::compute(store, compared)?;

        let base_total = round2(base.volume_total);
        let difference = round2(round2(other.volume_total) - base_total);
        let percent = if base_total > 0.0 {
            round2(difference / base_total * 100.0)
        } else {
            0.0
        };
        let hourly = |date: NaiveDate| {
            store
                .day(date)
                .iter()
                .map(|r| HistoryPoint {
                    timestamp: r.timestamp,
                    traffic_volume: r.traffic_volume,
                })
                .collect()
        };

        Some(Self {
            baseline_hourly: hourly(baseline),
            compared_hourly: hourly(compared),
            baseline: base,
            compared: other,
            volume_difference: difference,
            percent_difference: percent,
        })
    }
}
