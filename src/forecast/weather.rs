//! Weather context for a forecast step
//!
//! Future weather is unknown to the model, so each step reuses the weather of
//! the trailing window of known (or synthesized) rows.

use chrono::{Duration, NaiveDateTime};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::domain::HistoricalRow;
use crate::repo::WorkingTable;

/// Default trailing window length
pub const DEFAULT_WEATHER_WINDOW_HOURS: i64 = 12;

/// Representative weather for one reference hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherContext {
    pub main: String,
    pub description: String,
    /// Temperature (Celsius)
    pub temperature: f64,
    /// Rain (mm)
    pub rain: f64,
    /// Snow (mm)
    pub snow: f64,
    /// Cloud cover (0-100%)
    pub clouds: f64,
}

impl WeatherContext {
    /// Weather fields of a single row, copied verbatim
    pub fn from_row(row: &HistoricalRow) -> Self {
        Self {
            main: row.weather_main.clone(),
            description: row.weather_description.clone(),
            temperature: row.temp,
            rain: row.rain_1h,
            snow: row.snow_1h,
            clouds: row.clouds_all,
        }
    }
}

/// Derives weather context from the trailing window before a reference time
#[derive(Debug, Clone, Copy)]
pub struct WeatherContextResolver {
    window: Duration,
}

impl Default for WeatherContextResolver {
    fn default() -> Self {
        Self::new(DEFAULT_WEATHER_WINDOW_HOURS)
    }
}

impl WeatherContextResolver {
    pub fn new(window_hours: i64) -> Self {
        Self {
            window: Duration::hours(window_hours.max(1)),
        }
    }

    /// Aggregate the rows in `(reference_time - window, reference_time)`.
    ///
    /// Returns `None` when no row falls inside the window.
    pub fn resolve(
        &self,
        table: &WorkingTable,
        reference_time: NaiveDateTime,
    ) -> Option<WeatherContext> {
        let window = table.between_exclusive(reference_time - self.window, reference_time);
        let last = window.last()?;

        Some(WeatherContext {
            main: mode(window.iter().map(|r| r.weather_main.as_str()))?.to_string(),
            description: mode(window.iter().map(|r| r.weather_description.as_str()))?
                .to_string(),
            temperature: last.temp,
            rain: max(window.iter().map(|r| r.rain_1h)),
            snow: max(window.iter().map(|r| r.snow_1h)),
            clouds: median(window.iter().map(|r| r.clouds_all).collect()),
        })
    }

    /// Like [`resolve`](Self::resolve) but falls back to the latest row of the table
    pub fn resolve_or_latest(
        &self,
        table: &WorkingTable,
        reference_time: NaiveDateTime,
    ) -> Option<WeatherContext> {
        self.resolve(table, reference_time).or_else(|| {
            tracing::debug!(%reference_time, "empty weather window, using latest row");
            table.last().map(WeatherContext::from_row)
        })
    }
}

/// Most frequent value; ties go to the value seen first
pub(crate) fn mode<'a>(values: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for v in values {
        match counts.iter_mut().find(|(k, _)| *k == v) {
            Some((_, n)) => *n += 1,
            None => counts.push((v, 1)),
        }
    }
    // max_by_key returns the last maximum, so walk in reverse
    counts
        .into_iter()
        .rev()
        .max_by_key(|(_, n)| *n)
        .map(|(k, _)| k)
}

fn max(values: impl Iterator<Item = f64>) -> f64 {
    values
        .filter(|v| v.is_finite())
        .fold(0.0_f64, |a, b| a.max(b))
}

/// Median with the midpoint of the two central values for even lengths
pub(crate) fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by_key(|v| OrderedFloat(*v));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::fixtures::{hourly, row, ts};

    fn table_with_weather() -> WorkingTable {
        let mut rows = hourly(ts(2018, 9, 30, 23), 24);
        for (i, r) in rows.iter_mut().enumerate() {
            r.clouds_all = i as f64;
            r.temp = 10.0 + i as f64;
            r.rain_1h = if i == 15 { 2.5 } else { 0.0 };
            if i >= 20 {
                r.weather_main = "Rain".to_string();
                r.weather_description = "light rain".to_string();
            }
        }
        WorkingTable::from_rows(rows)
    }

    #[test]
    fn test_resolve_window_aggregates() {
        let table = table_with_weather();
        let ctx = WeatherContextResolver::default()
            .resolve(&table, ts(2018, 10, 1, 0))
            .unwrap();

        // window is 13:00..=23:00 -> indices 13..=23, 11 rows
        assert_eq!(ctx.main, "Clouds"); // 7 clouds vs 4 rain
        assert_eq!(ctx.description, "scattered clouds");
        assert_eq!(ctx.temperature, 33.0); // last row, not an aggregate
        assert_eq!(ctx.clouds, 18.0); // median of 13..=23
        assert_eq!(ctx.rain, 2.5);
        assert_eq!(ctx.snow, 0.0);
    }

    #[test]
    fn test_resolve_empty_window() {
        let table = WorkingTable::from_rows(hourly(ts(2018, 9, 30, 0), 3));
        let resolver = WeatherContextResolver::default();
        assert!(resolver.resolve(&table, ts(2018, 10, 2, 0)).is_none());

        let fallback = resolver
            .resolve_or_latest(&table, ts(2018, 10, 2, 0))
            .unwrap();
        assert_eq!(fallback, WeatherContext::from_row(table.last().unwrap()));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let table = table_with_weather();
        let resolver = WeatherContextResolver::default();
        let a = resolver.resolve(&table, ts(2018, 9, 30, 20));
        let b = resolver.resolve(&table, ts(2018, 9, 30, 20));
        assert_eq!(a, b);
    }

    #[test]
    fn test_mode_tie_breaks_on_first_seen() {
        let values = ["Mist", "Clear", "Clear", "Mist", "Fog"];
        assert_eq!(mode(values.iter().copied()), Some("Mist"));
        assert_eq!(mode(std::iter::empty()), None);
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(vec![40.0, 10.0, 90.0]), 40.0);
        assert_eq!(median(vec![40.0, 10.0, 90.0, 20.0]), 30.0);
        assert_eq!(median(vec![]), 0.0);
    }

    #[test]
    fn test_reference_row_excluded() {
        let mut rows = hourly(ts(2018, 9, 30, 23), 2);
        rows.push(row(ts(2018, 10, 1, 0), 1.0));
        let mut last = rows.pop().unwrap();
        last.weather_main = "Snow".to_string();
        rows.push(last);
        let table = WorkingTable::from_rows(rows);
        let ctx = WeatherContextResolver::default()
            .resolve(&table, ts(2018, 10, 1, 0))
            .unwrap();
        assert_eq!(ctx.main, "Clouds");
    }
}
