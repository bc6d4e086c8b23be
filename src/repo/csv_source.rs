//! CSV reader for the cleaned I-94 dataset.
//!
//! Expected format (with headers):
//!
//! ```text
//! holiday,temp,rain_1h,snow_1h,clouds_all,weather_main,weather_description,date_time,traffic_volume,...
//! None,15.2,0.0,0.0,40,Clouds,scattered clouds,2018-09-30 23:00:00,1200,...
//! ```
//!
//! Extra columns (`hour`, `day_of_week`, `is_weekend`, ...) are ignored: the
//! calendar columns are always recomputed from `date_time`.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{debug, info};

use super::{sort_dedup, StoreError};
use crate::domain::{normalize_holiday, HistoricalRow};

const REQUIRED_COLUMNS: [&str; 7] = [
    "date_time",
    "temp",
    "clouds_all",
    "weather_main",
    "weather_description",
    "traffic_volume",
    "holiday",
];

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Deserialize)]
struct RawRecord {
    date_time: String,
    #[serde(default)]
    holiday: Option<String>,
    temp: f64,
    #[serde(default)]
    rain_1h: Option<f64>,
    #[serde(default)]
    snow_1h: Option<f64>,
    clouds_all: f64,
    weather_main: String,
    weather_description: String,
    traffic_volume: f64,
}

/// Parse a dataset timestamp. Returns None for unparseable strings.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
}

/// Read and normalise all rows from a CSV file
pub fn read_csv_path(path: impl AsRef<Path>) -> Result<Vec<HistoricalRow>, StoreError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let rows = read_csv(file)?;
    info!(path = %path.display(), rows = rows.len(), "loaded historical dataset");
    Ok(rows)
}

/// Read and normalise all rows from any CSV source
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<HistoricalRow>, StoreError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !headers.iter().any(|h| h == **c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(StoreError::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    for (idx, result) in rdr.deserialize::<RawRecord>().enumerate() {
        let raw = result?;
        let timestamp =
            parse_timestamp(&raw.date_time).ok_or_else(|| StoreError::InvalidTimestamp {
                record: idx + 1,
                value: raw.date_time.clone(),
            })?;

        rows.push(
            HistoricalRow {
                timestamp,
                traffic_volume: raw.traffic_volume.max(0.0),
                temp: raw.temp,
                rain_1h: raw.rain_1h.unwrap_or(0.0),
                snow_1h: raw.snow_1h.unwrap_or(0.0),
                clouds_all: raw.clouds_all,
                weather_main: raw.weather_main,
                weather_description: raw.weather_description,
                holiday: normalize_holiday(raw.holiday.as_deref()),
                day_of_week: 0,
                month: 0,
                year: 0,
                is_weekend: false,
            }
            .with_calendar(),
        );
    }

    if rows.is_empty() {
        return Err(StoreError::Empty);
    }

    let read = rows.len();
    let rows = sort_dedup(rows);
    if rows.len() != read {
        debug!(dropped = read - rows.len(), "dropped duplicate timestamps");
    }
    Ok(rows)
}
