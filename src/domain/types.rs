use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

// ============================================================================
// Calendar helpers
// ============================================================================

/// Day of week with Monday = 0, Sunday = 6
pub fn day_of_week(ts: &NaiveDateTime) -> u32 {
    ts.weekday().num_days_from_monday()
}

/// Saturday or Sunday
pub fn is_weekend(ts: &NaiveDateTime) -> bool {
    day_of_week(ts) >= 5
}

/// One hour step used throughout the forecasting loop
pub fn one_hour() -> Duration {
    Duration::hours(1)
}

/// Last full hour (HH:00) of the given day
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(23, 0, 0)
        .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN))
}

/// Values the cleaned dataset uses to mean "no holiday"
const HOLIDAY_SENTINELS: [&str; 4] = ["", "none", "nan", "nan.0"];

/// Normalise a raw holiday cell: sentinels become `None`
pub fn normalize_holiday(raw: Option<&str>) -> Option<String> {
    let value = raw?.trim();
    if HOLIDAY_SENTINELS.contains(&value.to_ascii_lowercase().as_str()) {
        None
    } else {
        Some(value.to_string())
    }
}

// ============================================================================
// Historical row
// ============================================================================

/// One hourly observation (or one synthesized forecast row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRow {
    pub timestamp: NaiveDateTime,
    /// Vehicles per hour
    pub traffic_volume: f64,
    /// Temperature (Celsius)
    pub temp: f64,
    /// Rain in the last hour (mm)
    pub rain_1h: f64,
    /// Snow in the last hour (mm)
    pub snow_1h: f64,
    /// Cloud cover (0-100%)
    pub clouds_all: f64,
    pub weather_main: String,
    pub weather_description: String,
    pub holiday: Option<String>,
    /// 0=Monday, 6=Sunday
    pub day_of_week: u32,
    /// 1-12
    pub month: u32,
    pub year: i32,
    pub is_weekend: bool,
}

impl HistoricalRow {
    /// Hour of day (0-23)
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Recompute the calendar columns from the timestamp
    pub fn with_calendar(mut self) -> Self {
        self.day_of_week = day_of_week(&self.timestamp);
        self.month = self.timestamp.month();
        self.year = self.timestamp.year();
        self.is_weekend = is_weekend(&self.timestamp);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_holiday() {
        assert_eq!(normalize_holiday(None), None);
        assert_eq!(normalize_holiday(Some("None")), None);
        assert_eq!(normalize_holiday(Some("NaN")), None);
        assert_eq!(normalize_holiday(Some("nan.0")), None);
        assert_eq!(normalize_holiday(Some("  ")), None);
        assert_eq!(
            normalize_holiday(Some("Labor Day")),
            Some("Labor Day".to_string())
        );
    }

    #[test]
    fn test_weekend_detection() {
        // 2018-09-29 was a Saturday
        let sat = NaiveDate::from_ymd_opt(2018, 9, 29)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let mon = sat + Duration::days(2);
        assert!(is_weekend(&sat));
        assert_eq!(day_of_week(&sat), 5);
        assert!(!is_weekend(&mon));
        assert_eq!(day_of_week(&mon), 0);
    }

    #[test]
    fn test_end_of_day() {
        let d = NaiveDate::from_ymd_opt(2018, 10, 1).unwrap();
        assert_eq!(end_of_day(d).hour(), 23);
        assert_eq!(end_of_day(d).date(), d);
    }
}
