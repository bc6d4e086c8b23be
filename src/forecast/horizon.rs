use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::domain::end_of_day;

/// Forecast horizon choices offered to the user
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Horizon {
    /// One more hour; extends the current session
    NextHour,
    /// Until 23:00 of the start day
    Today,
    /// Until 23:00 of the day after the start day
    TodayAndTomorrow,
    NextThreeDays,
    NextWeek,
    NextMonth,
}

impl Horizon {
    /// Number of hourly steps to forecast when the first step is `start`
    pub fn steps_from(&self, start: NaiveDateTime) -> usize {
        match self {
            Self::NextHour => 1,
            Self::Today => hours_until_inclusive(start, end_of_day(start.date())),
            Self::TodayAndTomorrow => {
                hours_until_inclusive(start, end_of_day(start.date() + Duration::days(1)))
            }
            Self::NextThreeDays => 72,
            Self::NextWeek => 168,
            Self::NextMonth => 720,
        }
    }

    /// Whether this choice continues the existing session instead of restarting
    pub fn is_incremental(&self) -> bool {
        matches!(self, Self::NextHour)
    }
}

fn hours_until_inclusive(start: NaiveDateTime, end: NaiveDateTime) -> usize {
    let hours = (end - start).num_hours() + 1;
    hours.max(1) as usize
}

/// Historical slice shown next to the forecast
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum HistoryWindow {
    #[default]
    #[serde(rename = "24h")]
    #[strum(serialize = "24h")]
    Day,
    #[serde(rename = "3d")]
    #[strum(serialize = "3d")]
    ThreeDays,
    #[serde(rename = "1w")]
    #[strum(serialize = "1w")]
    Week,
    #[serde(rename = "1m")]
    #[strum(serialize = "1m")]
    Month,
    #[serde(rename = "1y")]
    #[strum(serialize = "1y")]
    Year,
}

impl HistoryWindow {
    pub fn span(&self) -> Duration {
        match self {
            Self::Day => Duration::hours(24),
            Self::ThreeDays => Duration::days(3),
            Self::Week => Duration::days(7),
            Self::Month => Duration::days(30),
            Self::Year => Duration::days(365),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::fixtures::ts;
    use rstest::rstest;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[rstest]
    #[case(Horizon::NextHour, ts(2018, 10, 1, 14), 1)]
    #[case(Horizon::Today, ts(2018, 10, 1, 14), 10)]
    #[case(Horizon::Today, ts(2018, 10, 1, 0), 24)]
    #[case(Horizon::Today, ts(2018, 10, 1, 23), 1)]
    #[case(Horizon::TodayAndTomorrow, ts(2018, 10, 1, 14), 34)]
    #[case(Horizon::TodayAndTomorrow, ts(2018, 10, 1, 0), 48)]
    #[case(Horizon::NextThreeDays, ts(2018, 10, 1, 14), 72)]
    #[case(Horizon::NextWeek, ts(2018, 10, 1, 14), 168)]
    #[case(Horizon::NextMonth, ts(2018, 10, 1, 14), 720)]
    fn test_steps_from(#[case] horizon: Horizon, #[case] start: NaiveDateTime, #[case] steps: usize) {
        assert_eq!(horizon.steps_from(start), steps);
    }

    #[test]
    fn test_only_next_hour_is_incremental() {
        let incremental: Vec<Horizon> = Horizon::iter().filter(|h| h.is_incremental()).collect();
        assert_eq!(incremental, vec![Horizon::NextHour]);
    }

    #[test]
    fn test_horizon_parsing() {
        assert_eq!(Horizon::from_str("next_week").unwrap(), Horizon::NextWeek);
        assert_eq!(Horizon::TodayAndTomorrow.to_string(), "today_and_tomorrow");
        let h: Horizon = serde_json::from_str("\"next_three_days\"").unwrap();
        assert_eq!(h, Horizon::NextThreeDays);
    }

    #[test]
    fn test_history_window() {
        assert_eq!(HistoryWindow::from_str("3d").unwrap(), HistoryWindow::ThreeDays);
        assert_eq!(HistoryWindow::Year.to_string(), "1y");
        assert_eq!(HistoryWindow::default().span(), Duration::hours(24));
        assert_eq!(HistoryWindow::Month.span(), Duration::days(30));
        let w: HistoryWindow = serde_json::from_str("\"1w\"").unwrap();
        assert_eq!(w, HistoryWindow::Week);
    }
}
