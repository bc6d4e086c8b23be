use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::repo::WorkingTable;

/// Lagged traffic volumes for one reference hour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LagFeatures {
    pub lag_1: f64,
    pub lag_24: f64,
    pub lag_168: f64,
}

/// Resolves lag features by exact timestamp lookup.
///
/// A missing row (sensor gap, or a lag reaching before the data) is replaced
/// by the last known value, without interpolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LagFeatureResolver;

impl LagFeatureResolver {
    pub fn resolve(
        &self,
        table: &WorkingTable,
        reference_time: NaiveDateTime,
        last_known_value: f64,
    ) -> LagFeatures {
        LagFeatures {
            lag_1: last_known_value,
            lag_24: Self::volume_at_or(table, reference_time - Duration::hours(24), last_known_value),
            lag_168: Self::volume_at_or(
                table,
                reference_time - Duration::hours(168),
                last_known_value,
            ),
        }
    }

    fn volume_at_or(table: &WorkingTable, ts: NaiveDateTime, fallback: f64) -> f64 {
        table.at(ts).map(|r| r.traffic_volume).unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::fixtures::{hourly, ts};
    use proptest::prelude::*;

    #[test]
    fn test_exact_matches() {
        let table = WorkingTable::from_rows(hourly(ts(2018, 9, 30, 23), 200));
        let lags = LagFeatureResolver.resolve(&table, ts(2018, 10, 1, 0), 1200.0);
        assert_eq!(lags.lag_1, 1200.0);
        // 200 rows: index of t is 199 - hours_before_end
        assert_eq!(lags.lag_24, table.at(ts(2018, 9, 30, 0)).unwrap().traffic_volume);
        assert_eq!(lags.lag_24, 1000.0 + 176.0);
        assert_eq!(lags.lag_168, 1000.0 + 32.0);
    }

    #[test]
    fn test_missing_rows_fall_back_to_last_value() {
        // only the last 10 hours are known
        let table = WorkingTable::from_rows(hourly(ts(2018, 9, 30, 23), 10));
        let lags = LagFeatureResolver.resolve(&table, ts(2018, 10, 1, 0), 777.0);
        assert_eq!(lags.lag_24, 777.0);
        assert_eq!(lags.lag_168, 777.0);
    }

    #[test]
    fn test_gap_degrades_single_lag() {
        let mut rows = hourly(ts(2018, 9, 30, 23), 200);
        rows.retain(|r| r.timestamp != ts(2018, 9, 30, 0));
        let table = WorkingTable::from_rows(rows);
        let lags = LagFeatureResolver.resolve(&table, ts(2018, 10, 1, 0), 5.0);
        assert_eq!(lags.lag_24, 5.0);
        assert_eq!(lags.lag_168, 1032.0);
    }

    proptest! {
        #[test]
        fn prop_lag_1_is_last_known_value(offset in 0i64..400, last in 0.0f64..10_000.0) {
            let table = WorkingTable::from_rows(hourly(ts(2018, 9, 30, 23), 200));
            let t = ts(2018, 9, 20, 0) + Duration::hours(offset);
            let lags = LagFeatureResolver.resolve(&table, t, last);
            prop_assert_eq!(lags.lag_1, last);
        }

        #[test]
        fn prop_lag_24_matches_row_or_fallback(offset in 0i64..400, last in 0.0f64..10_000.0) {
            let table = WorkingTable::from_rows(hourly(ts(2018, 9, 30, 23), 200));
            let t = ts(2018, 9, 20, 0) + Duration::hours(offset);
            let lags = LagFeatureResolver.resolve(&table, t, last);
            match table.at(t - Duration::hours(24)) {
                Some(row) => prop_assert_eq!(lags.lag_24, row.traffic_volume),
                None => prop_assert_eq!(lags.lag_24, last),
            }
        }
    }
}
