use std::collections::BTreeMap;

use chrono::{Duration, Month, NaiveDate, Weekday};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::kpi::round2;
use crate::domain::HistoricalRow;
use crate::repo::TimeSeriesStore;

/// Days shown by the daily series when no range is given
pub const DEFAULT_DAILY_SPAN_DAYS: i64 = 30;

/// Running sum and count of volumes
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct VolumeMean {
    sum: f64,
    count: usize,
}

impl VolumeMean {
    pub(crate) fn push(&mut self, volume: f64) {
        self.sum += volume;
        self.count += 1;
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }

    /// Rounded to two decimals; 0.0 when nothing was pushed
    pub(crate) fn value(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            round2(self.sum / self.count as f64)
        }
    }
}

/// Mean volume per key, keys in ascending order
pub(crate) fn grouped_means<'a, K: Ord>(
    rows: impl IntoIterator<Item = &'a HistoricalRow>,
    key: impl Fn(&HistoricalRow) -> K,
) -> BTreeMap<K, VolumeMean> {
    let mut groups: BTreeMap<K, VolumeMean> = BTreeMap::new();
    for r in rows {
        groups.entry(key(r)).or_default().push(r.traffic_volume);
    }
    groups
}

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Last [`DEFAULT_DAILY_SPAN_DAYS`] days of the dataset, clipped to its start
    pub fn trailing(store: &TimeSeriesStore) -> Option<Self> {
        let first = store.first()?.date();
        let end = store.last()?.date();
        let start = (end - Duration::days(DEFAULT_DAILY_SPAN_DAYS - 1)).max(first);
        Some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyMean {
    pub date: NaiveDate,
    pub traffic_volume: f64,
    pub hours: usize,
}

/// Mean hourly volume for each day in `range` that has observations
pub fn daily_series(store: &TimeSeriesStore, range: DateRange) -> Vec<DailyMean> {
    store
        .rows()
        .iter()
        .filter(|r| range.contains(r.date()))
        .chunk_by(|r| r.date())
        .into_iter()
        .map(|(date, rows)| {
            let mut mean = VolumeMean::default();
            rows.for_each(|r| mean.push(r.traffic_volume));
            DailyMean {
                date,
                traffic_volume: mean.value(),
                hours: mean.count(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodMean<K> {
    pub period: K,
    pub traffic_volume: f64,
    pub hours: usize,
}

/// Weekly, monthly and yearly seasonality of the whole dataset.
///
/// Periods without observations are left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalTrends {
    /// Monday first
    pub by_weekday: Vec<PeriodMean<String>>,
    /// January first
    pub by_month: Vec<PeriodMean<String>>,
    pub by_year: Vec<PeriodMean<i32>>,
}

impl SeasonalTrends {
    pub fn compute(store: &TimeSeriesStore) -> Self {
        let rows = store.rows();
        let labelled = |groups: BTreeMap<u32, VolumeMean>, label: fn(u32) -> String| {
            groups
                .into_iter()
                .map(|(k, m)| PeriodMean {
                    period: label(k),
                    traffic_volume: m.value(),
                    hours: m.count(),
                })
                .collect::<Vec<_>>()
        };

        Self {
            by_weekday: labelled(grouped_means(rows, |r| r.day_of_week), weekday_name),
            by_month: labelled(grouped_means(rows, |r| r.month), month_name),
            by_year: grouped_means(rows, |r| r.year)
                .into_iter()
                .map(|(year, m)| PeriodMean {
                    period: year,
                    traffic_volume: m.value(),
                    hours: m.count(),
                })
                .collect(),
        }
    }
}

fn weekday_name(day_of_week: u32) -> String {
    Weekday::try_from(day_of_week as u8)
        .map(|d| d.to_string())
        .unwrap_or_default()
}

fn month_name(month: u32) -> String {
    Month::try_from(month as u8)
        .map(|m| m.name()[..3].to_string())
        .unwrap_or_default()
}
