use std::collections::BTreeMap;

use serde::Serialize;

use super::kpi::round2;
use super::trends::{grouped_means, VolumeMean};
use crate::domain::HistoricalRow;
use crate::forecast::weather::median;
use crate::repo::TimeSeriesStore;

/// Conditions observed for fewer hours are reported but flagged
pub const MIN_CONDITION_SAMPLES: usize = 100;

/// Equal-width temperature bins
pub const TEMPERATURE_BINS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionStats {
    pub weather_main: String,
    pub mean: f64,
    pub median: f64,
    pub hours: usize,
    /// At least [`MIN_CONDITION_SAMPLES`] hours
    pub representative: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureBin {
    pub lower: f64,
    pub upper: f64,
    pub mean: f64,
    pub hours: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    None,
    Light,
    Heavy,
}

impl Intensity {
    /// Under 0.05 mm/h is treated as dry, 1 mm/h and up as heavy
    pub fn of_rain(mm: f64) -> Self {
        if mm < 0.05 {
            Self::None
        } else if mm < 1.0 {
            Self::Light
        } else {
            Self::Heavy
        }
    }

    pub fn of_snow(mm: f64) -> Self {
        if mm == 0.0 {
            Self::None
        } else if mm < 0.05 {
            Self::Light
        } else {
            Self::Heavy
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudCover {
    /// 0 to under 20 %
    Clear,
    /// 20 to under 80 %
    Variable,
    /// 80 % and up
    Overcast,
}

impl CloudCover {
    pub fn of(clouds_all: f64) -> Option<Self> {
        match clouds_all {
            c if !(0.0..=100.0).contains(&c) => None,
            c if c < 20.0 => Some(Self::Clear),
            c if c < 80.0 => Some(Self::Variable),
            _ => Some(Self::Overcast),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean<K> {
    pub group: K,
    pub mean: f64,
    pub hours: usize,
}

fn group_means<K>(groups: BTreeMap<K, VolumeMean>) -> Vec<GroupMean<K>> {
    groups
        .into_iter()
        .map(|(group, m)| GroupMean {
            group,
            mean: m.value(),
            hours: m.count(),
        })
        .collect()
}

/// How traffic volume varies with the weather
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherImpact {
    /// Highest mean first
    pub by_condition: Vec<ConditionStats>,
    pub by_temperature: Vec<TemperatureBin>,
    pub by_rain: Vec<GroupMean<Intensity>>,
    /// Empty when the dataset records no snow
    pub by_snow: Vec<GroupMean<Intensity>>,
    pub by_clouds: Vec<GroupMean<CloudCover>>,
}

impl WeatherImpact {
    pub fn compute(store: &TimeSeriesStore) -> Self {
        let rows = store.rows();
        let by_snow = if rows.iter().any(|r| r.snow_1h > 0.0) {
            group_means(grouped_means(rows, |r| Intensity::of_snow(r.snow_1h)))
        } else {
            Vec::new()
        };

        Self {
            by_condition: by_condition(rows),
            by_temperature: by_temperature(rows),
            by_rain: group_means(grouped_means(rows, |r| Intensity::of_rain(r.rain_1h))),
            by_snow,
            by_clouds: grouped_means(rows, |r| CloudCover::of(r.clouds_all))
                .into_iter()
                .filter_map(|(band, m)| {
                    Some(GroupMean {
                        group: band?,
                        mean: m.value(),
                        hours: m.count(),
                    })
                })
                .collect(),
        }
    }
}

fn by_condition(rows: &[HistoricalRow]) -> Vec<ConditionStats> {
    let mut volumes: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for r in rows.iter().filter(|r| !r.weather_main.trim().is_empty()) {
        volumes
            .entry(r.weather_main.as_str())
            .or_default()
            .push(r.traffic_volume);
    }

    let mut stats: Vec<ConditionStats> = volumes
        .into_iter()
        .map(|(main, v)| {
            let mut mean = VolumeMean::default();
            v.iter().for_each(|x| mean.push(*x));
            ConditionStats {
                weather_main: main.to_string(),
                mean: mean.value(),
                median: median(v),
                hours: mean.count(),
                representative: mean.count() >= MIN_CONDITION_SAMPLES,
            }
        })
        .collect();
    stats.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    stats
}

/// Right-closed equal-width bins between the coldest and warmest hour.
/// Only bins with observations are returned.
fn by_temperature(rows: &[HistoricalRow]) -> Vec<TemperatureBin> {
    let temps = rows.iter().map(|r| r.temp).filter(|t| t.is_finite());
    let Some((lo, hi)) = temps.fold(None, |acc: Option<(f64, f64)>, t| match acc {
        None => Some((t, t)),
        Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
    }) else {
        return Vec::new();
    };

    let width = (hi - lo) / TEMPERATURE_BINS as f64;
    let bin_of = |t: f64| -> usize {
        if width == 0.0 {
            return 0;
        }
        let idx = ((t - lo) / width).ceil() as usize;
        idx.saturating_sub(1).min(TEMPERATURE_BINS - 1)
    };

    grouped_means(rows.iter().filter(|r| r.temp.is_finite()), |r| bin_of(r.temp))
        .into_iter()
        .map(|(i, m)| TemperatureBin {
            lower: round2(lo + width * i as f64),
            upper: round2(if width == 0.0 { hi } else { lo + width * (i + 1) as f64 }),
            mean: m.value(),
            hours: m.count(),
        })
        .collect()
}
