use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{FeatureRecord, FeatureRowBuilder, LagFeatureResolver, WeatherContextResolver};
use crate::config::ForecastConfig;
use crate::domain::{is_weekend, one_hour, ForecastPoint, HistoricalRow, RunState};
use crate::ml::{Predictor, PredictorError};
use crate::repo::WorkingTable;

/// What to do when the model fails on a step
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepFailurePolicy {
    /// Stop the run and keep the points produced so far
    #[default]
    Abort,
    /// Leave the hour out and continue with the next one
    Skip,
}

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("No historical rows to forecast from")]
    EmptyTable,

    #[error("Prediction failed for {timestamp}: {source}")]
    Predictor {
        timestamp: NaiveDateTime,
        #[source]
        source: PredictorError,
    },

    #[error("Model returned a non-finite value ({value}) for {timestamp}")]
    NonFinite { timestamp: NaiveDateTime, value: f64 },

    #[error("Forecasting unavailable: {0}")]
    Unavailable(String),

    #[error("Forecast request abandoned before the run finished")]
    Cancelled,
}

/// Outcome of one generation run
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub state: RunState,
    pub requested_steps: usize,
    /// Points in timestamp order
    pub points: Vec<ForecastPoint>,
    /// Synthesized rows (features + predicted volume), one per point
    pub generated_rows: Vec<HistoricalRow>,
    /// First step failure, reported once per run
    pub error: Option<String>,
    pub failed_steps: usize,
}

/// Iterative multi-step forecaster.
///
/// Each step feeds its prediction back into the working table so that later
/// steps see it as `lag_1` and, further out, as `lag_24` / `lag_168`.
pub struct ForecastEngine {
    predictor: Arc<dyn Predictor>,
    weather: WeatherContextResolver,
    lags: LagFeatureResolver,
    builder: FeatureRowBuilder,
    on_failure: StepFailurePolicy,
}

impl ForecastEngine {
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        Self {
            predictor,
            weather: WeatherContextResolver::default(),
            lags: LagFeatureResolver,
            builder: FeatureRowBuilder,
            on_failure: StepFailurePolicy::Abort,
        }
    }

    pub fn from_config(predictor: Arc<dyn Predictor>, cfg: &ForecastConfig) -> Self {
        Self::new(predictor)
            .with_weather_window(cfg.weather_window_hours)
            .with_failure_policy(cfg.on_step_failure)
    }

    pub fn with_weather_window(mut self, hours: i64) -> Self {
        self.weather = WeatherContextResolver::new(hours);
        self
    }

    pub fn with_failure_policy(mut self, policy: StepFailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    pub fn predictor(&self) -> &Arc<dyn Predictor> {
        &self.predictor
    }

    /// Forecast `steps` consecutive hours starting at `start`.
    ///
    /// `table` must hold every known row before `start`. Only an empty table
    /// is an error; model failures end the run in [`RunState::Failed`] with
    /// the partial result.
    pub fn run(
        &self,
        mut table: WorkingTable,
        start: NaiveDateTime,
        steps: usize,
    ) -> Result<ForecastRun, ForecastError> {
        let mut state = RunState::Idle;
        let mut last_known_value = table
            .last()
            .map(|r| r.traffic_volume)
            .ok_or(ForecastError::EmptyTable)?;

        state = transition(state, RunState::Running);
        let started = Instant::now();
        info!(%start, steps, "forecast run started");

        let mut points = Vec::with_capacity(steps);
        let mut generated_rows = Vec::with_capacity(steps);
        let mut first_error: Option<ForecastError> = None;
        let mut failed_steps = 0usize;
        let mut reference_time = start;

        for step in 0..steps {
            let record = self.features_for(&table, reference_time, last_known_value)?;

            match self.predict_one(&record, reference_time) {
                Ok(volume) => {
                    debug!(step, %reference_time, volume, "forecast step");
                    points.push(ForecastPoint::new(reference_time, volume));
                    let row = record.into_row(reference_time, volume as f64);
                    table.push(row.clone());
                    generated_rows.push(row);
                    last_known_value = volume as f64;
                }
                Err(e) => {
                    warn!(step, %reference_time, error = %e, "forecast step failed");
                    failed_steps += 1;
                    first_error.get_or_insert(e);
                    if self.on_failure == StepFailurePolicy::Abort {
                        break;
                    }
                }
            }

            reference_time += one_hour();
        }

        state = transition(
            state,
            if failed_steps == 0 {
                RunState::Completed
            } else {
                RunState::Failed
            },
        );

        info!(
            state = %state,
            points = points.len(),
            failed_steps,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "forecast run finished"
        );

        Ok(ForecastRun {
            state,
            requested_steps: steps,
            points,
            generated_rows,
            error: first_error.map(|e| e.to_string()),
            failed_steps,
        })
    }

    /// Assemble the model input for `reference_time` from the current table
    pub fn features_for(
        &self,
        table: &WorkingTable,
        reference_time: NaiveDateTime,
        last_known_value: f64,
    ) -> Result<FeatureRecord, ForecastError> {
        let holiday = table.holiday_on(reference_time.date());
        let weather = self
            .weather
            .resolve_or_latest(table, reference_time)
            .ok_or(ForecastError::EmptyTable)?;
        let lags = self.lags.resolve(table, reference_time, last_known_value);
        Ok(self.builder.build(
            reference_time,
            holiday,
            is_weekend(&reference_time),
            &weather,
            lags,
        ))
    }

    fn predict_one(
        &self,
        record: &FeatureRecord,
        timestamp: NaiveDateTime,
    ) -> Result<u32, ForecastError> {
        let output = self
            .predictor
            .predict(std::slice::from_ref(record))
            .map_err(|source| ForecastError::Predictor { timestamp, source })?;
        let raw = output.first().copied().ok_or(ForecastError::Predictor {
            timestamp,
            source: PredictorError::OutputMismatch {
                expected: 1,
                got: output.len(),
            },
        })?;
        clamp_round(raw).ok_or(ForecastError::NonFinite {
            timestamp,
            value: raw,
        })
    }
}

/// Clamp to zero, then round to the nearest vehicle count
pub fn clamp_round(raw: f64) -> Option<u32> {
    if !raw.is_finite() {
        return None;
    }
    Some(raw.max(0.0).round() as u32)
}

fn transition(from: RunState, to: RunState) -> RunState {
    debug_assert!(
        matches!(
            (from, to),
            (RunState::Idle, RunState::Running)
                | (RunState::Running, RunState::Completed)
                | (RunState::Running, RunState::Failed)
        ),
        "invalid run transition {} -> {}",
        from,
        to
    );
    to
}
