use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use super::{ForecastEngine, ForecastError, ForecastRun, Horizon};
use crate::domain::{one_hour, ForecastPoint, ForecastSummary, HistoricalRow};
use crate::repo::{sort_dedup, TimeSeriesStore};

/// Per-user forecast state: generated rows and accumulated predictions.
///
/// `NextHour` on a non-empty session continues from the last generated hour;
/// every other horizon starts over from the end of the history.
#[derive(Debug, Clone, Default)]
pub struct ForecastSession {
    generated_rows: Vec<HistoricalRow>,
    predictions: Vec<ForecastPoint>,
    last_horizon: Option<Horizon>,
}

impl ForecastSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.generated_rows.is_empty()
    }

    /// Predictions in timestamp order, unique per hour
    pub fn predictions(&self) -> &[ForecastPoint] {
        &self.predictions
    }

    pub fn generated_rows(&self) -> &[HistoricalRow] {
        &self.generated_rows
    }

    pub fn last_horizon(&self) -> Option<Horizon> {
        self.last_horizon
    }

    pub fn summary(&self) -> ForecastSummary {
        ForecastSummary::from_points(&self.predictions)
    }

    pub fn reset(&mut self) {
        self.generated_rows.clear();
        self.predictions.clear();
        self.last_horizon = None;
    }

    /// Run `engine` for `horizon` and merge the outcome into the session.
    ///
    /// A failed run still merges its partial points.
    pub fn generate(
        &mut self,
        engine: &ForecastEngine,
        store: &TimeSeriesStore,
        horizon: Horizon,
    ) -> Result<ForecastRun, ForecastError> {
        self.generate_cancellable(engine, store, horizon, &AtomicBool::new(false))
    }

    /// Same as [`generate`](Self::generate), but once `cancelled` is set the
    /// finished run is discarded and the session stays as it was.
    pub fn generate_cancellable(
        &mut self,
        engine: &ForecastEngine,
        store: &TimeSeriesStore,
        horizon: Horizon,
        cancelled: &AtomicBool,
    ) -> Result<ForecastRun, ForecastError> {
        let extend = horizon.is_incremental() && !self.is_empty();
        let carried: &[HistoricalRow] = if extend { &self.generated_rows } else { &[] };

        let table = store.working_table().extend_with(carried);
        let start = table
            .last_timestamp()
            .ok_or(ForecastError::EmptyTable)?
            + one_hour();
        let steps = horizon.steps_from(start);
        info!(%horizon, extend, %start, steps, "session forecast requested");

        let run = engine.run(table, start, steps)?;
        if cancelled.load(Ordering::Acquire) {
            warn!(%horizon, points = run.points.len(), "forecast abandoned, session unchanged");
            return Err(ForecastError::Cancelled);
        }

        if !extend {
            self.reset();
        }
        self.merge(&run);
        self.last_horizon = Some(horizon);
        Ok(run)
    }

    fn merge(&mut self, run: &ForecastRun) {
        let rows = std::mem::take(&mut self.generated_rows)
            .into_iter()
            .chain(run.generated_rows.iter().cloned())
            .collect();
        self.generated_rows = sort_dedup(rows);

        self.predictions.extend(run.points.iter().copied());
        // stable sort keeps later writes after earlier ones for equal timestamps
        self.predictions.sort_by_key(|p| p.timestamp);
        let mut merged: Vec<ForecastPoint> = Vec::with_capacity(self.predictions.len());
        for point in self.predictions.drain(..) {
            match merged.last_mut() {
                Some(last) if last.timestamp == point.timestamp => *last = point,
                _ => merged.push(point),
            }
        }
        self.predictions = merged;
    }
}
