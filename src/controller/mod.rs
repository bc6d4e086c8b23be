pub mod sessions;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::Config;
use crate::domain::{ForecastPoint, ForecastSummary, RunState};
use crate::forecast::{ForecastEngine, ForecastError, Horizon};
use crate::ml::{load_predictor, Predictor, PredictorError};
use crate::repo::{StoreError, TimeSeriesStore};

pub use sessions::{SessionError, SessionRegistry, SharedSession};

#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error("Forecast task failed: {0}")]
    Task(String),
}

/// Shared service state.
///
/// Loading failures do not stop the service: a missing dataset leaves an
/// empty store, a missing model disables forecasting.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub store: Arc<TimeSeriesStore>,
    pub store_error: Option<String>,
    pub engine: Option<Arc<ForecastEngine>>,
    pub model_error: Option<String>,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(cfg: Config) -> Self {
        let store = TimeSeriesStore::from_csv_path(&cfg.data.csv_path);
        let predictor = load_predictor(&cfg.model);
        Self::from_parts(cfg, store, predictor)
    }

    pub fn from_parts(
        cfg: Config,
        store: Result<TimeSeriesStore, StoreError>,
        predictor: Result<Arc<dyn Predictor>, PredictorError>,
    ) -> Self {
        let (store, store_error) = match store {
            Ok(store) => {
                info!(rows = store.len(), "historical dataset ready");
                (store, None)
            }
            Err(e) => {
                error!(error = %e, path = %cfg.data.csv_path, "historical dataset unavailable");
                (TimeSeriesStore::default(), Some(e.to_string()))
            }
        };
        let (engine, model_error) = match predictor {
            Ok(p) => (
                Some(Arc::new(ForecastEngine::from_config(p, &cfg.forecast))),
                None,
            ),
            Err(e) => {
                error!(error = %e, path = %cfg.model.path, "model unavailable, forecasting disabled");
                (None, Some(e.to_string()))
            }
        };

        Self {
            sessions: SessionRegistry::new(
                cfg.forecast.max_sessions,
                Duration::from_secs(cfg.forecast.session_idle_secs),
            ),
            store: Arc::new(store),
            store_error,
            engine,
            model_error,
            cfg,
        }
    }

    pub fn engine(&self) -> Result<Arc<ForecastEngine>, ForecastError> {
        self.engine.clone().ok_or_else(|| {
            ForecastError::Unavailable(
                self.model_error
                    .clone()
                    .unwrap_or_else(|| "no model loaded".to_string()),
            )
        })
    }

    /// Run a forecast for `horizon` on one session and report the outcome.
    ///
    /// The run itself happens on the blocking pool. If this future is
    /// dropped first (client gone, request timeout) the run is discarded
    /// instead of being merged into the session.
    pub async fn run_forecast(
        &self,
        session_id: Uuid,
        horizon: Horizon,
    ) -> Result<SessionForecast, ControlError> {
        let engine = self.engine()?;
        let session = self.sessions.get(session_id).await?;
        let store = self.store.clone();
        let guard = CancelOnDrop::default();
        let cancelled = guard.0.clone();

        tokio::task::spawn_blocking(move || -> Result<SessionForecast, ControlError> {
            let mut session = session.blocking_lock();
            let run = session.generate_cancellable(&engine, &store, horizon, &cancelled)?;
            Ok(SessionForecast {
                state: Some(run.state),
                horizon: Some(horizon),
                new_points: run.points,
                predictions: session.predictions().to_vec(),
                summary: session.summary(),
                error: run.error,
            })
        })
        .await
        .map_err(|e| ControlError::Task(e.to_string()))?
    }

    /// Current predictions of a session, without running anything
    pub async fn session_forecast(&self, session_id: Uuid) -> Result<SessionForecast, ControlError> {
        let session = self.sessions.get(session_id).await?;
        let session = session.lock().await;
        Ok(SessionForecast {
            state: None,
            horizon: session.last_horizon(),
            new_points: Vec::new(),
            predictions: session.predictions().to_vec(),
            summary: session.summary(),
            error: None,
        })
    }

    /// Clear a session's predictions. Waits for a run in progress to finish.
    pub async fn reset_session(&self, session_id: Uuid) -> Result<(), ControlError> {
        let session = self.sessions.get(session_id).await?;
        session.lock().await.reset();
        info!(%session_id, "session reset");
        Ok(())
    }

    pub async fn close_session(&self, session_id: Uuid) -> Result<(), ControlError> {
        self.sessions.remove(session_id).await?;
        Ok(())
    }
}

/// Raises its flag when dropped. Once the blocking task has returned, the
/// flag is no longer read.
#[derive(Default)]
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Session view returned by the forecast endpoints
#[derive(Debug, Clone, Serialize)]
pub struct SessionForecast {
    /// State of the run just executed, if any
    pub state: Option<RunState>,
    pub horizon: Option<Horizon>,
    pub new_points: Vec<ForecastPoint>,
    pub predictions: Vec<ForecastPoint>,
    pub summary: ForecastSummary,
    pub error: Option<String>,
}
