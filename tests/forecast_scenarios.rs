mod common;

use std::io::Write;
use std::sync::Arc;

use chrono::Duration;
use traffic_forecaster::domain::RunState;
use traffic_forecaster::forecast::{
    FeatureRecord, ForecastEngine, ForecastSession, Horizon, StepFailurePolicy,
};
use traffic_forecaster::ml::{LinearPipeline, Predictor, PredictorError};
use traffic_forecaster::repo::TimeSeriesStore;

use common::ts;

/// Records every feature row it is asked about
struct Recorder {
    seen: parking_lot::Mutex<Vec<FeatureRecord>>,
    fail_at_call: Option<usize>,
}

impl Recorder {
    fn new() -> Self {
        Self {
            seen: parking_lot::Mutex::new(Vec::new()),
            fail_at_call: None,
        }
    }
}

impl Predictor for Recorder {
    fn predict(&self, records: &[FeatureRecord]) -> Result<Vec<f64>, PredictorError> {
        let mut seen = self.seen.lock();
        seen.extend(records.iter().cloned());
        if Some(seen.len()) == self.fail_at_call {
            return Err(PredictorError::Inference("model crashed".to_string()));
        }
        Ok(records.iter().map(|r| r.lag_1 - 0.4).collect())
    }
}

fn store() -> TimeSeriesStore {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(common::dataset_csv().as_bytes()).unwrap();
    TimeSeriesStore::from_csv_path(file.path()).unwrap()
}

#[test]
fn test_next_hour_after_dataset_end() {
    let store = store();
    assert_eq!(store.last_timestamp(), Some(ts(2018, 9, 30, 23)));

    let recorder = Arc::new(Recorder::new());
    let engine = ForecastEngine::new(recorder.clone());
    let mut session = ForecastSession::new();

    let run = session.generate(&engine, &store, Horizon::NextHour).unwrap();
    assert_eq!(run.state, RunState::Completed);
    assert_eq!(run.points[0].timestamp, ts(2018, 10, 1, 0));
    // 1200 - 0.4 rounds back to 1200
    assert_eq!(run.points[0].predicted_volume, 1200);

    let seen = recorder.seen.lock();
    assert_eq!(seen[0].lag_1, 1200.0);
    assert_eq!(seen[0].lag_24, 640.0);
    assert_eq!(seen[0].hour, 0.0);
    assert_eq!(seen[0].day_of_week, 0.0);
    assert!(!seen[0].is_weekend);
    // weather from 13:00..23:00 of the last day
    assert_eq!(seen[0].weather_main, "Clouds");
    assert_eq!(seen[0].temp, 21.5);
    // clouds cycle 50, 60, 40, ... over those 11 hours
    assert_eq!(seen[0].clouds_all, 50.0);
    assert_eq!(seen[0].rain_1h, 0.0);
    assert_eq!(seen[0].snow_1h, 0.0);
}

#[test]
fn test_weather_window_spanning_rainy_night() {
    let store = store();
    let engine = ForecastEngine::new(Arc::new(Recorder::new()));

    // window 2018-09-29 20:00 ..= 2018-09-30 06:00: six rainy hours, five dry
    let record = engine
        .features_for(&store.working_table(), ts(2018, 9, 30, 7), 600.0)
        .unwrap();
    assert_eq!(record.weather_main, "Rain");
    assert_eq!(record.weather_description, "light rain");
    assert_eq!(record.rain_1h, 0.5);
    assert_eq!(record.clouds_all, 50.0);
    assert_eq!(record.temp, 13.0);
}

#[test]
fn test_week_run_is_contiguous_and_non_negative() {
    let store = store();
    let engine = ForecastEngine::new(Arc::new(Recorder::new()));
    let mut session = ForecastSession::new();

    let run = session.generate(&engine, &store, Horizon::NextWeek).unwrap();
    assert_eq!(run.points.len(), 168);
    for pair in run.points.windows(2) {
        assert_eq!(pair[1].timestamp - pair[0].timestamp, Duration::hours(1));
    }
    assert_eq!(session.predictions().len(), 168);
    assert_eq!(session.summary().count, 168);
}

#[test]
fn test_failed_run_keeps_partial_points() {
    let store = store();
    let recorder = Recorder {
        seen: parking_lot::Mutex::new(Vec::new()),
        fail_at_call: Some(5),
    };
    let engine = ForecastEngine::new(Arc::new(recorder));
    let mut session = ForecastSession::new();

    let run = session.generate(&engine, &store, Horizon::Today).unwrap();
    assert_eq!(run.state, RunState::Failed);
    assert_eq!(run.points.len(), 4);
    assert!(run.error.unwrap().contains("model crashed"));
    assert_eq!(session.predictions().len(), 4);

    // the next hour continues after the partial result
    let healthy = ForecastEngine::new(Arc::new(Recorder::new()));
    let next = session.generate(&healthy, &store, Horizon::NextHour).unwrap();
    assert_eq!(next.points[0].timestamp, ts(2018, 10, 1, 4));
}

#[test]
fn test_skip_policy_leaves_gap() {
    let store = store();
    let recorder = Recorder {
        seen: parking_lot::Mutex::new(Vec::new()),
        fail_at_call: Some(2),
    };
    let engine =
        ForecastEngine::new(Arc::new(recorder)).with_failure_policy(StepFailurePolicy::Skip);
    let mut session = ForecastSession::new();

    let run = session.generate(&engine, &store, Horizon::Today).unwrap();
    assert_eq!(run.state, RunState::Failed);
    assert_eq!(run.points.len(), 23);
    assert_eq!(run.failed_steps, 1);
    assert!(session
        .predictions()
        .iter()
        .all(|p| p.timestamp != ts(2018, 10, 1, 1)));
}

#[test]
fn test_linear_pipeline_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(common::linear_model_json().as_bytes()).unwrap();
    let model = LinearPipeline::from_json_path(file.path().to_str().unwrap()).unwrap();

    let engine = ForecastEngine::new(Arc::new(model));
    let mut session = ForecastSession::new();
    let run = session
        .generate(&engine, &store(), Horizon::NextThreeDays)
        .unwrap();
    assert_eq!(run.points.len(), 72);
    assert_eq!(run.points[0].predicted_volume, 1210);
    assert_eq!(run.points[71].predicted_volume, 1200 + 72 * 10);
}
