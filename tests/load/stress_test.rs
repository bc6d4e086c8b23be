//! Load Testing Suite
//!
//! Verifies that concurrent sessions forecast independently:
//! - many sessions running long horizons in parallel
//! - repeated next-hour extensions on a single session

use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use uuid::Uuid;

use traffic_forecaster::forecast::Horizon;

use crate::common;

/// Test: parallel sessions do not interfere
///
/// 8 sessions each run a one-week forecast at the same time; every session
/// must end with the same 168 predictions.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore] // Ignore by default as this is a slow test
async fn test_parallel_sessions_are_isolated() {
    let app = common::app();
    let state = app.state.clone();

    let mut ids: Vec<Uuid> = Vec::new();
    for _ in 0..8 {
        ids.push(state.sessions.create().await.unwrap());
    }

    let start = Instant::now();
    let mut tasks = JoinSet::new();
    for id in ids {
        let state = state.clone();
        tasks.spawn(async move { state.run_forecast(id, Horizon::NextWeek).await });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        results.push(joined.unwrap().unwrap());
    }
    println!("8 parallel week forecasts took {:?}", start.elapsed());

    let reference = &results[0].predictions;
    assert_eq!(reference.len(), 168);
    for r in &results {
        assert_eq!(&r.predictions, reference);
    }
    assert!(start.elapsed() < Duration::from_secs(30));
}

/// Test: concurrent next-hour requests on one session are serialised
///
/// Every request must add exactly one distinct hour.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore] // Ignore by default as this is a slow test
async fn test_concurrent_extensions_on_one_session() {
    let app = common::app();
    let state = app.state.clone();
    let id = state.sessions.create().await.unwrap();

    let mut tasks = JoinSet::new();
    for _ in 0..20 {
        let state = state.clone();
        tasks.spawn(async move { state.run_forecast(id, Horizon::NextHour).await });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap().unwrap();
    }

    let view = state.session_forecast(id).await.unwrap();
    assert_eq!(view.predictions.len(), 20);
    for pair in view.predictions.windows(2) {
        assert_eq!(
            pair[1].timestamp - pair[0].timestamp,
            chrono::Duration::hours(1)
        );
    }
}
