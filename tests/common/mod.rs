#![allow(dead_code)]

use std::fmt::Write as _;
use std::path::Path;

use axum::Router;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use figment::providers::{Format, Toml};
use figment::Figment;
use tempfile::TempDir;

use traffic_forecaster::api;
use traffic_forecaster::config::Config;
use traffic_forecaster::controller::AppState;

pub fn ts(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

/// One week of hourly rows, 2018-09-24 00:00 to 2018-09-30 23:00.
///
/// Volume is `500 + 20 * hour`, except 1200 at the last hour and 640 at
/// 2018-09-30 00:00.
pub fn dataset_csv() -> String {
    let mut out = String::from(
        "holiday,temp,rain_1h,snow_1h,clouds_all,weather_main,weather_description,date_time,traffic_volume\n",
    );
    let start = ts(2018, 9, 24, 0);
    for i in 0..168 {
        let t = start + Duration::hours(i);
        let volume = if t == ts(2018, 9, 30, 23) {
            1200
        } else if t == ts(2018, 9, 30, 0) {
            640
        } else {
            500 + 20 * (i % 24)
        };
        let (main, desc, rain) = if i % 24 < 6 {
            ("Rain", "light rain", "0.5")
        } else {
            ("Clouds", "scattered clouds", "")
        };
        writeln!(
            out,
            "None,{:.1},{},0,{},{},{},{},{}",
            10.0 + (i % 24) as f64 * 0.5,
            rain,
            40 + i % 3 * 10,
            main,
            desc,
            t.format("%Y-%m-%d %H:%M:%S"),
            volume
        )
        .unwrap();
    }
    out
}

/// Linear model predicting `lag_1 + 10`
pub fn linear_model_json() -> String {
    // 12 numeric columns followed by the two weather_main categories
    let mut coefficients = vec![0.0; 14];
    coefficients[9] = 1.0;
    serde_json::json!({
        "metadata": {
            "model_id": "lag_plus_ten",
            "model_type": "linear_regression",
            "version": "1"
        },
        "preprocessor": {
            "scaler": null,
            "encoder": {"categories": [[], ["Clouds", "Rain"], []]}
        },
        "coefficients": coefficients,
        "intercept": 10.0
    })
    .to_string()
}

pub fn config(csv_path: &Path, model_path: &Path) -> Config {
    let toml = format!(
        r#"
        [server]
        host = "127.0.0.1"
        port = 0

        [data]
        csv_path = "{}"

        [model]
        path = "{}"
        kind = "linear_regression"

        [forecast]
        max_sessions = 8
        "#,
        csv_path.display(),
        model_path.display()
    );
    Config::from_figment(Figment::new().merge(Toml::string(&toml))).unwrap()
}

/// Router backed by files in a temporary directory
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _dir: TempDir,
}

pub fn app() -> TestApp {
    build(true)
}

pub fn app_without_model() -> TestApp {
    build(false)
}

fn build(with_model: bool) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("traffic.csv");
    let model_path = dir.path().join("model.json");
    std::fs::write(&csv_path, dataset_csv()).unwrap();
    if with_model {
        std::fs::write(&model_path, linear_model_json()).unwrap();
    }

    let cfg = config(&csv_path, &model_path);
    let state = AppState::new(cfg.clone());
    TestApp {
        router: api::router(state.clone(), &cfg),
        state,
        _dir: dir,
    }
}
