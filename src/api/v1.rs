use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::{
    api::{forecast, health, history, kpi, predict},
    controller::AppState,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::liveness_check))
        .route("/health", get(health::health_check))
        .route("/history", get(history::get_history))
        .route("/kpi", get(kpi::get_kpis))
        .route("/kpi/day/:date", get(kpi::get_day_summary))
        .route("/kpi/daily", get(kpi::get_daily_series))
        .route("/kpi/trends", get(kpi::get_trends))
        .route("/kpi/weather", get(kpi::get_weather_impact))
        .route("/kpi/compare", get(kpi::get_day_comparison))
        .route("/sessions", post(forecast::create_session))
        .route("/sessions/:id", delete(forecast::close_session))
        .route(
            "/sessions/:id/forecast",
            get(forecast::get_forecast)
                .post(forecast::run_forecast)
                .delete(forecast::reset_forecast),
        )
        .route("/predict", post(predict::predict))
        .with_state(state)
}
