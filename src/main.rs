use anyhow::Result;
use axum::Router;
use traffic_forecaster::{api, config, controller, telemetry};
use config::Config;
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }
    init_tracing();

    let cfg = Config::load()?;

    let app_state = controller::AppState::new(cfg.clone());

    #[allow(unused_mut)]
    let mut app: Router = api::router(app_state.clone(), &cfg);

    #[cfg(feature = "metrics")]
    {
        app = api::with_metrics(app);
    }

    let addr = cfg.server.socket_addr()?;

    if cfg.server.host == "0.0.0.0" {
        warn!("server binding to 0.0.0.0 - service will be accessible from the network");
    }

    info!(
        %addr,
        rows = app_state.store.len(),
        forecasting = app_state.engine.is_some(),
        "starting traffic forecaster"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    warn!("shutdown complete");
    Ok(())
}
