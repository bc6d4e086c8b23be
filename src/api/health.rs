use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::controller::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    checks: HealthChecks,
}

/// Individual health checks
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    dataset: ComponentHealth,
    model: ComponentHealth,
}

/// Health status of a component
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ComponentHealth {
    fn healthy(detail: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            detail: Some(detail.into()),
            error: None,
        }
    }

    fn unhealthy(error: String) -> Self {
        Self {
            status: "unhealthy".to_string(),
            detail: None,
            error: Some(error),
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// GET /health - dataset and model status
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let dataset = check_dataset(&state);
    let model = check_model(&state);
    let all_healthy = dataset.is_healthy() && model.is_healthy();

    let response = HealthResponse {
        status: if all_healthy {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        timestamp: chrono::Utc::now(),
        checks: HealthChecks { dataset, model },
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::debug!(healthy = all_healthy, "Health check completed");
    (status_code, Json(response))
}

/// GET /healthz - liveness check
pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}

fn check_dataset(state: &AppState) -> ComponentHealth {
    match &state.store_error {
        Some(e) => ComponentHealth::unhealthy(e.clone()),
        None => ComponentHealth::healthy(format!("{} rows loaded", state.store.len())),
    }
}

fn check_model(state: &AppState) -> ComponentHealth {
    match (&state.engine, &state.model_error) {
        (Some(_), _) => ComponentHealth::healthy(format!("{:?} loaded", state.cfg.model.kind)),
        (None, Some(e)) => ComponentHealth::unhealthy(e.clone()),
        (None, None) => ComponentHealth::unhealthy("no model loaded".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_health_healthy() {
        let health = ComponentHealth::healthy("42 rows loaded");
        assert!(health.is_healthy());
        assert!(health.error.is_none());
    }

    #[test]
    fn test_component_health_unhealthy() {
        let health = ComponentHealth::unhealthy("file not found".to_string());
        assert_eq!(health.status, "unhealthy");
        assert_eq!(health.error, Some("file not found".to_string()));
    }
}
