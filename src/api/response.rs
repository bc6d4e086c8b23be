use std::time::Duration;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Envelope for successful responses; failures are rendered by
/// [`ApiError`](super::error::ApiError) with `success: false`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Default, Serialize)]
pub struct ResponseMetadata {
    /// Items in `data` for list payloads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
    /// Handler time, for endpoints that run the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    pub fn with_duration(mut self, elapsed: Duration) -> Self {
        self.metadata.get_or_insert_with(Default::default).duration_ms =
            Some(elapsed.as_millis() as u64);
        self
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// List payload with its length in `metadata.total_count`
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        let mut response = Self::success(items);
        response.metadata = Some(ResponseMetadata {
            total_count: Some(count),
            ..Default::default()
        });
        response
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_counts_items() {
        let response = ApiResponse::list(vec![1, 2, 3]).with_duration(Duration::from_millis(42));
        assert!(response.success);
        let metadata = response.metadata.unwrap();
        assert_eq!(metadata.total_count, Some(3));
        assert_eq!(metadata.duration_ms, Some(42));
    }

    #[test]
    fn test_plain_payload_has_no_metadata() {
        let json = serde_json::to_value(ApiResponse::success("ok")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], "ok");
        assert!(json.get("metadata").is_none());
    }
}
