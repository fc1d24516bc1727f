use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use extract::SpanError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotReady(String),

    /// Spans supplied in the request body are malformed.
    #[error("Invalid spans: {0}")]
    InvalidSpans(SpanError),

    /// The recognizer returned malformed spans.
    #[error("Recognizer returned invalid spans: {0}")]
    RecognizerContract(SpanError),

    #[error("Upstream model failure: {0:#}")]
    Upstream(anyhow::Error),

    #[error("{0}")]
    BadRequest(String),

    #[error("Analysis timed out after {0}s")]
    Timeout(u64),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InvalidSpans(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::RecognizerContract(_) | ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
