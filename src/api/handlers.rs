//! Verification API handlers

use crate::claims::VerificationResult;
use crate::engine::VerificationEngine;
use crate::error::VerifyError;
use crate::metrics::METRICS;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Application state for verification handlers
#[derive(Clone)]
pub struct VerifyState {
    pub engine: Arc<VerificationEngine>,
}

/// API error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

/// Map an engine error to its HTTP status and body
pub fn error_response(e: &VerifyError) -> (StatusCode, Json<ApiError>) {
    match e {
        VerifyError::InvalidClaim(_) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(e.code(), e.to_string())),
        ),
        VerifyError::Extraction(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiError::new(e.code(), e.to_string())),
        ),
        VerifyError::Config(_) | VerifyError::Internal(_) => {
            error!("Verification failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new("INTERNAL_ERROR", "Internal error during verification")),
            )
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyRequest {
    /// Claim text or a single article URL
    pub input: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchVerifyResponse {
    pub results: Vec<VerificationResult>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub sources: Vec<String>,
}

fn parse_request(
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<VerifyRequest, (StatusCode, Json<ApiError>)> {
    payload.map(|Json(request)| request).map_err(|rejection| {
        warn!("Rejected request body: {}", rejection);
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ApiError::new("PAYLOAD_TOO_LARGE", rejection.body_text())),
            );
        }
        METRICS.invalid_claims.inc();
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("INVALID_CLAIM", rejection.body_text())),
        )
    })
}

/// Verify the lead claim of the input
///
/// POST /api/v1/verify
pub async fn verify(
    State(state): State<VerifyState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> ApiResult<VerificationResult> {
    let request = parse_request(payload)?;
    info!("Verify request: {} chars", request.input.len());

    state
        .engine
        .verify(&request.input)
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}

/// Verify every atomic claim of the input
///
/// POST /api/v1/verify/batch
pub async fn verify_batch(
    State(state): State<VerifyState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> ApiResult<BatchVerifyResponse> {
    let request = parse_request(payload)?;
    info!("Batch verify request: {} chars", request.input.len());

    let results = state
        .engine
        .verify_all(&request.input)
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(BatchVerifyResponse {
        total: results.len(),
        results,
    }))
}

/// GET /health
pub async fn health(State(state): State<VerifyState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        sources: state
            .engine
            .source_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS.export_prometheus(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;

    #[test]
    fn test_error_mapping() {
        let (status, Json(body)) = error_response(&VerifyError::InvalidClaim("empty".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "INVALID_CLAIM");

        let (status, Json(body)) = error_response(&ExtractionError::Status(404).into());
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.code, "EXTRACTION_FAILED");

        let (status, Json(body)) = error_response(&VerifyError::Internal("bad".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "INTERNAL_ERROR");
        assert!(!body.message.contains("bad"));
    }
}
