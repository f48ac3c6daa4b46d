//! Conversion and validation endpoints

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use tracing::{error, info, instrument, warn};

use crate::services::{ConvertError, RenderedArtifacts};
use crate::state::AppState;
use crate::types::{ConvertRequest, ConvertResponse, ErrorCode, ErrorResponse, ValidateResponse};

/// Create conversion routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/convert", post(convert))
        .route("/validate", post(validate))
}

/// Convert a native proof and verification key
/// POST /api/v1/convert
#[instrument(skip(state, request), fields(request_id = %uuid::Uuid::new_v4()))]
async fn convert(State(state): State<AppState>, Json(request): Json<ConvertRequest>) -> Response {
    info!(
        public_inputs = request.public_inputs.len(),
        "Received conversion request"
    );

    let output = match state.converter().convert(
        &request.proof,
        &request.verification_key,
        &request.public_inputs,
    ) {
        Ok(output) => output,
        Err(e) => {
            state.record_conversion(false);
            warn!(code = ?e.code(), error = %e, "Conversion rejected");
            return conversion_error(&e).into_response();
        }
    };

    let rendered = match RenderedArtifacts::render(&output) {
        Ok(rendered) => rendered,
        Err(e) => {
            state.record_conversion(false);
            error!(error = %e, "Failed to render artifacts");
            let body = ErrorResponse {
                code: ErrorCode::InternalError,
                message: e.to_string(),
                details: None,
            };
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
        }
    };

    state.record_conversion(true);

    let response = ConvertResponse {
        proof_digest: rendered.proof_digest(),
        verification_key_digest: rendered.verification_key_digest(),
        proof: output.proof,
        verification_key: output.verification_key,
    };

    info!(
        proof_digest = %response.proof_digest,
        verification_key_digest = %response.verification_key_digest,
        "Conversion completed"
    );

    (StatusCode::OK, Json(response)).into_response()
}

/// Check a native proof and verification key without returning artifacts
/// POST /api/v1/validate
#[instrument(skip(state, request))]
async fn validate(
    State(state): State<AppState>,
    Json(request): Json<ConvertRequest>,
) -> impl IntoResponse {
    let result = state.converter().convert(
        &request.proof,
        &request.verification_key,
        &request.public_inputs,
    );

    let (status, code, error) = match result {
        Ok(_) => (StatusCode::OK, None, None),
        Err(e) => {
            info!(code = ?e.code(), error = %e, "Validation failed");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Some(e.code()),
                Some(e.to_string()),
            )
        }
    };

    (
        status,
        Json(ValidateResponse {
            valid: error.is_none(),
            public_inputs: request.public_inputs.len(),
            ic_points: request.verification_key.ic.len(),
            code,
            error,
        }),
    )
}

fn conversion_error(e: &ConvertError) -> (StatusCode, Json<ErrorResponse>) {
    let details = match e {
        ConvertError::StructuralMismatch(mismatch) => json!({
            "expected": mismatch.expected(),
            "actual": mismatch.actual(),
        }),
        ConvertError::MalformedFieldElement { location, .. } => json!({
            "location": location,
        }),
        ConvertError::MalformedPoint {
            location,
            expected,
            actual,
        } => json!({
            "location": location,
            "expected": expected,
            "actual": actual,
        }),
    };

    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse {
            code: e.code(),
            message: e.to_string(),
            details: Some(details),
        }),
    )
}
