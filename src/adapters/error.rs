use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::application::error::ApplicationError;

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApplicationError::BadRequest(msg) => {
                warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            }
            ApplicationError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Invalid API key".to_string())
            }
            ApplicationError::UnsupportedInput(msg) => {
                warn!("Unsupported input: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            }
            ApplicationError::PayloadTooLarge(limit) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("File too large (> {} bytes)", limit),
            ),
            ApplicationError::ConversionFailed(msg) => {
                error!("Conversion failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Conversion failed: {}", msg),
                )
            }
            ApplicationError::InternalError(msg) => {
                error!("Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "detail": detail,
        }));

        (status, body).into_response()
    }
}
