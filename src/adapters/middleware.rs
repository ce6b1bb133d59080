use axum::{
    body::Body,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

use crate::{application::error::ApplicationError, domain::config::settings::Settings};

/// Middleware to validate the X-API-Key header on conversion routes.
///
/// Missing, non-UTF-8, and mismatched keys all collapse into the same 401
/// so the response leaks nothing about which check failed.
pub async fn validate_api_key(
    State(settings): State<Arc<Settings>>,
    headers: HeaderMap,
    request: Request<Body>,
    next: Next,
) -> Response {
    match headers.get("X-API-Key") {
        Some(header_value) => match header_value.to_str() {
            Ok(provided_key) if provided_key == settings.api_key => next.run(request).await,
            Ok(_) => {
                warn!("Invalid key provided in X-API-Key header");
                ApplicationError::Unauthorized.into_response()
            }
            Err(_) => {
                warn!("X-API-Key header contains invalid UTF-8");
                ApplicationError::Unauthorized.into_response()
            }
        },
        None => {
            warn!("X-API-Key header is missing");
            ApplicationError::Unauthorized.into_response()
        }
    }
}
