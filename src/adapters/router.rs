use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::adapters::{
    controllers::{convert_controller::ConvertController, health_controller::HealthController},
    middleware::validate_api_key,
    state::AppState,
};

/// Assemble the full route table over an injected state.
///
/// Shared between `main` and the HTTP tests so both drive the identical
/// router, middleware included.
pub fn build_router(state: AppState) -> Router {
    // The framework-level body limit is disabled on purpose: the capped
    // upload writer is the single enforcement point for upload size.
    let convert_routes = Router::new()
        .route("/convert/upload", post(ConvertController::upload_file))
        .route("/convert/pdf-to-docx", post(ConvertController::pdf_to_docx))
        .route("/convert/docx-to-pdf", post(ConvertController::docx_to_pdf))
        .route("/convert/xlsx-to-pdf", post(ConvertController::xlsx_to_pdf))
        .layer(DefaultBodyLimit::disable())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            validate_api_key,
        ));

    Router::new()
        .route("/healthz", get(HealthController::healthz))
        .merge(convert_routes)
        .with_state(state)
}
