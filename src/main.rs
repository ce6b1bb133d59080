mod adapters;
mod application;
mod domain;
mod services;

use std::sync::Arc;

use adapters::{router::build_router, state::AppState};
use domain::{config::settings::Settings, models::job::ConversionKind};
use services::{create_converter_service, Workspace};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // LOG_LEVEL takes an env-filter expression ("info", "sdc_service=debug", ...)
    let filter = std::env::var("LOG_LEVEL")
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = Arc::new(Settings::from_env());

    if settings.uses_default_api_key() {
        tracing::warn!(
            "API_KEY is the insecure placeholder; override it before exposing this service"
        );
    }

    // Configure CORS
    let cors = if let Ok(allowed_origins) = std::env::var("CORS_ALLOWED_ORIGINS") {
        // Parse comma-separated origins
        let origins: Vec<_> = allowed_origins
            .split(',')
            .map(|s| s.trim().parse().expect("Invalid CORS origin"))
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Allow all origins if not specified (only for development)
        CorsLayer::permissive()
    };

    let workspace = Arc::new(
        Workspace::new(settings.upload_dir.clone(), settings.output_dir.clone())
            .expect("ERROR: Failed to create scratch directories. Check UPLOAD_DIR/OUTPUT_DIR."),
    );
    tracing::info!(
        upload_dir = %settings.upload_dir.display(),
        output_dir = %settings.output_dir.display(),
        max_upload_bytes = settings.max_upload_bytes,
        "Workspace ready"
    );

    let app_state = AppState {
        settings: settings.clone(),
        workspace,
        pdf_to_docx: create_converter_service(ConversionKind::PdfToDocx, &settings),
        office_to_pdf: create_converter_service(ConversionKind::DocxToPdf, &settings),
    };

    let router = build_router(app_state).layer(cors);

    // Start the server
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", settings.port))
        .await
        .expect("Failed to bind to port");

    tracing::info!("Server listening on 0.0.0.0:{}", settings.port);

    axum::serve(listener, router)
        .await
        .expect("Failed to start server");
}
