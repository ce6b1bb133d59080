use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub struct HealthController;

impl HealthController {
    /// Liveness probe; deliberately outside the API-key middleware.
    /// GET /healthz
    pub async fn healthz() -> Json<HealthResponse> {
        Json(HealthResponse { status: "ok" })
    }
}
