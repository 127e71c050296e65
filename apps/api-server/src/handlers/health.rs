//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
    pub timestamp: String,
}

/// GET /api/health
///
/// Probes storage with a group listing; a failing store answers 503.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let (status, storage, mut builder) = match state.groups.list().await {
        Ok(_) => ("ok", "up", HttpResponse::Ok()),
        Err(e) => {
            tracing::warn!(error = %e, "Storage health probe failed");
            ("degraded", "down", HttpResponse::ServiceUnavailable())
        }
    };

    builder.json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        storage,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
