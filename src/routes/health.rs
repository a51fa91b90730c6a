use axum::{Router, routing::get};

pub fn routes() -> Router {
    Router::new().route("/health", get(get_health))
}

/// Liveness check.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = String)
    )
)]
pub async fn get_health() -> &'static str {
    "Healthy"
}
