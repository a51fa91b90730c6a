use axum::{Json, Router, routing::get};
use utoipa::OpenApi;

use crate::forecast::ForecastEntry;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::forecast::get_weather_forecast,
        crate::routes::health::get_health,
    ),
    components(schemas(ForecastEntry)),
    tags(
        (name = "forecast", description = "Synthetic weather forecast"),
        (name = "health", description = "Liveness check"),
    )
)]
pub struct ApiDoc;

pub fn routes() -> Router {
    Router::new().route("/openapi/v1.json", get(get_openapi))
}

async fn get_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
