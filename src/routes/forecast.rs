use axum::extract::State;
use axum::{Json, Router, routing::get};
use chrono::Local;

use crate::app::AppState;
use crate::forecast::{ForecastEntry, generate_forecast};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/weatherforecast", get(get_weather_forecast))
        .with_state(state)
}

/// Five days of made-up weather, starting tomorrow.
#[utoipa::path(
    get,
    path = "/weatherforecast",
    tag = "forecast",
    responses(
        (status = 200, description = "Forecast for the next five days", body = Vec<ForecastEntry>)
    )
)]
pub async fn get_weather_forecast(State(state): State<AppState>) -> Json<Vec<ForecastEntry>> {
    let today = Local::now().date_naive();
    let mut rng = state.rng.lock().await;
    let forecast = generate_forecast(&mut *rng, today, &state.forecast_config);
    log::trace!("generated forecast starting {}", today);
    Json(forecast)
}
