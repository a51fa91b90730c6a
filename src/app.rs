use axum::Router;
use axum::http::HeaderValue;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{CorsConfig, Environment, HostConfig, running_in_container};
use crate::forecast::{ForecastConfig, ForecastConfigError};
use crate::routes::spa::{DevServerProxy, dev_proxy_routes, static_service};
use crate::routes::{forecast, health, openapi};

// Anything that goes in here must be a handle or pointer that can be cloned.
// The underlying state itself should be shared.
#[derive(Clone)]
pub struct AppState {
    pub forecast_config: ForecastConfig,
    pub rng: Arc<Mutex<StdRng>>,
}

impl AppState {
    pub fn new(forecast_config: ForecastConfig) -> Result<AppState, ForecastConfigError> {
        forecast_config.validate()?;
        Ok(AppState {
            forecast_config,
            rng: Arc::new(Mutex::new(StdRng::from_os_rng())),
        })
    }

    /// Deterministic state, two apps created with the same seed hand out the
    /// same forecasts.
    pub fn with_seed(
        forecast_config: ForecastConfig,
        seed: u64,
    ) -> Result<AppState, ForecastConfigError> {
        forecast_config.validate()?;
        Ok(AppState {
            forecast_config,
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        })
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("could not create development server proxy")]
    ProxyClient {
        #[from]
        source: reqwest::Error,
    },
    #[error("invalid forecast settings")]
    InvalidForecast {
        #[from]
        source: ForecastConfigError,
    },
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(origin) => Some(origin),
            Err(_) => {
                log::warn!("ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_headers(AllowHeaders::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_credentials(true)
}

pub fn create_app(environment: Environment, config: &HostConfig) -> Result<Router, AppError> {
    create_app_with_state(environment, config, AppState::new(config.forecast)?)
}

pub fn create_app_with_state(
    environment: Environment,
    config: &HostConfig,
    state: AppState,
) -> Result<Router, AppError> {
    let mut app = Router::new()
        .merge(forecast::routes(state))
        .merge(health::routes());

    app = match environment {
        Environment::Development => {
            let dev_server_url = config.spa.resolve_dev_server_url(running_in_container());
            app.merge(openapi::routes())
                .fallback_service(dev_proxy_routes(DevServerProxy::new(dev_server_url)?))
        }
        Environment::Production => app.fallback_service(static_service(&config.spa.assets_dir)),
    };

    Ok(app
        .layer(cors_layer(&config.cors))
        .layer(TraceLayer::new_for_http()))
}
