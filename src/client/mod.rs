pub mod display;
pub mod source;

pub use display::{DisplayState, FetchOutcome, ForecastDisplay, PendingFetch};
pub use source::{DEFAULT_FORECAST_URL, FetchError, ForecastDay, ForecastSource, HttpForecastSource};
