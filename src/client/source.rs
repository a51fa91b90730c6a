use std::error::Error;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::forecast::celsius_to_fahrenheit;

pub const DEFAULT_FORECAST_URL: &str = "http://localhost:3000/weatherforecast";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("{0}")]
    Network(String),
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("{0}")]
    Malformed(String),
}

/// A forecast day as the client sees it. The server may leave out the
/// summary, and Fahrenheit is always computed locally.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub temperature_c: i32,
    #[serde(default)]
    pub summary: Option<String>,
}

impl ForecastDay {
    pub fn temperature_f(&self) -> i64 {
        celsius_to_fahrenheit(self.temperature_c)
    }

    pub fn summary_label(&self) -> &str {
        self.summary.as_deref().unwrap_or("")
    }
}

/// Formats an error together with everything in its `source()` chain, so the
/// root cause (refused connection, failed lookup) is part of the message.
pub fn error_chain_message(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        if !message.ends_with(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}

#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<ForecastDay>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpForecastSource {
    client: Client,
    url: String,
}

impl HttpForecastSource {
    pub fn new(url: String) -> Result<HttpForecastSource, reqwest::Error> {
        Ok(HttpForecastSource {
            client: Client::builder().build()?,
            url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ForecastSource for HttpForecastSource {
    async fn fetch(&self) -> Result<Vec<ForecastDay>, FetchError> {
        log::info!("Fetching weather forecast from {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|err| FetchError::Network(error_chain_message(&err)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| FetchError::Network(error_chain_message(&err)))?;
        serde_json::from_slice(&body).map_err(|err| {
            log::error!("Failed to parse weather forecast from backend: {}", err);
            FetchError::Malformed(err.to_string())
        })
    }
}
