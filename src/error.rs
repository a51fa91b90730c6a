use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;

/// Failure talking to a service the host forwards requests to.
#[derive(Debug)]
pub struct UpstreamError {
    pub message: String,
}

impl UpstreamError {
    pub fn new(message: String) -> UpstreamError {
        UpstreamError { message }
    }
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        error!("Error encountered while forwarding request: {}", self.message);
        StatusCode::BAD_GATEWAY.into_response()
    }
}
