use std::path::Path;

use axum::body::to_bytes;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::header::{
    CONNECTION, CONTENT_LENGTH, HOST, HeaderName, PROXY_AUTHENTICATE, PROXY_AUTHORIZATION, TE,
    TRAILER, TRANSFER_ENCODING, UPGRADE,
};
use axum::response::{IntoResponse, Response};
use axum::Router;
use reqwest::redirect::Policy;
use tower_http::services::{ServeDir, ServeFile};

use crate::error::UpstreamError;
use crate::routes::dev_socket::{is_websocket_upgrade, relay_websocket, websocket_url};

const MAX_PROXY_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Serves the built client. Paths that are not files get the entry document so
/// the client side router can take over.
pub fn static_service(assets_dir: &Path) -> ServeDir<ServeFile> {
    log::debug!("serving assets from {}", assets_dir.display());
    ServeDir::new(assets_dir).fallback(ServeFile::new(assets_dir.join("index.html")))
}

#[derive(Clone, Debug)]
pub struct DevServerProxy {
    client: reqwest::Client,
    base_url: String,
}

impl DevServerProxy {
    pub fn new(base_url: String) -> Result<DevServerProxy, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .no_proxy()
            .build()?;
        Ok(DevServerProxy { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Forwards every request it receives to the front-end development server,
/// including the websocket the dev server uses for hot module reloading.
pub fn dev_proxy_routes(proxy: DevServerProxy) -> Router {
    log::info!("proxying unmatched requests to {}", proxy.base_url);
    Router::new()
        .fallback(forward_to_dev_server)
        .with_state(proxy)
}

fn strip_hop_by_hop_headers(headers: &mut HeaderMap) {
    for name in [
        CONNECTION,
        PROXY_AUTHENTICATE,
        PROXY_AUTHORIZATION,
        TE,
        TRAILER,
        TRANSFER_ENCODING,
        UPGRADE,
        CONTENT_LENGTH,
        HeaderName::from_static("keep-alive"),
    ] {
        headers.remove(name);
    }
}

async fn forward_to_dev_server(
    State(proxy): State<DevServerProxy>,
    request: Request,
) -> Result<Response, UpstreamError> {
    let (mut parts, body) = request.into_parts();
    let path = parts
        .uri
        .path_and_query()
        .map(|path_and_query| path_and_query.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    if is_websocket_upgrade(&parts.headers) {
        let upgrade = match WebSocketUpgrade::from_request_parts(&mut parts, &proxy).await {
            Ok(upgrade) => upgrade,
            Err(rejection) => return Ok(rejection.into_response()),
        };
        let url = websocket_url(&proxy.base_url, &path);
        return relay_websocket(upgrade, &parts.headers, url).await;
    }

    let url = format!("{}{}", proxy.base_url, path);

    let body = to_bytes(body, MAX_PROXY_BODY_BYTES)
        .await
        .map_err(|err| UpstreamError::new(format!("Failed to read request body: {err}")))?;

    let mut headers = parts.headers;
    strip_hop_by_hop_headers(&mut headers);
    headers.remove(HOST);

    log::debug!("forwarding {} {} to {}", parts.method, path, url);
    let upstream = proxy
        .client
        .request(parts.method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|err| {
            UpstreamError::new(format!("Failed to reach development server at {url}: {err}"))
        })?;

    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    strip_hop_by_hop_headers(&mut headers);
    let body = upstream.bytes().await.map_err(|err| {
        UpstreamError::new(format!("Failed to read response from {url}: {err}"))
    })?;

    let mut response = (status, body).into_response();
    response.headers_mut().extend(headers);
    Ok(response)
}
