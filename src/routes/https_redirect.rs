use axum::Router;
use axum::extract::State;
use axum::http::header::HOST;
use axum::http::uri::Authority;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Redirect, Response};

/// Builds the https address for a plain http request. `host` is the request's
/// Host header; any port on it is replaced by `https_port`, which is left out
/// when it is the default 443.
pub fn https_location(host: &str, https_port: u16, path_and_query: &str) -> Option<String> {
    let authority: Authority = host.parse().ok()?;
    let host = authority.host();
    Some(if https_port == 443 {
        format!("https://{host}{path_and_query}")
    } else {
        format!("https://{host}:{https_port}{path_and_query}")
    })
}

/// Answers every request with a permanent redirect to the https listener.
pub fn redirect_routes(https_port: u16) -> Router {
    Router::new()
        .fallback(redirect_to_https)
        .with_state(https_port)
}

async fn redirect_to_https(
    State(https_port): State<u16>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let path_and_query = uri
        .path_and_query()
        .map(|path_and_query| path_and_query.as_str())
        .unwrap_or("/");
    let location = headers
        .get(HOST)
        .and_then(|host| host.to_str().ok())
        .and_then(|host| https_location(host, https_port, path_and_query));
    match location {
        Some(location) => {
            log::debug!("redirecting {} to {}", uri, location);
            Redirect::permanent(&location).into_response()
        }
        None => (StatusCode::BAD_REQUEST, "Missing or invalid Host header").into_response(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::http::header::LOCATION;
    use tower::ServiceExt;

    #[test]
    fn test_https_location() {
        assert_eq!(
            https_location("example.com:8080", 8443, "/weatherforecast?x=1").as_deref(),
            Some("https://example.com:8443/weatherforecast?x=1")
        );
        assert_eq!(
            https_location("example.com", 443, "/").as_deref(),
            Some("https://example.com/")
        );
        assert_eq!(
            https_location("[::1]:80", 3000, "/health").as_deref(),
            Some("https://[::1]:3000/health")
        );
        assert_eq!(https_location("bad host", 443, "/"), None);
    }

    #[tokio::test]
    async fn test_redirect_is_permanent_and_keeps_method() {
        let request = Request::builder()
            .method("POST")
            .uri("/forecasts/today?units=c")
            .header(HOST, "localhost:8080")
            .body(Body::empty())
            .unwrap();
        let response = redirect_routes(3000).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(
            response.headers()[LOCATION],
            "https://localhost:3000/forecasts/today?units=c"
        );
    }

    #[tokio::test]
    async fn test_missing_host_is_bad_request() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = redirect_routes(3000).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
