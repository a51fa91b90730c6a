use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::http::header::{SEC_WEBSOCKET_PROTOCOL, UPGRADE};
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as UpstreamMessage;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::CloseFrame as UpstreamCloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::error::UpstreamError;

type UpstreamSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub fn is_websocket_upgrade(headers: &HeaderMap) -> bool {
    headers
        .get(UPGRADE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("websocket"))
}

/// Maps the dev server's http(s) base onto ws(s) and appends the request path.
pub fn websocket_url(base_url: &str, path_and_query: &str) -> String {
    let base = if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base_url.to_string()
    };
    format!("{base}{path_and_query}")
}

/// Opens the socket to the dev server first, then upgrades the incoming
/// connection and pumps messages both ways until either side closes. The
/// subprotocol the dev server picked (vite uses `vite-hmr`) is echoed to the
/// browser.
pub async fn relay_websocket(
    upgrade: WebSocketUpgrade,
    headers: &HeaderMap,
    url: String,
) -> Result<Response, UpstreamError> {
    let mut request = url.as_str().into_client_request().map_err(|err| {
        UpstreamError::new(format!("Invalid websocket url {url}: {err}"))
    })?;
    if let Some(protocols) = headers.get(SEC_WEBSOCKET_PROTOCOL) {
        request
            .headers_mut()
            .insert(SEC_WEBSOCKET_PROTOCOL, protocols.clone());
    }

    let (upstream, response) = connect_async(request).await.map_err(|err| {
        UpstreamError::new(format!("Failed to open websocket to {url}: {err}"))
    })?;

    let mut upgrade = upgrade;
    if let Some(protocol) = response
        .headers()
        .get(SEC_WEBSOCKET_PROTOCOL)
        .and_then(|value| value.to_str().ok())
    {
        upgrade = upgrade.protocols([protocol.to_string()]);
    }

    log::debug!("relaying websocket to {}", url);
    Ok(upgrade
        .on_upgrade(move |socket| pump(socket, upstream))
        .into_response())
}

async fn pump(client: WebSocket, upstream: UpstreamSocket) {
    let (mut client_tx, mut client_rx) = client.split();
    let (mut upstream_tx, mut upstream_rx) = upstream.split();

    let to_upstream = async {
        while let Some(Ok(message)) = client_rx.next().await {
            let closing = matches!(message, Message::Close(_));
            if upstream_tx.send(into_upstream(message)).await.is_err() || closing {
                break;
            }
        }
    };
    let to_client = async {
        while let Some(Ok(message)) = upstream_rx.next().await {
            let Some(message) = into_client(message) else {
                continue;
            };
            let closing = matches!(message, Message::Close(_));
            if client_tx.send(message).await.is_err() || closing {
                break;
            }
        }
    };

    tokio::select! {
        _ = to_upstream => log::debug!("browser closed dev server websocket"),
        _ = to_client => log::debug!("dev server closed websocket"),
    }
}

fn into_upstream(message: Message) -> UpstreamMessage {
    match message {
        Message::Text(text) => UpstreamMessage::Text(text.as_str().to_owned().into()),
        Message::Binary(data) => UpstreamMessage::Binary(data),
        Message::Ping(data) => UpstreamMessage::Ping(data),
        Message::Pong(data) => UpstreamMessage::Pong(data),
        Message::Close(frame) => UpstreamMessage::Close(frame.map(|frame| UpstreamCloseFrame {
            code: CloseCode::from(frame.code),
            reason: frame.reason.as_str().to_owned().into(),
        })),
    }
}

// Raw frames only show up when writing, never when reading.
fn into_client(message: UpstreamMessage) -> Option<Message> {
    match message {
        UpstreamMessage::Text(text) => Some(Message::Text(text.as_str().to_owned().into())),
        UpstreamMessage::Binary(data) => Some(Message::Binary(data)),
        UpstreamMessage::Ping(data) => Some(Message::Ping(data)),
        UpstreamMessage::Pong(data) => Some(Message::Pong(data)),
        UpstreamMessage::Close(frame) => Some(Message::Close(frame.map(|frame| CloseFrame {
            code: u16::from(frame.code),
            reason: frame.reason.as_str().to_owned().into(),
        }))),
        UpstreamMessage::Frame(_) => None,
    }
}
