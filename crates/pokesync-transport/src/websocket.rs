//! Client-side WebSocket transport using `tokio-tungstenite`.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::{Connection, ConnectionId, Transport, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A WebSocket-based [`Transport`] that dials a fixed broker endpoint.
///
/// When a bearer credential is configured, it is attached to the upgrade
/// request as an `Authorization: Bearer <token>` header. Connecting without
/// a credential is permitted (anonymous connection).
pub struct WebSocketTransport {
    url: String,
    bearer: Option<String>,
}

impl WebSocketTransport {
    /// Creates a transport targeting the given `ws://` or `wss://` URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            bearer: None,
        }
    }

    /// Attaches a bearer credential to every connect attempt.
    #[must_use]
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Returns the endpoint URL this transport dials.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn connect(&self) -> Result<Self::Connection, Self::Error> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(TransportError::ConnectFailed)?;

        if let Some(token) = &self.bearer {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| TransportError::InvalidCredential)?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        let (ws, _) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(TransportError::ConnectFailed)?;

        let id = ConnectionId::next();
        tracing::debug!(%id, url = %self.url, "WebSocket connection established");

        Ok(WebSocketConnection { id, ws })
    }
}

/// A single established WebSocket connection.
pub struct WebSocketConnection {
    id: ConnectionId,
    ws: WsStream,
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&mut self, text: &str) -> Result<(), Self::Error> {
        self.ws
            .send(Message::Text(text.to_owned().into()))
            .await
            .map_err(TransportError::SendFailed)
    }

    async fn recv(&mut self) -> Result<Option<String>, Self::Error> {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(
                        String::from_utf8_lossy(&data).into_owned(),
                    ));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => return Err(TransportError::ReceiveFailed(e)),
            }
        }
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        match self.ws.close(None).await {
            Ok(()) => Ok(()),
            // Closing an already-closed socket is not an error.
            Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(TransportError::SendFailed(e)),
        }
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
