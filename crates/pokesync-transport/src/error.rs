/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Dialing the broker endpoint failed.
    #[cfg(feature = "websocket")]
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] tokio_tungstenite::tungstenite::Error),

    /// Sending a frame failed.
    #[cfg(feature = "websocket")]
    #[error("send failed: {0}")]
    SendFailed(#[source] tokio_tungstenite::tungstenite::Error),

    /// Receiving a frame failed.
    #[cfg(feature = "websocket")]
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] tokio_tungstenite::tungstenite::Error),

    /// The bearer credential cannot be carried in a request header.
    #[error("bearer credential is not a valid header value")]
    InvalidCredential,

    /// The connection was closed.
    #[error("connection closed: {0}")]
    Closed(String),
}
