use thiserror::Error;

/// Errors produced while encoding or decoding wire payloads.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A value could not be serialized for the wire.
    #[cfg(feature = "json")]
    #[error("failed to encode payload: {0}")]
    Encode(#[source] serde_json::Error),

    /// Incoming text could not be parsed as the expected type.
    #[cfg(feature = "json")]
    #[error("failed to decode payload: {0}")]
    Decode(#[source] serde_json::Error),

    /// A frame parsed but violated the channel contract.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
