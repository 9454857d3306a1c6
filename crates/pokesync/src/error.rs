use thiserror::Error;

use pokesync_protocol::ProtocolError;
use pokesync_transport::TransportError;

/// Unified error type for the room-sync channel.
///
/// Wraps the layer-specific errors so callers can match on one type.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Error from the transport layer.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Error from the protocol layer.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
