//! Pluggable text codecs for wire payloads.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ProtocolError;

/// Converts typed values to and from wire text.
///
/// The channel layer is generic over the codec so the framing logic never
/// commits to a serialization format.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value to wire text.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Parses wire text into a typed value.
    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError>;
}

/// JSON codec backed by `serde_json`.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}
