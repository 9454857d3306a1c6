//! Core wire types for the room-sync channel.
//!
//! Every frame exchanged with the broker is one of the [`Frame`] variants,
//! serialized as internally tagged JSON. Message bodies are themselves
//! pre-serialized JSON text; the framing layer never interprets them.

use serde::{Deserialize, Serialize};

use std::fmt;

/// A unique identifier for a multiplayer room.
///
/// Newtype over `u64` so a room id can't be confused with a player id.
/// `#[serde(transparent)]` makes it serialize as a plain number, matching
/// the backend's room DTOs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

/// A hierarchical broadcast channel name on the broker.
///
/// Any connected party may subscribe to a topic to receive messages
/// published to it. The per-room topic follows the shape
/// `/topic/room/<roomId>`; use [`Topic::room`] to build it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    /// Creates a topic from an arbitrary channel name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the per-room topic for the given room.
    pub fn room(room_id: RoomId) -> Self {
        Self(format!("/topic/room/{}", room_id.0))
    }

    /// Returns the topic as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Topic {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

/// A frame on the wire, in either direction.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
/// `{ "type": "Subscribe", "topic": "/topic/room/42" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Frame {
    /// Client → Broker: "deliver messages on this topic to me."
    Subscribe { topic: Topic },

    /// Client → Broker: publish a serialized body to a destination.
    Send { destination: Topic, body: String },

    /// Broker → Client: a message published on a subscribed topic.
    Message { topic: Topic, body: String },
}

#[cfg(test)]
mod tests {
    //! The broker contract defines exact JSON shapes; these verify that
    //! our serde attributes produce them.

    use super::*;

    #[test]
    fn test_room_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&RoomId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_room_id_display() {
        assert_eq!(RoomId(3).to_string(), "R-3");
    }

    #[test]
    fn test_topic_serializes_as_plain_string() {
        let json = serde_json::to_string(&Topic::new("/topic/room/7")).unwrap();
        assert_eq!(json, "\"/topic/room/7\"");
    }

    #[test]
    fn test_room_topic_shape() {
        assert_eq!(Topic::room(RoomId(42)).as_str(), "/topic/room/42");
    }

    #[test]
    fn test_frame_subscribe_json_format() {
        let frame = Frame::Subscribe {
            topic: Topic::room(RoomId(42)),
        };
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["type"], "Subscribe");
        assert_eq!(json["topic"], "/topic/room/42");
    }

    #[test]
    fn test_frame_send_json_format() {
        let frame = Frame::Send {
            destination: Topic::new("/app/room/42/chat"),
            body: "{\"text\":\"hi\"}".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["type"], "Send");
        assert_eq!(json["destination"], "/app/room/42/chat");
        assert_eq!(json["body"], "{\"text\":\"hi\"}");
    }

    #[test]
    fn test_frame_message_round_trip() {
        let frame = Frame::Message {
            topic: Topic::room(RoomId(1)),
            body: "{}".into(),
        };
        let text = serde_json::to_string(&frame).unwrap();
        let decoded: Frame = serde_json::from_str(&text).unwrap();
        assert_eq!(frame, decoded);
    }

    #[test]
    fn test_decode_garbage_returns_error() {
        let result: Result<Frame, _> = serde_json::from_str("not json at all");
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_unknown_frame_type_returns_error() {
        let unknown = r#"{"type": "Teleport", "topic": "/topic/room/1"}"#;
        let result: Result<Frame, _> = serde_json::from_str(unknown);
        assert!(result.is_err());
    }
}
