//! Payloads carried on the per-room topic.
//!
//! A [`RoomSnapshot`] is the full authoritative state of the room at the
//! moment of delivery, never a delta. Receivers must replace their local
//! copy wholesale.
//!
//! Field names follow the backend's room DTOs (camelCase JSON).

use serde::{Deserialize, Deserializer, Serialize};

use crate::RoomId;

/// One player in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPlayer {
    /// Player identity.
    pub id: u64,
    /// Display handle.
    pub username: String,
    /// Avatar glyph, when the player has one set.
    #[serde(default)]
    pub avatar: Option<String>,
    /// Whether this player created (and can start) the room.
    #[serde(default)]
    pub is_host: bool,
}

/// Full room state as broadcast on the room topic.
///
/// `players` is required: a snapshot without a player list is malformed,
/// not a room with zero players. `code` accepts both string and numeric
/// JSON because the backend serializes it as a number while clients treat
/// it as a display string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    /// Room identifier.
    pub id: RoomId,
    /// Six-digit join code.
    #[serde(default, deserialize_with = "code_from_string_or_number")]
    pub code: String,
    /// Number of quiz rounds.
    #[serde(default)]
    pub rounds: u32,
    /// Maximum players allowed in the room.
    #[serde(default)]
    pub max_players: u32,
    /// Ordered list of players currently in the room.
    pub players: Vec<RoomPlayer>,
}

/// Server-pushed game-start signal, broadcast on the room topic.
///
/// Every client arms its countdown from this broadcast, so all lobbies
/// count down together instead of each trusting a local timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStart {
    /// Seconds until the game begins.
    pub starts_in: u32,
}

/// A message delivered on the room topic.
///
/// Untagged: a body with `startsIn` is a start signal, a body with
/// `id` + `players` is a snapshot. Anything else fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RoomMessage {
    /// The host started the game; counts down on every client.
    Start(GameStart),
    /// Authoritative room state; replaces the local copy.
    Snapshot(RoomSnapshot),
}

fn code_from_string_or_number<'de, D>(
    deserializer: D,
) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CodeRepr {
        Text(String),
        Number(u64),
    }

    Ok(match CodeRepr::deserialize(deserializer)? {
        CodeRepr::Text(s) => s,
        CodeRepr::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_parses_backend_payload() {
        let json = r#"{
            "id": 42,
            "code": "773311",
            "players": [{"id": 1, "username": "Ash", "isHost": true}]
        }"#;
        let snapshot: RoomSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snapshot.id, RoomId(42));
        assert_eq!(snapshot.code, "773311");
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.players[0].username, "Ash");
        assert!(snapshot.players[0].is_host);
    }

    #[test]
    fn test_snapshot_code_accepts_numeric_json() {
        // The backend serializes the join code as a long.
        let json = r#"{"id": 1, "code": 773311, "players": []}"#;
        let snapshot: RoomSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.code, "773311");
    }

    #[test]
    fn test_snapshot_with_empty_players_is_valid() {
        let json = r#"{"id": 1, "code": "000000", "players": []}"#;
        let snapshot: RoomSnapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.players.is_empty());
    }

    #[test]
    fn test_snapshot_without_players_is_malformed() {
        // A missing player list is a parse failure, not an empty room.
        let json = r#"{"id": 1, "code": "000000"}"#;
        let result: Result<RoomSnapshot, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_snapshot_full_fields() {
        let json = r#"{
            "id": 7,
            "code": "123456",
            "rounds": 5,
            "maxPlayers": 4,
            "players": [
                {"id": 1, "username": "Ash", "avatar": "🔥", "isHost": true},
                {"id": 2, "username": "Misty", "avatar": "💧"}
            ]
        }"#;
        let snapshot: RoomSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snapshot.rounds, 5);
        assert_eq!(snapshot.max_players, 4);
        assert_eq!(snapshot.players[1].avatar.as_deref(), Some("💧"));
        assert!(!snapshot.players[1].is_host, "isHost defaults to false");
    }

    #[test]
    fn test_player_serializes_as_camel_case() {
        let player = RoomPlayer {
            id: 1,
            username: "Ash".into(),
            avatar: None,
            is_host: true,
        };
        let json: serde_json::Value = serde_json::to_value(&player).unwrap();
        assert_eq!(json["isHost"], true);
        assert!(json.get("is_host").is_none());
    }

    #[test]
    fn test_room_message_start_variant() {
        let json = r#"{"startsIn": 3}"#;
        let msg: RoomMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg, RoomMessage::Start(GameStart { starts_in: 3 }));
    }

    #[test]
    fn test_room_message_snapshot_variant() {
        let json = r#"{"id": 42, "code": "773311", "players": []}"#;
        let msg: RoomMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, RoomMessage::Snapshot(_)));
    }

    #[test]
    fn test_room_message_rejects_unrelated_payload() {
        let json = r#"{"greeting": "hello"}"#;
        let result: Result<RoomMessage, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
