//! Local lobby state, kept in sync by room snapshots.
//!
//! The broker is authoritative: every snapshot carries the complete
//! roster, and [`LobbyState::apply_snapshot`] replaces the local copy
//! wholesale. There is no merging and no per-player patching, so the
//! lobby can never drift from what the server believes.

use pokesync_protocol::{
    GameStart, RoomId, RoomMessage, RoomPlayer, RoomSnapshot,
};

/// The client's view of one room lobby.
#[derive(Debug, Clone)]
pub struct LobbyState {
    room_id: RoomId,
    code: String,
    rounds: u32,
    max_players: u32,
    players: Vec<RoomPlayer>,
}

impl LobbyState {
    /// Creates lobby state from the first snapshot of a room.
    pub fn new(snapshot: &RoomSnapshot) -> Self {
        Self {
            room_id: snapshot.id,
            code: snapshot.code.clone(),
            rounds: snapshot.rounds,
            max_players: snapshot.max_players,
            players: snapshot.players.clone(),
        }
    }

    /// Replaces the local state with a fresh snapshot.
    pub fn apply_snapshot(&mut self, snapshot: RoomSnapshot) {
        self.room_id = snapshot.id;
        self.code = snapshot.code;
        self.rounds = snapshot.rounds;
        self.max_players = snapshot.max_players;
        self.players = snapshot.players;
        tracing::debug!(
            room = %self.room_id,
            players = self.players.len(),
            "roster replaced"
        );
    }

    /// Feeds one room-topic message into the lobby.
    ///
    /// Snapshots update the roster in place; a start signal is returned
    /// to the caller so it can arm the countdown.
    pub fn on_message(&mut self, message: RoomMessage) -> Option<GameStart> {
        match message {
            RoomMessage::Snapshot(snapshot) => {
                self.apply_snapshot(snapshot);
                None
            }
            RoomMessage::Start(start) => Some(start),
        }
    }

    /// The room this lobby belongs to.
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// The join code players use to enter the room.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Number of quiz rounds configured for the room.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// The current roster, in server order.
    pub fn players(&self) -> &[RoomPlayer] {
        &self.players
    }

    /// How many players are currently in the room.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// The host, if present in the roster.
    pub fn host(&self) -> Option<&RoomPlayer> {
        self.players.iter().find(|p| p.is_host)
    }

    /// Whether the given player is in the roster.
    pub fn has_player(&self, id: u64) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    /// Whether the given player is the room host.
    pub fn is_host(&self, id: u64) -> bool {
        self.host().is_some_and(|p| p.id == id)
    }

    /// Whether the room has reached its configured capacity.
    ///
    /// A room that never advertised a capacity is never full.
    pub fn is_full(&self) -> bool {
        self.max_players > 0 && self.players.len() as u32 >= self.max_players
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: u64, username: &str, is_host: bool) -> RoomPlayer {
        RoomPlayer {
            id,
            username: username.into(),
            avatar: None,
            is_host,
        }
    }

    fn snapshot(players: Vec<RoomPlayer>) -> RoomSnapshot {
        RoomSnapshot {
            id: RoomId(42),
            code: "773311".into(),
            rounds: 5,
            max_players: 4,
            players,
        }
    }

    #[test]
    fn test_new_copies_the_snapshot() {
        let lobby = LobbyState::new(&snapshot(vec![player(1, "Ash", true)]));

        assert_eq!(lobby.room_id(), RoomId(42));
        assert_eq!(lobby.code(), "773311");
        assert_eq!(lobby.rounds(), 5);
        assert_eq!(lobby.player_count(), 1);
        assert_eq!(lobby.host().map(|p| p.id), Some(1));
    }

    #[test]
    fn test_apply_snapshot_replaces_roster_wholesale() {
        let mut lobby =
            LobbyState::new(&snapshot(vec![player(1, "Ash", true)]));

        lobby.apply_snapshot(snapshot(vec![
            player(2, "Misty", true),
            player(3, "Brock", false),
        ]));

        // Ash is gone; the old roster does not linger.
        assert!(!lobby.has_player(1));
        assert_eq!(lobby.player_count(), 2);
        assert_eq!(lobby.host().map(|p| p.id), Some(2));
    }

    #[test]
    fn test_empty_snapshot_empties_the_lobby() {
        let mut lobby =
            LobbyState::new(&snapshot(vec![player(1, "Ash", true)]));

        lobby.apply_snapshot(snapshot(vec![]));

        assert_eq!(lobby.player_count(), 0);
        assert!(lobby.host().is_none());
    }

    #[test]
    fn test_is_full_respects_capacity() {
        let mut lobby = LobbyState::new(&snapshot(vec![
            player(1, "Ash", true),
            player(2, "Misty", false),
            player(3, "Brock", false),
        ]));
        assert!(!lobby.is_full());

        lobby.apply_snapshot(snapshot(vec![
            player(1, "Ash", true),
            player(2, "Misty", false),
            player(3, "Brock", false),
            player(4, "Gary", false),
        ]));
        assert!(lobby.is_full());
    }

    #[test]
    fn test_zero_capacity_is_never_full() {
        let mut snap = snapshot(vec![player(1, "Ash", true)]);
        snap.max_players = 0;
        let lobby = LobbyState::new(&snap);
        assert!(!lobby.is_full());
    }

    #[test]
    fn test_on_message_routes_snapshot_and_start() {
        let mut lobby = LobbyState::new(&snapshot(vec![]));

        let none = lobby.on_message(RoomMessage::Snapshot(snapshot(vec![
            player(1, "Ash", true),
        ])));
        assert!(none.is_none());
        assert_eq!(lobby.player_count(), 1);

        let start = lobby
            .on_message(RoomMessage::Start(GameStart { starts_in: 3 }));
        assert_eq!(start, Some(GameStart { starts_in: 3 }));
    }
}
