//! Terminal lobby client.
//!
//! Connects to a sync broker, follows one room's roster, and counts down
//! when the host starts the game.
//!
//! ```text
//! POKESYNC_URL=ws://localhost:8080/ws POKESYNC_TOKEN=<jwt> cargo run -p lobby -- 42
//! ```

use pokesync::prelude::*;
use pokesync_lobby::{Countdown, LobbyState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let url = std::env::var("POKESYNC_URL")
        .unwrap_or_else(|_| "ws://localhost:8080/ws".into());
    let room_id = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .map(RoomId)
        .unwrap_or(RoomId(1));

    let mut config = ChannelConfig::new(url);
    if let Ok(token) = std::env::var("POKESYNC_TOKEN") {
        config = config.with_token(token);
    }

    let mut channel = RoomChannel::new(config);
    let conn = channel.connect();

    let mut events = conn.events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ChannelEvent::Connected => tracing::info!("channel up"),
                ChannelEvent::Disconnected => {
                    tracing::warn!("channel down, reconnecting")
                }
            }
        }
    });

    let mut room = conn.subscribe::<RoomMessage>(Topic::room(room_id));
    let mut lobby: Option<LobbyState> = None;

    println!("waiting for room {room_id}...");
    while let Some(message) = room.recv().await {
        match message {
            RoomMessage::Snapshot(snapshot) => {
                let state = match lobby.take() {
                    Some(mut state) => {
                        state.apply_snapshot(snapshot);
                        state
                    }
                    None => LobbyState::new(&snapshot),
                };
                print_roster(&state);
                lobby = Some(state);
            }
            RoomMessage::Start(start) => {
                println!("game starting in {}s", start.starts_in);
                let mut countdown = Countdown::from_signal(start);
                while let Some(remaining) = countdown.tick().await {
                    println!("  {remaining}...");
                }
                println!("go!");
                break;
            }
        }
    }

    channel.disconnect();
}

fn print_roster(lobby: &LobbyState) {
    println!(
        "room {} (code {}) -- {} player(s):",
        lobby.room_id(),
        lobby.code(),
        lobby.player_count()
    );
    for player in lobby.players() {
        let host = if player.is_host { " [host]" } else { "" };
        println!("  - {}{host}", player.username);
    }
}
