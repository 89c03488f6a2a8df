use chrono::{DateTime, Utc};
use protocol::{Color, GameId, PlayerId};

use crate::store::connection::ConnectionKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityState {
    Active,
    Idle,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Waiting,
    Joined,
    Playing,
    Finished,
}

/// A registered human player.
pub struct Player {
    pub player_id: PlayerId,
    pub handle: String,
    pub registered_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub connection_state: ConnectionState,
    pub activity_state: ActivityState,
    pub play_state: PlayState,
    pub current_game: Option<GameId>,
    pub seat_color: Option<Color>,
    /// The connection currently bound to this player, if any. Mirrors
    /// `Connection::bound_player` in the other direction.
    pub connection_key: Option<ConnectionKey>,
}

impl Player {
    pub fn new(player_id: PlayerId, handle: String, now: DateTime<Utc>, connection_key: ConnectionKey) -> Self {
        Self {
            player_id,
            handle,
            registered_at: now,
            last_active: now,
            connection_state: ConnectionState::Connected,
            activity_state: ActivityState::Active,
            play_state: PlayState::Waiting,
            current_game: None,
            seat_color: None,
            connection_key: Some(connection_key),
        }
    }

    /// Resets activity tracking in response to any recognized request from
    /// this player — see the *Player activity* state machine.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_active = now;
        self.activity_state = ActivityState::Active;
    }
}
