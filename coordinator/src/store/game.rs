use chrono::{DateTime, Utc};
use engine::EngineState;
use protocol::{Color, CompletionReason, GameId, GameMode, PlayerId, Visibility};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Advertised,
    Started,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityState {
    Active,
    Idle,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatState {
    Joined,
    Playing,
    Quit,
    Disconnected,
    Finished,
}

/// Who — if anyone — occupies a seat. `Empty` only appears before a game
/// starts; `start_game` converts every remaining `Empty` seat to
/// `Programmatic` per invariant 5, and no seat is ever `Empty` again after
/// that (quitting/disconnecting changes `SeatState`, not `Occupant`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupant {
    Empty,
    Human(PlayerId),
    Programmatic,
}

pub struct Seat {
    pub color: Color,
    pub occupant: Occupant,
    pub state: SeatState,
}

impl Seat {
    pub fn player_id(&self) -> Option<PlayerId> {
        match self.occupant {
            Occupant::Human(id) => Some(id),
            Occupant::Empty | Occupant::Programmatic => None,
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self.occupant, Occupant::Human(_))
    }
}

/// Parameters supplied to [`crate::store::Store::create_game`].
pub struct GameSpec {
    pub name: String,
    pub mode: GameMode,
    pub total_seats: u8,
    pub visibility: Visibility,
    pub invited_handles: HashSet<String>,
}

pub struct Game {
    pub game_id: GameId,
    pub name: String,
    pub mode: GameMode,
    pub total_seats: u8,
    pub advertiser: PlayerId,
    pub visibility: Visibility,
    pub invited_handles: HashSet<String>,
    pub advertised_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_active: DateTime<Utc>,
    pub game_state: GameState,
    pub activity_state: ActivityState,
    pub completion_reason: Option<CompletionReason>,
    pub completion_comment: Option<String>,
    pub seats: Vec<Seat>,
    pub engine_state: Option<EngineState>,
    pub current_turn: Option<Color>,
}

impl Game {
    /// The number of seats currently occupied by a human player (as opposed
    /// to empty or programmatic).
    pub fn human_seat_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_human()).count()
    }

    /// Seats whose occupant is still an actively playing human — the
    /// viability rule cares about this count, not raw occupancy.
    pub fn active_human_seat_count(&self) -> usize {
        self.seats
            .iter()
            .filter(|s| s.is_human() && matches!(s.state, SeatState::Playing | SeatState::Joined))
            .count()
    }

    pub fn seat_for_player(&self, player_id: PlayerId) -> Option<&Seat> {
        self.seats.iter().find(|s| s.player_id() == Some(player_id))
    }

    pub fn seat_for_player_mut(&mut self, player_id: PlayerId) -> Option<&mut Seat> {
        self.seats.iter_mut().find(|s| s.player_id() == Some(player_id))
    }

    pub fn seat_for_color_mut(&mut self, color: Color) -> Option<&mut Seat> {
        self.seats.iter_mut().find(|s| s.color == color)
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self.game_state, GameState::Advertised | GameState::Started)
    }
}
