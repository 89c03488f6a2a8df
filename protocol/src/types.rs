use crate::{GameId, PlayerId};
use serde::{Deserialize, Serialize};

/// One of the (at most four) seats at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Yellow,
    Green,
}

impl Color {
    /// Seat order used to fill a new game: red first, then blue, yellow, green.
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Yellow, Color::Green];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameMode {
    Standard,
    Adult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Visibility {
    Public,
    Private,
}

/// Per-seat lifecycle, independent of the owning player's own play-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeatState {
    Joined,
    Playing,
    Quit,
    Disconnected,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionReason {
    Won,
    Cancelled,
    NotViable,
    Inactive,
    Shutdown,
}

/// A single seat as reported to clients — the occupant is either a human
/// player id or `None`, which means the seat is programmatic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatSummary {
    pub color: Color,
    pub player_id: Option<PlayerId>,
    pub handle: Option<String>,
    pub state: SeatState,
}

/// The row shown in `LIST_AVAILABLE_GAMES` / sent as part of `GAME_ADVERTISED`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSummary {
    pub game_id: GameId,
    pub name: String,
    pub mode: GameMode,
    pub visibility: Visibility,
    pub total_seats: u8,
    pub advertiser_handle: String,
    pub seats: Vec<SeatSummary>,
}

/// The row shown in `LIST_PLAYERS`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub player_id: PlayerId,
    pub handle: String,
    pub connection_state: String,
    pub activity_state: String,
    pub play_state: String,
    pub game_id: Option<GameId>,
}

/// One legal move, as surfaced to the turn-holder in a `GAME_PLAYER_TURN`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalMoveSummary {
    pub move_id: String,
    pub description: String,
}
