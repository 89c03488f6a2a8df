use crate::{
    CompletionReason, GameId, GameSummary, LegalMoveSummary, PlayerId, PlayerSummary,
    RequestErrorReason, SeatSummary,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed set of event kinds the coordinator may push to a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    PlayerRegistered,
    RequestFailed,
    PlayersList,
    GameAdvertised,
    GameInvitation,
    AvailableGames,
    GamePlayerChange,
    GameStarted,
    GameStateChange,
    GamePlayerTurn,
    GameCompleted,
    GameCancelled,
    GameIdle,
    PlayerIdle,
    PlayerInactive,
    PlayerMessageReceived,
    ServerShutdown,
}

/// A single outbound frame: `{ "message": <kind>, "context": { ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "message", content = "context", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerEvent {
    PlayerRegistered {
        player_id: PlayerId,
        handle: String,
    },
    RequestFailed {
        reason: RequestErrorReason,
        comment: String,
    },
    PlayersList {
        players: Vec<PlayerSummary>,
    },
    GameAdvertised {
        game: GameSummary,
    },
    GameInvitation {
        game: GameSummary,
    },
    AvailableGames {
        games: Vec<GameSummary>,
    },
    GamePlayerChange {
        game_id: GameId,
        comment: String,
        seats: Vec<SeatSummary>,
    },
    GameStarted {
        game_id: GameId,
        seats: Vec<SeatSummary>,
    },
    /// `view` is intentionally an opaque [`Value`] rather than a typed board:
    /// the board representation belongs to the `GameEngine` implementation,
    /// not to the coordinator's wire protocol.
    GameStateChange {
        game_id: GameId,
        view: Value,
    },
    GamePlayerTurn {
        game_id: GameId,
        legal_moves: Vec<LegalMoveSummary>,
    },
    GameCompleted {
        game_id: GameId,
        winner: Option<PlayerId>,
    },
    GameCancelled {
        game_id: GameId,
        reason: CompletionReason,
        comment: String,
    },
    GameIdle {
        game_id: GameId,
    },
    PlayerIdle {
        player_id: PlayerId,
    },
    PlayerInactive {
        player_id: PlayerId,
    },
    PlayerMessageReceived {
        sender_handle: String,
        message: String,
    },
    ServerShutdown,
}

impl ServerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ServerEvent::PlayerRegistered { .. } => EventKind::PlayerRegistered,
            ServerEvent::RequestFailed { .. } => EventKind::RequestFailed,
            ServerEvent::PlayersList { .. } => EventKind::PlayersList,
            ServerEvent::GameAdvertised { .. } => EventKind::GameAdvertised,
            ServerEvent::GameInvitation { .. } => EventKind::GameInvitation,
            ServerEvent::AvailableGames { .. } => EventKind::AvailableGames,
            ServerEvent::GamePlayerChange { .. } => EventKind::GamePlayerChange,
            ServerEvent::GameStarted { .. } => EventKind::GameStarted,
            ServerEvent::GameStateChange { .. } => EventKind::GameStateChange,
            ServerEvent::GamePlayerTurn { .. } => EventKind::GamePlayerTurn,
            ServerEvent::GameCompleted { .. } => EventKind::GameCompleted,
            ServerEvent::GameCancelled { .. } => EventKind::GameCancelled,
            ServerEvent::GameIdle { .. } => EventKind::GameIdle,
            ServerEvent::PlayerIdle { .. } => EventKind::PlayerIdle,
            ServerEvent::PlayerInactive { .. } => EventKind::PlayerInactive,
            ServerEvent::PlayerMessageReceived { .. } => EventKind::PlayerMessageReceived,
            ServerEvent::ServerShutdown => EventKind::ServerShutdown,
        }
    }
}
