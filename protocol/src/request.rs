use crate::{GameId, GameMode, PlayerId, Visibility};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The closed set of request kinds a client may send, carried on the wire as
/// the frame's `message` field. Kept separate from [`ClientRequest`] so
/// handlers and tracing spans can name a request kind without holding (or
/// cloning) its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestKind {
    RegisterPlayer,
    ReregisterPlayer,
    UnregisterPlayer,
    ListPlayers,
    AdvertiseGame,
    ListAvailableGames,
    JoinGame,
    QuitGame,
    StartGame,
    CancelGame,
    ExecuteMove,
    RetrieveGameState,
    SendMessage,
}

/// A single inbound frame: `{ "message": <kind>, "context": { ... } }`.
///
/// `RegisterPlayer` is the only variant that may arrive unauthenticated; every
/// other variant carries `player_id`, which the connection lifecycle checks
/// against the connection's bound player before the request ever reaches a
/// handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "message", content = "context", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientRequest {
    RegisterPlayer {
        handle: String,
    },
    ReregisterPlayer {
        player_id: PlayerId,
    },
    UnregisterPlayer {
        player_id: PlayerId,
    },
    ListPlayers {
        player_id: PlayerId,
    },
    AdvertiseGame {
        player_id: PlayerId,
        name: String,
        mode: GameMode,
        total_seats: u8,
        visibility: Visibility,
        invited_handles: HashSet<String>,
    },
    ListAvailableGames {
        player_id: PlayerId,
    },
    JoinGame {
        player_id: PlayerId,
        game_id: GameId,
    },
    QuitGame {
        player_id: PlayerId,
        game_id: GameId,
    },
    StartGame {
        player_id: PlayerId,
        game_id: GameId,
    },
    CancelGame {
        player_id: PlayerId,
        game_id: GameId,
        comment: Option<String>,
    },
    ExecuteMove {
        player_id: PlayerId,
        game_id: GameId,
        move_id: String,
    },
    RetrieveGameState {
        player_id: PlayerId,
        game_id: GameId,
    },
    SendMessage {
        player_id: PlayerId,
        recipient_handles: Vec<String>,
        message: String,
    },
}

impl ClientRequest {
    /// The request's kind, independent of its payload — cheap and `Copy`.
    pub fn kind(&self) -> RequestKind {
        match self {
            ClientRequest::RegisterPlayer { .. } => RequestKind::RegisterPlayer,
            ClientRequest::ReregisterPlayer { .. } => RequestKind::ReregisterPlayer,
            ClientRequest::UnregisterPlayer { .. } => RequestKind::UnregisterPlayer,
            ClientRequest::ListPlayers { .. } => RequestKind::ListPlayers,
            ClientRequest::AdvertiseGame { .. } => RequestKind::AdvertiseGame,
            ClientRequest::ListAvailableGames { .. } => RequestKind::ListAvailableGames,
            ClientRequest::JoinGame { .. } => RequestKind::JoinGame,
            ClientRequest::QuitGame { .. } => RequestKind::QuitGame,
            ClientRequest::StartGame { .. } => RequestKind::StartGame,
            ClientRequest::CancelGame { .. } => RequestKind::CancelGame,
            ClientRequest::ExecuteMove { .. } => RequestKind::ExecuteMove,
            ClientRequest::RetrieveGameState { .. } => RequestKind::RetrieveGameState,
            ClientRequest::SendMessage { .. } => RequestKind::SendMessage,
        }
    }

    /// The player id this request claims to act as, if any. `None` only for
    /// the pre-authentication `RegisterPlayer` request.
    pub fn player_id(&self) -> Option<PlayerId> {
        match self {
            ClientRequest::RegisterPlayer { .. } => None,
            ClientRequest::ReregisterPlayer { player_id }
            | ClientRequest::UnregisterPlayer { player_id }
            | ClientRequest::ListPlayers { player_id }
            | ClientRequest::AdvertiseGame { player_id, .. }
            | ClientRequest::ListAvailableGames { player_id }
            | ClientRequest::JoinGame { player_id, .. }
            | ClientRequest::QuitGame { player_id, .. }
            | ClientRequest::StartGame { player_id, .. }
            | ClientRequest::CancelGame { player_id, .. }
            | ClientRequest::ExecuteMove { player_id, .. }
            | ClientRequest::RetrieveGameState { player_id, .. }
            | ClientRequest::SendMessage { player_id, .. } => Some(*player_id),
        }
    }
}
