//! The Engine Adapter: the contract between the coordinator and whatever
//! actually implements Sorry!-style board-game rules.
//!
//! The coordinator never reaches into a game's internals. It stores the
//! engine's [`EngineState`] as an opaque blob on the game record and only
//! ever calls it through the four [`GameEngine`] methods below, each a pure
//! `state -> state'` transform. This keeps cancellation of a pending turn
//! prompt trivial — there is no hidden callback waiting on a human's move,
//! just a value the coordinator already holds.
//!
//! [`reference`] ships a minimal engine — turn order only, no card rules —
//! used by the coordinator's own tests and as a template for a real
//! implementation, the same role the teacher's tic-tac-toe backend plays
//! against `BackEndArchitecture`.

mod reference;

pub use reference::ReferenceEngine;

use protocol::Color;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A seat at the table as handed to [`GameEngine::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatAssignment {
    pub color: Color,
    /// `true` if this seat has no human occupant and the engine must choose
    /// its own moves on `legal_moves`/turn resolution.
    pub programmatic: bool,
}

/// Opaque engine state, round-tripped by the coordinator without inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineState(pub Value);

/// One candidate move for the current turn-holder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalMove {
    pub move_id: String,
    pub description: String,
}

/// What applying a move did to the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Continue { next_seat: Color },
    GameOver { winner: Option<Color> },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0} is not a legal move for this turn")]
    IllegalMove(String),
    #[error("engine state is malformed: {0}")]
    CorruptState(String),
}

/// The pluggable contract a real Sorry!-rules implementation must satisfy.
///
/// Every method is pure with respect to its inputs — no method mutates
/// `self`, and no method has side effects beyond its return value. The
/// coordinator is the only thing that persists state, in the game record.
pub trait GameEngine: Send + Sync {
    /// Initializes a fresh game for the given seats, in the order they should
    /// take turns. Returns the starting state and the seat of the first turn.
    fn start(&self, seats: &[SeatAssignment]) -> (EngineState, Color);

    /// Lists the moves available to `seat` on `state`. Only meaningful when
    /// `seat` is the current turn-holder; callers are responsible for that
    /// check.
    fn legal_moves(&self, state: &EngineState, seat: Color) -> Vec<LegalMove>;

    /// Applies `move_id` as played by `seat`. Fails with
    /// [`EngineError::IllegalMove`] if `move_id` is not currently legal for
    /// `seat`.
    fn apply(
        &self,
        state: &EngineState,
        seat: Color,
        move_id: &str,
    ) -> Result<(EngineState, MoveOutcome), EngineError>;

    /// The state as `seat` should see it — e.g. hiding other players' hands.
    /// Returned as an opaque JSON value; the coordinator forwards it
    /// unexamined inside `GAME_STATE_CHANGE`.
    fn player_view(&self, state: &EngineState, seat: Color) -> Value;
}
