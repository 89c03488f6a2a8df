//! Wraps the pluggable [`engine::GameEngine`] with the bookkeeping the
//! coordinator needs around it: building `SeatAssignment`s from a game
//! record, and walking consecutive seats that cannot make their own human
//! decision (programmatic seats, and — per the design note on viability —
//! seats whose human has quit or disconnected) until a live human turn or
//! game-over is reached.

use crate::invariant;
use crate::store::{Game, Occupant, SeatState};
use engine::{EngineState, GameEngine, MoveOutcome, SeatAssignment};
use protocol::Color;

/// The result of starting or advancing a game to the point where either a
/// human must act or the game has ended.
pub enum Advance {
    HumanTurn { color: Color },
    GameOver { winner: Option<Color> },
}

/// Whether the seat at `color` can act on its own behalf right now, i.e. is
/// a programmatic seat or a human seat whose occupant has quit/disconnected
/// and is therefore auto-played (see SPEC_FULL.md section 9 design notes).
fn seat_is_autoplayed(game: &Game, color: Color) -> bool {
    game.seats
        .iter()
        .find(|s| s.color == color)
        .map(|s| match s.occupant {
            Occupant::Programmatic => true,
            Occupant::Human(_) => matches!(s.state, SeatState::Quit | SeatState::Disconnected),
            Occupant::Empty => true,
        })
        .unwrap_or(true)
}

/// Initializes the engine for a just-started game and advances through any
/// leading programmatic turns.
pub fn start(engine: &dyn GameEngine, game: &mut Game) -> Advance {
    let seats: Vec<SeatAssignment> = game
        .seats
        .iter()
        .map(|s| SeatAssignment { color: s.color, programmatic: matches!(s.occupant, Occupant::Programmatic) })
        .collect();
    let (state, first) = engine.start(&seats);
    game.engine_state = Some(state);
    game.current_turn = Some(first);
    advance_autoplay(engine, game, first)
}

/// Applies a human move and advances through any consecutive autoplayed
/// turns that follow, per Open Question (a): programmatic turns are
/// coalesced into the single `GAME_STATE_CHANGE` that precedes the next
/// human turn rather than broadcast individually.
pub fn apply_human_move(
    engine: &dyn GameEngine,
    game: &mut Game,
    color: Color,
    move_id: &str,
) -> Result<Advance, engine::EngineError> {
    invariant!(game.engine_state.is_some(), "started game has no engine state: game_id={:?}", game.game_id);
    let state = game.engine_state.as_ref().unwrap();
    let (next_state, outcome) = engine.apply(state, color, move_id)?;
    game.engine_state = Some(next_state);
    Ok(match outcome {
        MoveOutcome::GameOver { winner } => Advance::GameOver { winner },
        MoveOutcome::Continue { next_seat } => {
            game.current_turn = Some(next_seat);
            advance_autoplay(engine, game, next_seat)
        }
    })
}

/// Forces the seat currently forfeiting (via quit/disconnect) to play its
/// first legal move, then keeps advancing through any further autoplayed
/// seats. Called by the quit/disconnect cascade when the game stays viable.
pub fn forfeit_current_turn(engine: &dyn GameEngine, game: &mut Game) -> Advance {
    invariant!(game.current_turn.is_some(), "forfeiting requires a started game: game_id={:?}", game.game_id);
    let color = game.current_turn.unwrap();
    advance_autoplay(engine, game, color)
}

fn advance_autoplay(engine: &dyn GameEngine, game: &mut Game, mut color: Color) -> Advance {
    loop {
        if !seat_is_autoplayed(game, color) {
            game.current_turn = Some(color);
            return Advance::HumanTurn { color };
        }
        invariant!(game.engine_state.is_some(), "started game has no engine state: game_id={:?}", game.game_id);
        let state = game.engine_state.as_ref().unwrap();
        let moves = engine.legal_moves(state, color);
        let Some(choice) = moves.first() else {
            // No legal move at all — treat as a stalemate loss of viability
            // for this seat; the cascade that called us decides what to do
            // with a game that can no longer progress.
            game.current_turn = Some(color);
            return Advance::HumanTurn { color };
        };
        let (next_state, outcome) = engine
            .apply(state, color, &choice.move_id)
            .expect("a move drawn from legal_moves is always accepted by apply");
        game.engine_state = Some(next_state);
        match outcome {
            MoveOutcome::GameOver { winner } => return Advance::GameOver { winner },
            MoveOutcome::Continue { next_seat } => color = next_seat,
        }
    }
}

pub fn view_for(engine: &dyn GameEngine, game: &Game, color: Color) -> EngineState {
    invariant!(game.engine_state.is_some(), "started game has no engine state: game_id={:?}", game.game_id);
    let state = game.engine_state.as_ref().unwrap();
    EngineState(engine.player_view(state, color))
}
