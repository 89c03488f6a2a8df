//! A minimal stand-in for the real Sorry! rules engine.
//!
//! Seats simply take turns in the order they were seated. Each turn a seat
//! may `advance` (increments its own lap counter) or, once it has advanced
//! three times, `win` (ends the game in that seat's favor). There is no
//! board, no cards, no pawns — this is intentionally just enough state
//! machine to exercise turn rotation, legal-move queries, and game-over
//! detection in the coordinator's tests, the way the teacher's
//! `TicTacToeLogic` exercises `BackEndArchitecture` without being a real
//! commercial board game.

use crate::{EngineError, EngineState, GameEngine, LegalMove, MoveOutcome, SeatAssignment};
use protocol::Color;
use serde_json::json;

const LAPS_TO_WIN: u64 = 3;

#[derive(Default)]
pub struct ReferenceEngine;

fn order_from_state(state: &EngineState) -> Result<Vec<Color>, EngineError> {
    state.0["order"]
        .as_array()
        .ok_or_else(|| EngineError::CorruptState("missing order".into()))?
        .iter()
        .map(|v| {
            let s = v
                .as_str()
                .ok_or_else(|| EngineError::CorruptState("order entry not a string".into()))?;
            color_from_str(s)
        })
        .collect()
}

fn color_from_str(s: &str) -> Result<Color, EngineError> {
    match s {
        "red" => Ok(Color::Red),
        "blue" => Ok(Color::Blue),
        "yellow" => Ok(Color::Yellow),
        "green" => Ok(Color::Green),
        other => Err(EngineError::CorruptState(format!("unknown color {other}"))),
    }
}

fn color_str(c: Color) -> &'static str {
    match c {
        Color::Red => "red",
        Color::Blue => "blue",
        Color::Yellow => "yellow",
        Color::Green => "green",
    }
}

impl GameEngine for ReferenceEngine {
    fn start(&self, seats: &[SeatAssignment]) -> (EngineState, Color) {
        let order: Vec<_> = seats.iter().map(|s| color_str(s.color)).collect();
        let laps: Vec<u64> = vec![0; seats.len()];
        let state = EngineState(json!({
            "order": order,
            "turn_index": 0,
            "laps": laps,
        }));
        (state, seats[0].color)
    }

    fn legal_moves(&self, state: &EngineState, seat: Color) -> Vec<LegalMove> {
        let Ok(order) = order_from_state(state) else {
            return Vec::new();
        };
        let Some(idx) = order.iter().position(|c| *c == seat) else {
            return Vec::new();
        };
        let laps = state.0["laps"][idx].as_u64().unwrap_or(0);

        let mut moves = vec![LegalMove {
            move_id: "advance".to_string(),
            description: "Advance one lap".to_string(),
        }];
        if laps >= LAPS_TO_WIN {
            moves.push(LegalMove {
                move_id: "win".to_string(),
                description: "Claim victory".to_string(),
            });
        }
        moves
    }

    fn apply(
        &self,
        state: &EngineState,
        seat: Color,
        move_id: &str,
    ) -> Result<(EngineState, MoveOutcome), EngineError> {
        let order = order_from_state(state)?;
        let idx = order
            .iter()
            .position(|c| *c == seat)
            .ok_or_else(|| EngineError::CorruptState("seat not seated".into()))?;
        let mut laps: Vec<u64> = state.0["laps"]
            .as_array()
            .ok_or_else(|| EngineError::CorruptState("missing laps".into()))?
            .iter()
            .map(|v| v.as_u64().unwrap_or(0))
            .collect();

        match move_id {
            "advance" => {
                laps[idx] += 1;
                let next_idx = (idx + 1) % order.len();
                let new_state = EngineState(json!({
                    "order": order.iter().map(|c| color_str(*c)).collect::<Vec<_>>(),
                    "turn_index": next_idx,
                    "laps": laps,
                }));
                Ok((new_state, MoveOutcome::Continue { next_seat: order[next_idx] }))
            }
            "win" => {
                if laps[idx] < LAPS_TO_WIN {
                    return Err(EngineError::IllegalMove(move_id.to_string()));
                }
                Ok((state.clone(), MoveOutcome::GameOver { winner: Some(seat) }))
            }
            other => Err(EngineError::IllegalMove(other.to_string())),
        }
    }

    fn player_view(&self, state: &EngineState, seat: Color) -> serde_json::Value {
        json!({
            "your_seat": color_str(seat),
            "order": state.0["order"],
            "turn_index": state.0["turn_index"],
            "laps": state.0["laps"],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seats(colors: &[Color]) -> Vec<SeatAssignment> {
        colors
            .iter()
            .map(|&color| SeatAssignment { color, programmatic: false })
            .collect()
    }

    #[test]
    fn start_picks_first_seat() {
        let engine = ReferenceEngine;
        let (_, first) = engine.start(&seats(&[Color::Red, Color::Blue]));
        assert_eq!(first, Color::Red);
    }

    #[test]
    fn advancing_rotates_turn_order() {
        let engine = ReferenceEngine;
        let (state, _) = engine.start(&seats(&[Color::Red, Color::Blue]));
        let (state, outcome) = engine.apply(&state, Color::Red, "advance").unwrap();
        assert_eq!(outcome, MoveOutcome::Continue { next_seat: Color::Blue });
        let (_, outcome) = engine.apply(&state, Color::Blue, "advance").unwrap();
        assert_eq!(outcome, MoveOutcome::Continue { next_seat: Color::Red });
    }

    #[test]
    fn win_requires_enough_laps() {
        let engine = ReferenceEngine;
        let (mut state, _) = engine.start(&seats(&[Color::Red]));
        assert!(engine.apply(&state, Color::Red, "win").is_err());
        for _ in 0..LAPS_TO_WIN {
            let (next, _) = engine.apply(&state, Color::Red, "advance").unwrap();
            state = next;
        }
        let (_, outcome) = engine.apply(&state, Color::Red, "win").unwrap();
        assert_eq!(outcome, MoveOutcome::GameOver { winner: Some(Color::Red) });
    }

    #[test]
    fn illegal_move_is_rejected() {
        let engine = ReferenceEngine;
        let (state, _) = engine.start(&seats(&[Color::Red]));
        assert!(engine.apply(&state, Color::Red, "teleport").is_err());
    }
}
