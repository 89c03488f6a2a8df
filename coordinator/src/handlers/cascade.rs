//! The shared "a player is leaving a game" cascade, used by `QUIT_GAME`,
//! disconnects, `UNREGISTER_PLAYER`, and the idle-player sweep's forced
//! unregister. Also hosts the two ways a game reaches a terminal state:
//! completion (a winner was decided) and cancellation (everything else).

use super::seat_summaries;
use crate::dispatcher::Outbox;
use crate::engine_adapter::{self, Advance};
use crate::invariant;
use crate::store::{GameState, Occupant, PlayState, SeatState, Store};
use chrono::{DateTime, Utc};
use engine::GameEngine;
use protocol::{Color, CompletionReason, GameId, PlayerId, ServerEvent};

/// Resets a player's game-membership fields without touching its connection
/// or activity state. Used whenever a game a player belongs to ends or the
/// player's seat in it is vacated.
fn detach_player(store: &mut Store, player_id: PlayerId) {
    if let Some(player) = store.players.get_mut(&player_id) {
        player.current_game = None;
        player.seat_color = None;
        player.play_state = PlayState::Waiting;
    }
}

fn detach_all_human_seats(store: &mut Store, game_id: GameId) {
    let human_ids: Vec<PlayerId> = store
        .games
        .get(&game_id)
        .map(|g| g.seats.iter().filter_map(|s| s.player_id()).collect())
        .unwrap_or_default();
    for player_id in human_ids {
        detach_player(store, player_id);
    }
}

/// Cancels a game for any reason other than a decided winner: viability
/// loss, an explicit `CANCEL_GAME`, inactivity, or shutdown.
pub fn cancel_game(
    store: &mut Store,
    outbox: &mut Outbox,
    now: DateTime<Utc>,
    game_id: GameId,
    reason: CompletionReason,
    comment: String,
) {
    detach_all_human_seats(store, game_id);
    let Some(game) = store.games.get_mut(&game_id) else {
        return;
    };
    game.game_state = GameState::Cancelled;
    game.completed_at = Some(now);
    game.completion_reason = Some(reason);
    game.completion_comment = Some(comment.clone());

    outbox.to_game(game_id, ServerEvent::GameCancelled { game_id, reason, comment });
}

/// Completes a game with a decided winner (or a draw, if `winner` is `None`).
pub fn complete_game_won(store: &mut Store, outbox: &mut Outbox, now: DateTime<Utc>, game_id: GameId, winner: Option<Color>) {
    let winner_player = winner.and_then(|color| {
        store
            .games
            .get(&game_id)
            .and_then(|g| g.seats.iter().find(|s| s.color == color))
            .and_then(|s| s.player_id())
    });

    detach_all_human_seats(store, game_id);
    let Some(game) = store.games.get_mut(&game_id) else {
        return;
    };
    game.game_state = GameState::Completed;
    game.completed_at = Some(now);
    game.completion_reason = Some(CompletionReason::Won);
    game.completion_comment = Some("game complete".into());

    outbox.to_game(game_id, ServerEvent::GameCompleted { game_id, winner: winner_player });
}

/// Pushes the current engine view and, if a human holds the turn, their
/// legal moves — to every human seat still in the game.
pub fn notify_state(store: &Store, engine: &dyn GameEngine, outbox: &mut Outbox, game_id: GameId) {
    let Some(game) = store.games.get(&game_id) else {
        return;
    };
    for seat in &game.seats {
        let Some(player_id) = seat.player_id() else { continue };
        let view = engine_adapter::view_for(engine, game, seat.color);
        outbox.to_player(player_id, ServerEvent::GameStateChange { game_id, view: view.0 });
    }
    if let Some(turn_color) = game.current_turn
        && let Some(seat) = game.seats.iter().find(|s| s.color == turn_color)
        && let Some(player_id) = seat.player_id()
    {
        invariant!(game.engine_state.is_some(), "started game has no engine state: game_id={:?}", game.game_id);
        let state = game.engine_state.as_ref().unwrap();
        let legal_moves = engine
            .legal_moves(state, turn_color)
            .into_iter()
            .map(|m| protocol::LegalMoveSummary { move_id: m.move_id, description: m.description })
            .collect();
        outbox.to_player(player_id, ServerEvent::GamePlayerTurn { game_id, legal_moves });
    }
}

/// Applies the outcome of having just advanced the engine (start, a human
/// move, or a forced forfeit): either notify the new turn holder, or settle
/// the game as completed.
pub fn apply_advance(
    store: &mut Store,
    engine: &dyn GameEngine,
    outbox: &mut Outbox,
    now: DateTime<Utc>,
    game_id: GameId,
    advance: Advance,
) {
    match advance {
        Advance::HumanTurn { .. } => notify_state(store, engine, outbox, game_id),
        Advance::GameOver { winner } => complete_game_won(store, outbox, now, game_id, winner),
    }
}

/// A player leaves a game they currently occupy a seat in, other than by the
/// game reaching a terminal state on its own. `leaving_state` is `Quit` for
/// an explicit `QUIT_GAME` and `Disconnected` for a lost connection or forced
/// unregister.
pub fn leave_game(
    store: &mut Store,
    engine: &dyn GameEngine,
    outbox: &mut Outbox,
    now: DateTime<Utc>,
    player_id: PlayerId,
    leaving_state: SeatState,
) {
    let Some(game_id) = store.players.get(&player_id).and_then(|p| p.current_game) else {
        return;
    };
    let Some(game) = store.games.get_mut(&game_id) else {
        detach_player(store, player_id);
        return;
    };
    if !matches!(game.game_state, GameState::Advertised | GameState::Started) {
        detach_player(store, player_id);
        return;
    }

    let was_advertiser = game.advertiser == player_id;
    let seat_color = game.seat_for_player(player_id).map(|s| s.color);
    if let Some(seat) = game.seat_for_player_mut(player_id) {
        if game.game_state == GameState::Advertised {
            seat.occupant = Occupant::Empty;
        }
        seat.state = leaving_state;
    }
    let was_started = game.game_state == GameState::Started;
    let was_turn = was_started && game.current_turn == seat_color;
    game.last_active = now;

    detach_player(store, player_id);

    match (was_started, was_advertiser) {
        (false, true) => {
            cancel_game(store, outbox, now, game_id, CompletionReason::Cancelled, "advertiser left before the game started".into());
        }
        (false, false) => {
            if let Some(game) = store.games.get(&game_id) {
                outbox.to_game(
                    game_id,
                    ServerEvent::GamePlayerChange {
                        game_id,
                        comment: "a player left the game".into(),
                        seats: seat_summaries(store, game),
                    },
                );
            }
        }
        (true, _) => {
            let still_viable = store.games.get(&game_id).is_some_and(|g| g.active_human_seat_count() > 0);
            if !still_viable {
                cancel_game(store, outbox, now, game_id, CompletionReason::NotViable, "no active human players remain".into());
                return;
            }
            if let Some(game) = store.games.get(&game_id) {
                outbox.to_game(
                    game_id,
                    ServerEvent::GamePlayerChange {
                        game_id,
                        comment: "a player left the game".into(),
                        seats: seat_summaries(store, game),
                    },
                );
            }
            if was_turn {
                let game = store.games.get_mut(&game_id).expect("checked above");
                let advance = engine_adapter::forfeit_current_turn(engine, game);
                apply_advance(store, engine, outbox, now, game_id, advance);
            }
        }
    }
}
