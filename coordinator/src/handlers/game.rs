use super::{cascade, game_summary, seat_summaries, Ctx};
use crate::errors::RequestError;
use crate::store::{GameSpec, GameState, Occupant, SeatState};
use protocol::{CompletionReason, GameId, GameMode, PlayerId, ServerEvent, Visibility};
use std::collections::HashSet;

pub fn advertise(
    ctx: &mut Ctx,
    player_id: PlayerId,
    name: String,
    mode: GameMode,
    total_seats: u8,
    visibility: Visibility,
    invited_handles: HashSet<String>,
) -> Result<(), RequestError> {
    if name.trim().is_empty() {
        return Err(RequestError::InvalidRequest("game name must not be empty".into()));
    }
    let spec = GameSpec { name, mode, total_seats, visibility, invited_handles: invited_handles.clone() };
    let game_id = ctx.store.create_game(player_id, spec, ctx.now, ctx.config)?;

    let game = ctx.store.games.get(&game_id).expect("just created");
    ctx.outbox.to_player(player_id, ServerEvent::GameAdvertised { game: game_summary(ctx.store, game) });

    for handle in &invited_handles {
        if let Some(invitee) = ctx.store.player_by_handle(handle) {
            let game = ctx.store.games.get(&game_id).expect("just created");
            ctx.outbox.to_player(invitee.player_id, ServerEvent::GameInvitation { game: game_summary(ctx.store, game) });
        }
    }
    Ok(())
}

pub fn list_available(ctx: &mut Ctx, player_id: PlayerId) -> Result<(), RequestError> {
    let Some(requester) = ctx.store.players.get(&player_id) else {
        return Err(RequestError::InvalidPlayer);
    };
    let handle = requester.handle.clone();
    let games = ctx
        .store
        .games
        .values()
        .filter(|g| g.game_state == GameState::Advertised)
        .filter(|g| g.visibility == Visibility::Public || g.invited_handles.contains(&handle))
        .map(|g| game_summary(ctx.store, g))
        .collect();
    ctx.outbox.to_player(player_id, ServerEvent::AvailableGames { games });
    Ok(())
}

pub fn join(ctx: &mut Ctx, player_id: PlayerId, game_id: GameId) -> Result<(), RequestError> {
    ctx.store.join_game(player_id, game_id, ctx.now)?;

    let game = ctx.store.games.get(&game_id).expect("just joined");
    ctx.outbox.to_game(
        game_id,
        ServerEvent::GamePlayerChange { game_id, comment: "a player joined the game".into(), seats: seat_summaries(ctx.store, game) },
    );

    let full = game.human_seat_count() == game.total_seats as usize;
    if full {
        begin_game(ctx, game_id);
    }
    Ok(())
}

pub fn quit(ctx: &mut Ctx, player_id: PlayerId, game_id: GameId) -> Result<(), RequestError> {
    let Some(player) = ctx.store.players.get(&player_id) else {
        return Err(RequestError::InvalidPlayer);
    };
    if player.current_game != Some(game_id) {
        return Err(RequestError::InvalidGameState);
    }
    cascade::leave_game(ctx.store, ctx.engine, &mut ctx.outbox, ctx.now, player_id, SeatState::Quit);
    Ok(())
}

pub fn start(ctx: &mut Ctx, player_id: PlayerId, game_id: GameId) -> Result<(), RequestError> {
    let Some(game) = ctx.store.games.get(&game_id) else {
        return Err(RequestError::InvalidGame);
    };
    if game.advertiser != player_id {
        return Err(RequestError::NotAdvertiser);
    }
    if game.game_state != GameState::Advertised {
        return Err(RequestError::GameAlreadyStarted);
    }
    begin_game(ctx, game_id);
    Ok(())
}

/// Converts remaining empty seats to programmatic, marks the game started,
/// and runs the engine up to the first human turn (or immediate game over).
/// Shared by the explicit `START_GAME` request and the auto-start triggered
/// by `JOIN_GAME` filling the last seat.
fn begin_game(ctx: &mut Ctx, game_id: GameId) {
    let game = ctx.store.games.get_mut(&game_id).expect("caller verified the game exists");
    for seat in &mut game.seats {
        if seat.occupant == Occupant::Empty {
            seat.occupant = Occupant::Programmatic;
        }
        seat.state = SeatState::Playing;
    }
    game.game_state = GameState::Started;
    game.started_at = Some(ctx.now);
    game.last_active = ctx.now;

    let human_ids: Vec<PlayerId> = game.seats.iter().filter_map(|s| s.player_id()).collect();
    for id in human_ids {
        if let Some(player) = ctx.store.players.get_mut(&id) {
            player.play_state = crate::store::PlayState::Playing;
        }
    }

    let game = ctx.store.games.get_mut(&game_id).expect("checked above");
    let advance = crate::engine_adapter::start(ctx.engine, game);

    let game = ctx.store.games.get(&game_id).expect("checked above");
    ctx.outbox.to_game(game_id, ServerEvent::GameStarted { game_id, seats: seat_summaries(ctx.store, game) });

    cascade::apply_advance(ctx.store, ctx.engine, &mut ctx.outbox, ctx.now, game_id, advance);
}

pub fn cancel(ctx: &mut Ctx, player_id: PlayerId, game_id: GameId, comment: Option<String>) -> Result<(), RequestError> {
    let Some(game) = ctx.store.games.get(&game_id) else {
        return Err(RequestError::InvalidGame);
    };
    if game.advertiser != player_id {
        return Err(RequestError::NotAdvertiser);
    }
    if !game.is_in_progress() {
        return Err(RequestError::InvalidGameState);
    }
    let comment = comment.unwrap_or_else(|| "cancelled by the advertiser".into());
    cascade::cancel_game(ctx.store, &mut ctx.outbox, ctx.now, game_id, CompletionReason::Cancelled, comment);
    Ok(())
}

pub fn execute_move(ctx: &mut Ctx, player_id: PlayerId, game_id: GameId, move_id: String) -> Result<(), RequestError> {
    let Some(game) = ctx.store.games.get(&game_id) else {
        return Err(RequestError::InvalidGame);
    };
    if game.game_state != GameState::Started {
        return Err(RequestError::InvalidGameState);
    }
    let Some(seat) = game.seat_for_player(player_id) else {
        return Err(RequestError::InvalidPlayer);
    };
    let color = seat.color;
    if game.current_turn != Some(color) {
        return Err(RequestError::NotYourTurn);
    }

    let game = ctx.store.games.get_mut(&game_id).expect("checked above");
    let advance = crate::engine_adapter::apply_human_move(ctx.engine, game, color, &move_id)
        .map_err(|e| RequestError::IllegalMove(e.to_string()))?;

    if let Some(player) = ctx.store.players.get_mut(&player_id) {
        player.touch(ctx.now);
    }
    if let Some(game) = ctx.store.games.get_mut(&game_id) {
        game.last_active = ctx.now;
    }
    cascade::apply_advance(ctx.store, ctx.engine, &mut ctx.outbox, ctx.now, game_id, advance);
    Ok(())
}

pub fn retrieve_state(ctx: &mut Ctx, player_id: PlayerId, game_id: GameId) -> Result<(), RequestError> {
    let Some(game) = ctx.store.games.get(&game_id) else {
        return Err(RequestError::InvalidGame);
    };
    // RETRIEVE_GAME_STATE stays valid for a COMPLETED game until the
    // obsolete sweep purges it; only CANCELLED/never-started games (or an
    // unknown id) are rejected.
    if matches!(game.game_state, GameState::Advertised | GameState::Cancelled) {
        return Err(RequestError::InvalidGameState);
    }
    let Some(seat) = game.seat_for_player(player_id) else {
        return Err(RequestError::InvalidPlayer);
    };
    let color = seat.color;
    let view = crate::engine_adapter::view_for(ctx.engine, game, color);
    ctx.outbox.to_player(player_id, ServerEvent::GameStateChange { game_id, view: view.0 });
    Ok(())
}
