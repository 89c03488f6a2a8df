use super::{cascade, player_summary, Ctx};
use crate::errors::RequestError;
use crate::store::{ConnectionKey, SeatState};
use protocol::{PlayerId, ServerEvent};

pub fn register(ctx: &mut Ctx, connection_key: ConnectionKey, handle: String) -> Result<(), RequestError> {
    let player_id = ctx
        .store
        .register_player(handle.clone(), connection_key, ctx.now, ctx.config.registered_player_limit)?;
    ctx.outbox.to_connection(connection_key, ServerEvent::PlayerRegistered { player_id, handle });
    Ok(())
}

pub fn reregister(ctx: &mut Ctx, connection_key: ConnectionKey, player_id: PlayerId) -> Result<(), RequestError> {
    ctx.store.bind_reregister(player_id, connection_key, ctx.now)?;
    let handle = ctx
        .store
        .players
        .get(&player_id)
        .map(|p| p.handle.clone())
        .ok_or(RequestError::InvalidPlayer)?;
    ctx.outbox.to_connection(connection_key, ServerEvent::PlayerRegistered { player_id, handle });
    Ok(())
}

pub fn unregister(ctx: &mut Ctx, player_id: PlayerId) -> Result<(), RequestError> {
    if !ctx.store.players.contains_key(&player_id) {
        return Err(RequestError::InvalidPlayer);
    }
    cascade::leave_game(ctx.store, ctx.engine, &mut ctx.outbox, ctx.now, player_id, SeatState::Quit);
    ctx.store.destroy_player(player_id);
    Ok(())
}

pub fn list(ctx: &mut Ctx, player_id: PlayerId) -> Result<(), RequestError> {
    if !ctx.store.players.contains_key(&player_id) {
        return Err(RequestError::InvalidPlayer);
    }
    let players = ctx.store.players.values().map(|p| player_summary(ctx.store, p)).collect();
    ctx.outbox.to_player(player_id, ServerEvent::PlayersList { players });
    Ok(())
}
