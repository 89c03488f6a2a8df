//! Request handlers: one function per [`RequestKind`], each validating
//! against the current store, mutating it, and queuing outbound events. A
//! handler either completes and leaves the store in a new consistent state,
//! or returns a [`RequestError`] and leaves the store exactly as it found it
//! — there is no partial-mutation case.

pub(crate) mod cascade;
mod game;
mod message;
mod player;

use crate::config::Config;
use crate::dispatcher::Outbox;
use crate::errors::RequestError;
use crate::store::{ConnectionKey, Game, Store};
use chrono::{DateTime, Utc};
use engine::GameEngine;
use protocol::{
    ClientRequest, Color, GameSummary, PlayerSummary, SeatSummary, ServerEvent,
};

/// Everything a handler needs, bundled so signatures stay short. Borrowed for
/// the lifetime of a single request; the coordinator loop constructs one of
/// these per mailbox item and discards it once the handler returns.
pub struct Ctx<'a> {
    pub store: &'a mut Store,
    pub config: &'a Config,
    pub engine: &'a dyn GameEngine,
    pub now: DateTime<Utc>,
    pub outbox: Outbox,
}

/// Runs `request` (received on `connection_key`) to completion and returns
/// the outbox of events to dispatch. On failure, the outbox contains exactly
/// one `REQUEST_FAILED` addressed back to `connection_key`.
pub fn handle(
    store: &mut Store,
    config: &Config,
    engine: &dyn GameEngine,
    now: DateTime<Utc>,
    connection_key: ConnectionKey,
    request: ClientRequest,
) -> Outbox {
    if let Some(connection) = store.connections.get_mut(&connection_key) {
        connection.touch(now);
    }
    let mut ctx = Ctx { store, config, engine, now, outbox: Outbox::new() };

    let result = match request {
        ClientRequest::RegisterPlayer { handle } => player::register(&mut ctx, connection_key, handle),
        ClientRequest::ReregisterPlayer { player_id } => player::reregister(&mut ctx, connection_key, player_id),
        ClientRequest::UnregisterPlayer { player_id } => player::unregister(&mut ctx, player_id),
        ClientRequest::ListPlayers { player_id } => player::list(&mut ctx, player_id),
        ClientRequest::AdvertiseGame { player_id, name, mode, total_seats, visibility, invited_handles } => {
            game::advertise(&mut ctx, player_id, name, mode, total_seats, visibility, invited_handles)
        }
        ClientRequest::ListAvailableGames { player_id } => game::list_available(&mut ctx, player_id),
        ClientRequest::JoinGame { player_id, game_id } => game::join(&mut ctx, player_id, game_id),
        ClientRequest::QuitGame { player_id, game_id } => game::quit(&mut ctx, player_id, game_id),
        ClientRequest::StartGame { player_id, game_id } => game::start(&mut ctx, player_id, game_id),
        ClientRequest::CancelGame { player_id, game_id, comment } => game::cancel(&mut ctx, player_id, game_id, comment),
        ClientRequest::ExecuteMove { player_id, game_id, move_id } => {
            game::execute_move(&mut ctx, player_id, game_id, move_id)
        }
        ClientRequest::RetrieveGameState { player_id, game_id } => game::retrieve_state(&mut ctx, player_id, game_id),
        ClientRequest::SendMessage { player_id, recipient_handles, message } => {
            message::send(&mut ctx, player_id, recipient_handles, message)
        }
    };

    if let Err(err) = result {
        ctx.outbox.to_connection(
            connection_key,
            ServerEvent::RequestFailed { reason: err.reason(), comment: err.comment() },
        );
    }
    ctx.outbox
}

// ---------------------------------------------------------------------
// Shared summary builders — every handler that reports game/player state
// renders it through these so the wire shape stays consistent.
// ---------------------------------------------------------------------

pub(crate) fn seat_summaries(store: &Store, game: &Game) -> Vec<SeatSummary> {
    game.seats
        .iter()
        .map(|seat| {
            let player = seat.player_id().and_then(|id| store.players.get(&id));
            SeatSummary {
                color: seat.color,
                player_id: seat.player_id(),
                handle: player.map(|p| p.handle.clone()),
                state: seat.state,
            }
        })
        .collect()
}

pub(crate) fn game_summary(store: &Store, game: &Game) -> GameSummary {
    let advertiser_handle = store
        .players
        .get(&game.advertiser)
        .map(|p| p.handle.clone())
        .unwrap_or_default();
    GameSummary {
        game_id: game.game_id,
        name: game.name.clone(),
        mode: game.mode,
        visibility: game.visibility,
        total_seats: game.total_seats,
        advertiser_handle,
        seats: seat_summaries(store, game),
    }
}

pub(crate) fn player_summary(store: &Store, player: &crate::store::Player) -> PlayerSummary {
    PlayerSummary {
        player_id: player.player_id,
        handle: player.handle.clone(),
        connection_state: format!("{:?}", player.connection_state).to_uppercase(),
        activity_state: format!("{:?}", player.activity_state).to_uppercase(),
        play_state: format!("{:?}", player.play_state).to_uppercase(),
        game_id: player.current_game,
    }
}

pub(crate) fn seat_color_for(game: &Game, player_id: protocol::PlayerId) -> Option<Color> {
    game.seat_for_player(player_id).map(|s| s.color)
}
