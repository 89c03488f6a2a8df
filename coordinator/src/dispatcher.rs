//! The Event Dispatcher: turns the events a handler produced into wire
//! messages delivered to the right connections.
//!
//! Handlers never touch a socket. They push `(Audience, ServerEvent)` pairs
//! into an [`Outbox`] as they run; once a handler returns, the coordinator
//! loop hands that outbox to [`dispatch`], which resolves each audience to
//! live connections and attempts a non-blocking send on each. A send that
//! fails marks the connection dead and is reported back so the coordinator
//! loop can fold it into the same cascade a normal disconnect goes through.

use crate::store::{ConnectionKey, ConnectionState, Store};
use protocol::{GameId, PlayerId, ServerEvent};

/// Who should receive an event.
#[derive(Debug, Clone)]
pub enum Audience {
    Connection(ConnectionKey),
    Player(PlayerId),
    Players(Vec<PlayerId>),
    Game(GameId),
    AllConnected,
}

pub struct OutboundEvent {
    pub audience: Audience,
    pub event: ServerEvent,
}

/// Accumulates outbound events during a single handler invocation. Order is
/// preserved per-connection by the dispatcher (see module docs); order
/// across different audiences is whatever the handler pushed.
#[derive(Default)]
pub struct Outbox(Vec<OutboundEvent>);

impl Outbox {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, audience: Audience, event: ServerEvent) {
        self.0.push(OutboundEvent { audience, event });
    }

    pub fn to_connection(&mut self, key: ConnectionKey, event: ServerEvent) {
        self.push(Audience::Connection(key), event);
    }

    pub fn to_player(&mut self, player_id: PlayerId, event: ServerEvent) {
        self.push(Audience::Player(player_id), event);
    }

    pub fn to_players(&mut self, players: Vec<PlayerId>, event: ServerEvent) {
        self.push(Audience::Players(players), event);
    }

    pub fn to_game(&mut self, game_id: GameId, event: ServerEvent) {
        self.push(Audience::Game(game_id), event);
    }

    pub fn to_all(&mut self, event: ServerEvent) {
        self.push(Audience::AllConnected, event);
    }

    pub fn into_events(self) -> Vec<OutboundEvent> {
        self.0
    }
}

/// Resolves every queued event to its connections and attempts delivery.
/// Returns the connections that went dead during this pass, in delivery
/// order, so the caller can enqueue a connection-closed event for each.
pub fn dispatch(store: &mut Store, outbox: Outbox) -> Vec<ConnectionKey> {
    let mut dead = Vec::new();
    for OutboundEvent { audience, event } in outbox.into_events() {
        for key in resolve(store, &audience) {
            let Some(connection) = store.connections.get_mut(&key) else {
                continue;
            };
            if !connection.send(event.clone()) {
                dead.push(key);
            }
        }
    }
    dead.sort_unstable();
    dead.dedup();
    dead
}

fn resolve(store: &Store, audience: &Audience) -> Vec<ConnectionKey> {
    match audience {
        Audience::Connection(key) => vec![*key],
        Audience::Player(player_id) => store
            .players
            .get(player_id)
            .and_then(|p| p.connection_key)
            .into_iter()
            .collect(),
        Audience::Players(player_ids) => player_ids
            .iter()
            .filter_map(|id| store.players.get(id).and_then(|p| p.connection_key))
            .collect(),
        Audience::Game(game_id) => {
            let Some(game) = store.games.get(game_id) else {
                return Vec::new();
            };
            game.seats
                .iter()
                .filter_map(|seat| seat.player_id())
                .filter_map(|player_id| store.players.get(&player_id).and_then(|p| p.connection_key))
                .collect()
        }
        Audience::AllConnected => store
            .players
            .values()
            .filter(|p| p.connection_state == ConnectionState::Connected)
            .filter_map(|p| p.connection_key)
            .collect(),
    }
}
