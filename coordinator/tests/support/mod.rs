//! Shared test harness: a `Store` plus the pieces `handlers::handle` needs,
//! driven the same way the coordinator loop drives them but without any
//! sockets or timers. Every test in this directory talks to the coordinator
//! exclusively through `ClientRequest`/`ServerEvent`, the same surface a real
//! client sees.

use chrono::{DateTime, Utc};
use coordinator::config::Config;
use coordinator::dispatcher;
use coordinator::handlers;
use coordinator::store::{ConnectionKey, Store};
use engine::ReferenceEngine;
use protocol::{ClientRequest, ServerEvent};
use tokio::sync::mpsc;

pub struct Harness {
    pub store: Store,
    pub config: Config,
    pub engine: ReferenceEngine,
    pub now: DateTime<Utc>,
}

impl Harness {
    pub fn new() -> Self {
        Self { store: Store::new(), config: Config::default(), engine: ReferenceEngine, now: Utc::now() }
    }

    pub fn advance(&mut self, delta: chrono::Duration) {
        self.now += delta;
    }

    pub fn connect(&mut self) -> (ConnectionKey, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let key = self.store.accept_connection(self.now, tx);
        (key, rx)
    }

    /// Runs one request through the handlers and dispatcher, same as the
    /// coordinator loop's `deliver`. Returns connections that went dead as a
    /// side effect of delivery (a full mailbox send failing).
    pub fn send(&mut self, connection_key: ConnectionKey, request: ClientRequest) -> Vec<ConnectionKey> {
        let outbox = handlers::handle(&mut self.store, &self.config, &self.engine, self.now, connection_key, request);
        dispatcher::dispatch(&mut self.store, outbox)
    }
}

pub fn drain(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Registers a fresh player on a fresh connection and returns its id,
/// discarding the `PLAYER_REGISTERED` event.
pub fn register(h: &mut Harness, handle: &str) -> (ConnectionKey, protocol::PlayerId, mpsc::UnboundedReceiver<ServerEvent>) {
    let (key, mut rx) = h.connect();
    h.send(key, ClientRequest::RegisterPlayer { handle: handle.to_string() });
    let events = drain(&mut rx);
    let Some(ServerEvent::PlayerRegistered { player_id, .. }) = events.into_iter().next() else {
        panic!("expected PLAYER_REGISTERED");
    };
    (key, player_id, rx)
}
