//! The Coordinator Loop: the single serialization point. Every client
//! request, timer tick, and connection-closed notification passes through
//! here one at a time — nothing else in the process ever touches the
//! [`Store`] directly. I/O runs in parallel tasks (the accept loop, the
//! sweeper timers) that only ever enqueue events onto this loop's mailbox.

use crate::config::{Clock, Config};
use crate::dispatcher::{self, Outbox};
use crate::handlers;
use crate::handlers::cascade;
use crate::scanner::{self, TickGates, TickKind};
use crate::store::{ConnectionKey, SeatState, Store};
use chrono::{DateTime, Utc};
use engine::GameEngine;
use protocol::{ClientRequest, CompletionReason, ServerEvent};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// A unit of work for the coordinator loop.
pub enum Envelope {
    /// A socket was just accepted; hand back a [`ConnectionKey`] for the
    /// connection task to address future requests and the dispatcher's
    /// outbound events with. `None` means `websocket_limit` was already
    /// reached and the connection task should close the socket without
    /// registering it.
    Accept { outbox: mpsc::UnboundedSender<ServerEvent>, reply: oneshot::Sender<Option<ConnectionKey>> },
    /// A decoded request arrived on an already-accepted connection.
    Request { connection_key: ConnectionKey, request: ClientRequest },
    /// A connection's socket closed, or a send to it failed.
    ConnectionClosed { connection_key: ConnectionKey },
    /// Graceful shutdown was requested.
    Shutdown,
}

pub struct Coordinator {
    store: Store,
    config: Config,
    engine: Box<dyn GameEngine>,
    clock: Arc<dyn Clock>,
    gates: Arc<TickGates>,
}

impl Coordinator {
    pub fn new(config: Config, engine: Box<dyn GameEngine>, clock: Arc<dyn Clock>) -> Self {
        Self { store: Store::new(), config, engine, clock, gates: TickGates::new() }
    }

    pub fn tick_gates(&self) -> Arc<TickGates> {
        self.gates.clone()
    }

    /// Runs until a `Shutdown` envelope is processed, or both input channels
    /// close. `mailbox` carries requests/accepts/disconnects; `ticks` carries
    /// sweeper ticks — kept separate so a burst of client traffic can never
    /// starve the sweepers, or vice versa.
    pub async fn run(mut self, mut mailbox: mpsc::UnboundedReceiver<Envelope>, mut ticks: mpsc::UnboundedReceiver<TickKind>) {
        loop {
            tokio::select! {
                biased;
                envelope = mailbox.recv() => {
                    let Some(envelope) = envelope else { break };
                    if self.handle_envelope(envelope).await {
                        break;
                    }
                }
                tick = ticks.recv() => {
                    let Some(kind) = tick else { continue };
                    let now = self.clock.now();
                    let mut outbox = Outbox::new();
                    scanner::run_tick(&mut self.store, &self.config, self.engine.as_ref(), &mut outbox, now, kind);
                    self.gates.mark_done(kind);
                    self.deliver(outbox);
                }
            }
        }
    }

    /// Returns `true` if the loop should stop after this envelope.
    async fn handle_envelope(&mut self, envelope: Envelope) -> bool {
        let now = self.clock.now();
        match envelope {
            Envelope::Accept { outbox, reply } => {
                if self.store.connections.len() >= self.config.websocket_limit {
                    tracing::warn!(limit = self.config.websocket_limit, "websocket_limit reached, rejecting connection");
                    let _ = reply.send(None);
                } else {
                    let key = self.store.accept_connection(now, outbox);
                    let _ = reply.send(Some(key));
                }
                false
            }
            Envelope::Request { connection_key, request } => {
                let span = tracing::info_span!("request", kind = ?request.kind(), connection = %connection_key);
                let _guard = span.enter();
                let outbox = handlers::handle(&mut self.store, &self.config, self.engine.as_ref(), now, connection_key, request);
                self.deliver(outbox);
                false
            }
            Envelope::ConnectionClosed { connection_key } => {
                self.on_connection_closed(now, connection_key);
                false
            }
            Envelope::Shutdown => {
                self.on_shutdown(now);
                true
            }
        }
    }

    fn deliver(&mut self, outbox: Outbox) {
        let dead = dispatcher::dispatch(&mut self.store, outbox);
        for key in dead {
            let now = self.clock.now();
            self.on_connection_closed(now, key);
        }
    }

    fn on_connection_closed(&mut self, now: DateTime<Utc>, connection_key: ConnectionKey) {
        let Some(player_id) = self.store.remove_connection(connection_key) else {
            return;
        };
        let mut outbox = Outbox::new();
        cascade::leave_game(&mut self.store, self.engine.as_ref(), &mut outbox, now, player_id, SeatState::Disconnected);
        self.deliver(outbox);
    }

    fn on_shutdown(&mut self, now: DateTime<Utc>) {
        tracing::info!("coordinator shutting down");
        let mut outbox = Outbox::new();
        outbox.to_all(ServerEvent::ServerShutdown);

        let in_progress: Vec<_> = self.store.games.values().filter(|g| g.is_in_progress()).map(|g| g.game_id).collect();
        for game_id in in_progress {
            cascade::cancel_game(&mut self.store, &mut outbox, now, game_id, CompletionReason::Shutdown, "server is shutting down".into());
        }
        self.deliver(outbox);
    }
}
