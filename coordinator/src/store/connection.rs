use chrono::{DateTime, Utc};
use protocol::{PlayerId, ServerEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::UnboundedSender;

/// A stable key for a connection's lifetime, distinct from any player id it
/// ends up bound to (a connection exists before a player registers on it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionKey(u64);

static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

impl ConnectionKey {
    pub fn next() -> Self {
        Self(NEXT_KEY.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A live bidirectional channel to one remote peer.
///
/// The connection does not own the socket directly — the writer task owns
/// the split sink, and `outbox` is how the dispatcher hands it messages
/// without blocking the coordinator loop. A failed send marks `alive` false
/// rather than attempting to touch the socket from here.
pub struct Connection {
    pub key: ConnectionKey,
    pub accepted_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub bound_player: Option<PlayerId>,
    pub outbox: UnboundedSender<ServerEvent>,
    pub alive: bool,
}

impl Connection {
    pub fn new(key: ConnectionKey, now: DateTime<Utc>, outbox: UnboundedSender<ServerEvent>) -> Self {
        Self {
            key,
            accepted_at: now,
            last_activity: now,
            bound_player: None,
            outbox,
            alive: true,
        }
    }

    /// Resets idle tracking in response to any request arriving on this
    /// connection — see the *Connection* state machine.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    /// Sends directly to this connection. Returns `false` (and marks the
    /// connection dead) if the writer task's receiver has gone away; the
    /// dispatcher turns that into a connection-closed event.
    pub fn send(&mut self, event: ServerEvent) -> bool {
        if !self.alive {
            return false;
        }
        if self.outbox.send(event).is_err() {
            self.alive = false;
            return false;
        }
        true
    }
}
