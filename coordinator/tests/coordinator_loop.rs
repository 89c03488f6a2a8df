//! Exercises the coordinator loop itself — `Envelope` delivery, the
//! connection-closed cascade, and graceful shutdown — rather than the
//! synchronous handler surface the other integration tests drive directly.

use std::sync::Arc;
use std::time::Duration;

use coordinator::config::{Config, SystemClock};
use coordinator::coordinator::{Coordinator, Envelope};
use coordinator::store::ConnectionKey;
use engine::ReferenceEngine;
use protocol::{ClientRequest, ServerEvent};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

fn spawn_coordinator(config: Config) -> (mpsc::UnboundedSender<Envelope>, tokio::task::JoinHandle<()>) {
    let coordinator = Coordinator::new(config, Box::new(ReferenceEngine), Arc::new(SystemClock));
    let (mailbox_tx, mailbox_rx) = mpsc::unbounded_channel();
    let (_tick_tx, tick_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(coordinator.run(mailbox_rx, tick_rx));
    (mailbox_tx, handle)
}

/// Sends `Envelope::Accept` and returns `None` if the coordinator rejected
/// the connection (e.g. `websocket_limit` was reached).
async fn try_accept(mailbox: &mpsc::UnboundedSender<Envelope>) -> Option<(ConnectionKey, mpsc::UnboundedReceiver<ServerEvent>)> {
    let (tx, rx) = mpsc::unbounded_channel();
    let (reply_tx, reply_rx) = oneshot::channel();
    mailbox.send(Envelope::Accept { outbox: tx, reply: reply_tx }).expect("coordinator is running");
    let key = timeout(Duration::from_secs(1), reply_rx).await.expect("accept timed out").expect("coordinator dropped the reply");
    key.map(|k| (k, rx))
}

async fn accept(mailbox: &mpsc::UnboundedSender<Envelope>) -> (ConnectionKey, mpsc::UnboundedReceiver<ServerEvent>) {
    try_accept(mailbox).await.expect("connection should have been accepted")
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> ServerEvent {
    timeout(Duration::from_secs(1), rx.recv()).await.expect("event timed out").expect("connection closed unexpectedly")
}

async fn register(mailbox: &mpsc::UnboundedSender<Envelope>, handle: &str) -> (ConnectionKey, protocol::PlayerId, mpsc::UnboundedReceiver<ServerEvent>) {
    let (key, mut rx) = accept(mailbox).await;
    mailbox
        .send(Envelope::Request { connection_key: key, request: ClientRequest::RegisterPlayer { handle: handle.to_string() } })
        .unwrap();
    let ServerEvent::PlayerRegistered { player_id, .. } = next_event(&mut rx).await else {
        panic!("expected PLAYER_REGISTERED");
    };
    (key, player_id, rx)
}

#[tokio::test]
async fn shutdown_broadcasts_to_every_connected_player() {
    let (mailbox, task) = spawn_coordinator(Config::default());
    let (_alice_key, _alice_id, mut alice_rx) = register(&mailbox, "alice").await;
    let (_bob_key, _bob_id, mut bob_rx) = register(&mailbox, "bob").await;

    mailbox.send(Envelope::Shutdown).unwrap();
    assert!(matches!(next_event(&mut alice_rx).await, ServerEvent::ServerShutdown));
    assert!(matches!(next_event(&mut bob_rx).await, ServerEvent::ServerShutdown));

    timeout(Duration::from_secs(1), task).await.expect("coordinator did not stop after shutdown").unwrap();
}

#[tokio::test]
async fn a_non_advertisers_connection_closing_does_not_destabilize_a_still_viable_game() {
    use std::collections::HashSet;

    let (mailbox, _task) = spawn_coordinator(Config::default());
    let (advertiser_key, advertiser, mut advertiser_rx) = register(&mailbox, "alice").await;
    let (joiner_key, joiner, mut joiner_rx) = register(&mailbox, "bob").await;
    let _ = joiner_key;

    mailbox
        .send(Envelope::Request {
            connection_key: advertiser_key,
            request: ClientRequest::AdvertiseGame {
                player_id: advertiser,
                name: "table one".to_string(),
                mode: protocol::GameMode::Standard,
                total_seats: 2,
                visibility: protocol::Visibility::Public,
                invited_handles: HashSet::new(),
            },
        })
        .unwrap();
    let ServerEvent::GameAdvertised { game } = next_event(&mut advertiser_rx).await else {
        panic!("expected GAME_ADVERTISED");
    };
    let game_id = game.game_id;

    mailbox
        .send(Envelope::Request { connection_key: joiner_key, request: ClientRequest::JoinGame { player_id: joiner, game_id } })
        .unwrap();
    // GAME_PLAYER_CHANGE, GAME_STARTED, GAME_STATE_CHANGE, GAME_PLAYER_TURN
    // all land on the advertiser (red moves first); drain them all.
    for _ in 0..4 {
        next_event(&mut advertiser_rx).await;
    }
    // GAME_PLAYER_CHANGE, GAME_STARTED, GAME_STATE_CHANGE — no turn prompt,
    // since blue doesn't hold the opening turn.
    for _ in 0..3 {
        next_event(&mut joiner_rx).await;
    }

    drop(joiner_rx);
    mailbox.send(Envelope::ConnectionClosed { connection_key: joiner_key }).unwrap();

    let ServerEvent::GamePlayerChange { seats, .. } = next_event(&mut advertiser_rx).await else {
        panic!("expected GAME_PLAYER_CHANGE reporting the disconnect");
    };
    let joiner_seat = seats.iter().find(|s| s.player_id == Some(joiner)).unwrap();
    assert_eq!(joiner_seat.state, protocol::SeatState::Disconnected);
}

#[tokio::test]
async fn the_websocket_limit_rejects_connections_once_reached() {
    let mut config = Config::default();
    config.websocket_limit = 1;
    let (mailbox, _task) = spawn_coordinator(config);

    let _first = try_accept(&mailbox).await.expect("first connection is under the limit");
    assert!(try_accept(&mailbox).await.is_none(), "second connection should be rejected");
}
