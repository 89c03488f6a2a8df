//! Connection Lifecycle: accepts sockets, registers them with the
//! coordinator, decodes inbound JSON frames into [`ClientRequest`]s, and
//! reports disconnects. Grounded on the teacher's own `websocket()` entry
//! point and handshake module, adapted from a binary postcard handshake over
//! per-room channels to a single text-framed JSON channel shared by every
//! player against one coordinator.

use crate::coordinator::Envelope;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use protocol::{ClientRequest, ServerEvent};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

#[derive(Clone)]
pub struct AppState {
    pub mailbox: mpsc::UnboundedSender<Envelope>,
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/ws", get(websocket_handler)).with_state(state)
}

async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| serve(socket, state))
}

/// Owns one socket end to end: registers it with the coordinator, pumps its
/// outbox to the writer half, and decodes inbound frames into requests until
/// the socket closes, at which point the coordinator is told to clean up.
async fn serve(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerEvent>();

    let (reply_tx, reply_rx) = oneshot::channel();
    if state.mailbox.send(Envelope::Accept { outbox: event_tx, reply: reply_tx }).is_err() {
        return;
    }
    let Ok(Some(connection_key)) = reply_rx.await else {
        // Either the coordinator dropped the reply, or `websocket_limit` was
        // already reached — either way, close the socket without registering.
        return;
    };

    let writer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let Ok(text) = serde_json::to_string(&event) else {
                tracing::error!("failed to serialize outbound event");
                continue;
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientRequest>(&text) {
                Ok(request) => {
                    if state.mailbox.send(Envelope::Request { connection_key, request }).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    // A decode failure is a transport error, not a request
                    // error (section 7): there is no well-formed request to
                    // blame it on, so the connection is treated as closed.
                    tracing::warn!(?err, connection = %connection_key, "failed to decode request frame");
                    break;
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {} // Ping/Pong/Binary carry no protocol meaning here.
            Err(err) => {
                tracing::warn!(?err, connection = %connection_key, "websocket read error");
                break;
            }
        }
    }

    writer.abort();
    let _ = state.mailbox.send(Envelope::ConnectionClosed { connection_key });
}
