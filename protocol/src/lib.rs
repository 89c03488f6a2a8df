//! The wire protocol shared between the coordinator and every connected client.
//!
//! Every frame exchanged over the WebSocket is a single JSON object shaped like
//! `{ "message": <kind>, "context": { ... } }`. This crate defines the closed
//! sets of request and event kinds, their context payloads, and the small
//! value types (identifiers, colors, game modes) that appear in them. It has
//! no knowledge of `tokio`, `axum`, or how the coordinator stores anything —
//! it is purely the shape of the bytes on the wire, the same role `protocol`
//! plays for the relay server this system is descended from.

mod ids;
mod reason;
mod request;
mod event;
mod types;

pub use ids::{GameId, PlayerId};
pub use reason::RequestErrorReason;
pub use request::{ClientRequest, RequestKind};
pub use event::{ServerEvent, EventKind};
pub use types::{
    Color, CompletionReason, GameMode, GameSummary, LegalMoveSummary, PlayerSummary,
    SeatState, SeatSummary, Visibility,
};
