use serde::{Deserialize, Serialize};

/// The closed set of reasons a [`crate::ClientRequest`] can be rejected with.
///
/// Every variant here corresponds 1:1 to a failure mode enumerated in the
/// coordinator's request-error design; the wire form is the upper-snake-case
/// name so clients can `match` on it without guessing casing conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestErrorReason {
    InvalidRequest,
    HandleTaken,
    UserLimit,
    TotalGameLimit,
    InProgressGameLimit,
    AlreadyPlaying,
    InvalidPlayer,
    InvalidGame,
    GameAlreadyStarted,
    NotInvited,
    NoSeats,
    NotAdvertiser,
    NotYourTurn,
    IllegalMove,
    InvalidGameState,
    MessageTooLarge,
    NotAuthorized,
}
