//! Request errors: the client-attributable half of the error design. Every
//! variant here maps 1:1 to a [`protocol::RequestErrorReason`] and carries
//! enough context to render a human `comment`. Handlers return
//! `Result<(), RequestError>`; on `Err`, the coordinator loop emits a single
//! `REQUEST_FAILED` to the offending connection and leaves the store
//! untouched — see `handlers::dispatch`.

use protocol::RequestErrorReason;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request is malformed: {0}")]
    InvalidRequest(String),
    #[error("handle '{0}' is already taken")]
    HandleTaken(String),
    #[error("registered player limit reached")]
    UserLimit,
    #[error("total game limit reached")]
    TotalGameLimit,
    #[error("in-progress game limit reached")]
    InProgressGameLimit,
    #[error("player is already in a game")]
    AlreadyPlaying,
    #[error("no such player")]
    InvalidPlayer,
    #[error("no such game")]
    InvalidGame,
    #[error("game has already started")]
    GameAlreadyStarted,
    #[error("player was not invited to this private game")]
    NotInvited,
    #[error("game has no open seats")]
    NoSeats,
    #[error("only the advertiser may do this")]
    NotAdvertiser,
    #[error("it is not this player's turn")]
    NotYourTurn,
    #[error("'{0}' is not a legal move")]
    IllegalMove(String),
    #[error("game is not in a state that allows this request")]
    InvalidGameState,
    #[error("message exceeds the maximum allowed size")]
    MessageTooLarge,
    #[error("player is not authorized to perform this request")]
    NotAuthorized,
}

impl RequestError {
    pub fn reason(&self) -> RequestErrorReason {
        match self {
            RequestError::InvalidRequest(_) => RequestErrorReason::InvalidRequest,
            RequestError::HandleTaken(_) => RequestErrorReason::HandleTaken,
            RequestError::UserLimit => RequestErrorReason::UserLimit,
            RequestError::TotalGameLimit => RequestErrorReason::TotalGameLimit,
            RequestError::InProgressGameLimit => RequestErrorReason::InProgressGameLimit,
            RequestError::AlreadyPlaying => RequestErrorReason::AlreadyPlaying,
            RequestError::InvalidPlayer => RequestErrorReason::InvalidPlayer,
            RequestError::InvalidGame => RequestErrorReason::InvalidGame,
            RequestError::GameAlreadyStarted => RequestErrorReason::GameAlreadyStarted,
            RequestError::NotInvited => RequestErrorReason::NotInvited,
            RequestError::NoSeats => RequestErrorReason::NoSeats,
            RequestError::NotAdvertiser => RequestErrorReason::NotAdvertiser,
            RequestError::NotYourTurn => RequestErrorReason::NotYourTurn,
            RequestError::IllegalMove(_) => RequestErrorReason::IllegalMove,
            RequestError::InvalidGameState => RequestErrorReason::InvalidGameState,
            RequestError::MessageTooLarge => RequestErrorReason::MessageTooLarge,
            RequestError::NotAuthorized => RequestErrorReason::NotAuthorized,
        }
    }

    pub fn comment(&self) -> String {
        self.to_string()
    }
}

/// A programmer error: an internal invariant was violated. There is no
/// recovery path that preserves correctness, so this aborts the process
/// (see `invariant!`) rather than being handled like a `RequestError`.
#[macro_export]
macro_rules! invariant {
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            tracing::error!($($arg)*);
            panic!(concat!("invariant violated: ", stringify!($cond)));
        }
    };
}
