use crate::collaborators::TokenError;
use crate::encrypted::EncryptedError;
use crate::engine::round::{ActionError, StateError};

/// Every way a public table operation can be rejected. A rejected operation leaves no trace in
/// table, round, ledger or commitment state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PokerError {
    #[error("table is full")]
    TableFull,
    #[error("buy-in below the table minimum")]
    InsufficientBuyIn,
    #[error("a hand is already in progress")]
    GameInProgress,
    #[error("expected {expected} public keys, got {actual}")]
    KeyCountMismatch { expected: usize, actual: usize },
    #[error("at least two players are required")]
    NotEnoughPlayers,
    #[error("no betting round is open")]
    NoActiveRound,
    #[error("it is not this player's turn")]
    NotYourTurn,
    #[error("illegal action")]
    IllegalAction,
    #[error("table is not in showdown")]
    NotInShowdown,
    #[error("expected {expected} reveals, got {actual}")]
    RevealCountMismatch { expected: usize, actual: usize },
    #[error("revealed cards do not match the commitment")]
    CardVerificationFailed,
    #[error("caller is not authorized")]
    Unauthorized,
    #[error("index out of bounds")]
    IndexOutOfBounds,
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("no winner could be determined")]
    ZeroWinner,
    #[error("withdrawal exceeds balance")]
    InsufficientBalance,
    #[error("board has {dealt} of {required} community cards")]
    IncompleteBoard { dealt: usize, required: usize },
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Encrypted(#[from] EncryptedError),
    #[error("invariant violated: {0}")]
    Invariant(&'static str),
}

pub type PokerResult<T> = Result<T, PokerError>;

impl From<ActionError> for PokerError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::NoActiveRound => PokerError::NoActiveRound,
            ActionError::NotPlayersTurn => PokerError::NotYourTurn,
            ActionError::IllegalAction => PokerError::IllegalAction,
            ActionError::Encrypted(err) => PokerError::Encrypted(err),
            // start_hand is only reached after the seat count was checked
            ActionError::State(StateError::InvalidTransition) => PokerError::NotEnoughPlayers,
            ActionError::State(StateError::InvariantViolation(what)) => PokerError::Invariant(what),
        }
    }
}

/// Maps a failed encrypted assertion onto the operation-specific rejection.
pub(crate) fn on_assertion(err: EncryptedError, rejection: PokerError) -> PokerError {
    match err {
        EncryptedError::AssertionFailed => rejection,
        other => PokerError::Encrypted(other),
    }
}
