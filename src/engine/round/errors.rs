use crate::encrypted::EncryptedError;

#[derive(Debug, PartialEq, Eq)]
pub enum ActionError {
    NoActiveRound,
    NotPlayersTurn,
    IllegalAction,
    Encrypted(EncryptedError),
    State(StateError),
}

impl From<EncryptedError> for ActionError {
    fn from(err: EncryptedError) -> Self {
        ActionError::Encrypted(err)
    }
}

impl From<StateError> for ActionError {
    fn from(err: StateError) -> Self {
        ActionError::State(err)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum StateError {
    InvalidTransition,
    InvariantViolation(&'static str),
}

pub trait InvariantCheck {
    fn validate_invariants(&self) -> Result<(), StateError>;
}
