//! Interfaces to the services the table state machine depends on but does not implement.

pub mod access;
pub mod token;

pub use access::{AccessControl, DealerGate};
pub use token::{InMemoryToken, TokenError, TokenOp, TokenOpKind, TokenService};
