use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ledger::types::PlayerId;

const LOG_TARGET: &str = "collaborators::token";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token transfer rejected: {0}")]
    Rejected(String),
    #[error("token service unavailable")]
    Unavailable,
}

/// Confidential token backing table chips. Amounts stay encrypted end to end.
pub trait TokenService<C> {
    /// Pulls `amount` from `player` into the table's custody.
    fn mint_encrypted(&mut self, token_ref: &str, player: PlayerId, amount: &C)
        -> Result<(), TokenError>;

    /// Pays `amount` out of custody to `to`.
    fn transfer_encrypted(&mut self, token_ref: &str, to: PlayerId, amount: &C)
        -> Result<(), TokenError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenOpKind {
    Mint,
    Transfer,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenOp<C> {
    pub kind: TokenOpKind,
    pub token_ref: String,
    pub player: PlayerId,
    pub amount: C,
}

/// Records every call. A queued failure is returned by the next call instead.
#[derive(Clone, Debug)]
pub struct InMemoryToken<C> {
    ops: Vec<TokenOp<C>>,
    fail_next: Option<TokenError>,
}

impl<C> Default for InMemoryToken<C> {
    fn default() -> Self {
        Self {
            ops: Vec::new(),
            fail_next: None,
        }
    }
}

impl<C: Clone> InMemoryToken<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&mut self, err: TokenError) {
        self.fail_next = Some(err);
    }

    pub fn ops(&self) -> &[TokenOp<C>] {
        &self.ops
    }

    fn record(
        &mut self,
        kind: TokenOpKind,
        token_ref: &str,
        player: PlayerId,
        amount: &C,
    ) -> Result<(), TokenError> {
        if let Some(err) = self.fail_next.take() {
            return Err(err);
        }
        debug!(target: LOG_TARGET, ?kind, token_ref, player, "token operation");
        self.ops.push(TokenOp {
            kind,
            token_ref: token_ref.to_string(),
            player,
            amount: amount.clone(),
        });
        Ok(())
    }
}

impl<C: Clone> TokenService<C> for InMemoryToken<C> {
    fn mint_encrypted(
        &mut self,
        token_ref: &str,
        player: PlayerId,
        amount: &C,
    ) -> Result<(), TokenError> {
        self.record(TokenOpKind::Mint, token_ref, player, amount)
    }

    fn transfer_encrypted(
        &mut self,
        token_ref: &str,
        to: PlayerId,
        amount: &C,
    ) -> Result<(), TokenError> {
        self.record(TokenOpKind::Transfer, token_ref, to, amount)
    }
}
