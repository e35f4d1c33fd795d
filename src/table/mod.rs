//! Table configuration, membership and the table-level state machine.

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::encrypted::EncryptedBackend;
use crate::errors::{PokerError, PokerResult};
use crate::ledger::types::{PlayerId, RoundIndex, TableId};

/// Public chip amounts from the table configuration. Only player stakes are encrypted.
pub type Chips = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableState {
    /// Between hands.
    Inactive,
    /// A hand is being bet.
    Active,
    /// All streets finished; hole cards await reveal.
    Showdown,
}

impl TableState {
    pub fn hand_in_progress(self) -> bool {
        !matches!(self, TableState::Inactive)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub buy_in: Chips,
    pub max_players: usize,
    pub big_blind: Chips,
    /// Identifier of the token contract backing this table's chips.
    pub token_ref: String,
}

#[derive(Clone, Debug)]
pub struct Table<C> {
    pub id: TableId,
    pub config: TableConfig,
    pub state: TableState,
    pub total_hands: u64,
    pub current_round_index: RoundIndex,
    /// Seat order. Blinds are posted by the last two seats.
    pub players: Vec<PlayerId>,
    pub pot: C,
    /// Street contributions removed from the pot by folds. Never paid out.
    pub forfeited: C,
    pub community_cards: Vec<Card>,
}

impl<C: Clone> Table<C> {
    pub fn is_seated(&self, player: PlayerId) -> bool {
        self.players.contains(&player)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.config.max_players
    }

    pub fn snapshot(&self) -> TableSnapshot<C> {
        TableSnapshot {
            table_id: self.id,
            state: self.state,
            total_hands: self.total_hands,
            current_round_index: self.current_round_index,
            buy_in: self.config.buy_in,
            max_players: self.config.max_players,
            big_blind: self.config.big_blind,
            token_ref: self.config.token_ref.clone(),
            players: self.players.clone(),
            pot: self.pot.clone(),
        }
    }
}

/// Public view of a table. The pot is carried as a ciphertext handle only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot<C> {
    pub table_id: TableId,
    pub state: TableState,
    pub total_hands: u64,
    pub current_round_index: RoundIndex,
    pub buy_in: Chips,
    pub max_players: usize,
    pub big_blind: Chips,
    pub token_ref: String,
    pub players: Vec<PlayerId>,
    pub pot: C,
}

/// Tables indexed by id. Tables are never deleted.
#[derive(Clone, Debug)]
pub struct TableRegistry<C> {
    tables: Vec<Table<C>>,
}

impl<C> Default for TableRegistry<C> {
    fn default() -> Self {
        Self { tables: Vec::new() }
    }
}

impl<C: Clone> TableRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create<B>(&mut self, backend: &B, config: TableConfig) -> TableId
    where
        B: EncryptedBackend<Cipher = C>,
    {
        let id = self.tables.len() as TableId;
        self.tables.push(Table {
            id,
            config,
            state: TableState::Inactive,
            total_hands: 0,
            current_round_index: 0,
            players: Vec::new(),
            pot: backend.trivial(0),
            forfeited: backend.trivial(0),
            community_cards: Vec::new(),
        });
        id
    }

    pub fn get(&self, table_id: TableId) -> PokerResult<&Table<C>> {
        usize::try_from(table_id)
            .ok()
            .and_then(|index| self.tables.get(index))
            .ok_or(PokerError::IndexOutOfBounds)
    }

    pub fn get_mut(&mut self, table_id: TableId) -> PokerResult<&mut Table<C>> {
        usize::try_from(table_id)
            .ok()
            .and_then(|index| self.tables.get_mut(index))
            .ok_or(PokerError::IndexOutOfBounds)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
