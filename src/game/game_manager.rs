//! Game manager exposing the public table operations.
//!
//! Every operation runs against a staged copy of [`GameState`]. The copy replaces the live state
//! only after every check, encrypted assertion and collaborator call has succeeded, so a
//! rejected operation leaves tables, rounds, balances, commitments and the journal untouched.

use std::collections::HashMap;

use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, warn};

use super::notifications::GameNotification;
use crate::cards::{
    Card, CommitmentContext, CommitmentStore, DealtHand, PlayerCardCommitment, PlayerPublicKey,
    RevealKey, SealedRevealKey,
};
use crate::collaborators::{AccessControl, TokenService};
use crate::config::EngineConfig;
use crate::encrypted::EncryptedBackend;
use crate::engine::round::{
    BetAction, BettingContext, ConfidentialBetting, Round, RoundBook, RoundEngine, RoundEvent,
    Transition,
};
use crate::errors::{on_assertion, PokerError, PokerResult};
use crate::ledger::hash::Journal;
use crate::ledger::state::ChipLedger;
use crate::ledger::types::{HandNumber, PlayerId, RoundIndex, StateHash, TableId};
use crate::showdown::{self, HandRanker, Reveal};
use crate::table::{Table, TableConfig, TableRegistry, TableState};

const LOG_TARGET: &str = "game::manager";

/// Everything an operation may write.
#[derive(Clone, Debug)]
pub struct GameState<C> {
    pub tables: TableRegistry<C>,
    pub rounds: RoundBook<C>,
    pub ledger: ChipLedger<C>,
    pub commitments: CommitmentStore,
    pub public_keys: HashMap<PlayerId, PlayerPublicKey>,
}

impl<C> Default for GameState<C> {
    fn default() -> Self {
        Self {
            tables: TableRegistry::default(),
            rounds: RoundBook::default(),
            ledger: ChipLedger::default(),
            commitments: CommitmentStore::default(),
            public_keys: HashMap::new(),
        }
    }
}

/// Result of a betting action as seen by the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandProgress {
    Continued { next_to_act: PlayerId },
    StreetClosed { closed: RoundIndex, next: RoundIndex },
    ShowdownEntered,
    WonByFold { winner: PlayerId },
}

pub struct GameManager<B, T, R, A>
where
    B: EncryptedBackend,
{
    backend: B,
    token: T,
    ranker: R,
    access: A,
    config: EngineConfig,
    rng: StdRng,
    state: GameState<B::Cipher>,
    journal: Journal<GameNotification<B::Cipher>>,
}

fn reject(op: &'static str, err: PokerError) -> PokerError {
    warn!(target: LOG_TARGET, op, error = %err, "operation rejected");
    err
}

impl<B, T, R, A> GameManager<B, T, R, A>
where
    B: EncryptedBackend,
    T: TokenService<B::Cipher>,
    R: HandRanker,
    A: AccessControl,
{
    /// Fails when `config` does not pass [`EngineConfig::validate`].
    pub fn new(
        config: EngineConfig,
        backend: B,
        token: T,
        ranker: R,
        access: A,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            backend,
            token,
            ranker,
            access,
            config,
            rng,
            state: GameState::default(),
            journal: Journal::new(),
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    pub fn access_mut(&mut self) -> &mut A {
        &mut self.access
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState<B::Cipher> {
        &self.state
    }

    pub fn journal(&self) -> &Journal<GameNotification<B::Cipher>> {
        &self.journal
    }

    /// Head of the notification hash chain.
    pub fn state_hash(&self) -> StateHash {
        self.journal.head()
    }

    pub fn table(&self, table_id: TableId) -> PokerResult<&Table<B::Cipher>> {
        self.state.tables.get(table_id)
    }

    /// The street currently being bet at `table_id`, if any.
    pub fn current_round(&self, table_id: TableId) -> Option<&Round<B::Cipher>> {
        let table = self.state.tables.get(table_id).ok()?;
        self.state.rounds.get(table_id, table.current_round_index)
    }

    pub fn balance(&self, player: PlayerId, table_id: TableId) -> Option<&B::Cipher> {
        self.state.ledger.balance(player, table_id)
    }

    pub fn commitment(
        &self,
        player: PlayerId,
        table_id: TableId,
        hand: HandNumber,
    ) -> Option<&PlayerCardCommitment> {
        self.state.commitments.get(player, table_id, hand)
    }

    fn commit(
        &mut self,
        staged: GameState<B::Cipher>,
        notifications: Vec<GameNotification<B::Cipher>>,
    ) -> PokerResult<()> {
        // append_all links nothing unless every message hashes
        self.journal
            .append_all(notifications)
            .map_err(|_| PokerError::Invariant("notification could not be journaled"))?;
        self.state = staged;
        Ok(())
    }

    fn require_privileged(&self, caller: PlayerId) -> PokerResult<()> {
        if self.access.is_privileged(caller) {
            Ok(())
        } else {
            Err(PokerError::Unauthorized)
        }
    }

    pub fn create_table(&mut self, config: TableConfig) -> PokerResult<TableId> {
        let mut staged = self.state.clone();
        let table_id = staged.tables.create(&self.backend, config);
        let snapshot = staged.tables.get(table_id)?.snapshot();
        self.commit(staged, vec![GameNotification::TableCreated { snapshot }])?;
        info!(target: LOG_TARGET, table_id, "table created");
        Ok(table_id)
    }

    /// Registers the compressed BN254 point `caller` wants hole cards sealed to.
    pub fn set_public_key(&mut self, caller: PlayerId, key_bytes: &[u8]) -> PokerResult<()> {
        let key = PlayerPublicKey::from_bytes(key_bytes)
            .map_err(|_| reject("set_public_key", PokerError::InvalidPublicKey))?;
        self.state.public_keys.insert(caller, key);
        info!(target: LOG_TARGET, player = caller, "public key registered");
        Ok(())
    }

    pub fn buy_in(
        &mut self,
        caller: PlayerId,
        table_id: TableId,
        amount: &B::Cipher,
    ) -> PokerResult<()> {
        self.try_buy_in(caller, table_id, amount)
            .map_err(|err| reject("buy_in", err))
    }

    fn try_buy_in(
        &mut self,
        caller: PlayerId,
        table_id: TableId,
        amount: &B::Cipher,
    ) -> PokerResult<()> {
        let backend = &self.backend;
        let mut staged = self.state.clone();
        let table = staged.tables.get_mut(table_id)?;
        let seated = table.is_seated(caller);
        if !seated && table.is_full() {
            return Err(PokerError::TableFull);
        }

        let minimum = backend.trivial(table.config.buy_in);
        let enough = backend.gte(amount, &minimum)?;
        backend
            .require(&enough)
            .map_err(|err| on_assertion(err, PokerError::InsufficientBuyIn))?;

        if !seated {
            table.players.push(caller);
        }
        let token_ref = table.config.token_ref.clone();
        staged.ledger.credit(backend, caller, table_id, amount)?;
        self.token.mint_encrypted(&token_ref, caller, amount)?;

        self.commit(
            staged,
            vec![GameNotification::BuyIn {
                table_id,
                player: caller,
            }],
        )?;
        info!(target: LOG_TARGET, table_id, player = caller, rebuy = seated, "buy-in accepted");
        Ok(())
    }

    /// Deals two sealed hole cards to every seated player and posts the blinds.
    ///
    /// `public_keys[i]` must be the key `players[i]` registered. The returned envelopes are for
    /// out-of-band delivery; the table keeps only the commitments.
    pub fn deal_cards(
        &mut self,
        caller: PlayerId,
        table_id: TableId,
        public_keys: &[PlayerPublicKey],
    ) -> PokerResult<Vec<DealtHand>> {
        self.try_deal_cards(caller, table_id, public_keys)
            .map_err(|err| reject("deal_cards", err))
    }

    fn try_deal_cards(
        &mut self,
        caller: PlayerId,
        table_id: TableId,
        public_keys: &[PlayerPublicKey],
    ) -> PokerResult<Vec<DealtHand>> {
        self.require_privileged(caller)?;
        let backend = &self.backend;
        let deck_size = self.config.deck_size;
        let mut staged = self.state.clone();
        let table = staged.tables.get_mut(table_id)?;

        if table.state != TableState::Inactive {
            return Err(PokerError::GameInProgress);
        }
        if public_keys.len() != table.players.len() {
            return Err(PokerError::KeyCountMismatch {
                expected: table.players.len(),
                actual: public_keys.len(),
            });
        }
        if table.players.len() < 2 {
            return Err(PokerError::NotEnoughPlayers);
        }
        for (player, key) in table.players.iter().zip(public_keys) {
            if staged.public_keys.get(player) != Some(key) {
                return Err(PokerError::InvalidPublicKey);
            }
        }

        let hand = table.total_hands;
        let mut envelopes = Vec::with_capacity(table.players.len());
        for (player, key) in table.players.iter().zip(public_keys) {
            let reveal_key = RevealKey::random(&mut self.rng);
            let context = |slot| CommitmentContext {
                table_id,
                hand,
                player: *player,
                slot,
            };
            let first = backend.random_below(deck_size);
            let second = backend.random_below(deck_size);
            let commitment = PlayerCardCommitment {
                card1_hash: backend.commit(&first, &reveal_key, &context(0))?,
                card2_hash: backend.commit(&second, &reveal_key, &context(1))?,
            };
            if !staged.commitments.record(*player, table_id, hand, commitment) {
                return Err(PokerError::Invariant("hole cards already committed"));
            }
            envelopes.push(DealtHand {
                table_id,
                hand,
                player: *player,
                cards: [backend.seal(&first, key)?, backend.seal(&second, key)?],
                reveal_key: SealedRevealKey::seal(&reveal_key, key, &mut self.rng),
            });
        }

        RoundEngine::start_hand(&mut BettingContext {
            backend,
            table,
            rounds: &mut staged.rounds,
            ledger: &mut staged.ledger,
        })?;

        self.commit(staged, vec![GameNotification::HandDealt { table_id, hand }])?;
        info!(target: LOG_TARGET, table_id, hand, players = envelopes.len(), "hole cards dealt");
        Ok(envelopes)
    }

    /// Applies `caller`'s betting action. `raise_amount` is required for [`BetAction::Raise`]
    /// and ignored otherwise.
    pub fn play_hand(
        &mut self,
        caller: PlayerId,
        table_id: TableId,
        action: BetAction,
        raise_amount: Option<&B::Cipher>,
    ) -> PokerResult<HandProgress> {
        self.try_play_hand(caller, table_id, action, raise_amount)
            .map_err(|err| reject("play_hand", err))
    }

    fn try_play_hand(
        &mut self,
        caller: PlayerId,
        table_id: TableId,
        action: BetAction,
        raise_amount: Option<&B::Cipher>,
    ) -> PokerResult<HandProgress> {
        let backend = &self.backend;
        let mut staged = self.state.clone();
        let table = staged.tables.get_mut(table_id)?;
        let hand = table.total_hands;

        let transition = RoundEngine::apply_action(
            &mut BettingContext {
                backend,
                table: &mut *table,
                rounds: &mut staged.rounds,
                ledger: &mut staged.ledger,
            },
            caller,
            action,
            raise_amount,
        )?;

        let mut notifications = Vec::new();
        for event in transition.events() {
            match event {
                RoundEvent::StreetEnded { round_index } => {
                    notifications.push(GameNotification::RoundOver {
                        table_id,
                        round_index: *round_index,
                    });
                }
                RoundEvent::ShowdownEntered => {
                    notifications.push(GameNotification::ShowdownEntered { table_id });
                }
                RoundEvent::HandEndedByFolds { winner } => {
                    showdown::settle(
                        backend,
                        table,
                        &mut staged.rounds,
                        &mut staged.ledger,
                        *winner,
                    )?;
                    notifications.push(GameNotification::HandSettled {
                        table_id,
                        hand,
                        winner: *winner,
                    });
                }
                RoundEvent::BlindsPosted { .. } | RoundEvent::ActionApplied { .. } => {}
            }
        }

        let progress = match transition {
            Transition::Continued { next_to_act, .. } => HandProgress::Continued { next_to_act },
            Transition::StreetEnd { closed, next, .. } => HandProgress::StreetClosed { closed, next },
            Transition::Showdown { .. } => HandProgress::ShowdownEntered,
            Transition::HandEnd { winner, .. } => HandProgress::WonByFold { winner },
        };
        self.commit(staged, notifications)?;
        Ok(progress)
    }

    pub fn deal_community_cards(
        &mut self,
        caller: PlayerId,
        table_id: TableId,
        round_id: RoundIndex,
        cards: &[Card],
    ) -> PokerResult<()> {
        self.try_deal_community_cards(caller, table_id, round_id, cards)
            .map_err(|err| reject("deal_community_cards", err))
    }

    fn try_deal_community_cards(
        &mut self,
        caller: PlayerId,
        table_id: TableId,
        round_id: RoundIndex,
        cards: &[Card],
    ) -> PokerResult<()> {
        self.require_privileged(caller)?;
        let mut staged = self.state.clone();
        let table = staged.tables.get_mut(table_id)?;
        if table.community_cards.len() + cards.len() > self.config.board_size {
            return Err(PokerError::IndexOutOfBounds);
        }
        table.community_cards.extend_from_slice(cards);

        self.commit(
            staged,
            vec![GameNotification::CommunityCardsDealt {
                table_id,
                round_id,
                cards: cards.to_vec(),
            }],
        )?;
        info!(target: LOG_TARGET, table_id, round_id, count = cards.len(), "community cards dealt");
        Ok(())
    }

    /// Verifies every remaining player's opening, pays the pot to the strongest hand and resets
    /// the table. `reveal_keys` and `revealed_cards` follow the river round's player order.
    pub fn showdown(
        &mut self,
        caller: PlayerId,
        table_id: TableId,
        reveal_keys: &[RevealKey],
        revealed_cards: &[[Card; 2]],
    ) -> PokerResult<PlayerId> {
        self.try_showdown(caller, table_id, reveal_keys, revealed_cards)
            .map_err(|err| reject("showdown", err))
    }

    fn try_showdown(
        &mut self,
        caller: PlayerId,
        table_id: TableId,
        reveal_keys: &[RevealKey],
        revealed_cards: &[[Card; 2]],
    ) -> PokerResult<PlayerId> {
        self.require_privileged(caller)?;
        let backend = &self.backend;
        let mut staged = self.state.clone();
        let table = staged.tables.get_mut(table_id)?;
        if table.state != TableState::Showdown {
            return Err(PokerError::NotInShowdown);
        }
        let players = staged
            .rounds
            .get(table_id, table.current_round_index)
            .map(|round| round.players.clone())
            .ok_or(PokerError::Invariant("showdown without a river round"))?;
        if reveal_keys.len() != players.len() || revealed_cards.len() != players.len() {
            return Err(PokerError::RevealCountMismatch {
                expected: players.len(),
                actual: reveal_keys.len().min(revealed_cards.len()),
            });
        }
        let board: [Card; 5] = table
            .community_cards
            .get(..5)
            .and_then(|cards| cards.try_into().ok())
            .ok_or(PokerError::IncompleteBoard {
                dealt: table.community_cards.len(),
                required: 5,
            })?;

        let hand = table.total_hands;
        let reveals: Vec<Reveal> = reveal_keys
            .iter()
            .zip(revealed_cards)
            .map(|(reveal_key, cards)| Reveal {
                reveal_key: reveal_key.clone(),
                cards: *cards,
            })
            .collect();
        showdown::verify_reveals(&staged.commitments, table_id, hand, &players, &reveals)?;
        let winner = showdown::select_winner(&self.ranker, &board, &players, revealed_cards)?;
        showdown::settle(backend, table, &mut staged.rounds, &mut staged.ledger, winner)?;

        self.commit(
            staged,
            vec![GameNotification::HandSettled {
                table_id,
                hand,
                winner,
            }],
        )?;
        Ok(winner)
    }

    /// Pays `amount` of `caller`'s table balance back out through the token service. The seat
    /// is kept.
    pub fn withdraw(
        &mut self,
        caller: PlayerId,
        table_id: TableId,
        amount: &B::Cipher,
    ) -> PokerResult<()> {
        self.try_withdraw(caller, table_id, amount)
            .map_err(|err| reject("withdraw", err))
    }

    fn try_withdraw(
        &mut self,
        caller: PlayerId,
        table_id: TableId,
        amount: &B::Cipher,
    ) -> PokerResult<()> {
        let backend = &self.backend;
        let mut staged = self.state.clone();
        let table = staged.tables.get(table_id)?;
        if table.state.hand_in_progress() {
            return Err(PokerError::GameInProgress);
        }
        let token_ref = table.config.token_ref.clone();

        let balance = staged.ledger.balance_or_zero(backend, caller, table_id);
        let covered = backend.gte(&balance, amount)?;
        if !backend.decrypt_bool(&covered) {
            return Err(PokerError::InsufficientBalance);
        }
        staged.ledger.debit(backend, caller, table_id, amount)?;
        self.token.transfer_encrypted(&token_ref, caller, amount)?;

        self.commit(
            staged,
            vec![GameNotification::Withdrawal {
                table_id,
                player: caller,
            }],
        )?;
        info!(target: LOG_TARGET, table_id, player = caller, "withdrawal paid");
        Ok(())
    }
}
