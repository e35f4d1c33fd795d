use tracing::info;

use super::HandRanker;
use crate::cards::{Card, CommitmentStore, RevealKey};
use crate::encrypted::{EncryptedBackend, EncryptedError};
use crate::engine::round::{Round, RoundBook};
use crate::errors::{PokerError, PokerResult};
use crate::ledger::state::ChipLedger;
use crate::ledger::types::{HandNumber, PlayerId, TableId};
use crate::table::{Table, TableState};

const LOG_TARGET: &str = "showdown";

/// A player's opening: the reveal key from their envelope and the two cards it unlocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reveal {
    pub reveal_key: RevealKey,
    pub cards: [Card; 2],
}

/// Checks every opening against the stored commitments. One bad opening rejects them all.
pub fn verify_reveals(
    commitments: &CommitmentStore,
    table_id: TableId,
    hand: HandNumber,
    players: &[PlayerId],
    reveals: &[Reveal],
) -> PokerResult<()> {
    if players.len() != reveals.len() {
        return Err(PokerError::RevealCountMismatch {
            expected: players.len(),
            actual: reveals.len(),
        });
    }
    for (player, reveal) in players.iter().zip(reveals) {
        let valid = reveal.cards.iter().all(Card::is_valid)
            && commitments
                .get(*player, table_id, hand)
                .is_some_and(|stored| {
                    stored.verify(table_id, hand, *player, &reveal.reveal_key, &reveal.cards)
                });
        if !valid {
            return Err(PokerError::CardVerificationFailed);
        }
    }
    Ok(())
}

/// Lowest rank wins; on equal ranks the earlier player keeps the pot.
pub fn select_winner<R: HandRanker + ?Sized>(
    ranker: &R,
    board: &[Card; 5],
    players: &[PlayerId],
    holes: &[[Card; 2]],
) -> PokerResult<PlayerId> {
    let mut best: Option<(PlayerId, u32)> = None;
    for (player, hole) in players.iter().zip(holes) {
        let rank = ranker.rank(board, hole);
        if best.map_or(true, |(_, best_rank)| rank < best_rank) {
            best = Some((*player, rank));
        }
    }
    best.map(|(player, _)| player).ok_or(PokerError::ZeroWinner)
}

/// Pays the whole pot to `winner` and resets the table for the next hand.
pub fn settle<B: EncryptedBackend>(
    backend: &B,
    table: &mut Table<B::Cipher>,
    rounds: &mut RoundBook<B::Cipher>,
    ledger: &mut ChipLedger<B::Cipher>,
    winner: PlayerId,
) -> Result<(), EncryptedError> {
    ledger.credit(backend, winner, table.id, &table.pot)?;
    info!(target: LOG_TARGET, table_id = table.id, hand = table.total_hands, winner, "hand settled");
    reset_hand(backend, table, rounds);
    Ok(())
}

/// Back to `Inactive` with an empty pot and board. Round 0 is reopened for the seated players
/// at the big blind, without posting blinds.
pub fn reset_hand<B: EncryptedBackend>(
    backend: &B,
    table: &mut Table<B::Cipher>,
    rounds: &mut RoundBook<B::Cipher>,
) {
    table.state = TableState::Inactive;
    table.total_hands += 1;
    table.current_round_index = 0;
    table.pot = backend.trivial(0);
    table.community_cards.clear();

    let mut fresh = Round::open(
        backend,
        table.players.clone(),
        backend.trivial(table.config.big_blind),
    );
    fresh.active = false;
    rounds.clear_table(table.id);
    rounds.insert(table.id, 0, fresh);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardCommitment, CommitmentContext, PlayerCardCommitment};
    use crate::encrypted::{ClearBackend, Handle};
    use crate::showdown::NativeRanker;
    use crate::table::{TableConfig, TableRegistry};

    fn commit(store: &mut CommitmentStore, player: PlayerId, key: &RevealKey, cards: [Card; 2]) {
        let ctx = |slot| CommitmentContext {
            table_id: 0,
            hand: 0,
            player,
            slot,
        };
        store.record(
            player,
            0,
            0,
            PlayerCardCommitment {
                card1_hash: CardCommitment::compute(&ctx(0), key, u32::from(cards[0].code())),
                card2_hash: CardCommitment::compute(&ctx(1), key, u32::from(cards[1].code())),
            },
        );
    }

    fn reveal(key: &RevealKey, cards: [Card; 2]) -> Reveal {
        Reveal {
            reveal_key: key.clone(),
            cards,
        }
    }

    struct FixedRanker(Vec<u32>);

    impl HandRanker for FixedRanker {
        fn rank(&self, _community: &[Card; 5], hole: &[Card; 2]) -> u32 {
            self.0[hole[0].code() as usize]
        }
    }

    #[test]
    fn all_reveals_must_match_their_commitments() {
        let mut store = CommitmentStore::new();
        let k1 = RevealKey::new([1; 32]);
        let k2 = RevealKey::new([2; 32]);
        commit(&mut store, 10, &k1, [Card(0), Card(1)]);
        commit(&mut store, 11, &k2, [Card(2), Card(3)]);

        let good = [reveal(&k1, [Card(0), Card(1)]), reveal(&k2, [Card(2), Card(3)])];
        assert_eq!(verify_reveals(&store, 0, 0, &[10, 11], &good), Ok(()));

        let swapped = [reveal(&k1, [Card(0), Card(1)]), reveal(&k2, [Card(3), Card(2)])];
        assert_eq!(
            verify_reveals(&store, 0, 0, &[10, 11], &swapped),
            Err(PokerError::CardVerificationFailed)
        );

        assert_eq!(
            verify_reveals(&store, 0, 0, &[10, 12], &good),
            Err(PokerError::CardVerificationFailed)
        );
        assert_eq!(
            verify_reveals(&store, 0, 0, &[10, 11], &good[..1]),
            Err(PokerError::RevealCountMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn lowest_rank_wins_and_ties_go_to_the_first_player() {
        let board = [Card(40), Card(41), Card(42), Card(43), Card(44)];
        let ranker = FixedRanker(vec![7, 3, 3, 9]);
        let holes = [[Card(0), Card(5)], [Card(1), Card(5)], [Card(2), Card(5)], [Card(3), Card(5)]];

        assert_eq!(select_winner(&ranker, &board, &[20, 21, 22, 23], &holes), Ok(21));
        assert_eq!(
            select_winner(&ranker, &board, &[22, 21], &[holes[2], holes[1]]),
            Ok(22)
        );
        assert_eq!(
            select_winner(&NativeRanker, &board, &[], &[]),
            Err(PokerError::ZeroWinner)
        );
    }

    #[test]
    fn settle_pays_the_pot_and_resets() {
        let backend = ClearBackend::new(Some(1));
        let mut registry = TableRegistry::new();
        let id = registry.create(
            &backend,
            TableConfig {
                buy_in: 0,
                max_players: 4,
                big_blind: 10,
                token_ref: "chips".into(),
            },
        );
        let mut table = registry.get(id).unwrap().clone();
        table.players = vec![1, 2];
        table.state = TableState::Showdown;
        table.current_round_index = 3;
        table.pot = backend.encrypt(40);
        table.community_cards = vec![Card(1); 5];

        let mut rounds: RoundBook<Handle> = RoundBook::new();
        rounds.insert(id, 3, Round::open(&backend, vec![2], backend.trivial(0)));
        let mut ledger = ChipLedger::new();
        ledger.credit(&backend, 2, id, &backend.encrypt(60)).unwrap();

        settle(&backend, &mut table, &mut rounds, &mut ledger, 2).unwrap();

        assert_eq!(backend.reveal(ledger.balance(2, id).unwrap()).unwrap(), 100);
        assert_eq!(backend.reveal(&table.pot).unwrap(), 0);
        assert_eq!(table.state, TableState::Inactive);
        assert_eq!(table.total_hands, 1);
        assert_eq!(table.current_round_index, 0);
        assert!(table.community_cards.is_empty());

        assert!(rounds.get(id, 3).is_none());
        let fresh = rounds.get(id, 0).unwrap();
        assert_eq!(fresh.players, vec![1, 2]);
        assert_eq!(backend.reveal(&fresh.highest_chip).unwrap(), 10);
        assert!(!fresh.active);
    }
}
