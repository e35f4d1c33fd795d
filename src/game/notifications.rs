use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::ledger::types::{HandNumber, PlayerId, RoundIndex, TableId};
use crate::table::TableSnapshot;

/// Observable record of a committed operation. No variant carries a decrypted amount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameNotification<C> {
    TableCreated {
        snapshot: TableSnapshot<C>,
    },
    BuyIn {
        table_id: TableId,
        player: PlayerId,
    },
    HandDealt {
        table_id: TableId,
        hand: HandNumber,
    },
    RoundOver {
        table_id: TableId,
        round_index: RoundIndex,
    },
    CommunityCardsDealt {
        table_id: TableId,
        round_id: RoundIndex,
        cards: Vec<Card>,
    },
    ShowdownEntered {
        table_id: TableId,
    },
    HandSettled {
        table_id: TableId,
        hand: HandNumber,
        winner: PlayerId,
    },
    Withdrawal {
        table_id: TableId,
        player: PlayerId,
    },
}

impl<C> GameNotification<C> {
    pub fn table_id(&self) -> TableId {
        match self {
            GameNotification::TableCreated { snapshot } => snapshot.table_id,
            GameNotification::BuyIn { table_id, .. }
            | GameNotification::HandDealt { table_id, .. }
            | GameNotification::RoundOver { table_id, .. }
            | GameNotification::CommunityCardsDealt { table_id, .. }
            | GameNotification::ShowdownEntered { table_id }
            | GameNotification::HandSettled { table_id, .. }
            | GameNotification::Withdrawal { table_id, .. } => *table_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::serde::assert_round_trip_eq;

    #[test]
    fn notifications_are_tagged_by_kind() {
        let note: GameNotification<u64> = GameNotification::RoundOver {
            table_id: 4,
            round_index: 1,
        };
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["type"], "round_over");
        assert_eq!(note.table_id(), 4);
        assert_round_trip_eq(&note);

        assert_round_trip_eq(&GameNotification::<u64>::CommunityCardsDealt {
            table_id: 1,
            round_id: 1,
            cards: vec![Card(3), Card(51)],
        });
    }
}
