use serde::{Deserialize, Serialize};

use super::actions::BetAction;
use crate::ledger::types::{PlayerId, RoundIndex};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundEvent {
    BlindsPosted {
        small_blind: PlayerId,
        big_blind: PlayerId,
    },
    ActionApplied {
        player: PlayerId,
        action: BetAction,
    },
    StreetEnded {
        round_index: RoundIndex,
    },
    ShowdownEntered,
    HandEndedByFolds {
        winner: PlayerId,
    },
}
