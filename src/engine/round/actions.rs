use serde::{Deserialize, Serialize};

/// What a player does on their turn. A raise carries its encrypted amount separately.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetAction {
    Call,
    Check,
    Raise,
    Fold,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::serde::assert_round_trip_eq;

    #[test]
    fn bet_action_round_trips_with_serde() {
        assert_round_trip_eq(&BetAction::Raise);
        assert_eq!(serde_json::to_string(&BetAction::Fold).unwrap(), "\"fold\"");
    }
}
