use super::types::Round;
use crate::ledger::types::PlayerId;

pub trait Seating {
    fn current_actor(&self) -> Option<PlayerId>;

    /// Hands the turn to the first player after `after` in `seat_order` who is still in the
    /// round, wrapping at the end. Players that are not in the round are skipped.
    fn pass_turn(&mut self, seat_order: &[PlayerId], after: PlayerId);
}

impl<C: Clone> Seating for Round<C> {
    fn current_actor(&self) -> Option<PlayerId> {
        self.players.get(self.turn).copied()
    }

    fn pass_turn(&mut self, seat_order: &[PlayerId], after: PlayerId) {
        let start = seat_order
            .iter()
            .position(|player| *player == after)
            .map_or(0, |seat| seat + 1);
        self.turn = seat_order
            .iter()
            .cycle()
            .skip(start)
            .take(seat_order.len())
            .find_map(|player| self.position(*player))
            .unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encrypted::{ClearBackend, EncryptedBackend};

    #[test]
    fn turn_wraps_around() {
        let backend = ClearBackend::new(Some(1));
        let mut round = Round::open(&backend, vec![5, 6, 7], backend.trivial(0));
        let mut seen = Vec::new();
        for _ in 0..4 {
            let actor = round.current_actor().unwrap();
            seen.push(actor);
            round.pass_turn(&[5, 6, 7], actor);
        }
        assert_eq!(seen, vec![5, 6, 7, 5]);
    }

    #[test]
    fn turn_follows_seats_not_list_order() {
        let backend = ClearBackend::new(Some(1));
        // seat 6 folded and 8 was swapped into its slot
        let mut round = Round::open(&backend, vec![5, 8, 7], backend.trivial(0));
        let seats = [5, 6, 7, 8];

        round.pass_turn(&seats, 6);
        assert_eq!(round.current_actor(), Some(7));
        round.pass_turn(&seats, 7);
        assert_eq!(round.current_actor(), Some(8));
        round.pass_turn(&seats, 8);
        assert_eq!(round.current_actor(), Some(5));
    }
}
