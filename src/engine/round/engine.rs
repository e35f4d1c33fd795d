use tracing::{debug, info};

use super::actions::*;
use super::errors::*;
use super::events::*;
use super::rules::*;
use super::seating::Seating;
use super::state::*;
use super::types::*;
use crate::encrypted::EncryptedBackend;
use crate::ledger::state::ChipLedger;
use crate::ledger::types::{PlayerId, RoundIndex, RIVER};
use crate::table::{Table, TableState};

const LOG_TARGET: &str = "engine::round";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Continued {
        events: Vec<RoundEvent>,
        next_to_act: PlayerId,
    },
    StreetEnd {
        events: Vec<RoundEvent>,
        closed: RoundIndex,
        next: RoundIndex,
    },
    Showdown {
        events: Vec<RoundEvent>,
    },
    HandEnd {
        events: Vec<RoundEvent>,
        winner: PlayerId,
    },
}

impl Transition {
    pub fn events(&self) -> &[RoundEvent] {
        match self {
            Transition::Continued { events, .. }
            | Transition::StreetEnd { events, .. }
            | Transition::Showdown { events }
            | Transition::HandEnd { events, .. } => events,
        }
    }
}

/// The slices of game state a betting step reads and writes.
pub struct BettingContext<'a, B: EncryptedBackend> {
    pub backend: &'a B,
    pub table: &'a mut Table<B::Cipher>,
    pub rounds: &'a mut RoundBook<B::Cipher>,
    pub ledger: &'a mut ChipLedger<B::Cipher>,
}

pub trait ConfidentialBetting {
    /// Opens street 0 for every seated player and posts the blinds.
    fn start_hand<B: EncryptedBackend>(
        ctx: &mut BettingContext<'_, B>,
    ) -> Result<Vec<RoundEvent>, ActionError>;

    fn apply_action<B: EncryptedBackend>(
        ctx: &mut BettingContext<'_, B>,
        caller: PlayerId,
        action: BetAction,
        raise_amount: Option<&B::Cipher>,
    ) -> Result<Transition, ActionError>;

    /// Closes the current street and opens the next one, or moves the table to showdown after
    /// the river.
    fn advance_street<B: EncryptedBackend>(
        ctx: &mut BettingContext<'_, B>,
        events: Vec<RoundEvent>,
    ) -> Result<Transition, ActionError>;
}

pub struct RoundEngine;

fn post_blind<B: EncryptedBackend>(
    ctx: &mut BettingContext<'_, B>,
    round: &mut Round<B::Cipher>,
    seat: usize,
    amount: &B::Cipher,
) -> Result<(), ActionError> {
    let backend = ctx.backend;
    let player = round.players[seat];
    let balance = ctx.ledger.balance_or_zero(backend, player, ctx.table.id);
    let funded = backend.gte(&balance, amount)?;
    backend
        .require(&funded)
        .map_err(|_| ActionError::IllegalAction)?;
    ctx.ledger.debit(backend, player, ctx.table.id, amount)?;
    ctx.table.pot = backend.add(&ctx.table.pot, amount)?;
    round.chips[seat] = backend.add(&round.chips[seat], amount)?;
    Ok(())
}

impl ConfidentialBetting for RoundEngine {
    fn start_hand<B: EncryptedBackend>(
        ctx: &mut BettingContext<'_, B>,
    ) -> Result<Vec<RoundEvent>, ActionError> {
        let backend = ctx.backend;
        let players = ctx.table.players.clone();
        if players.len() < 2 {
            return Err(StateError::InvalidTransition.into());
        }
        let big_blind = ctx.table.config.big_blind;
        let mut round = Round::open(backend, players, backend.trivial(big_blind));

        let small_seat = round.len() - 2;
        let big_seat = round.len() - 1;
        post_blind(ctx, &mut round, small_seat, &backend.trivial(big_blind / 2))?;
        post_blind(ctx, &mut round, big_seat, &backend.trivial(big_blind))?;
        round.validate_invariants()?;

        let table_id = ctx.table.id;
        let event = RoundEvent::BlindsPosted {
            small_blind: round.players[small_seat],
            big_blind: round.players[big_seat],
        };
        ctx.rounds.clear_table(table_id);
        ctx.rounds.insert(table_id, 0, round);
        ctx.table.state = TableState::Active;
        ctx.table.current_round_index = 0;
        ctx.table.community_cards.clear();

        info!(target: LOG_TARGET, table_id, big_blind, "hand started");
        Ok(vec![event])
    }

    fn apply_action<B: EncryptedBackend>(
        ctx: &mut BettingContext<'_, B>,
        caller: PlayerId,
        action: BetAction,
        raise_amount: Option<&B::Cipher>,
    ) -> Result<Transition, ActionError> {
        if ctx.table.state != TableState::Active {
            return Err(ActionError::NoActiveRound);
        }
        let backend = ctx.backend;
        let table_id = ctx.table.id;
        let round_index = ctx.table.current_round_index;
        let round = ctx
            .rounds
            .get_mut(table_id, round_index)
            .filter(|round| round.active)
            .ok_or(ActionError::NoActiveRound)?;
        if round.current_actor() != Some(caller) {
            return Err(ActionError::NotPlayersTurn);
        }
        let seat = round.turn;
        let mut events = Vec::new();

        match action {
            BetAction::Call => {
                round.require_call(backend, seat)?;
                round.acted[seat] = true;
            }
            BetAction::Check => {
                round.require_check(backend)?;
                round.acted[seat] = true;
            }
            BetAction::Raise => {
                let amount = raise_amount.ok_or(ActionError::IllegalAction)?;
                let balance = ctx.ledger.balance_or_zero(backend, caller, table_id);
                round.require_raise(backend, amount, &balance)?;
                ctx.ledger.debit(backend, caller, table_id, amount)?;
                ctx.table.pot = backend.add(&ctx.table.pot, amount)?;
                round.chips[seat] = backend.add(&round.chips[seat], amount)?;
                round.highest_chip = backend.max(&round.highest_chip, amount)?;
                round.acted[seat] = true;
            }
            BetAction::Fold => {
                let (_, contribution) = round.remove_at(seat);
                ctx.table.pot = backend.sub(&ctx.table.pot, &contribution)?;
                ctx.table.forfeited = backend.add(&ctx.table.forfeited, &contribution)?;
            }
        }
        events.push(RoundEvent::ActionApplied {
            player: caller,
            action,
        });
        debug!(target: LOG_TARGET, table_id, round_index, caller, ?action, "action applied");

        if round.len() == 1 {
            let winner = round.players[0];
            round.active = false;
            events.push(RoundEvent::HandEndedByFolds { winner });
            return Ok(Transition::HandEnd { events, winner });
        }

        if round.everyone_acted() && round.contributions_settled(backend)? {
            round.validate_invariants()?;
            return Self::advance_street(ctx, events);
        }

        round.pass_turn(&ctx.table.players, caller);
        round.validate_invariants()?;
        let next_to_act = round
            .current_actor()
            .ok_or(StateError::InvariantViolation("round has no players"))?;
        Ok(Transition::Continued {
            events,
            next_to_act,
        })
    }

    fn advance_street<B: EncryptedBackend>(
        ctx: &mut BettingContext<'_, B>,
        mut events: Vec<RoundEvent>,
    ) -> Result<Transition, ActionError> {
        let backend = ctx.backend;
        let table_id = ctx.table.id;
        let closed = ctx.table.current_round_index;
        let round = ctx
            .rounds
            .get_mut(table_id, closed)
            .ok_or(ActionError::NoActiveRound)?;
        round.active = false;
        // back to seat order; folds reorder the closed street's list
        let players: Vec<PlayerId> = ctx
            .table
            .players
            .iter()
            .copied()
            .filter(|player| round.players.contains(player))
            .collect();
        events.push(RoundEvent::StreetEnded {
            round_index: closed,
        });

        if closed >= RIVER {
            ctx.table.state = TableState::Showdown;
            events.push(RoundEvent::ShowdownEntered);
            info!(target: LOG_TARGET, table_id, "betting complete, awaiting reveal");
            return Ok(Transition::Showdown { events });
        }

        let next = closed + 1;
        ctx.rounds
            .insert(table_id, next, Round::open(backend, players, backend.trivial(0)));
        ctx.table.current_round_index = next;
        info!(target: LOG_TARGET, table_id, closed, next, "street closed");
        Ok(Transition::StreetEnd {
            events,
            closed,
            next,
        })
    }
}
