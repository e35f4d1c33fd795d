//! showdown: reveal verification, winner selection and hand settlement

pub mod ranking;
pub mod resolution;

use crate::cards::Card;

pub use ranking::{choose_best5_from7, pack_score_u32, score_five, HandCategory, NativeRanker};
pub use resolution::{reset_hand, select_winner, settle, verify_reveals, Reveal};

/// Ranks a 7-card holding. Lower ranks are stronger; the function must be pure.
pub trait HandRanker {
    fn rank(&self, community: &[Card; 5], hole: &[Card; 2]) -> u32;
}
