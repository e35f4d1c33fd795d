use core::cmp::Reverse;

use super::HandRanker;
use crate::cards::Card;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum HandCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8, // royal is a straight flush with high = 14
}

impl HandCategory {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Base-16 multipliers for packing (cat, c1..c5).
pub const M5: u32 = 1_048_576; // 16^5
pub const M4: u32 = 65_536; // 16^4
pub const M3: u32 = 4_096; // 16^3
pub const M2: u32 = 256; // 16^2
pub const M1: u32 = 16; // 16^1
pub const M0: u32 = 1; // 16^0

/// Packed score of a royal flush, the strongest possible hand.
pub const MAX_SCORE: u32 = HandCategory::StraightFlush as u32 * M5 + 14 * M4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoredHand {
    pub category: HandCategory,
    pub tiebreak: [u8; 5],
    pub score: u32,
}

/// Pack (cat, c1..c5) into a u32. Higher is stronger.
#[inline]
pub fn pack_score_u32(cat: HandCategory, c: [u8; 5]) -> u32 {
    (cat.as_u8() as u32) * M5
        + (c[0] as u32) * M4
        + (c[1] as u32) * M3
        + (c[2] as u32) * M2
        + (c[3] as u32) * M1
        + (c[4] as u32) * M0
}

/// High card of a run of five distinct ranks given in descending order, counting the wheel
/// (A-2-3-4-5) as five-high.
fn straight_high(desc: &[u8; 5]) -> Option<u8> {
    let run = desc.windows(2).all(|w| w[0] == w[1] + 1);
    if run {
        Some(desc[0])
    } else if *desc == [14, 5, 4, 3, 2] {
        Some(5)
    } else {
        None
    }
}

/// Classifies exactly five cards.
pub fn score_five(hand: &[Card; 5]) -> ScoredHand {
    let mut ranks = hand.map(|card| card.rank());
    ranks.sort_unstable_by_key(|rank| Reverse(*rank));
    let flush = hand.iter().all(|card| card.suit() == hand[0].suit());

    let mut counts = [0u8; 15];
    for rank in ranks {
        counts[rank as usize] += 1;
    }
    // (count, rank) groups, largest group first, then highest rank
    let mut groups: Vec<(u8, u8)> = (2..=14u8)
        .rev()
        .filter(|rank| counts[*rank as usize] > 0)
        .map(|rank| (counts[rank as usize], rank))
        .collect();
    groups.sort_by_key(|(count, rank)| Reverse((*count, *rank)));

    let mut grouped = [0u8; 5];
    for (slot, (_, rank)) in grouped.iter_mut().zip(groups.iter()) {
        *slot = *rank;
    }

    let straight = if groups.len() == 5 {
        straight_high(&ranks)
    } else {
        None
    };

    let (category, tiebreak) = match (straight, flush, groups[0].0, groups.get(1).map(|g| g.0)) {
        (Some(high), true, _, _) => (HandCategory::StraightFlush, [high, 0, 0, 0, 0]),
        (_, _, 4, _) => (HandCategory::FourOfAKind, grouped),
        (_, _, 3, Some(2)) => (HandCategory::FullHouse, grouped),
        (None, true, _, _) => (HandCategory::Flush, ranks),
        (Some(high), false, _, _) => (HandCategory::Straight, [high, 0, 0, 0, 0]),
        (_, _, 3, _) => (HandCategory::ThreeOfAKind, grouped),
        (_, _, 2, Some(2)) => (HandCategory::TwoPair, grouped),
        (_, _, 2, _) => (HandCategory::OnePair, grouped),
        _ => (HandCategory::HighCard, ranks),
    };

    ScoredHand {
        category,
        tiebreak,
        score: pack_score_u32(category, tiebreak),
    }
}

/// Enumerates all 21 five-card subsets of seven cards and keeps the highest score.
pub fn choose_best5_from7(cards: &[Card; 7]) -> ScoredHand {
    let mut best: Option<ScoredHand> = None;
    for a in 0..=2 {
        for b in (a + 1)..=3 {
            for c in (b + 1)..=4 {
                for d in (c + 1)..=5 {
                    for e in (d + 1)..=6 {
                        let scored = score_five(&[cards[a], cards[b], cards[c], cards[d], cards[e]]);
                        if best.map_or(true, |current| scored.score > current.score) {
                            best = Some(scored);
                        }
                    }
                }
            }
        }
    }
    best.unwrap_or_else(|| score_five(&[cards[0], cards[1], cards[2], cards[3], cards[4]]))
}

/// Best-five-of-seven evaluator. Ranks are `MAX_SCORE - score`, so 0 is a royal flush.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeRanker;

impl HandRanker for NativeRanker {
    fn rank(&self, community: &[Card; 5], hole: &[Card; 2]) -> u32 {
        let seven = [
            community[0],
            community[1],
            community[2],
            community[3],
            community[4],
            hole[0],
            hole[1],
        ];
        MAX_SCORE - choose_best5_from7(&seven).score
    }
}
