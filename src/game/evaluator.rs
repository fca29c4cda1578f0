//! 5-card hand evaluation.
//!
//! Pure and deterministic: a hand of exactly 5 cards maps to a [`HandValue`]
//! that orders under the usual poker rules. The wheel (A-2-3-4-5) counts as
//! the lowest straight.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::constants::HAND_SIZE;
use super::entities::{ACE, Card, Value};
use crate::table::errors::TableError;

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum HandRank {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "high card",
            Self::OnePair => "one pair",
            Self::TwoPair => "two pair",
            Self::ThreeOfAKind => "three of a kind",
            Self::Straight => "straight",
            Self::Flush => "flush",
            Self::FullHouse => "full house",
            Self::FourOfAKind => "four of a kind",
            Self::StraightFlush => "straight flush",
            Self::RoyalFlush => "royal flush",
        };
        write!(f, "{repr}")
    }
}

/// An evaluated hand. Ordering is derived: rank category first, then the
/// rank-defining values, then the kickers, both compared lexicographically
/// (all value lists are stored in descending power order).
#[derive(Clone, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HandValue {
    pub rank: HandRank,
    /// Values that define the rank (e.g. the pair value, the straight high).
    pub cards: Vec<Value>,
    /// Remaining values that only break ties.
    pub kickers: Vec<Value>,
}

impl fmt::Display for HandValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.rank.fmt(f)
    }
}

/// Evaluate exactly 5 cards. Rejects any other hand size.
pub fn evaluate(hand: &[Card]) -> Result<HandValue, TableError> {
    if hand.len() != HAND_SIZE {
        return Err(TableError::InvalidHandSize { got: hand.len() });
    }

    // Descending values.
    let mut values: Vec<Value> = hand.iter().map(|c| c.0).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = hand.iter().all(|c| c.1 == hand[0].1);
    let straight_high = straight_high(&values);

    // Group values by multiplicity: (count, value), highest count first,
    // then highest value.
    let mut groups: Vec<(u8, Value)> = Vec::with_capacity(HAND_SIZE);
    for &value in &values {
        match groups.iter_mut().find(|(_, v)| *v == value) {
            Some((count, _)) => *count += 1,
            None => groups.push((1, value)),
        }
    }
    groups.sort_unstable_by(|a, b| b.cmp(a));

    let hand_value = match (straight_high, is_flush) {
        (Some(high), true) if high == ACE => HandValue {
            rank: HandRank::RoyalFlush,
            cards: vec![high],
            kickers: vec![],
        },
        (Some(high), true) => HandValue {
            rank: HandRank::StraightFlush,
            cards: vec![high],
            kickers: vec![],
        },
        _ if groups[0].0 == 4 => HandValue {
            rank: HandRank::FourOfAKind,
            cards: vec![groups[0].1],
            kickers: vec![groups[1].1],
        },
        _ if groups[0].0 == 3 && groups[1].0 == 2 => HandValue {
            rank: HandRank::FullHouse,
            cards: vec![groups[0].1, groups[1].1],
            kickers: vec![],
        },
        (None, true) => HandValue {
            rank: HandRank::Flush,
            cards: values,
            kickers: vec![],
        },
        (Some(high), false) => HandValue {
            rank: HandRank::Straight,
            cards: vec![high],
            kickers: vec![],
        },
        _ if groups[0].0 == 3 => HandValue {
            rank: HandRank::ThreeOfAKind,
            cards: vec![groups[0].1],
            kickers: vec![groups[1].1, groups[2].1],
        },
        _ if groups[0].0 == 2 && groups[1].0 == 2 => HandValue {
            rank: HandRank::TwoPair,
            cards: vec![groups[0].1, groups[1].1],
            kickers: vec![groups[2].1],
        },
        _ if groups[0].0 == 2 => HandValue {
            rank: HandRank::OnePair,
            cards: vec![groups[0].1],
            kickers: vec![groups[1].1, groups[2].1, groups[3].1],
        },
        _ => HandValue {
            rank: HandRank::HighCard,
            cards: vec![values[0]],
            kickers: values[1..].to_vec(),
        },
    };

    Ok(hand_value)
}

/// The high card of a 5-card straight, if the values form one. Values must
/// be sorted descending. The wheel ranks as a 5-high straight.
fn straight_high(values: &[Value]) -> Option<Value> {
    if values.windows(2).any(|w| w[0] == w[1]) {
        return None;
    }
    if values.windows(2).all(|w| w[0] == w[1] + 1) {
        return Some(values[0]);
    }
    // A-2-3-4-5: descending is [14, 5, 4, 3, 2].
    if values == [ACE, 5, 4, 3, 2] {
        return Some(5);
    }
    None
}
