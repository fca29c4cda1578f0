use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::constants;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Club, Self::Spade, Self::Diamond, Self::Heart];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// Card value. 2..=14, ace high.
pub type Value = u8;

pub const ACE: Value = 14;

/// A card is a tuple of a value (2u8 ... ace=14u8) and a suit.
/// Total order is by value, then suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            14 => "A",
            11 => "J",
            12 => "Q",
            13 => "K",
            v => &v.to_string(),
        };
        let repr = format!("{value}/{}", self.1);
        write!(f, "{repr:>4}")
    }
}

/// A mutable, shuffled sequence of the 52 unique cards. A new deck is
/// constructed at the start of every hand; the old one is discarded.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Build the 52 unique cards in canonical order, unshuffled.
    #[must_use]
    pub fn ordered() -> Self {
        let mut cards = Vec::with_capacity(constants::DECK_SIZE);
        for value in 2..=ACE {
            for suit in Suit::ALL {
                cards.push(Card(value, suit));
            }
        }
        Self { cards }
    }

    pub fn shuffle<R: rand::Rng>(&mut self, rng: &mut R) {
        use rand::seq::SliceRandom;
        self.cards.shuffle(rng);
    }

    /// Deal the top card, or `None` when the deck is exhausted.
    pub fn deal(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Type alias for whole chips. All bets and player stacks are whole chips.
pub type Chips = u32;

/// Handle into a table's player arena. Assigned at join time; stable from
/// the moment a game starts (lobby departures compact the arena).
pub type PlayerId = usize;

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Username(String);

impl Username {
    pub fn new(s: &str) -> Self {
        let mut username: String = s
            .chars()
            .map(|c| if c.is_ascii_whitespace() { '_' } else { c })
            .collect();
        username.truncate(constants::MAX_USERNAME_LENGTH);
        Self(username)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<String> for Username {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PlayerStatus {
    /// In the hand and still able to act.
    Active,
    /// Forfeited this hand.
    Folded,
    /// Committed their whole stack; in the hand but out of moves.
    AllIn,
    /// Not participating (busted or disconnected).
    SittingOut,
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Active => "active",
            Self::Folded => "folded",
            Self::AllIn => "all-in",
            Self::SittingOut => "sitting out",
        };
        write!(f, "{repr}")
    }
}

/// Per-participant mutable state. The table owns the canonical player list;
/// other components refer to players by id/index only.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: Username,
    pub chips: Chips,
    /// Total contributed during the current betting round.
    pub round_bet: Chips,
    pub hand: Vec<Card>,
    pub status: PlayerStatus,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, name: Username, chips: Chips) -> Self {
        Self {
            id,
            name,
            chips,
            round_bet: 0,
            hand: Vec::with_capacity(constants::HAND_SIZE),
            status: PlayerStatus::Active,
        }
    }

    /// Move up to `amount` chips from the stack into the current-round bet,
    /// clipping to the remaining stack. A bet that empties the stack flips
    /// the player to all-in immediately. Returns the amount actually bet.
    pub fn bet(&mut self, amount: Chips) -> Chips {
        let amount = amount.min(self.chips);
        self.chips -= amount;
        self.round_bet += amount;
        if self.chips == 0 && self.status == PlayerStatus::Active {
            self.status = PlayerStatus::AllIn;
        }
        amount
    }

    pub fn fold(&mut self) {
        self.status = PlayerStatus::Folded;
    }

    /// Reset for a new hand. Folded and all-in players re-enter active play
    /// if they still have chips; busted players sit out. Sitting-out players
    /// stay out.
    pub fn clear_hand(&mut self) {
        self.hand.clear();
        self.round_bet = 0;
        if self.status != PlayerStatus::SittingOut {
            self.status = if self.chips > 0 {
                PlayerStatus::Active
            } else {
                PlayerStatus::SittingOut
            };
        }
    }

    pub fn reset_round_bet(&mut self) {
        self.round_bet = 0;
    }

    /// Still contending for the pot (not folded, not sitting out).
    #[must_use]
    pub fn is_in_hand(&self) -> bool {
        matches!(self.status, PlayerStatus::Active | PlayerStatus::AllIn)
    }

    #[must_use]
    pub fn is_folded(&self) -> bool {
        self.status == PlayerStatus::Folded
    }
}

/// Bookkeeping for one betting round. Created fresh on every phase
/// transition and discarded when the phase changes.
#[derive(Debug, Default)]
pub struct Round {
    /// Highest total contributed this round by any player.
    pub current_bet: Chips,
    /// Count of actions since the last raise.
    pub actions_in_round: usize,
    /// Seat index of the last player to raise.
    pub last_aggressor: Option<usize>,
}

impl Round {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_action(&mut self) {
        self.actions_in_round += 1;
    }

    /// A raise reopens the action: the raiser's own action is the only one
    /// counted toward completion.
    pub fn record_raise(&mut self, new_bet: Chips, aggressor_idx: usize) {
        self.current_bet = new_bet;
        self.actions_in_round = 1;
        self.last_aggressor = Some(aggressor_idx);
    }

    #[must_use]
    pub fn is_complete(&self, active_count: usize) -> bool {
        active_count < 2 || self.actions_in_round >= active_count
    }
}
