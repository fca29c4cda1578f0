//! Game-wide constants.

use super::entities::Chips;

/// Number of cards in a fresh deck.
pub const DECK_SIZE: usize = 52;

/// Cards dealt to each player in 5-card draw.
pub const HAND_SIZE: usize = 5;

/// Hard cap on seats at a single table.
pub const MAX_PLAYERS: usize = 8;

pub const DEFAULT_MAX_PLAYERS: usize = 6;
pub const DEFAULT_MIN_PLAYERS: usize = 2;
pub const DEFAULT_BUY_IN: Chips = 1000;
pub const DEFAULT_ANTE: Chips = 10;
pub const DEFAULT_MAX_DRAW: usize = 3;

/// Longest allowed display name.
pub const MAX_USERNAME_LENGTH: usize = 16;
