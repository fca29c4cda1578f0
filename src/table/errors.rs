//! Error taxonomy for table operations.
//!
//! Every rule or structural violation is a recoverable, typed error reported
//! synchronously to the offending caller; table state is unchanged by a
//! rejected call. Each variant carries a stable machine-readable code (see
//! [`TableError::code`]) alongside its human-readable message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::entities::{Chips, PlayerId};

#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum TableError {
    #[error("not legal in the current game phase")]
    WrongState,
    #[error("table is full")]
    TooManyPlayers,
    #[error("need {min}+ players")]
    TooFewPlayers { min: usize },
    #[error("not your turn")]
    OutOfTurn,
    #[error("invalid move")]
    InvalidMove,
    #[error("need {needed} more chips")]
    InsufficientChips { needed: Chips },
    #[error("raise must be at least {min}")]
    RaiseBelowMinimum { min: Chips },
    #[error("can't draw more than {max} cards")]
    IllegalDraw { max: usize },
    #[error("deck can't cover the draw, {remaining} cards left")]
    DrawExceedsDeck { remaining: usize },
    #[error("discard index {index} out of range")]
    InvalidDiscardIndex { index: usize },
    #[error("deck exhausted")]
    EmptyDeck,
    #[error("no such player: {0}")]
    UnknownPlayer(PlayerId),
    #[error("a hand has exactly 5 cards, got {got}")]
    InvalidHandSize { got: usize },
    #[error("invalid table config: {0}")]
    InvalidConfig(String),
}

impl TableError {
    /// Stable machine-readable code for the protocol layer.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::WrongState => "wrong_state",
            Self::TooManyPlayers => "too_many_players",
            Self::TooFewPlayers { .. } => "too_few_players",
            Self::OutOfTurn => "out_of_turn",
            Self::InvalidMove => "invalid_move",
            Self::InsufficientChips { .. } => "insufficient_chips",
            Self::RaiseBelowMinimum { .. } => "raise_below_minimum",
            // A draw the deck can't cover is still an illegal draw to the
            // protocol layer; "empty_deck" is reserved for exhaustion while
            // cards are being dealt.
            Self::IllegalDraw { .. } | Self::DrawExceedsDeck { .. } => "illegal_draw",
            Self::InvalidDiscardIndex { .. } => "invalid_discard_index",
            Self::EmptyDeck => "empty_deck",
            Self::UnknownPlayer(_) => "unknown_player",
            Self::InvalidHandSize { .. } => "invalid_hand_size",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}
