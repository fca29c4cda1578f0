//! Domain events emitted by a table and the observer seam that consumes
//! them.
//!
//! Events carry only value data, never references into table state, so an
//! observer can ship them across a channel or serialize them onto the wire
//! as-is. Card visibility is the protocol layer's problem: the engine always
//! emits true cards in [`TableEvent::CardsDealt`] and the broadcaster masks
//! them for everyone but the owner.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::game::entities::{Card, Chips, PlayerId};
use crate::game::evaluator::HandRank;
use super::engine::GamePhase;

/// What a player did on their turn.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ActionKind {
    Check,
    Call,
    Raise,
    Fold,
    Draw,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Check => "checks",
            Self::Call => "calls",
            Self::Raise => "raises",
            Self::Fold => "folds",
            Self::Draw => "draws",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum TableEvent {
    PlayerJoined {
        id: PlayerId,
        name: String,
        chips: Chips,
    },
    GameStarted {
        game_id: Uuid,
    },
    StateChanged {
        new_phase: GamePhase,
    },
    CardsDealt {
        player_id: PlayerId,
        cards: Vec<Card>,
    },
    PlayerAction {
        player_id: PlayerId,
        action: ActionKind,
        amount: Chips,
        message: String,
    },
    TurnChanged {
        player_id: PlayerId,
        phase: GamePhase,
        amount_to_call: Chips,
        min_raise: Chips,
    },
    GameFinished {
        winner_id: PlayerId,
        pot_amount: Chips,
        hand_rank: Option<HandRank>,
        cards: Vec<Card>,
    },
    RoundInfo {
        pot_amount: Chips,
        highest_bet: Chips,
    },
}

impl fmt::Display for TableEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayerJoined { id, name, chips } => {
                write!(f, "{name} joined as player {id} with {chips} chips")
            }
            Self::GameStarted { game_id } => write!(f, "game {game_id} started"),
            Self::StateChanged { new_phase } => write!(f, "phase is now {new_phase}"),
            Self::CardsDealt { player_id, cards } => {
                write!(f, "player {player_id} holds ")?;
                for (i, card) in cards.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{card}")?;
                }
                Ok(())
            }
            Self::PlayerAction {
                player_id,
                action,
                amount,
                message,
            } => {
                if message.is_empty() {
                    write!(f, "player {player_id} {action} {amount}")
                } else {
                    write!(f, "player {player_id} {action} {amount} ({message})")
                }
            }
            Self::TurnChanged {
                player_id,
                phase,
                amount_to_call,
                min_raise,
            } => write!(
                f,
                "player {player_id} to act in {phase} ({amount_to_call} to call, min raise {min_raise})"
            ),
            Self::GameFinished {
                winner_id,
                pot_amount,
                hand_rank,
                ..
            } => match hand_rank {
                Some(rank) => {
                    write!(f, "player {winner_id} wins {pot_amount} with {rank}")
                }
                None => write!(f, "player {winner_id} wins {pot_amount} uncontested"),
            },
            Self::RoundInfo {
                pot_amount,
                highest_bet,
            } => write!(f, "pot {pot_amount}, highest bet {highest_bet}"),
        }
    }
}

/// Subscriber seam for the outbound event stream. Observers are invoked
/// synchronously inside the table lock, in emission order; an observer must
/// not block. A slow consumer should push onto its own outbound queue and
/// return.
pub trait TableObserver: Send {
    fn on_event(&self, event: &TableEvent);
}
