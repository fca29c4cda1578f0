//! Core draw-poker domain: cards, players, hand evaluation, dealing, turn
//! order, and pot accounting. Everything here is synchronous and pure-ish;
//! orchestration and locking live in [`crate::table`].

pub mod constants;
pub mod dealer;
pub mod entities;
pub mod evaluator;
pub mod pot;
pub mod turns;

pub use constants::{DECK_SIZE, HAND_SIZE, MAX_PLAYERS};
pub use dealer::Dealer;
pub use entities::{ACE, Card, Chips, Deck, Player, PlayerId, PlayerStatus, Suit, Username, Value};
pub use evaluator::{HandRank, HandValue, evaluate};
pub use pot::{Pot, PotManager};
pub use turns::TurnOrder;
