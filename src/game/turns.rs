//! Dealer-button rotation and the active-turn cursor.
//!
//! Operates on the table's player list by seat index only; it never holds
//! its own copy of player state.

use super::entities::Player;

#[derive(Debug, Default)]
pub struct TurnOrder {
    dealer_idx: Option<usize>,
    turn_idx: usize,
}

impl TurnOrder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn dealer_index(&self) -> Option<usize> {
        self.dealer_idx
    }

    #[must_use]
    pub fn turn_index(&self) -> usize {
        self.turn_idx
    }

    /// Advance the button one seat (wrapping), or seat it at 0 on the very
    /// first hand.
    pub fn rotate_dealer(&mut self, seat_count: usize) {
        self.dealer_idx = Some(match self.dealer_idx {
            None => 0,
            Some(idx) => (idx + 1) % seat_count,
        });
    }

    /// Point the cursor at the first in-hand seat clockwise of the dealer.
    /// Returns false when no such seat exists.
    pub fn start_from_left_of_dealer(&mut self, players: &[Player]) -> bool {
        let dealer = self.dealer_idx.unwrap_or(0);
        let start = (dealer + 1) % players.len();
        for offset in 0..players.len() {
            let idx = (start + offset) % players.len();
            if players[idx].is_in_hand() {
                self.turn_idx = idx;
                return true;
            }
        }
        false
    }

    /// Advance the cursor to the next in-hand seat. Returns false when no
    /// in-hand seat exists within one full lap, which signals that the
    /// round must end.
    pub fn next_player(&mut self, players: &[Player]) -> bool {
        for offset in 1..=players.len() {
            let idx = (self.turn_idx + offset) % players.len();
            if players[idx].is_in_hand() {
                self.turn_idx = idx;
                return true;
            }
        }
        false
    }

    /// Count of players still contending for the pot.
    #[must_use]
    pub fn count_active(&self, players: &[Player]) -> usize {
        players.iter().filter(|p| p.is_in_hand()).count()
    }
}
