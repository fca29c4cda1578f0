//! Deck lifecycle for a single hand.
//!
//! The dealer owns one deck per hand: shuffle, initial deal, draw-phase
//! exchanges, and remaining-card accounting. Every shuffle is seeded from OS
//! entropy and the seed is retained hex-encoded as an opaque audit token.

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::constants::HAND_SIZE;
use super::entities::{Card, Deck, Player};
use crate::table::errors::TableError;

#[derive(Debug)]
pub struct Dealer {
    deck: Deck,
    seed_token: String,
}

impl Default for Dealer {
    fn default() -> Self {
        Self::new()
    }
}

impl Dealer {
    /// A dealer with an unshuffled deck. [`Dealer::setup_new_deck`] must run
    /// before any cards are dealt for a hand.
    #[must_use]
    pub fn new() -> Self {
        Self {
            deck: Deck::ordered(),
            seed_token: String::new(),
        }
    }

    /// Discard the old deck and shuffle a fresh one. Called once per hand.
    pub fn setup_new_deck(&mut self) {
        let mut seed = [0u8; 32];
        rand::rng().fill(&mut seed);
        self.setup_from_seed(seed);
    }

    /// Shuffle a fresh deck from a caller-supplied seed. Exposed so hands
    /// can be replayed deterministically in tests.
    pub fn setup_from_seed(&mut self, seed: [u8; 32]) {
        self.seed_token = hex::encode(seed);
        let mut rng = StdRng::from_seed(seed);
        let mut deck = Deck::ordered();
        deck.shuffle(&mut rng);
        self.deck = deck;
    }

    /// Opaque audit token for the current hand's shuffle.
    #[must_use]
    pub fn audit_seed(&self) -> &str {
        &self.seed_token
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.deck.len()
    }

    /// Pre-flight guard: can the deck satisfy a demand of `n` cards?
    #[must_use]
    pub fn has_enough_cards(&self, n: usize) -> bool {
        self.deck.len() >= n
    }

    fn deal_card(&mut self) -> Result<Card, TableError> {
        self.deck.deal().ok_or(TableError::EmptyDeck)
    }

    /// Deal exactly [`HAND_SIZE`] cards to every in-hand player, failing
    /// fast (dealing nothing) when the deck cannot satisfy the demand.
    pub fn deal_initial_hands(&mut self, players: &mut [Player]) -> Result<(), TableError> {
        let demand = players.iter().filter(|p| p.is_in_hand()).count() * HAND_SIZE;
        if !self.has_enough_cards(demand) {
            return Err(TableError::EmptyDeck);
        }
        for player in players.iter_mut().filter(|p| p.is_in_hand()) {
            for _ in 0..HAND_SIZE {
                let card = self.deal_card()?;
                player.hand.push(card);
            }
        }
        Ok(())
    }

    /// Remove the player's cards at the given zero-based indexes and deal
    /// the same number of replacements. Indexes are processed in descending
    /// order so earlier removals don't shift later ones.
    pub fn exchange_cards(
        &mut self,
        player: &mut Player,
        indexes: &[usize],
    ) -> Result<Vec<Card>, TableError> {
        let mut indexes = indexes.to_vec();
        indexes.sort_unstable();
        indexes.dedup();
        if let Some(&index) = indexes.iter().find(|&&i| i >= player.hand.len()) {
            return Err(TableError::InvalidDiscardIndex { index });
        }
        if !self.has_enough_cards(indexes.len()) {
            return Err(TableError::DrawExceedsDeck {
                remaining: self.deck.len(),
            });
        }

        let mut discarded = Vec::with_capacity(indexes.len());
        for &index in indexes.iter().rev() {
            discarded.push(player.hand.remove(index));
        }
        for _ in 0..discarded.len() {
            let card = self.deal_card()?;
            player.hand.push(card);
        }
        Ok(discarded)
    }
}
