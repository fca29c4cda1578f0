//! Main/side pot construction and payout.
//!
//! Pots are built from heterogeneous current-round bets: each distinct bet
//! level contributes one slice, eligible to the non-folded players who bet
//! at least that level. Chip conservation holds across every operation:
//! amounts paid out always equal amounts collected.

use log::warn;
use serde::Serialize;
use std::collections::BTreeSet;

use super::entities::{Chips, Player, PlayerId};

/// An amount plus the set of player ids entitled to win it. Index 0 in the
/// manager is the main pot; later entries are side pots in ascending
/// bet-level order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Pot {
    pub amount: Chips,
    pub eligible: BTreeSet<PlayerId>,
}

#[derive(Debug, Default)]
pub struct PotManager {
    pots: Vec<Pot>,
}

impl PotManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pot_count(&self) -> usize {
        self.pots.len()
    }

    #[must_use]
    pub fn pots(&self) -> &[Pot] {
        &self.pots
    }

    #[must_use]
    pub fn total(&self) -> Chips {
        self.pots.iter().map(|pot| pot.amount).sum()
    }

    /// Discard all pots at the top of a new hand.
    pub fn clear(&mut self) {
        self.pots.clear();
    }

    /// Accumulate an ante into the main pot and mark the contributor
    /// eligible for it. Used for the ante phase only.
    pub fn add_ante(&mut self, player: PlayerId, amount: Chips) {
        if self.pots.is_empty() {
            self.pots.push(Pot {
                amount: 0,
                eligible: BTreeSet::new(),
            });
        }
        let main = &mut self.pots[0];
        main.amount += amount;
        main.eligible.insert(player);
    }

    /// Collect every player's current-round bet into the pot ladder and
    /// reset the round bets.
    ///
    /// Uniform bets collapse into a single slice; unequal bets (all-ins)
    /// produce one slice per distinct level, each eligible to the non-folded
    /// players who bet at least that level. Folded players' chips stay in
    /// the slices they reached but they are never eligible. The lowest slice
    /// merges into the existing main pot when its eligible set matches the
    /// main pot's surviving contenders; otherwise it opens a new side pot.
    pub fn distribute_bets(&mut self, players: &mut [Player]) {
        let bets: Vec<(PlayerId, Chips, bool)> = players
            .iter()
            .filter(|p| p.round_bet > 0)
            .map(|p| (p.id, p.round_bet, p.is_in_hand()))
            .collect();
        for player in players.iter_mut() {
            player.reset_round_bet();
        }
        if bets.is_empty() {
            return;
        }

        let mut levels: Vec<Chips> = bets.iter().map(|&(_, bet, _)| bet).collect();
        levels.sort_unstable();
        levels.dedup();

        let in_hand: BTreeSet<PlayerId> = players
            .iter()
            .filter(|p| p.is_in_hand())
            .map(|p| p.id)
            .collect();

        let mut prev = 0;
        for (slice, &level) in levels.iter().enumerate() {
            let contributors = bets.iter().filter(|&&(_, bet, _)| bet >= level).count() as Chips;
            let amount = (level - prev) * contributors;
            let eligible: BTreeSet<PlayerId> = bets
                .iter()
                .filter(|&&(_, bet, in_hand)| bet >= level && in_hand)
                .map(|&(id, _, _)| id)
                .collect();

            let merge_into_main = slice == 0
                && self.pots.first().is_some_and(|main| {
                    let survivors: BTreeSet<PlayerId> =
                        main.eligible.intersection(&in_hand).copied().collect();
                    survivors == eligible
                });
            if merge_into_main {
                self.pots[0].amount += amount;
            } else {
                self.pots.push(Pot { amount, eligible });
            }
            prev = level;
        }
    }

    /// Pay the whole pot at `index` to `winner` if they are eligible for
    /// it, then zero the pot. Returns the amount paid (0 for an ineligible
    /// winner or unknown pot).
    pub fn award_pot(&mut self, index: usize, players: &mut [Player], winner: PlayerId) -> Chips {
        let Some(pot) = self.pots.get_mut(index) else {
            return 0;
        };
        if !pot.eligible.contains(&winner) {
            return 0;
        }
        let Some(player) = players.get_mut(winner) else {
            warn!("pot {index} winner {winner} has no seat; leaving pot in place");
            return 0;
        };
        let amount = pot.amount;
        pot.amount = 0;
        player.chips += amount;
        amount
    }

    /// Split the pot at `index` evenly among `winners`, handing the
    /// remainder out one chip at a time to the first winners in iteration
    /// order. Deterministic and exact. Returns the amount distributed.
    pub fn split_pot(
        &mut self,
        index: usize,
        players: &mut [Player],
        winners: &[PlayerId],
    ) -> Chips {
        let Some(pot) = self.pots.get_mut(index) else {
            return 0;
        };
        if winners.is_empty() {
            return 0;
        }
        let amount = pot.amount;
        let share = amount / winners.len() as Chips;
        let remainder = amount % winners.len() as Chips;
        pot.amount = 0;

        for (i, &winner) in winners.iter().enumerate() {
            let extra = Chips::from((i as Chips) < remainder);
            match players.get_mut(winner) {
                Some(player) => player.chips += share + extra,
                None => {
                    warn!("split winner {winner} has no seat; their share is forfeit");
                }
            }
        }
        amount
    }

    /// Premature-end payout: every pot goes to the sole survivor regardless
    /// of per-pot eligibility. Returns the total paid.
    pub fn award_all(&mut self, players: &mut [Player], winner: PlayerId) -> Chips {
        let total = self.total();
        let Some(player) = players.get_mut(winner) else {
            warn!("uncontested winner {winner} has no seat; leaving pots in place");
            return 0;
        };
        for pot in &mut self.pots {
            pot.amount = 0;
        }
        player.chips += total;
        total
    }
}
