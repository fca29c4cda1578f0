//! Per-table configuration.

use serde::{Deserialize, Serialize};

use super::errors::TableError;
use crate::game::constants::{
    DEFAULT_ANTE, DEFAULT_BUY_IN, DEFAULT_MAX_DRAW, DEFAULT_MAX_PLAYERS, DEFAULT_MIN_PLAYERS,
    HAND_SIZE, MAX_PLAYERS,
};
use crate::game::entities::Chips;

/// Knobs fixed at table construction. The minimum raise tracks the ante
/// rather than the last raise size; [`TableConfig::min_raise`] exists so the
/// engine never reads the ante for that purpose directly.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableConfig {
    pub max_players: usize,
    pub min_players: usize,
    /// Starting stack handed to every player on join.
    pub buy_in: Chips,
    pub ante: Chips,
    /// Most cards a player may discard in the draw phase.
    pub max_draw: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_players: DEFAULT_MAX_PLAYERS,
            min_players: DEFAULT_MIN_PLAYERS,
            buy_in: DEFAULT_BUY_IN,
            ante: DEFAULT_ANTE,
            max_draw: DEFAULT_MAX_DRAW,
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), TableError> {
        if self.min_players < 2 {
            return Err(TableError::InvalidConfig(
                "min_players must be at least 2".into(),
            ));
        }
        if self.max_players < self.min_players {
            return Err(TableError::InvalidConfig(
                "max_players must be >= min_players".into(),
            ));
        }
        if self.max_players > MAX_PLAYERS {
            return Err(TableError::InvalidConfig(format!(
                "max_players capped at {MAX_PLAYERS}"
            )));
        }
        if self.ante == 0 {
            return Err(TableError::InvalidConfig("ante must be positive".into()));
        }
        if self.buy_in < self.ante {
            return Err(TableError::InvalidConfig(
                "buy_in must cover at least one ante".into(),
            ));
        }
        if self.max_draw > HAND_SIZE {
            return Err(TableError::InvalidConfig(format!(
                "max_draw capped at {HAND_SIZE}"
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn min_raise(&self) -> Chips {
        self.ante
    }
}
