//! A concurrent 5-card draw poker engine.
//!
//! Each [`table::Table`] is an independent state machine behind an exclusive
//! lock: network-facing callers translate commands into method calls, the
//! engine applies them atomically, and observers receive an ordered stream
//! of [`table::TableEvent`]s to broadcast. The [`game`] module holds the
//! underlying domain: cards and decks, hand evaluation, dealing, turn order,
//! and main/side pot accounting.
//!
//! ```
//! use draw_poker::game::Username;
//! use draw_poker::table::{Table, TableConfig};
//!
//! let table = Table::new(TableConfig::default())?;
//! let alice = table.add_player(Username::new("alice"))?;
//! let bob = table.add_player(Username::new("bob"))?;
//! table.start_game()?;
//! assert_eq!(table.pot_total(), 20);
//! # let _ = (alice, bob);
//! # Ok::<(), draw_poker::table::TableError>(())
//! ```

pub mod game;
pub mod table;
