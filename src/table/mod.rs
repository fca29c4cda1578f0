//! Table orchestration: configuration, the phase state machine, the event
//! stream, and the process-wide registry.

pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod registry;

pub use config::TableConfig;
pub use engine::{GamePhase, PlayerView, Table};
pub use errors::TableError;
pub use events::{ActionKind, TableEvent, TableObserver};
pub use registry::TableRegistry;
