//! Process-wide table map.
//!
//! Explicitly constructed and passed down by the owning server, never a
//! global. The registry only maps ids to tables; each table serializes its
//! own state, so the registry lock is held just long enough to clone an
//! [`Arc`].

use log::info;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

use super::config::TableConfig;
use super::engine::Table;
use super::errors::TableError;

#[derive(Default)]
pub struct TableRegistry {
    tables: RwLock<HashMap<Uuid, Arc<Table>>>,
}

impl TableRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config, construct the table, and register it. Returns
    /// the shared handle.
    pub fn create(&self, config: TableConfig) -> Result<Arc<Table>, TableError> {
        let table = Arc::new(Table::new(config)?);
        let id = table.id();
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&table));
        info!("table {id} registered");
        Ok(table)
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<Arc<Table>> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Evict a finished table. Existing handles stay valid until dropped.
    pub fn remove(&self, id: Uuid) -> Option<Arc<Table>> {
        let removed = self
            .tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if removed.is_some() {
            info!("table {id} evicted");
        }
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
