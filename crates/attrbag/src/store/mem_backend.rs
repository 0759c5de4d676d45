use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::backend::ColumnBackend;
use crate::error::{AttrError, Result};
use crate::model::{ColumnKey, EntityKind};

/// In-memory column backend.
///
/// Uses `RefCell` for interior mutability so that [`ColumnBackend`] can take
/// `&self` everywhere; a backend instance is not shared across threads.
#[derive(Debug, Default)]
pub struct MemBackend {
    columns: RefCell<BTreeMap<ColumnKey, String>>,
    simulate_write_error: Cell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Test helper to plant raw text, bypassing the encoder.
    pub fn put_raw(&self, key: ColumnKey, text: &str) {
        self.columns.borrow_mut().insert(key, text.to_string());
    }

    pub fn len(&self) -> usize {
        self.columns.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.borrow().is_empty()
    }
}

impl ColumnBackend for MemBackend {
    fn read_column(&self, key: &ColumnKey) -> Result<Option<String>> {
        Ok(self.columns.borrow().get(key).cloned())
    }

    fn write_column(&self, key: &ColumnKey, text: Option<&str>) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(AttrError::Store("Simulated write error".to_string()));
        }
        let mut columns = self.columns.borrow_mut();
        match text {
            Some(text) => {
                columns.insert(key.clone(), text.to_string());
            }
            None => {
                columns.remove(key);
            }
        }
        Ok(())
    }

    fn list_columns(&self, entity: EntityKind) -> Result<Vec<ColumnKey>> {
        Ok(self
            .columns
            .borrow()
            .keys()
            .filter(|key| key.entity == entity)
            .cloned()
            .collect())
    }
}
