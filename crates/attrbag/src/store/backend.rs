use crate::error::Result;
use crate::model::{ColumnKey, EntityKind};

/// Raw text I/O for attribute columns.
///
/// Backends know nothing about values; they store and return column text
/// verbatim. Decoding happens above them so every backend shares one numeric
/// policy.
pub trait ColumnBackend {
    /// Returns the stored text, or `Ok(None)` if the column holds no value.
    /// Returns Err only on actual I/O errors.
    fn read_column(&self, key: &ColumnKey) -> Result<Option<String>>;

    /// Stores `text`, or removes the column when `text` is `None`.
    /// MUST be atomic: readers see either the old text or the new text.
    fn write_column(&self, key: &ColumnKey, text: Option<&str>) -> Result<()>;

    /// Keys of every column holding a value for entities of `entity` kind,
    /// in a stable order.
    fn list_columns(&self, entity: EntityKind) -> Result<Vec<ColumnKey>>;
}
