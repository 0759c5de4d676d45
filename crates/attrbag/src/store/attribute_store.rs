use super::backend::ColumnBackend;
use crate::codec::{self, CodecError};
use crate::config::Limits;
use crate::error::{AttrError, Result};
use crate::holder::AttributeSlot;
use crate::model::{ColumnKey, EntityKind};

/// Report from [`AttributeStore::verify`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VerifyReport {
    /// Columns read and decoded.
    pub checked: usize,
    /// Columns whose text does not decode, with the reason.
    pub undecodable: Vec<(ColumnKey, CodecError)>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.undecodable.is_empty()
    }
}

/// Loads and saves attribute slots through a [`ColumnBackend`].
pub struct AttributeStore<B: ColumnBackend> {
    pub(crate) backend: B,
    limits: Limits,
}

impl<B: ColumnBackend> AttributeStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self::with_limits(backend, Limits::default())
    }

    /// Slots loaded from this store validate and decode against `limits`.
    pub fn with_limits(backend: B, limits: Limits) -> Self {
        Self { backend, limits }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Reads the column and rebuilds its slot. A missing column gives an
    /// absent slot; text that does not decode is an [`AttrError::Codec`].
    pub fn load(&self, key: &ColumnKey) -> Result<AttributeSlot> {
        let column = self.backend.read_column(key)?;
        let slot = AttributeSlot::from_column(column, self.limits).map_err(|source| {
            AttrError::Codec {
                key: key.clone(),
                source,
            }
        })?;
        tracing::debug!(%key, present = slot.is_present(), "loaded attribute");
        Ok(slot)
    }

    /// Persists the slot's column. An absent slot removes the column.
    pub fn save(&self, key: &ColumnKey, slot: &AttributeSlot) -> Result<()> {
        self.backend.write_column(key, slot.column())?;
        tracing::debug!(%key, present = slot.is_present(), "saved attribute");
        Ok(())
    }

    /// Decodes every stored column of `entity` kind and reports the ones that
    /// fail, without stopping at the first.
    pub fn verify(&self, entity: EntityKind) -> Result<VerifyReport> {
        let mut report = VerifyReport::default();
        for key in self.backend.list_columns(entity)? {
            let Some(text) = self.backend.read_column(&key)? else {
                continue;
            };
            report.checked += 1;
            if let Err(e) = codec::decode_with_limits(&text, &self.limits) {
                tracing::debug!(%key, error = %e, "undecodable attribute column");
                report.undecodable.push((key, e));
            }
        }
        tracing::debug!(
            %entity,
            checked = report.checked,
            undecodable = report.undecodable.len(),
            "verified attribute columns"
        );
        Ok(report)
    }
}
