//! # Attribute Slot
//!
//! One slot per attribute field of an entity. The slot owns its value outright:
//! it holds either nothing (absent) or a validated tree together with the
//! canonical column text that tree encodes to.
//!
//! ## State Machine
//!
//! | State | Operation | Result |
//! |-------|-----------|--------|
//! | Absent / Present(p) | `set_attribute(valid v)` | Present(copy of v) |
//! | Present(p) | `set_attribute(invalid v)` | Present(p), error returned |
//! | Absent / Present(p) | `set_attribute(Null)` | Absent |
//! | Absent / Present(p) | `clear_attribute()` | Absent |
//!
//! ## Copy Boundaries
//!
//! `set_attribute` snapshots the caller's graph before storing it, and
//! `get_attribute` hands out a fresh copy on every call. Neither the caller's
//! input nor anything returned from the slot shares a container with the slot.

use crate::codec::{self, CodecError};
use crate::config::Limits;
use crate::copy::DeepCopy;
use crate::validate::{validate, ValidationError};
use crate::value::{SharedValue, Value};

#[derive(Debug, Clone, PartialEq)]
enum SlotState {
    Absent,
    Present { column: String, cached: Value },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSlot {
    limits: Limits,
    state: SlotState,
}

impl Default for AttributeSlot {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl AttributeSlot {
    /// Creates an absent slot that validates writes against `limits`.
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            state: SlotState::Absent,
        }
    }

    /// Rebuilds a slot from its persisted column.
    ///
    /// `None` and the literal `null` both load as absent. Any other text must
    /// decode under `limits`; the error is returned as-is so the caller can
    /// decide whether a corrupt column is fatal.
    pub fn from_column(column: Option<String>, limits: Limits) -> Result<Self, CodecError> {
        let Some(column) = column else {
            return Ok(Self::new(limits));
        };
        let cached = codec::decode_with_limits(&column, &limits)?;
        let state = if cached.is_null() {
            SlotState::Absent
        } else {
            SlotState::Present { column, cached }
        };
        Ok(Self { limits, state })
    }

    /// Validates `raw` and, if it is acceptable, replaces the slot's value
    /// with an independent copy of it.
    ///
    /// A `Null` root clears the slot. On error the slot is left exactly as it
    /// was.
    pub fn set_attribute(&mut self, raw: &SharedValue) -> Result<(), ValidationError> {
        if raw.is_null() {
            self.clear_attribute();
            return Ok(());
        }

        validate(raw, &self.limits)?;
        let cached = raw.deep_copy();
        let column = codec::encode(&cached);
        tracing::debug!(kind = cached.kind(), bytes = column.len(), "attribute set");
        self.state = SlotState::Present { column, cached };
        Ok(())
    }

    /// Returns a fresh copy of the stored value, or `None` when absent.
    pub fn get_attribute(&self) -> Option<Value> {
        match &self.state {
            SlotState::Absent => None,
            SlotState::Present { cached, .. } => Some(cached.deep_copy()),
        }
    }

    /// Makes the slot absent. Clearing an absent slot does nothing.
    pub fn clear_attribute(&mut self) {
        if self.is_present() {
            tracing::debug!("attribute cleared");
        }
        self.state = SlotState::Absent;
    }

    /// The text to persist, or `None` when the column should hold no value.
    pub fn column(&self) -> Option<&str> {
        match &self.state {
            SlotState::Absent => None,
            SlotState::Present { column, .. } => Some(column),
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self.state, SlotState::Present { .. })
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }
}
