//! # Attrbag Architecture
//!
//! Attrbag is the **semi-structured attribute subsystem** for record-keeping backends:
//! it lets an entity field (custom attributes, template definitions, report payloads)
//! carry an arbitrarily nested bag of values while guaranteeing three things:
//!
//! 1. Only acyclic trees built from six kinds (null, bool, number, string, array,
//!    object) are ever accepted.
//! 2. Stored state can never be reached, and therefore never mutated, through a
//!    reference held by a caller.
//! 3. The persisted text form round-trips exactly, including the integral vs.
//!    fractional distinction of numbers, no matter which storage engine wrote it.
//!
//! ## Data Flow
//!
//! ```text
//!  write:  SharedValue ──validate──▶ deep_copy ──▶ Value ──encode──▶ column text
//!                                                    │
//!                                                    └──▶ cached snapshot
//!
//!  read:   column text ──decode──▶ cached snapshot ──deep_copy──▶ Value (caller's)
//! ```
//!
//! ## Two Value Types
//!
//! - [`SharedValue`]: what callers hand in. Containers are shared, mutable handles,
//!   so a caller can alias a container inside itself, reuse keys, or smuggle in
//!   timestamps and byte blobs. Nothing downstream trusts it.
//! - [`Value`]: the closed, owned tree. It can only hold the six permitted kinds and
//!   it cannot alias, so everything past the validator pattern-matches exhaustively.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  AttributeStore<B> (store/)                                 │
//! │  - Loads/saves slots through a ColumnBackend                │
//! │  - MemBackend (testing), FsBackend (files on disk)          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  AttributeSlot (holder.rs)                                  │
//! │  - set_attribute / get_attribute / clear_attribute          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  validate.rs, copy.rs, codec/                               │
//! │  - Stateless, re-entrant, no I/O                            │
//! │  - Limits always passed in, never global                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`value`]: [`Value`], [`Number`], [`SharedValue`] and conversions
//! - [`path`]: Locations inside a tree, used by errors
//! - [`validate`]: Structural validator
//! - [`copy`]: Deep copier
//! - [`codec`]: Canonical text encoding and decoding
//! - [`holder`]: The per-field attribute slot
//! - [`store`]: Column backends and the attribute store
//! - [`model`]: Entity kinds, field names and column keys
//! - [`config`]: Limits configuration
//! - [`error`]: Crate-level error type

pub mod codec;
pub mod config;
pub mod copy;
pub mod error;
pub mod holder;
pub mod model;
pub mod path;
pub mod store;
pub mod validate;
pub mod value;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use codec::{decode, decode_with_limits, encode, CodecError};
pub use config::{Limit, Limits};
pub use copy::{deep_copy, DeepCopy};
pub use error::{AttrError, Result};
pub use holder::AttributeSlot;
pub use path::{Path, PathSegment};
pub use validate::{validate, ValidationError};
pub use value::{Foreign, Map, Number, SharedValue, Value};
