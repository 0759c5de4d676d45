//! # Storage Layer
//!
//! Persists attribute slots as nullable text columns. The split mirrors the
//! rest of the crate: backends only move text in and out, while
//! [`AttributeStore`] owns the slot logic on top of them.
//!
//! ## Column Contract
//!
//! - A present slot is stored as the codec's canonical text.
//! - An absent slot is stored as **no value**: the backend removes the column.
//!   It is never written as `null`, `{}` or any other placeholder text.
//! - Reading goes through the same decoder for every backend, so a column
//!   written by one engine reads back identically from another.
//!
//! ## Implementations
//!
//! - [`mem_backend::MemBackend`]: in-memory, for tests and embedding.
//! - [`fs_backend::FsBackend`]: one file per column, written atomically.
//!
//! ## Storage Layout (FsBackend)
//!
//! ```text
//! <root>/
//! └── <entity>/               # asset, inspection, checklist, ...
//!     └── <uuid>/
//!         └── <field>.json    # canonical column text
//! ```

pub mod attribute_store;
pub mod backend;
pub mod fs_backend;
pub mod mem_backend;

pub use attribute_store::{AttributeStore, VerifyReport};
pub use backend::ColumnBackend;
pub use fs_backend::FsBackend;
pub use mem_backend::MemBackend;
