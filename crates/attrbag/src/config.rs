//! # Configuration
//!
//! The only tunables are the work limits that bound validation and decoding.
//! They are managed by [`confique`], which handles layered loading from TOML
//! files and environment variables.
//!
//! ## Storage Hierarchy
//!
//! [`Limits::load`] resolves values in priority order:
//! 1. **Environment variables**: `ATTRBAG_MAX_DEPTH`, `ATTRBAG_MAX_NODES`.
//! 2. **Explicit file**: the path handed to `load`, if any.
//! 3. **Global Config**: `attrbag.toml` in the OS config directory (via `directories`).
//! 4. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `max_depth` | `128` | Deepest container nesting accepted |
//! | `max_nodes` | `100000` | Most values visited in one tree |
//!
//! A loaded [`Limits`] is a plain value. Callers pass it into every validation
//! and decode; nothing in this crate reads configuration from process state.

use std::fmt;
use std::path::{Path, PathBuf};

use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_MAX_DEPTH: usize = 128;
pub const DEFAULT_MAX_NODES: usize = 100_000;

const CONFIG_FILE_NAME: &str = "attrbag.toml";

/// Work limits applied while validating or decoding one tree.
#[derive(Config, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of nested containers on any path from the root.
    #[config(default = 128, env = "ATTRBAG_MAX_DEPTH")]
    pub max_depth: usize,

    /// Maximum number of values (containers and leaves) visited in one tree.
    #[config(default = 100000, env = "ATTRBAG_MAX_NODES")]
    pub max_nodes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

impl Limits {
    pub fn new(max_depth: usize, max_nodes: usize) -> Self {
        Self {
            max_depth,
            max_nodes,
        }
    }

    /// Limits that never trip.
    pub fn unbounded() -> Self {
        Self::new(usize::MAX, usize::MAX)
    }

    /// Load limits from the environment, `file` (if given), the global config
    /// file, and the compiled defaults, in that priority order.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Limits::builder().env();
        if let Some(file) = file {
            builder = builder.file(file);
        }
        if let Some(global) = global_config_path() {
            builder = builder.file(global);
        }
        let limits = builder.load()?;
        tracing::debug!(
            max_depth = limits.max_depth,
            max_nodes = limits.max_nodes,
            "loaded attribute limits"
        );
        Ok(limits)
    }
}

/// Location of the global `attrbag.toml`, if the platform has a config dir.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "attrbag").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// A commented `attrbag.toml` listing every setting with its default.
pub fn sample_config() -> String {
    confique::toml::template::<Limits>(confique::toml::FormatOptions::default())
}

/// The limit that a traversal ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Depth(usize),
    Nodes(usize),
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Depth(max) => write!(f, "max_depth={}", max),
            Limit::Nodes(max) => write!(f, "max_nodes={}", max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_depth, 128);
        assert_eq!(limits.max_nodes, 100_000);
    }

    #[test]
    fn test_unbounded() {
        let limits = Limits::unbounded();
        assert_eq!(limits.max_depth, usize::MAX);
        assert_eq!(limits.max_nodes, usize::MAX);
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attrbag.toml");
        fs::write(&path, "max_depth = 8\nmax_nodes = 50\n").unwrap();

        let limits = Limits::builder().file(&path).load().unwrap();
        assert_eq!(limits, Limits::new(8, 50));
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attrbag.toml");
        fs::write(&path, "max_depth = 16\n").unwrap();

        let limits = Limits::builder().file(&path).load().unwrap();
        assert_eq!(limits.max_depth, 16);
        assert_eq!(limits.max_nodes, DEFAULT_MAX_NODES);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");

        let limits = Limits::builder().file(&path).load().unwrap();
        assert_eq!(limits, Limits::default());
    }

    // The only test in the crate that touches ATTRBAG_* variables.
    #[test]
    fn test_load_priority_env_over_file_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attrbag.toml");
        fs::write(&path, "max_depth = 3\nmax_nodes = 50\n").unwrap();

        std::env::set_var("ATTRBAG_MAX_DEPTH", "7");
        let with_env = Limits::load(Some(&path));
        let from_builder = Limits::builder().env().file(&path).load();
        std::env::remove_var("ATTRBAG_MAX_DEPTH");

        assert_eq!(with_env.unwrap(), Limits::new(7, 50));
        assert_eq!(from_builder.unwrap(), Limits::new(7, 50));

        let without_env = Limits::load(Some(&path)).unwrap();
        assert_eq!(without_env, Limits::new(3, 50));
    }

    #[test]
    fn test_sample_config_is_valid_toml() {
        let sample = sample_config();
        assert!(sample.contains("max_depth"));
        assert!(sample.contains("max_nodes"));
        assert!(toml::from_str::<toml::Table>(&sample).is_ok());
    }

    #[test]
    fn test_limit_display() {
        assert_eq!(Limit::Depth(4).to_string(), "max_depth=4");
        assert_eq!(Limit::Nodes(10).to_string(), "max_nodes=10");
    }
}
