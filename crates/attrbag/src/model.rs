//! Addressing for attribute columns.
//!
//! Every stored attribute lives in one column, identified by the kind of
//! entity that owns it, the entity's id, and the field name.
//!
//! Valid field names:
//! - Alphanumeric characters, underscores (`_`), and hyphens (`-`)
//! - Must start with a letter
//! - Cannot have consecutive hyphens (`--`)
//! - Cannot end with a hyphen

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Asset,
    Inspection,
    Checklist,
    Maintenance,
    Template,
    Report,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Asset,
        EntityKind::Inspection,
        EntityKind::Checklist,
        EntityKind::Maintenance,
        EntityKind::Template,
        EntityKind::Report,
    ];

    /// Directory name used by file-backed engines.
    pub fn dir_name(&self) -> &'static str {
        match self {
            EntityKind::Asset => "asset",
            EntityKind::Inspection => "inspection",
            EntityKind::Checklist => "checklist",
            EntityKind::Maintenance => "maintenance",
            EntityKind::Template => "template",
            EntityKind::Report => "report",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.dir_name() == s)
            .ok_or_else(|| format!("unknown entity kind '{}'", s))
    }
}

/// Error type for field name validation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldNameError {
    #[error("field name cannot be empty")]
    Empty,
    #[error("field name must start with a letter, found '{0}'")]
    InvalidStart(char),
    #[error("field name cannot end with a hyphen")]
    EndsWithHyphen,
    #[error("field name cannot contain consecutive hyphens")]
    ConsecutiveHyphens,
    #[error(
        "field name contains invalid character '{0}' (only alphanumeric, underscore, and hyphen allowed)"
    )]
    InvalidCharacter(char),
}

/// A validated attribute field name.
///
/// ```
/// use attrbag::model::FieldName;
///
/// assert!(FieldName::new("attrs").is_ok());
/// assert!(FieldName::new("custom_fields").is_ok());
/// assert!(FieldName::new("x7-data").is_ok());
///
/// assert!(FieldName::new("").is_err());
/// assert!(FieldName::new("-attrs").is_err());
/// assert!(FieldName::new("attrs-").is_err());
/// assert!(FieldName::new("a--b").is_err());
/// assert!(FieldName::new("../etc").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FieldName(String);

impl FieldName {
    pub fn new(name: impl Into<String>) -> Result<Self, FieldNameError> {
        let name = name.into();
        validate_field_name(&name)?;
        Ok(FieldName(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_field_name(name: &str) -> Result<(), FieldNameError> {
    let mut chars = name.chars();
    let first = chars.next().ok_or(FieldNameError::Empty)?;
    if !first.is_ascii_alphabetic() {
        return Err(FieldNameError::InvalidStart(first));
    }

    let mut prev_was_hyphen = false;
    for ch in name.chars() {
        if !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '-') {
            return Err(FieldNameError::InvalidCharacter(ch));
        }
        if ch == '-' && prev_was_hyphen {
            return Err(FieldNameError::ConsecutiveHyphens);
        }
        prev_was_hyphen = ch == '-';
    }

    if prev_was_hyphen {
        return Err(FieldNameError::EndsWithHyphen);
    }
    Ok(())
}

impl FromStr for FieldName {
    type Err = FieldNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::new(s)
    }
}

impl<'de> Deserialize<'de> for FieldName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        FieldName::new(raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FieldName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Address of one attribute column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnKey {
    pub entity: EntityKind,
    pub id: Uuid,
    pub field: FieldName,
}

impl ColumnKey {
    pub fn new(entity: EntityKind, id: Uuid, field: FieldName) -> Self {
        Self { entity, id, field }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.entity, self.id, self.field)
    }
}
