//! Caller-supplied value graphs.
//!
//! A [`SharedValue`] is what the outside world hands to an attribute slot. Its
//! containers are reference-counted, mutable handles: the same array or object
//! can appear in several places, including inside itself, and the caller can
//! keep mutating it after handing it over. Object entries may also carry a
//! null key or repeat a key, and leaves may be of kinds no attribute can store
//! (see [`Foreign`]).
//!
//! None of that is trusted. [`crate::validate`] rejects the bad shapes and
//! [`crate::deep_copy`] turns an accepted graph into an owned [`Value`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Number, Value};

pub type SharedArray = Rc<RefCell<Vec<SharedValue>>>;
pub type SharedObject = Rc<RefCell<Vec<(Option<String>, SharedValue)>>>;

#[derive(Clone)]
pub enum SharedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(SharedArray),
    Object(SharedObject),
    Foreign(Foreign),
}

/// Values a caller may produce that have no place in an attribute tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Foreign {
    Timestamp(DateTime<Utc>),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    /// An unsigned integer, typically one beyond `i64::MAX`.
    Unsigned(u64),
    /// Integer literal text too wide for any machine integer.
    BigInteger(String),
}

impl Foreign {
    pub fn kind(&self) -> &'static str {
        match self {
            Foreign::Timestamp(_) => "timestamp",
            Foreign::Bytes(_) => "bytes",
            Foreign::Uuid(_) => "uuid",
            Foreign::Unsigned(_) => "unsigned integer",
            Foreign::BigInteger(_) => "big integer",
        }
    }
}

impl SharedValue {
    /// A fresh array handle holding `items`.
    pub fn array(items: impl IntoIterator<Item = SharedValue>) -> Self {
        SharedValue::Array(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    /// A fresh object handle holding `entries` in order.
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, SharedValue)>) -> Self {
        SharedValue::Object(Rc::new(RefCell::new(
            entries
                .into_iter()
                .map(|(k, v)| (Some(k.into()), v))
                .collect(),
        )))
    }

    pub fn empty_object() -> Self {
        SharedValue::object(Vec::<(String, SharedValue)>::new())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SharedValue::Null => "null",
            SharedValue::Bool(_) => "bool",
            SharedValue::Int(_) => "integer",
            SharedValue::Float(_) => "float",
            SharedValue::String(_) => "string",
            SharedValue::Array(_) => "array",
            SharedValue::Object(_) => "object",
            SharedValue::Foreign(foreign) => foreign.kind(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SharedValue::Null)
    }

    /// Address of the container allocation; `None` for leaves.
    ///
    /// Two handles have the same identity exactly when they point at the same
    /// container, regardless of contents.
    pub fn identity(&self) -> Option<usize> {
        match self {
            SharedValue::Array(items) => Some(Rc::as_ptr(items) as *const u8 as usize),
            SharedValue::Object(entries) => Some(Rc::as_ptr(entries) as *const u8 as usize),
            _ => None,
        }
    }

    /// Appends to an array. Returns `false` if this is not an array.
    pub fn push(&self, value: SharedValue) -> bool {
        match self {
            SharedValue::Array(items) => {
                items.borrow_mut().push(value);
                true
            }
            _ => false,
        }
    }

    /// Appends an entry to an object without checking for an existing key.
    /// Returns `false` if this is not an object.
    pub fn insert(&self, key: impl Into<String>, value: SharedValue) -> bool {
        self.insert_entry(Some(key.into()), value)
    }

    /// Like [`SharedValue::insert`], but the key may be null.
    pub fn insert_entry(&self, key: Option<String>, value: SharedValue) -> bool {
        match self {
            SharedValue::Object(entries) => {
                entries.borrow_mut().push((key, value));
                true
            }
            _ => false,
        }
    }

    /// Replaces the value of the first entry named `key`. Returns `false` if
    /// this is not an object or has no such key.
    pub fn set(&self, key: &str, value: SharedValue) -> bool {
        match self {
            SharedValue::Object(entries) => {
                let mut entries = entries.borrow_mut();
                match entries.iter_mut().find(|(k, _)| k.as_deref() == Some(key)) {
                    Some(entry) => {
                        entry.1 = value;
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    /// Handle to the value of the first entry named `key`.
    pub fn member(&self, key: &str) -> Option<SharedValue> {
        match self {
            SharedValue::Object(entries) => entries
                .borrow()
                .iter()
                .find(|(k, _)| k.as_deref() == Some(key))
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }
}

// Containers print shallowly so that a cyclic graph can still be logged.
impl fmt::Debug for SharedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SharedValue::Null => f.write_str("Null"),
            SharedValue::Bool(b) => write!(f, "Bool({})", b),
            SharedValue::Int(n) => write!(f, "Int({})", n),
            SharedValue::Float(x) => write!(f, "Float({:?})", x),
            SharedValue::String(s) => write!(f, "String({:?})", s),
            SharedValue::Array(handle) => match handle.try_borrow() {
                Ok(items) => write!(f, "Array(len={}, @{:p})", items.len(), Rc::as_ptr(handle)),
                Err(_) => f.write_str("Array(<borrowed>)"),
            },
            SharedValue::Object(handle) => match handle.try_borrow() {
                Ok(entries) => {
                    write!(f, "Object(len={}, @{:p})", entries.len(), Rc::as_ptr(handle))
                }
                Err(_) => f.write_str("Object(<borrowed>)"),
            },
            SharedValue::Foreign(foreign) => write!(f, "Foreign({:?})", foreign),
        }
    }
}

impl From<bool> for SharedValue {
    fn from(b: bool) -> Self {
        SharedValue::Bool(b)
    }
}

impl From<i64> for SharedValue {
    fn from(n: i64) -> Self {
        SharedValue::Int(n)
    }
}

impl From<i32> for SharedValue {
    fn from(n: i32) -> Self {
        SharedValue::Int(i64::from(n))
    }
}

impl From<f64> for SharedValue {
    fn from(f: f64) -> Self {
        SharedValue::Float(f)
    }
}

impl From<&str> for SharedValue {
    fn from(s: &str) -> Self {
        SharedValue::String(s.to_string())
    }
}

impl From<String> for SharedValue {
    fn from(s: String) -> Self {
        SharedValue::String(s)
    }
}

impl From<Vec<SharedValue>> for SharedValue {
    fn from(items: Vec<SharedValue>) -> Self {
        SharedValue::array(items)
    }
}

impl From<DateTime<Utc>> for SharedValue {
    fn from(ts: DateTime<Utc>) -> Self {
        SharedValue::Foreign(Foreign::Timestamp(ts))
    }
}

impl From<Uuid> for SharedValue {
    fn from(id: Uuid) -> Self {
        SharedValue::Foreign(Foreign::Uuid(id))
    }
}

impl From<Number> for SharedValue {
    fn from(n: Number) -> Self {
        match n.as_i64() {
            Some(i) => SharedValue::Int(i),
            None => SharedValue::Float(n.as_f64()),
        }
    }
}

/// Re-exposes an owned tree as fresh, unaliased handles, e.g. for a caller
/// that wants to edit a stored value and set it back.
impl From<&Value> for SharedValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => SharedValue::Null,
            Value::Bool(b) => SharedValue::Bool(*b),
            Value::Number(n) => SharedValue::from(*n),
            Value::String(s) => SharedValue::String(s.clone()),
            Value::Array(items) => SharedValue::array(items.iter().map(SharedValue::from)),
            Value::Object(map) => {
                SharedValue::object(map.iter().map(|(k, v)| (k.clone(), SharedValue::from(v))))
            }
        }
    }
}

impl From<Value> for SharedValue {
    fn from(value: Value) -> Self {
        SharedValue::from(&value)
    }
}

/// Payloads parsed by an API layer with `serde_json`.
///
/// Object member order is kept. Numbers are classified by their literal text,
/// with the same rule the codec uses: a literal without `.` or exponent is an
/// integer, and one too wide for `i64` arrives as [`Foreign::Unsigned`] or
/// [`Foreign::BigInteger`] so the validator reports it instead of silently
/// turning it into a float.
impl From<serde_json::Value> for SharedValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => SharedValue::Null,
            serde_json::Value::Bool(b) => SharedValue::Bool(b),
            serde_json::Value::Number(n) => from_json_number(&n),
            serde_json::Value::String(s) => SharedValue::String(s),
            serde_json::Value::Array(items) => {
                SharedValue::array(items.into_iter().map(SharedValue::from))
            }
            serde_json::Value::Object(map) => {
                SharedValue::object(map.into_iter().map(|(k, v)| (k, SharedValue::from(v))))
            }
        }
    }
}

fn from_json_number(n: &serde_json::Number) -> SharedValue {
    let literal = n.to_string();
    if literal.contains(['.', 'e', 'E']) {
        // Overflowing literals become non-finite and are rejected downstream.
        return SharedValue::Float(literal.parse().unwrap_or(f64::NAN));
    }
    if let Some(i) = n.as_i64() {
        SharedValue::Int(i)
    } else if let Some(u) = n.as_u64() {
        SharedValue::Foreign(Foreign::Unsigned(u))
    } else {
        SharedValue::Foreign(Foreign::BigInteger(literal))
    }
}
