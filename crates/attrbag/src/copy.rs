//! Deep copying at the slot boundaries.
//!
//! An attribute slot copies on the way in and again on the way out, so that
//! neither the graph a caller handed to `set_attribute` nor the tree a caller
//! got back from `get_attribute` shares a single container with stored state.
//!
//! - [`SharedValue`] → [`Value`] is the write boundary. Every container is
//!   rebuilt; an aliased subgraph becomes independent copies.
//! - [`Value`] → [`Value`] is the read boundary. Owned trees never share
//!   containers, so a clone is already a fresh allocation throughout.

use crate::value::{Map, Number, SharedArray, SharedObject, SharedValue, Value};

pub trait DeepCopy {
    /// Returns an owned tree that shares no container with `self`.
    fn deep_copy(&self) -> Value;
}

/// Free-function form of [`DeepCopy::deep_copy`].
pub fn deep_copy<T: DeepCopy + ?Sized>(value: &T) -> Value {
    value.deep_copy()
}

impl DeepCopy for Value {
    fn deep_copy(&self) -> Value {
        self.clone()
    }
}

/// Snapshot of a caller's graph.
///
/// The graph must already have passed [`crate::validate`]: acyclicity is
/// assumed, not re-checked, and a cyclic graph never terminates. Null keys
/// (also rejected by validation) become empty strings.
impl DeepCopy for SharedValue {
    fn deep_copy(&self) -> Value {
        let mut stack: Vec<CopyFrame> = Vec::new();
        if let Some(leaf) = open(self, &mut stack) {
            return leaf;
        }

        while let Some(frame) = stack.last_mut() {
            let value = match frame.next_child() {
                Some(child) => match open(&child, &mut stack) {
                    Some(leaf) => leaf,
                    None => continue,
                },
                None => match stack.pop() {
                    Some(done) => done.finish(),
                    None => break,
                },
            };
            match stack.last_mut() {
                Some(parent) => parent.accept(value),
                None => return value,
            }
        }
        Value::Null
    }
}

/// Copies a leaf, or pushes a frame for a container.
fn open(node: &SharedValue, stack: &mut Vec<CopyFrame>) -> Option<Value> {
    let leaf = match node {
        SharedValue::Array(items) => {
            stack.push(CopyFrame::Array {
                source: items.clone(),
                next: 0,
                out: Vec::with_capacity(items.borrow().len()),
            });
            return None;
        }
        SharedValue::Object(entries) => {
            stack.push(CopyFrame::Object {
                source: entries.clone(),
                next: 0,
                out: Map::with_capacity(entries.borrow().len()),
                key: None,
            });
            return None;
        }
        SharedValue::Null => Value::Null,
        SharedValue::Bool(b) => Value::Bool(*b),
        SharedValue::Int(n) => Value::Number(Number::from(*n)),
        SharedValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        SharedValue::String(s) => Value::String(s.clone()),
        SharedValue::Foreign(_) => Value::Null,
    };
    Some(leaf)
}

enum CopyFrame {
    Array {
        source: SharedArray,
        next: usize,
        out: Vec<Value>,
    },
    Object {
        source: SharedObject,
        next: usize,
        out: Map,
        key: Option<String>,
    },
}

impl CopyFrame {
    fn next_child(&mut self) -> Option<SharedValue> {
        match self {
            CopyFrame::Array { source, next, .. } => {
                let child = source.borrow().get(*next).cloned();
                *next += 1;
                child
            }
            CopyFrame::Object {
                source, next, key, ..
            } => {
                let entry = source.borrow().get(*next).cloned();
                *next += 1;
                entry.map(|(k, child)| {
                    *key = Some(k.unwrap_or_default());
                    child
                })
            }
        }
    }

    fn accept(&mut self, value: Value) {
        match self {
            CopyFrame::Array { out, .. } => out.push(value),
            CopyFrame::Object { out, key, .. } => {
                out.insert(key.take().unwrap_or_default(), value);
            }
        }
    }

    fn finish(self) -> Value {
        match self {
            CopyFrame::Array { out, .. } => Value::Array(out),
            CopyFrame::Object { out, .. } => Value::Object(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Limits;
    use crate::validate::validate;

    fn sample() -> SharedValue {
        SharedValue::object([
            ("name", SharedValue::from("pump")),
            ("count", SharedValue::from(3)),
            ("ratio", SharedValue::from(0.75)),
            (
                "tags",
                SharedValue::array([SharedValue::from("a"), SharedValue::Null]),
            ),
            (
                "nested",
                SharedValue::object([("deep", SharedValue::object([("x", SharedValue::from(true))]))]),
            ),
        ])
    }

    #[test]
    fn copy_is_structurally_equal() {
        let copy = sample().deep_copy();
        assert_eq!(copy.pointer("/name"), Some(&Value::from("pump")));
        assert_eq!(copy.pointer("/count").and_then(Value::as_i64), Some(3));
        assert_eq!(copy.pointer("/ratio").and_then(Value::as_f64), Some(0.75));
        assert_eq!(copy.pointer("/tags/1"), Some(&Value::Null));
        assert_eq!(copy.pointer("/nested/deep/x"), Some(&Value::Bool(true)));
        let keys: Vec<_> = copy.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["name", "count", "ratio", "tags", "nested"]);
    }

    #[test]
    fn mutating_the_source_does_not_reach_the_copy() {
        let source = sample();
        let copy = source.deep_copy();

        source.set("name", SharedValue::from("valve"));
        source.member("tags").unwrap().push(SharedValue::from("b"));

        assert_eq!(copy.get("name"), Some(&Value::from("pump")));
        assert_eq!(copy.get("tags").and_then(Value::as_array).map(Vec::len), Some(2));
    }

    #[test]
    fn aliased_subgraphs_become_independent() {
        let shared = SharedValue::object([("x", SharedValue::from(1))]);
        let source = SharedValue::array([shared.clone(), shared]);
        assert!(validate(&source, &Limits::default()).is_ok());

        let mut copy = source.deep_copy();
        *copy.pointer_mut("/0/x").unwrap() = Value::from(2);
        assert_eq!(copy.pointer("/1/x"), Some(&Value::from(1)));
    }

    #[test]
    fn leaf_roots_copy_by_value() {
        assert_eq!(SharedValue::from("s").deep_copy(), Value::from("s"));
        assert_eq!(SharedValue::Null.deep_copy(), Value::Null);
        assert_eq!(deep_copy(&SharedValue::from(7)), Value::from(7));
    }

    #[test]
    fn empty_containers_stay_empty() {
        assert_eq!(SharedValue::empty_object().deep_copy(), Value::Object(Map::new()));
        assert_eq!(SharedValue::array([]).deep_copy(), Value::Array(Vec::new()));
    }

    #[test]
    fn owned_copies_are_independent_of_each_other() {
        let original = sample().deep_copy();
        let mut first = original.deep_copy();
        let second = original.deep_copy();

        first.as_object_mut().unwrap().insert("extra".into(), Value::from(1));
        *first.pointer_mut("/nested/deep/x").unwrap() = Value::Bool(false);

        assert_eq!(second, original);
        assert_ne!(first, original);
    }
}
