//! Structural validation of caller-supplied graphs.
//!
//! [`validate`] decides whether a [`SharedValue`] can become an attribute. It
//! accepts exactly the finite, acyclic graphs made of the six permitted kinds
//! with non-null, unique object keys.
//!
//! # Cycle Detection
//!
//! Cycles are found by container **identity**, never by equality. The walk
//! keeps the set of containers on the current root-to-node path; entering a
//! container already in that set is a cycle, and a container leaves the set
//! when the walk backtracks out of it. Two equal but distinct objects are
//! fine, and so is the same container appearing twice side by side (a
//! diamond): only a container nested inside itself is rejected.
//!
//! # Work Limits
//!
//! The walk is iterative with an explicit frame stack, so a hostile depth
//! cannot exhaust the call stack. [`Limits`] bounds both nesting depth and the
//! number of values visited; aliased substructures count once per visit, which
//! keeps exponential diamonds bounded too.

use std::collections::HashSet;

use thiserror::Error;

use crate::config::{Limit, Limits};
use crate::path::{Path, PathSegment};
use crate::value::SharedValue;

/// Why a graph was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A container is nested inside itself.
    #[error("cyclic reference at '{path}'")]
    CyclicReference {
        /// Path to the handle that points back at one of its ancestors.
        path: Path,
    },

    /// A value of a kind attributes cannot hold.
    #[error("disallowed {kind} value at '{path}'")]
    DisallowedType { path: Path, kind: &'static str },

    /// An object entry with a null key, or a key repeated within one object.
    ///
    /// For a null key the last path segment is the entry's position.
    #[error("invalid object key at '{path}'")]
    InvalidKey { path: Path },

    /// The graph is deeper or larger than the configured limits allow.
    #[error("limit exceeded: {limit}")]
    ResourceExhausted { limit: Limit },
}

/// Checks that `value` may be stored as an attribute.
///
/// A `Null` root always passes: an absent attribute is always legal.
///
/// # Errors
///
/// - [`ValidationError::CyclicReference`] - a container reachable from itself
/// - [`ValidationError::DisallowedType`] - a foreign leaf or a non-finite float
/// - [`ValidationError::InvalidKey`] - a null or duplicate object key
/// - [`ValidationError::ResourceExhausted`] - `limits` exceeded
pub fn validate(value: &SharedValue, limits: &Limits) -> Result<(), ValidationError> {
    if value.is_null() {
        return Ok(());
    }

    let mut walk = Walk::new(limits);
    walk.visit(value)?;

    while let Some(frame) = walk.stack.last_mut() {
        match frame.next_child() {
            Some(Child::Element(index, child)) => {
                walk.path.push(index);
                walk.visit(&child)?;
            }
            Some(Child::Member(index, key, child)) => {
                let segment = match key {
                    Some(key) => {
                        if !frame.seen_keys.insert(key.clone()) {
                            walk.path.push(key);
                            return Err(ValidationError::InvalidKey {
                                path: walk.path.clone(),
                            });
                        }
                        PathSegment::Key(key)
                    }
                    None => {
                        walk.path.push(index);
                        return Err(ValidationError::InvalidKey {
                            path: walk.path.clone(),
                        });
                    }
                };
                walk.path.push(segment);
                walk.visit(&child)?;
            }
            None => walk.leave(),
        }
    }

    tracing::trace!(nodes = walk.nodes, "validated attribute graph");
    Ok(())
}

struct Walk<'a> {
    limits: &'a Limits,
    stack: Vec<Frame>,
    on_path: HashSet<usize>,
    path: Path,
    nodes: usize,
}

impl<'a> Walk<'a> {
    fn new(limits: &'a Limits) -> Self {
        Self {
            limits,
            stack: Vec::new(),
            on_path: HashSet::new(),
            path: Path::root(),
            nodes: 0,
        }
    }

    /// Checks one value reached at `self.path`. Containers get a frame and keep
    /// their path segment until [`Walk::leave`]; leaves give it back at once.
    fn visit(&mut self, value: &SharedValue) -> Result<(), ValidationError> {
        self.nodes += 1;
        if self.nodes > self.limits.max_nodes {
            return Err(ValidationError::ResourceExhausted {
                limit: Limit::Nodes(self.limits.max_nodes),
            });
        }

        // Containers are exactly the values with an identity.
        let identity = match (value, value.identity()) {
            (SharedValue::Float(f), _) if !f.is_finite() => {
                return Err(ValidationError::DisallowedType {
                    path: self.path.clone(),
                    kind: "non-finite float",
                });
            }
            (SharedValue::Foreign(foreign), _) => {
                return Err(ValidationError::DisallowedType {
                    path: self.path.clone(),
                    kind: foreign.kind(),
                });
            }
            (_, Some(identity)) => identity,
            (_, None) => {
                self.path.pop();
                return Ok(());
            }
        };

        if self.stack.len() >= self.limits.max_depth {
            return Err(ValidationError::ResourceExhausted {
                limit: Limit::Depth(self.limits.max_depth),
            });
        }

        if !self.on_path.insert(identity) {
            return Err(ValidationError::CyclicReference {
                path: self.path.clone(),
            });
        }

        self.stack.push(Frame {
            identity,
            container: value.clone(),
            next: 0,
            seen_keys: HashSet::new(),
        });
        Ok(())
    }

    fn leave(&mut self) {
        if let Some(frame) = self.stack.pop() {
            self.on_path.remove(&frame.identity);
            // The root frame has no segment of its own.
            if !self.stack.is_empty() {
                self.path.pop();
            }
        }
    }
}

enum Child {
    Element(usize, SharedValue),
    Member(usize, Option<String>, SharedValue),
}

struct Frame {
    identity: usize,
    container: SharedValue,
    next: usize,
    seen_keys: HashSet<String>,
}

impl Frame {
    /// Next unvisited child. Children are read one at a time through the
    /// handle, so no borrow of the caller's container outlives this call.
    fn next_child(&mut self) -> Option<Child> {
        let index = self.next;
        let child = match &self.container {
            SharedValue::Array(items) => items
                .borrow()
                .get(index)
                .map(|child| Child::Element(index, child.clone())),
            SharedValue::Object(entries) => entries
                .borrow()
                .get(index)
                .map(|(key, child)| Child::Member(index, key.clone(), child.clone())),
            _ => None,
        };
        if child.is_some() {
            self.next += 1;
        }
        child
    }
}
