//! Locations inside a value tree.
//!
//! Errors from the validator carry a [`Path`] from the root to the offending
//! node so that a failure is actionable without dumping the payload. Paths
//! render in the familiar `$.specs.dims[0]` notation.

use std::fmt;

/// One step from a container to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object member, by key.
    Key(String),
    /// Array element, by position. Also used for an object entry whose key is null.
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Sequence of segments from the root of a tree. The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<PathSegment>);

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, segment: impl Into<PathSegment>) {
        self.0.push(segment.into());
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    /// Returns a copy of this path extended by one segment.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Path(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Path(segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            match segment {
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_renders_as_dollar() {
        assert_eq!(Path::root().to_string(), "$");
        assert!(Path::root().is_root());
    }

    #[test]
    fn mixed_segments_render_in_order() {
        let path: Path = vec![
            PathSegment::from("specs"),
            PathSegment::from("dims"),
            PathSegment::from(2usize),
        ]
        .into();
        assert_eq!(path.to_string(), "$.specs.dims[2]");
    }

    #[test]
    fn collects_from_keys() {
        let path: Path = ["a", "b"].into_iter().collect();
        assert_eq!(path.segments().len(), 2);
        assert_eq!(path.to_string(), "$.a.b");
    }

    #[test]
    fn child_leaves_parent_untouched() {
        let parent: Path = ["tags"].into_iter().collect();
        let child = parent.child(0usize);
        assert_eq!(parent.to_string(), "$.tags");
        assert_eq!(child.to_string(), "$.tags[0]");
    }

    #[test]
    fn push_and_pop() {
        let mut path = Path::root();
        path.push("x");
        path.push(1usize);
        assert_eq!(path.pop(), Some(PathSegment::Index(1)));
        assert_eq!(path.pop(), Some(PathSegment::Key("x".into())));
        assert_eq!(path.pop(), None);
    }
}
