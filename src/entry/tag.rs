use std::fmt;

use serde::{Deserialize, Serialize};

/// A hierarchical, `/`-delimited tag path (§3). No leading, trailing, or repeated separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    pub fn new(path: impl Into<String>) -> Result<Self, InvalidTag> {
        let path = path.into();
        if path.is_empty()
            || path.starts_with('/')
            || path.ends_with('/')
            || path.contains("//")
        {
            return Err(InvalidTag(path));
        }
        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// The last path segment.
    pub fn name(&self) -> &str {
        self.segments().next_back().unwrap_or(&self.0)
    }

    /// The parent path, if any.
    pub fn parent(&self) -> Option<Tag> {
        self.0.rfind('/').map(|i| Tag(self.0[..i].to_owned()))
    }

    /// Depth: top-level tags have level 0.
    pub fn level(&self) -> usize {
        self.segments().count() - 1
    }

    /// Whether `self` is an ancestor of `other` (strict: `self != other`).
    pub fn is_ancestor_of(&self, other: &Tag) -> bool {
        other.0.len() > self.0.len()
            && other.0.starts_with(self.0.as_str())
            && other.0.as_bytes()[self.0.len()] == b'/'
    }

    /// Whether `self` is a descendant of `other` (strict).
    pub fn is_descendant_of(&self, other: &Tag) -> bool {
        other.is_ancestor_of(self)
    }

    /// Whether `self` and `other` share the same parent.
    pub fn is_sibling_of(&self, other: &Tag) -> bool {
        self != other && self.parent() == other.parent()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid tag path '{0}': must be non-empty, `/`-delimited, without leading/trailing/repeated separators")]
pub struct InvalidTag(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_paths() {
        assert!(Tag::new("").is_err());
        assert!(Tag::new("/a").is_err());
        assert!(Tag::new("a/").is_err());
        assert!(Tag::new("a//b").is_err());
    }

    #[test]
    fn derives_name_parent_level() {
        let t = Tag::new("math/topology/algebraic").unwrap();
        assert_eq!(t.name(), "algebraic");
        assert_eq!(t.parent(), Some(Tag::new("math/topology").unwrap()));
        assert_eq!(t.level(), 2);
    }

    #[test]
    fn ancestor_descendant_sibling() {
        let a = Tag::new("math").unwrap();
        let b = Tag::new("math/topology").unwrap();
        let c = Tag::new("math/algebra").unwrap();
        assert!(a.is_ancestor_of(&b));
        assert!(b.is_descendant_of(&a));
        assert!(b.is_sibling_of(&c));
        assert!(!a.is_ancestor_of(&a));
    }
}
