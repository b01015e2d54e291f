use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The members of a [`Collection`]: either an explicit set of entry keys, or a persisted
/// query string (§3 "a collection is exactly one of {has non-empty members, has non-empty
/// query}").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CollectionMembers {
    Manual(Vec<String>),
    Smart(String),
}

/// A named group of entries (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub members: CollectionMembers,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Collection {
    pub fn new_manual(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            parent_id: None,
            color: None,
            icon: None,
            members: CollectionMembers::Manual(Vec::new()),
            created_at: now,
            modified_at: now,
        }
    }

    pub fn new_smart(id: impl Into<String>, name: impl Into<String>, query: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            parent_id: None,
            color: None,
            icon: None,
            members: CollectionMembers::Smart(query.into()),
            created_at: now,
            modified_at: now,
        }
    }

    pub fn is_smart(&self) -> bool {
        matches!(self.members, CollectionMembers::Smart(_))
    }

    /// Add a member to a manual collection, returning a new instance with updated
    /// `modified_at`. Returns the receiver unchanged (cloned) if this is a smart collection.
    pub fn with_member_added(&self, key: &str) -> Self {
        let mut next = self.clone();
        if let CollectionMembers::Manual(ref mut members) = next.members {
            if !members.iter().any(|m| m == key) {
                members.push(key.to_owned());
                next.modified_at = Utc::now();
            }
        }
        next
    }

    /// Remove a member from a manual collection, returning a new instance with updated
    /// `modified_at`.
    pub fn with_member_removed(&self, key: &str) -> Self {
        let mut next = self.clone();
        if let CollectionMembers::Manual(ref mut members) = next.members {
            let before = members.len();
            members.retain(|m| m != key);
            if members.len() != before {
                next.modified_at = Utc::now();
            }
        }
        next
    }

    pub fn contains_manual(&self, key: &str) -> bool {
        matches!(&self.members, CollectionMembers::Manual(members) if members.iter().any(|m| m == key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_and_smart_are_mutually_exclusive() {
        let manual = Collection::new_manual("c1", "Reading list");
        assert!(!manual.is_smart());
        let smart = Collection::new_smart("c2", "Recent", "year:2024");
        assert!(smart.is_smart());
    }

    #[test]
    fn member_add_remove_updates_modified_at() {
        let c = Collection::new_manual("c1", "List");
        let added = c.with_member_added("smith2024");
        assert!(added.contains_manual("smith2024"));
        assert!(added.modified_at >= c.modified_at);
        let removed = added.with_member_removed("smith2024");
        assert!(!removed.contains_manual("smith2024"));
    }
}
