use std::fmt;

/// A citation key: ASCII letters/digits/underscore/hyphen, starting with a letter (§3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct EntryKey(String);

impl EntryKey {
    /// Validate and wrap a citation key.
    pub fn new(key: impl Into<String>) -> Result<Self, InvalidKey> {
        let key = key.into();
        let mut chars = key.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() => {}
            _ => return Err(InvalidKey(key)),
        }
        if chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            Ok(Self(key))
        } else {
            Err(InvalidKey(key))
        }
    }

    /// Construct a key from an already-valid string without re-validating.
    ///
    /// # Safety (invariant, not memory safety)
    /// The caller must guarantee `key` satisfies [`EntryKey::new`]'s rules.
    pub(crate) fn new_unchecked(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EntryKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EntryKey> for String {
    fn from(key: EntryKey) -> Self {
        key.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid citation key '{0}': must start with a letter and contain only ASCII letters, digits, '_' or '-'")]
pub struct InvalidKey(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_keys() {
        assert!(EntryKey::new("smith2024").is_ok());
        assert!(EntryKey::new("a").is_ok());
        assert!(EntryKey::new("Smith-2024_b").is_ok());
    }

    #[test]
    fn rejects_invalid_keys() {
        assert!(EntryKey::new("").is_err());
        assert!(EntryKey::new("2024smith").is_err());
        assert!(EntryKey::new("smith 2024").is_err());
        assert!(EntryKey::new("smith.2024").is_err());
    }
}
