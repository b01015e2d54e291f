//! The structured result of an operation-layer call (§4.J).
use crate::entry::Entry;

/// Which kind of operation produced an [`OperationResult`] (§4.J).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Read,
    Update,
    Delete,
    Replace,
    Bulk,
}

/// The outcome of a single operation-layer call (§4.J): whether it succeeded, the key
/// concerned, a human-readable message (prefixed `[DRY RUN]` under dry-run mode), the entry
/// before/after the change when applicable, any errors collected along the way, and how many
/// records were affected (1 for a single-record operation, the batch size for [`Self::kind`]
/// `Bulk`).
#[derive(Debug, Clone)]
pub struct OperationResult {
    pub success: bool,
    pub kind: OperationKind,
    pub key: Option<String>,
    pub message: String,
    pub before: Option<Entry>,
    pub after: Option<Entry>,
    pub errors: Vec<String>,
    pub affected: usize,
}

impl OperationResult {
    pub fn ok(kind: OperationKind, key: Option<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            kind,
            key,
            message: message.into(),
            before: None,
            after: None,
            errors: Vec::new(),
            affected: 1,
        }
    }

    pub fn failed(kind: OperationKind, key: Option<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            kind,
            key,
            message: message.into(),
            before: None,
            after: None,
            errors: Vec::new(),
            affected: 0,
        }
    }

    pub fn with_before(mut self, entry: Entry) -> Self {
        self.before = Some(entry);
        self
    }

    pub fn with_after(mut self, entry: Entry) -> Self {
        self.after = Some(entry);
        self
    }

    pub fn with_affected(mut self, affected: usize) -> Self {
        self.affected = affected;
        self
    }
}
