//! History entries returned by `Document::get_history`

use crate::change::{Change, ChangeHash};
use crate::document::Document;
use crate::op_set::OpSet;
use crate::read::ReadDoc;
use std::sync::Arc;

/// One applied change and the document as it was right after it
///
/// # Example
///
/// ```rust
/// use convergent_core::{Document, ReadDoc, ROOT};
///
/// let doc = Document::new()
///     .change("Set x", |tx| tx.put(&ROOT, "x", 1))
///     .unwrap()
///     .change("Set y", |tx| tx.put(&ROOT, "y", 2))
///     .unwrap();
///
/// let history = doc.get_history().unwrap();
/// assert_eq!(history[0].message(), Some("Set x"));
/// assert_eq!(history[0].length(&ROOT).unwrap(), 1);
/// assert_eq!(history[1].length(&ROOT).unwrap(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub change: Arc<Change>,
    pub snapshot: Document,
}

impl HistoryEntry {
    pub fn message(&self) -> Option<&str> {
        self.change.message()
    }

    pub fn hash(&self) -> ChangeHash {
        self.change.hash()
    }

    pub fn actor(&self) -> &str {
        &self.change.actor
    }

    /// `{hash, actor, seq, time, message, snapshot}` as exposed to JavaScript
    pub fn to_summary_json(&self) -> serde_json::Value {
        serde_json::json!({
            "hash": self.hash().to_string(),
            "actor": self.actor(),
            "seq": self.change.seq,
            "time": self.change.time,
            "message": self.message(),
            "snapshot": self.to_json(),
        })
    }
}

/// Reads go to the snapshot
impl ReadDoc for HistoryEntry {
    fn op_set(&self) -> &OpSet {
        self.snapshot.op_set()
    }
}
