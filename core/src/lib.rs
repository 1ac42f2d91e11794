//! Convergent Core - JSON document CRDT
//!
//! This is the Rust core of Convergent, compiled to both native and WASM.
//! It implements:
//! - Documents of nested maps and lists that replicas edit independently
//! - Conflict-free merging (last writer wins by a total order over op ids)
//! - Hashed change history with causal dependencies
//! - Vector clocks for causality tracking
//! - Change exchange between replicas and JSON persistence
//!
//! # Examples
//!
//! ```rust
//! use convergent_core::{change, get_history, init, merge, ObjType, ReadDoc, ROOT};
//! use serde_json::json;
//!
//! let doc1 = change(&init(), "Add card", |tx| {
//!     let cards = tx.put_object(&ROOT, "cards", ObjType::List)?;
//!     tx.push_json(&cards, &json!({"title": "Rewrite everything in Clojure", "done": false}))?;
//!     tx.push_json(&cards, &json!({"title": "Rewrite everything in Haskell", "done": false}))
//! })
//! .unwrap();
//!
//! let doc2 = merge(&init(), &doc1).unwrap();
//!
//! let doc1 = change(&doc1, "Mark card as done", |tx| {
//!     let card = tx.object_at(&"cards/0".parse().unwrap())?;
//!     tx.put(&card, "done", true)
//! })
//! .unwrap();
//!
//! let doc2 = change(&doc2, "Delete card", |tx| {
//!     let cards = tx.object_at(&"cards".parse().unwrap())?;
//!     tx.delete(&cards, 1usize)
//! })
//! .unwrap();
//!
//! let final_doc = merge(&doc1, &doc2).unwrap();
//! assert_eq!(
//!     final_doc.to_json()["cards"],
//!     json!([{"title": "Rewrite everything in Clojure", "done": true}])
//! );
//!
//! let messages: Vec<_> = get_history(&final_doc)
//!     .unwrap()
//!     .iter()
//!     .map(|entry| entry.message().unwrap().to_string())
//!     .collect();
//! assert_eq!(messages[0], "Add card");
//! assert_eq!(messages.len(), 3);
//! ```

pub mod change;
pub mod config;
pub mod document;
pub mod encoding;
pub mod error;
pub mod history;
pub mod op_set;
pub mod path;
pub mod read;
pub mod sync;
pub mod time;
pub mod transaction;
pub mod types;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-exports for convenience
pub use change::{Change, ChangeHash, Op, OpAction};
pub use config::InitOptions;
pub use document::Document;
pub use error::{DocError, Result};
pub use history::HistoryEntry;
pub use path::Path;
pub use read::ReadDoc;
pub use sync::{LamportClock, VectorClock};
pub use transaction::Transaction;
pub use types::{ActorId, ElemId, Key, ObjId, ObjType, OpId, Prop, ScalarValue, Value, ROOT};

/// Create an empty document with a random actor
pub fn init() -> Document {
    Document::new()
}

/// Create an empty document attributed to `actor`
pub fn init_with_actor(actor: impl Into<ActorId>) -> Document {
    Document::with_actor(actor)
}

/// Record one change on a copy of `doc`; see [`Document::change`]
pub fn change<F>(doc: &Document, message: impl Into<String>, f: F) -> Result<Document>
where
    F: FnOnce(&mut Transaction<'_>) -> Result<()>,
{
    doc.change(message, f)
}

/// Merge `other` into a copy of `doc`; see [`Document::merge`]
pub fn merge(doc: &Document, other: &Document) -> Result<Document> {
    doc.merge(other)
}

/// Every change of `doc` with the state right after it
pub fn get_history(doc: &Document) -> Result<Vec<HistoryEntry>> {
    doc.get_history()
}
