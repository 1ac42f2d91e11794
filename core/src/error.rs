//! Error types for document operations

use crate::types::{ObjId, ObjType, OpId};
use crate::change::ChangeHash;
use thiserror::Error;

/// Errors that can occur while reading, changing or merging documents
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DocError {
    /// Object id does not exist in this document
    #[error("Object not found: {0}")]
    MissingObject(ObjId),

    /// Property kind does not match the object type (index into a map, key into a list)
    #[error("Invalid property '{prop}' for {obj_type} object")]
    InvalidProp { prop: String, obj_type: ObjType },

    /// List index is out of bounds
    #[error("Index {index} out of bounds (length: {length})")]
    IndexOutOfBounds { index: usize, length: usize },

    /// Increment targeted something that is not a counter
    #[error("Value at '{prop}' is not a counter")]
    NotACounter { prop: String },

    /// Increment would take the counter outside the i64 range
    #[error("Counter at '{prop}' would overflow")]
    CounterOverflow { prop: String },

    /// NaN and infinities have no JSON encoding
    #[error("Float value {0} is not finite")]
    NonFiniteFloat(f64),

    /// An op referenced an op (predecessor or list element) that was never applied
    #[error("Operation {0} was never applied")]
    MissingOp(OpId),

    /// A change depends on changes this document has not seen
    #[error("Change {hash} is missing {} dependencies", .missing.len())]
    MissingDependencies {
        hash: ChangeHash,
        missing: Vec<ChangeHash>,
    },

    /// An actor produced two different changes with the same sequence number
    #[error("Actor {actor} reused sequence number {seq}")]
    DuplicateSeq { actor: String, seq: u64 },

    /// A change skipped sequence numbers of its actor
    #[error("Actor {actor} expected sequence number {expected}, got {got}")]
    SeqGap { actor: String, expected: u64, got: u64 },

    /// Stored hash does not match the change contents
    #[error("Change hash mismatch: stored {stored}, computed {computed}")]
    HashMismatch {
        stored: ChangeHash,
        computed: ChangeHash,
    },

    /// Hash string is not 32 bytes of hex
    #[error("Invalid change hash: {0}")]
    InvalidHash(String),

    /// Path could not be parsed or does not resolve to an object
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Saved document uses an unknown format version
    #[error("Unsupported document format version {0}")]
    UnsupportedVersion(u32),

    /// JSON encoding or decoding failed
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Result type for document operations
pub type Result<T> = std::result::Result<T, DocError>;
