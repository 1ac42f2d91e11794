//! Identifiers and addressing types shared by the whole engine
//!
//! Every operation is identified by an [`OpId`], which also provides the
//! total order used to break ties between concurrent writes. Objects and list
//! elements are named after the operation that created them.

mod value;

pub use value::{ScalarValue, Value};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Replica identifier
pub type ActorId = String;

/// Unique identifier for an operation
///
/// Combines a Lamport counter with the authoring actor. Two replicas never
/// produce the same `OpId` as long as their actor ids differ.
///
/// # Ordering
///
/// 1. Counter (Lamport timestamp, causal order)
/// 2. Actor id (lexicographic tiebreaker for concurrent operations)
///
/// This is the last-writer-wins order: the visible value of a slot is the
/// value written by the greatest `OpId`.
///
/// # Example
///
/// ```rust
/// use convergent_core::OpId;
///
/// let a = OpId::new(1, "alice".to_string());
/// let b = OpId::new(1, "bob".to_string());
/// let c = OpId::new(2, "alice".to_string());
///
/// assert!(a < b);
/// assert!(c > b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpId {
    /// Lamport timestamp
    pub counter: u64,

    /// Actor that created the operation
    pub actor: ActorId,
}

impl OpId {
    /// Create a new OpId
    pub fn new(counter: u64, actor: ActorId) -> Self {
        Self { counter, actor }
    }
}

impl Ord for OpId {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.counter.cmp(&other.counter) {
            Ordering::Equal => self.actor.cmp(&other.actor),
            other => other,
        }
    }
}

impl PartialOrd for OpId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for OpId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.counter, self.actor)
    }
}

/// Identifier of a map or list object inside a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjId {
    /// The root map every document starts with
    Root,

    /// Object created by the operation with this id
    Id(OpId),
}

/// The root object of every document
pub const ROOT: ObjId = ObjId::Root;

impl std::fmt::Display for ObjId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjId::Root => write!(f, "_root"),
            ObjId::Id(id) => write!(f, "{}", id),
        }
    }
}

/// Identifier of a list element
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElemId {
    /// Virtual element before the first element of every list
    Head,

    /// Element created by the insert operation with this id
    Elem(OpId),
}

/// The slot inside an object that an operation targets
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    /// Map key
    Map(String),

    /// List element (for inserts: the element inserted after)
    Seq(ElemId),
}

/// Kind of composite object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjType {
    Map,
    List,
}

impl std::fmt::Display for ObjType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjType::Map => write!(f, "map"),
            ObjType::List => write!(f, "list"),
        }
    }
}

/// User-facing address inside an object: a map key or a list index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Prop {
    Map(String),
    Seq(usize),
}

impl std::fmt::Display for Prop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prop::Map(key) => write!(f, "{}", key),
            Prop::Seq(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for Prop {
    fn from(key: &str) -> Self {
        Prop::Map(key.to_string())
    }
}

impl From<String> for Prop {
    fn from(key: String) -> Self {
        Prop::Map(key)
    }
}

impl From<&String> for Prop {
    fn from(key: &String) -> Self {
        Prop::Map(key.clone())
    }
}

impl From<usize> for Prop {
    fn from(index: usize) -> Self {
        Prop::Seq(index)
    }
}
