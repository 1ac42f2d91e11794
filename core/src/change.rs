//! Changes: the atomic, hashed unit of document history
//!
//! A [`Change`] groups the operations produced by one call to
//! [`Document::change`](crate::Document::change). Changes reference the
//! changes they were made on top of (`deps`), forming a DAG. Each change is
//! identified by the BLAKE3 hash of its canonical JSON encoding.

use crate::error::{DocError, Result};
use crate::types::{ActorId, ElemId, Key, ObjId, ObjType, OpId, ScalarValue};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Hash identifying a change
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChangeHash(pub [u8; 32]);

impl ChangeHash {
    fn digest(bytes: &[u8]) -> Self {
        ChangeHash(*blake3::hash(bytes).as_bytes())
    }
}

impl std::fmt::Display for ChangeHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl std::fmt::Debug for ChangeHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ChangeHash({})", hex::encode(&self.0[..8]))
    }
}

impl FromStr for ChangeHash {
    type Err = DocError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|_| DocError::InvalidHash(s.to_string()))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| DocError::InvalidHash(s.to_string()))?;
        Ok(ChangeHash(array))
    }
}

/// Serializes as lowercase hex.
impl Serialize for ChangeHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ChangeHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ChangeHash::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// What an operation does to its slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OpAction {
    /// Create a nested map
    MakeMap,

    /// Create a nested list
    MakeList,

    /// Write a primitive value
    Set(ScalarValue),

    /// Add to the counters named in `pred`
    Increment(i64),

    /// Remove the values named in `pred`
    Delete,
}

impl OpAction {
    /// Whether this op leaves a value in its slot
    pub fn is_value(&self) -> bool {
        matches!(self, OpAction::MakeMap | OpAction::MakeList | OpAction::Set(_))
    }

    /// Object type created by this op, if any
    pub fn obj_type(&self) -> Option<ObjType> {
        match self {
            OpAction::MakeMap => Some(ObjType::Map),
            OpAction::MakeList => Some(ObjType::List),
            _ => None,
        }
    }
}

/// A single operation
///
/// The id of an op is not stored: the i-th op of a change has id
/// `OpId(change.start_op + i, change.actor)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Op {
    /// Object the op applies to
    pub obj: ObjId,

    /// Map key, list element, or (for inserts) the element inserted after
    pub key: Key,

    /// Whether this op inserts a new list element
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub insert: bool,

    pub action: OpAction,

    /// Ops this one overwrites (or, for increments, adds to)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pred: Vec<OpId>,
}

impl Op {
    /// Slot the op's value occupies once applied
    ///
    /// Inserts occupy the new element they create; everything else occupies
    /// the key it names.
    pub fn target_key(&self, id: &OpId) -> Key {
        if self.insert {
            Key::Seq(ElemId::Elem(id.clone()))
        } else {
            self.key.clone()
        }
    }
}

/// Fields covered by the change hash, in canonical order
#[derive(Serialize)]
struct HashedFields<'a> {
    actor: &'a ActorId,
    seq: u64,
    start_op: u64,
    time: i64,
    message: &'a Option<String>,
    deps: &'a [ChangeHash],
    ops: &'a [Op],
}

/// An atomic group of operations made by one actor
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    hash: ChangeHash,

    /// Actor that made the change
    pub actor: ActorId,

    /// Per-actor sequence number, starting at 1
    pub seq: u64,

    /// Counter of the first op in this change
    pub start_op: u64,

    /// Milliseconds since the unix epoch when the change was made
    pub time: i64,

    /// Human-readable description passed to `change`
    pub message: Option<String>,

    /// Heads of the authoring document when the change was made (sorted)
    pub deps: Vec<ChangeHash>,

    pub ops: Vec<Op>,
}

impl Change {
    /// Build a change and compute its hash
    pub fn new(
        actor: ActorId,
        seq: u64,
        start_op: u64,
        time: i64,
        message: Option<String>,
        mut deps: Vec<ChangeHash>,
        ops: Vec<Op>,
    ) -> Result<Self> {
        deps.sort();
        deps.dedup();

        let mut change = Self {
            hash: ChangeHash([0; 32]),
            actor,
            seq,
            start_op,
            time,
            message,
            deps,
            ops,
        };
        change.hash = change.compute_hash()?;
        Ok(change)
    }

    fn compute_hash(&self) -> Result<ChangeHash> {
        let fields = HashedFields {
            actor: &self.actor,
            seq: self.seq,
            start_op: self.start_op,
            time: self.time,
            message: &self.message,
            deps: &self.deps,
            ops: &self.ops,
        };
        let bytes = serde_json::to_vec(&fields)?;
        Ok(ChangeHash::digest(&bytes))
    }

    pub fn hash(&self) -> ChangeHash {
        self.hash
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Counter of the last op (equal to `start_op - 1` for empty changes)
    pub fn max_op(&self) -> u64 {
        (self.start_op + self.ops.len() as u64).saturating_sub(1)
    }

    /// Ops paired with their ids
    pub fn iter_ops(&self) -> impl Iterator<Item = (OpId, &Op)> + '_ {
        self.ops
            .iter()
            .enumerate()
            .map(move |(i, op)| (OpId::new(self.start_op + i as u64, self.actor.clone()), op))
    }

    /// Change time as a UTC datetime
    pub fn timestamp(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.time)
    }
}

impl Serialize for Change {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Change", 8)?;
        state.serialize_field("hash", &self.hash)?;
        state.serialize_field("actor", &self.actor)?;
        state.serialize_field("seq", &self.seq)?;
        state.serialize_field("start_op", &self.start_op)?;
        state.serialize_field("time", &self.time)?;
        state.serialize_field("message", &self.message)?;
        state.serialize_field("deps", &self.deps)?;
        state.serialize_field("ops", &self.ops)?;
        state.end()
    }
}

/// Recomputes the hash and rejects changes whose stored hash differs.
impl<'de> Deserialize<'de> for Change {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ChangeHelper {
            hash: ChangeHash,
            actor: ActorId,
            seq: u64,
            start_op: u64,
            time: i64,
            message: Option<String>,
            deps: Vec<ChangeHash>,
            ops: Vec<Op>,
        }

        let helper = ChangeHelper::deserialize(deserializer)?;
        let change = Change::new(
            helper.actor,
            helper.seq,
            helper.start_op,
            helper.time,
            helper.message,
            helper.deps,
            helper.ops,
        )
        .map_err(serde::de::Error::custom)?;

        if change.hash != helper.hash {
            return Err(serde::de::Error::custom(DocError::HashMismatch {
                stored: helper.hash,
                computed: change.hash,
            }));
        }
        Ok(change)
    }
}
