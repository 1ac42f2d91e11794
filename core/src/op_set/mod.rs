//! OpSet: materialized document state
//!
//! The OpSet stores every value-bearing operation ever applied, grouped by
//! object and by the slot ([`Key`]) they occupy. Overwrites and deletes do
//! not remove anything: they mark the ops they replace as having a successor.
//!
//! # Visibility
//!
//! - An entry is **visible** while no later op has overwritten it.
//! - The value of a slot is its visible entry with the greatest [`OpId`].
//! - Several visible entries in one slot are a conflict; all are reported
//!   by [`OpSet::get_all`].
//! - A list element exists while it has at least one visible entry.
//!
//! Visible state depends only on the *set* of applied ops, never on the
//! order they arrived in. This is what makes merge commutative, associative
//! and idempotent.

mod seq;

pub(crate) use seq::Sequence;

use crate::change::{Op, OpAction};
use crate::error::{DocError, Result};
use crate::types::{ElemId, Key, ObjId, ObjType, OpId, Prop, ScalarValue, Value};
use std::collections::{BTreeMap, HashMap};

/// A value-bearing op stored in a slot
#[derive(Debug, Clone)]
pub(crate) struct OpEntry {
    pub(crate) id: OpId,
    pub(crate) action: OpAction,

    /// Ops that overwrote or deleted this one
    pub(crate) succ: Vec<OpId>,

    /// Sum of increments applied to this entry (counters only)
    pub(crate) increment: i64,
}

impl OpEntry {
    fn is_visible(&self) -> bool {
        self.succ.is_empty()
    }

    fn value(&self) -> Value {
        match &self.action {
            OpAction::MakeMap => Value::Object(ObjType::Map, ObjId::Id(self.id.clone())),
            OpAction::MakeList => Value::Object(ObjType::List, ObjId::Id(self.id.clone())),
            OpAction::Set(ScalarValue::Counter(base)) => {
                Value::Scalar(ScalarValue::Counter(base.wrapping_add(self.increment)))
            }
            OpAction::Set(scalar) => Value::Scalar(scalar.clone()),
            // Never stored
            OpAction::Increment(_) | OpAction::Delete => Value::Scalar(ScalarValue::Null),
        }
    }
}

/// State of one map or list
#[derive(Debug, Clone)]
pub(crate) struct ObjState {
    obj_type: ObjType,
    props: BTreeMap<Key, Vec<OpEntry>>,
    seq: Sequence,
}

impl ObjState {
    fn new(obj_type: ObjType) -> Self {
        Self {
            obj_type,
            props: BTreeMap::new(),
            seq: Sequence::new(),
        }
    }

    fn winner(&self, key: &Key) -> Option<&OpEntry> {
        self.props
            .get(key)?
            .iter()
            .filter(|e| e.is_visible())
            .max_by(|a, b| a.id.cmp(&b.id))
    }

    fn visible_elems(&self) -> impl Iterator<Item = &OpId> + '_ {
        self.seq.iter().filter(move |id| {
            self.winner(&Key::Seq(ElemId::Elem((*id).clone()))).is_some()
        })
    }
}

/// Materialized state of a document
#[derive(Debug, Clone)]
pub struct OpSet {
    objects: HashMap<ObjId, ObjState>,
    op_count: usize,
}

impl Default for OpSet {
    fn default() -> Self {
        Self::new()
    }
}

impl OpSet {
    /// Create an OpSet containing only the empty root map
    pub fn new() -> Self {
        let mut objects = HashMap::new();
        objects.insert(ObjId::Root, ObjState::new(ObjType::Map));
        Self {
            objects,
            op_count: 0,
        }
    }

    /// Number of ops applied so far
    pub fn op_count(&self) -> usize {
        self.op_count
    }

    fn object(&self, obj: &ObjId) -> Result<&ObjState> {
        self.objects
            .get(obj)
            .ok_or_else(|| DocError::MissingObject(obj.clone()))
    }

    /// Apply a single op
    ///
    /// The ops named in `pred` (and, for inserts, the origin element) must
    /// already be applied.
    pub fn apply(&mut self, id: &OpId, op: &Op) -> Result<()> {
        tracing::trace!(op_id = %id, obj = %op.obj, action = ?op.action, "Applying op");

        let target = op.target_key(id);
        {
            let state = self
                .objects
                .get_mut(&op.obj)
                .ok_or_else(|| DocError::MissingObject(op.obj.clone()))?;

            match (&op.key, state.obj_type) {
                (Key::Map(_), ObjType::Map) | (Key::Seq(_), ObjType::List) => {}
                (key, obj_type) => {
                    return Err(DocError::InvalidProp {
                        prop: format!("{:?}", key),
                        obj_type,
                    })
                }
            }

            if op.insert {
                if let Key::Seq(origin) = &op.key {
                    state.seq.insert(origin, id.clone())?;
                }
            } else if let Key::Seq(ElemId::Elem(elem)) = &op.key {
                if !state.seq.contains(elem) {
                    return Err(DocError::MissingOp(elem.clone()));
                }
            }

            let entries = state.props.entry(target).or_default();
            for pred in &op.pred {
                let entry = entries
                    .iter_mut()
                    .find(|e| &e.id == pred)
                    .ok_or_else(|| DocError::MissingOp(pred.clone()))?;

                match op.action {
                    // Wrapping, so concurrent increments still commute
                    OpAction::Increment(by) => entry.increment = entry.increment.wrapping_add(by),
                    _ => entry.succ.push(id.clone()),
                }
            }

            if op.action.is_value() {
                entries.push(OpEntry {
                    id: id.clone(),
                    action: op.action.clone(),
                    succ: Vec::new(),
                    increment: 0,
                });
            }
        }

        if let Some(obj_type) = op.action.obj_type() {
            self.objects
                .insert(ObjId::Id(id.clone()), ObjState::new(obj_type));
        }

        self.op_count += 1;
        Ok(())
    }

    /// Type of an object
    pub fn object_type(&self, obj: &ObjId) -> Result<ObjType> {
        Ok(self.object(obj)?.obj_type)
    }

    /// Resolve a user-facing property to the slot it names
    ///
    /// Any map key resolves; list indices must address a visible element.
    pub(crate) fn resolve(&self, obj: &ObjId, prop: &Prop) -> Result<Key> {
        let state = self.object(obj)?;
        match (prop, state.obj_type) {
            (Prop::Map(key), ObjType::Map) => Ok(Key::Map(key.clone())),
            (Prop::Seq(index), ObjType::List) => {
                let length = state.visible_elems().count();
                state
                    .visible_elems()
                    .nth(*index)
                    .map(|id| Key::Seq(ElemId::Elem(id.clone())))
                    .ok_or(DocError::IndexOutOfBounds {
                        index: *index,
                        length,
                    })
            }
            (prop, obj_type) => Err(DocError::InvalidProp {
                prop: prop.to_string(),
                obj_type,
            }),
        }
    }

    /// Element a new insert at `index` should be placed after
    pub(crate) fn insert_origin(&self, obj: &ObjId, index: usize) -> Result<ElemId> {
        let state = self.object(obj)?;
        if state.obj_type != ObjType::List {
            return Err(DocError::InvalidProp {
                prop: index.to_string(),
                obj_type: state.obj_type,
            });
        }

        if index == 0 {
            return Ok(ElemId::Head);
        }

        let length = state.visible_elems().count();
        state
            .visible_elems()
            .nth(index - 1)
            .map(|id| ElemId::Elem(id.clone()))
            .ok_or(DocError::IndexOutOfBounds { index, length })
    }

    /// Ids of the visible entries in a slot (the `pred` of a new write)
    pub(crate) fn visible_ids(&self, obj: &ObjId, key: &Key) -> Result<Vec<OpId>> {
        let state = self.object(obj)?;
        Ok(state
            .props
            .get(key)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.is_visible())
                    .map(|e| e.id.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Winning value in a slot
    pub(crate) fn value_at(&self, obj: &ObjId, key: &Key) -> Result<Option<Value>> {
        Ok(self.object(obj)?.winner(key).map(OpEntry::value))
    }

    /// Winning value at a property
    pub fn get(&self, obj: &ObjId, prop: &Prop) -> Result<Option<Value>> {
        match self.resolve(obj, prop) {
            Ok(key) => self.value_at(obj, &key),
            Err(DocError::IndexOutOfBounds { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// All visible values at a property, ordered by op id (the last one wins)
    pub fn get_all(&self, obj: &ObjId, prop: &Prop) -> Result<Vec<(OpId, Value)>> {
        let key = match self.resolve(obj, prop) {
            Ok(key) => key,
            Err(DocError::IndexOutOfBounds { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut values: Vec<(OpId, Value)> = self
            .object(obj)?
            .props
            .get(&key)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.is_visible())
                    .map(|e| (e.id.clone(), e.value()))
                    .collect()
            })
            .unwrap_or_default();
        values.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(values)
    }

    /// Visible keys of a map, sorted
    pub fn keys(&self, obj: &ObjId) -> Result<Vec<String>> {
        let state = self.object(obj)?;
        Ok(state
            .props
            .keys()
            .filter_map(|key| match key {
                Key::Map(name) if state.winner(key).is_some() => Some(name.clone()),
                _ => None,
            })
            .collect())
    }

    /// Number of visible keys (maps) or elements (lists)
    pub fn length(&self, obj: &ObjId) -> Result<usize> {
        let state = self.object(obj)?;
        Ok(match state.obj_type {
            ObjType::Map => state
                .props
                .keys()
                .filter(|key| state.winner(key).is_some())
                .count(),
            ObjType::List => state.visible_elems().count(),
        })
    }

    /// Visible values of an object in order (map: by key, list: by index)
    pub fn values(&self, obj: &ObjId) -> Result<Vec<Value>> {
        let state = self.object(obj)?;
        Ok(match state.obj_type {
            ObjType::Map => state
                .props
                .keys()
                .filter_map(|key| state.winner(key).map(OpEntry::value))
                .collect(),
            ObjType::List => state
                .visible_elems()
                .filter_map(|id| {
                    state
                        .winner(&Key::Seq(ElemId::Elem(id.clone())))
                        .map(OpEntry::value)
                })
                .collect(),
        })
    }

    /// Materialize an object as JSON
    pub fn to_json(&self, obj: &ObjId) -> Result<serde_json::Value> {
        let state = self.object(obj)?;
        match state.obj_type {
            ObjType::Map => {
                let mut map = serde_json::Map::new();
                for key in state.props.keys() {
                    if let (Key::Map(name), Some(entry)) = (key, state.winner(key)) {
                        map.insert(name.clone(), self.value_to_json(&entry.value())?);
                    }
                }
                Ok(serde_json::Value::Object(map))
            }
            ObjType::List => {
                let items = self
                    .values(obj)?
                    .iter()
                    .map(|value| self.value_to_json(value))
                    .collect::<Result<Vec<_>>>()?;
                Ok(serde_json::Value::Array(items))
            }
        }
    }

    fn value_to_json(&self, value: &Value) -> Result<serde_json::Value> {
        match value {
            Value::Object(_, id) => self.to_json(id),
            Value::Scalar(scalar) => Ok(scalar.to_json()),
        }
    }
}
