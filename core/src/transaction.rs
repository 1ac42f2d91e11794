//! Transaction: the mutable view handed to `Document::change`
//!
//! Every write is applied to the in-progress state immediately, so reads made
//! later in the same closure observe it, and is recorded as an [`Op`] of the
//! change being built.
//!
//! # Example
//!
//! ```rust
//! use convergent_core::{Document, ObjType, ReadDoc, ROOT};
//!
//! let doc = Document::new()
//!     .change("Add card", |tx| {
//!         let cards = tx.put_object(&ROOT, "cards", ObjType::List)?;
//!         let card = tx.push_object(&cards, ObjType::Map)?;
//!         tx.put(&card, "title", "Write tests")?;
//!         tx.put(&card, "done", false)?;
//!         assert_eq!(tx.length(&cards)?, 1);
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! assert_eq!(doc.to_json()["cards"][0]["title"], "Write tests");
//! ```

use crate::change::{Op, OpAction};
use crate::error::{DocError, Result};
use crate::op_set::OpSet;
use crate::read::ReadDoc;
use crate::sync::LamportClock;
use crate::types::{ActorId, Key, ObjId, ObjType, OpId, Prop, ScalarValue, Value};

/// Mutable view of a document inside a change
pub struct Transaction<'a> {
    op_set: &'a mut OpSet,
    actor: ActorId,
    clock: LamportClock,
    ops: Vec<Op>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(op_set: &'a mut OpSet, actor: ActorId, clock: LamportClock) -> Self {
        Self {
            op_set,
            actor,
            clock,
            ops: Vec::new(),
        }
    }

    /// Ops recorded so far
    pub(crate) fn into_ops(self) -> Vec<Op> {
        self.ops
    }

    /// Number of ops recorded so far
    pub fn pending_ops(&self) -> usize {
        self.ops.len()
    }

    /// Actor the change is attributed to
    pub fn actor(&self) -> &ActorId {
        &self.actor
    }

    /// Apply and record an op
    ///
    /// The counter is only consumed once the op applied cleanly, so a failed
    /// write leaves no gap in the change's op ids.
    fn push_op(&mut self, op: Op) -> Result<OpId> {
        let id = OpId::new(self.clock.value() + 1, self.actor.clone());
        self.op_set.apply(&id, &op)?;
        self.clock.tick();
        self.ops.push(op);
        Ok(id)
    }

    fn write(&mut self, obj: &ObjId, prop: Prop, action: OpAction) -> Result<OpId> {
        let key = self.op_set.resolve(obj, &prop)?;
        let pred = self.op_set.visible_ids(obj, &key)?;
        self.push_op(Op {
            obj: obj.clone(),
            key,
            insert: false,
            action,
            pred,
        })
    }

    fn insert_op(&mut self, obj: &ObjId, index: usize, action: OpAction) -> Result<OpId> {
        let origin = self.op_set.insert_origin(obj, index)?;
        self.push_op(Op {
            obj: obj.clone(),
            key: Key::Seq(origin),
            insert: true,
            action,
            pred: Vec::new(),
        })
    }

    /// Set a map key or overwrite a list element
    pub fn put<P: Into<Prop>, V: Into<ScalarValue>>(
        &mut self,
        obj: &ObjId,
        prop: P,
        value: V,
    ) -> Result<()> {
        let value = finite(value.into())?;
        self.write(obj, prop.into(), OpAction::Set(value))?;
        Ok(())
    }

    /// Create a nested object at a map key or list element
    pub fn put_object<P: Into<Prop>>(
        &mut self,
        obj: &ObjId,
        prop: P,
        obj_type: ObjType,
    ) -> Result<ObjId> {
        let id = self.write(obj, prop.into(), make_action(obj_type))?;
        Ok(ObjId::Id(id))
    }

    /// Insert a value before the element currently at `index`
    ///
    /// `index == length` appends.
    pub fn insert<V: Into<ScalarValue>>(
        &mut self,
        obj: &ObjId,
        index: usize,
        value: V,
    ) -> Result<()> {
        let value = finite(value.into())?;
        self.insert_op(obj, index, OpAction::Set(value))?;
        Ok(())
    }

    /// Insert a nested object into a list
    pub fn insert_object(&mut self, obj: &ObjId, index: usize, obj_type: ObjType) -> Result<ObjId> {
        let id = self.insert_op(obj, index, make_action(obj_type))?;
        Ok(ObjId::Id(id))
    }

    /// Append a value to a list
    pub fn push<V: Into<ScalarValue>>(&mut self, obj: &ObjId, value: V) -> Result<()> {
        let length = self.op_set.length(obj)?;
        self.insert(obj, length, value)
    }

    /// Append a nested object to a list
    pub fn push_object(&mut self, obj: &ObjId, obj_type: ObjType) -> Result<ObjId> {
        let length = self.op_set.length(obj)?;
        self.insert_object(obj, length, obj_type)
    }

    /// Remove a map key or list element
    ///
    /// Deleting a key that holds no value is a no-op.
    pub fn delete<P: Into<Prop>>(&mut self, obj: &ObjId, prop: P) -> Result<()> {
        let key = self.op_set.resolve(obj, &prop.into())?;
        let pred = self.op_set.visible_ids(obj, &key)?;
        if pred.is_empty() {
            return Ok(());
        }

        self.push_op(Op {
            obj: obj.clone(),
            key,
            insert: false,
            action: OpAction::Delete,
            pred,
        })?;
        Ok(())
    }

    /// Add `by` to the counter at a property
    ///
    /// Concurrent increments of the same counter add up.
    pub fn increment<P: Into<Prop>>(&mut self, obj: &ObjId, prop: P, by: i64) -> Result<()> {
        let prop = prop.into();
        let key = self.op_set.resolve(obj, &prop)?;

        let counters: Vec<(OpId, Value)> = self
            .op_set
            .get_all(obj, &prop)?
            .into_iter()
            .filter(|(_, value)| value.as_scalar().is_some_and(ScalarValue::is_counter))
            .collect();
        if counters.is_empty() {
            return Err(DocError::NotACounter {
                prop: prop.to_string(),
            });
        }
        let overflows = counters
            .iter()
            .any(|(_, value)| value.as_i64().and_then(|n| n.checked_add(by)).is_none());
        if overflows {
            return Err(DocError::CounterOverflow {
                prop: prop.to_string(),
            });
        }
        let counters: Vec<OpId> = counters.into_iter().map(|(id, _)| id).collect();

        self.push_op(Op {
            obj: obj.clone(),
            key,
            insert: false,
            action: OpAction::Increment(by),
            pred: counters,
        })?;
        Ok(())
    }

    /// Write a JSON value, turning objects into maps and arrays into lists
    pub fn put_json<P: Into<Prop>>(
        &mut self,
        obj: &ObjId,
        prop: P,
        json: &serde_json::Value,
    ) -> Result<()> {
        match ScalarValue::from_json(json) {
            Some(scalar) => self.put(obj, prop, scalar),
            None => {
                let child = self.put_object(obj, prop, json_obj_type(json))?;
                self.fill_json(&child, json)
            }
        }
    }

    /// Insert a JSON value into a list
    pub fn insert_json(&mut self, obj: &ObjId, index: usize, json: &serde_json::Value) -> Result<()> {
        match ScalarValue::from_json(json) {
            Some(scalar) => self.insert(obj, index, scalar),
            None => {
                let child = self.insert_object(obj, index, json_obj_type(json))?;
                self.fill_json(&child, json)
            }
        }
    }

    /// Append a JSON value to a list
    pub fn push_json(&mut self, obj: &ObjId, json: &serde_json::Value) -> Result<()> {
        let length = self.op_set.length(obj)?;
        self.insert_json(obj, length, json)
    }

    fn fill_json(&mut self, obj: &ObjId, json: &serde_json::Value) -> Result<()> {
        match json {
            serde_json::Value::Object(map) => {
                for (key, value) in map {
                    self.put_json(obj, key.as_str(), value)?;
                }
            }
            serde_json::Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    self.insert_json(obj, index, item)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl ReadDoc for Transaction<'_> {
    fn op_set(&self) -> &OpSet {
        &*self.op_set
    }
}

/// Reject floats without a JSON encoding
fn finite(value: ScalarValue) -> Result<ScalarValue> {
    match value {
        ScalarValue::F64(f) if !f.is_finite() => Err(DocError::NonFiniteFloat(f)),
        value => Ok(value),
    }
}

fn make_action(obj_type: ObjType) -> OpAction {
    match obj_type {
        ObjType::Map => OpAction::MakeMap,
        ObjType::List => OpAction::MakeList,
    }
}

fn json_obj_type(json: &serde_json::Value) -> ObjType {
    if json.is_array() {
        ObjType::List
    } else {
        ObjType::Map
    }
}
