//! Read access shared by documents, transactions and history snapshots

use crate::error::{DocError, Result};
use crate::op_set::OpSet;
use crate::path::Path;
use crate::types::{ObjId, ObjType, OpId, Prop, Value, ROOT};

/// Read the visible state of a document
pub trait ReadDoc {
    /// Materialized state backing this view
    fn op_set(&self) -> &OpSet;

    /// Winning value at a property, `None` if absent
    fn get<P: Into<Prop>>(&self, obj: &ObjId, prop: P) -> Result<Option<Value>> {
        self.op_set().get(obj, &prop.into())
    }

    /// Every concurrently written value at a property, ordered by op id
    ///
    /// The last entry is the one [`ReadDoc::get`] returns. More than one
    /// entry means concurrent writes conflicted.
    fn get_all<P: Into<Prop>>(&self, obj: &ObjId, prop: P) -> Result<Vec<(OpId, Value)>> {
        self.op_set().get_all(obj, &prop.into())
    }

    /// Visible keys of a map, sorted
    fn keys(&self, obj: &ObjId) -> Result<Vec<String>> {
        self.op_set().keys(obj)
    }

    /// Number of keys (maps) or elements (lists)
    fn length(&self, obj: &ObjId) -> Result<usize> {
        self.op_set().length(obj)
    }

    fn object_type(&self, obj: &ObjId) -> Result<ObjType> {
        self.op_set().object_type(obj)
    }

    /// Values of an object in key or index order
    fn values(&self, obj: &ObjId) -> Result<Vec<Value>> {
        self.op_set().values(obj)
    }

    /// Value at a path from the root
    ///
    /// The empty path is the root map. Numeric segments address map keys when
    /// the object at that point is a map.
    fn get_path(&self, path: &Path) -> Result<Option<Value>> {
        let mut current = Value::Object(ObjType::Map, ROOT);
        for prop in path.iter() {
            let obj = match current.obj_id() {
                Some(id) => id.clone(),
                None => return Ok(None),
            };
            let prop = adapt_prop(self.op_set(), &obj, prop)?;
            match self.op_set().get(&obj, &prop)? {
                Some(value) => current = value,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Object at a path, failing if the path is absent or names a scalar
    fn object_at(&self, path: &Path) -> Result<ObjId> {
        match self.get_path(path)? {
            Some(Value::Object(_, id)) => Ok(id),
            _ => Err(DocError::InvalidPath(path.to_string())),
        }
    }

    /// Parent object and final property of a non-empty path
    ///
    /// A numeric final segment under a map becomes a map key.
    fn resolve_path(&self, path: &Path) -> Result<(ObjId, Prop)> {
        let (parent, last) = path
            .split_last()
            .ok_or_else(|| DocError::InvalidPath(path.to_string()))?;
        let obj = self.object_at(&parent)?;
        let prop = adapt_prop(self.op_set(), &obj, last)?;
        Ok((obj, prop))
    }

    /// Value at a path as JSON, objects included
    fn get_path_json(&self, path: &Path) -> Result<Option<serde_json::Value>> {
        match self.get_path(path)? {
            Some(Value::Object(_, id)) => self.object_to_json(&id).map(Some),
            Some(Value::Scalar(scalar)) => Ok(Some(scalar.to_json())),
            None => Ok(None),
        }
    }

    /// Whole document as JSON
    fn to_json(&self) -> serde_json::Value {
        // The root map always exists
        self.op_set().to_json(&ROOT).unwrap_or_default()
    }

    /// One object as JSON
    fn object_to_json(&self, obj: &ObjId) -> Result<serde_json::Value> {
        self.op_set().to_json(obj)
    }
}

/// Reinterpret a numeric path segment as a map key when addressing a map
pub(crate) fn adapt_prop(op_set: &OpSet, obj: &ObjId, prop: &Prop) -> Result<Prop> {
    Ok(match (prop, op_set.object_type(obj)?) {
        (Prop::Seq(index), ObjType::Map) => Prop::Map(index.to_string()),
        (prop, _) => prop.clone(),
    })
}
