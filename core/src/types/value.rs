//! Values stored in a document

use super::{ObjId, ObjType};
use serde::{Deserialize, Serialize};

/// A primitive value
///
/// Counters are special: concurrent increments add up instead of one
/// overwriting the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Int(i64),
    Uint(u64),
    F64(f64),
    Str(String),
    Counter(i64),
    /// Milliseconds since the unix epoch
    Timestamp(i64),
}

impl ScalarValue {
    /// Convert a JSON primitive into a scalar
    ///
    /// Returns `None` for arrays and objects, which become nested CRDT objects.
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        use serde_json::Value as JsonValue;

        match json {
            JsonValue::Null => Some(ScalarValue::Null),
            JsonValue::Bool(b) => Some(ScalarValue::Boolean(*b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(ScalarValue::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Some(ScalarValue::Uint(u))
                } else {
                    n.as_f64().map(ScalarValue::F64)
                }
            }
            JsonValue::String(s) => Some(ScalarValue::Str(s.clone())),
            JsonValue::Array(_) | JsonValue::Object(_) => None,
        }
    }

    /// JSON representation (counters and timestamps become plain numbers)
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as JsonValue;

        match self {
            ScalarValue::Null => JsonValue::Null,
            ScalarValue::Boolean(b) => JsonValue::Bool(*b),
            ScalarValue::Int(i) => JsonValue::from(*i),
            ScalarValue::Uint(u) => JsonValue::from(*u),
            // Non-finite floats have no JSON form
            ScalarValue::F64(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            ScalarValue::Str(s) => JsonValue::String(s.clone()),
            ScalarValue::Counter(c) => JsonValue::from(*c),
            ScalarValue::Timestamp(t) => JsonValue::from(*t),
        }
    }

    /// Whether this value merges additively
    pub fn is_counter(&self) -> bool {
        matches!(self, ScalarValue::Counter(_))
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        ScalarValue::Boolean(b)
    }
}

impl From<i64> for ScalarValue {
    fn from(i: i64) -> Self {
        ScalarValue::Int(i)
    }
}

impl From<i32> for ScalarValue {
    fn from(i: i32) -> Self {
        ScalarValue::Int(i as i64)
    }
}

impl From<u64> for ScalarValue {
    fn from(u: u64) -> Self {
        ScalarValue::Uint(u)
    }
}

impl From<f64> for ScalarValue {
    fn from(f: f64) -> Self {
        ScalarValue::F64(f)
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::Str(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        ScalarValue::Str(s)
    }
}

impl From<()> for ScalarValue {
    fn from(_: ()) -> Self {
        ScalarValue::Null
    }
}

/// The value found at a property: a nested object or a scalar
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Object(ObjType, ObjId),
    Scalar(ScalarValue),
}

impl Value {
    /// Object id if this is a nested object
    pub fn obj_id(&self) -> Option<&ObjId> {
        match self {
            Value::Object(_, id) => Some(id),
            Value::Scalar(_) => None,
        }
    }

    /// Scalar if this is a primitive
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::Object(..) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(ScalarValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Scalar(ScalarValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Scalar(ScalarValue::Int(i))
            | Value::Scalar(ScalarValue::Counter(i))
            | Value::Scalar(ScalarValue::Timestamp(i)) => Some(*i),
            Value::Scalar(ScalarValue::Uint(u)) => i64::try_from(*u).ok(),
            _ => None,
        }
    }
}

impl From<ScalarValue> for Value {
    fn from(v: ScalarValue) -> Self {
        Value::Scalar(v)
    }
}
