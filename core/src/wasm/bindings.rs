//! JavaScript bindings for Convergent core types

use super::utils::{parse_json, to_js_error};
use crate::document::Document;
use crate::error::Result as DocResult;
use crate::history::HistoryEntry;
use crate::path::Path;
use crate::read::ReadDoc;
use crate::sync::VectorClock;
use crate::transaction::Transaction;
use wasm_bindgen::prelude::*;

/// JavaScript-friendly wrapper for Document
///
/// Each `change*` method records one change and replaces the wrapped
/// document with the result.
#[wasm_bindgen]
pub struct WasmDocument {
    inner: Document,
}

#[wasm_bindgen]
impl WasmDocument {
    /// Create an empty document with a random actor
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: Document::new(),
        }
    }

    /// Create an empty document attributed to `actor`
    #[wasm_bindgen(js_name = withActor)]
    pub fn with_actor(actor: String) -> Self {
        Self {
            inner: Document::with_actor(actor),
        }
    }

    /// Get the actor id
    #[wasm_bindgen(js_name = getActor)]
    pub fn get_actor(&self) -> String {
        self.inner.actor().clone()
    }

    /// Set the value at `path` (pass JSON string for value)
    #[wasm_bindgen(js_name = changePut)]
    pub fn change_put(&mut self, message: String, path: String, value_json: String) -> Result<(), JsValue> {
        let value = parse_json(&value_json)?;
        self.apply(message, |tx| {
            let (obj, prop) = tx.resolve_path(&Path::parse(&path))?;
            tx.put_json(&obj, prop, &value)
        })
    }

    /// Insert into the list at `path` before `index`
    #[wasm_bindgen(js_name = changeInsert)]
    pub fn change_insert(
        &mut self,
        message: String,
        path: String,
        index: usize,
        value_json: String,
    ) -> Result<(), JsValue> {
        let value = parse_json(&value_json)?;
        self.apply(message, |tx| {
            let list = tx.object_at(&Path::parse(&path))?;
            tx.insert_json(&list, index, &value)
        })
    }

    /// Delete the map key or list element at `path`
    #[wasm_bindgen(js_name = changeDelete)]
    pub fn change_delete(&mut self, message: String, path: String) -> Result<(), JsValue> {
        self.apply(message, |tx| {
            let (obj, prop) = tx.resolve_path(&Path::parse(&path))?;
            tx.delete(&obj, prop)
        })
    }

    /// Add `by` to the counter at `path`
    #[wasm_bindgen(js_name = changeIncrement)]
    pub fn change_increment(&mut self, message: String, path: String, by: i64) -> Result<(), JsValue> {
        self.apply(message, |tx| {
            let (obj, prop) = tx.resolve_path(&Path::parse(&path))?;
            tx.increment(&obj, prop, by)
        })
    }

    /// Get the value at `path` (returns JSON string)
    #[wasm_bindgen(js_name = get)]
    pub fn get(&self, path: String) -> Result<Option<String>, JsValue> {
        let json = self
            .inner
            .get_path_json(&Path::parse(&path))
            .map_err(to_js_error)?;
        json.map(|value| serde_json::to_string(&value))
            .transpose()
            .map_err(|e| to_js_error(e.into()))
    }

    /// Export document as JSON string
    #[wasm_bindgen(js_name = toJSON)]
    pub fn to_json(&self) -> String {
        self.inner.to_json().to_string()
    }

    /// Merge another document into this one
    #[wasm_bindgen(js_name = merge)]
    pub fn merge(&mut self, other: &WasmDocument) -> Result<(), JsValue> {
        self.inner = self.inner.merge(&other.inner).map_err(to_js_error)?;
        Ok(())
    }

    /// Change history as a JSON array of `{hash, actor, seq, time, message, snapshot}`
    #[wasm_bindgen(js_name = history)]
    pub fn history(&self) -> Result<String, JsValue> {
        let entries: Vec<serde_json::Value> = self
            .inner
            .get_history()
            .map_err(to_js_error)?
            .iter()
            .map(HistoryEntry::to_summary_json)
            .collect();
        Ok(serde_json::Value::Array(entries).to_string())
    }

    /// Current heads as hex strings
    #[wasm_bindgen(js_name = heads)]
    pub fn heads(&self) -> Vec<String> {
        self.inner.heads().iter().map(|h| h.to_string()).collect()
    }

    /// Encode the document
    #[wasm_bindgen(js_name = save)]
    pub fn save(&self) -> Result<Vec<u8>, JsValue> {
        self.inner.save().map_err(to_js_error)
    }

    /// Decode a document produced by `save`
    #[wasm_bindgen(js_name = load)]
    pub fn load(bytes: &[u8], actor: Option<String>) -> Result<WasmDocument, JsValue> {
        let inner = match actor {
            Some(actor) => Document::load_with_actor(bytes, actor),
            None => Document::load(bytes),
        }
        .map_err(to_js_error)?;
        Ok(Self { inner })
    }

    /// Per-actor applied sequence numbers
    #[wasm_bindgen(js_name = vectorClock)]
    pub fn vector_clock(&self) -> WasmVectorClock {
        WasmVectorClock {
            inner: self.inner.vector_clock().clone(),
        }
    }
}

impl Default for WasmDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl WasmDocument {
    fn apply<F>(&mut self, message: String, f: F) -> Result<(), JsValue>
    where
        F: FnOnce(&mut Transaction<'_>) -> DocResult<()>,
    {
        self.inner = self.inner.change(message, f).map_err(to_js_error)?;
        Ok(())
    }
}

/// JavaScript-friendly wrapper for VectorClock
#[wasm_bindgen]
pub struct WasmVectorClock {
    inner: VectorClock,
}

impl Default for WasmVectorClock {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WasmVectorClock {
    /// Create a new empty vector clock
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: VectorClock::new(),
        }
    }

    /// Highest applied sequence number for an actor
    #[wasm_bindgen(js_name = get)]
    pub fn get(&self, actor: String) -> u64 {
        self.inner.get(&actor)
    }

    /// Whether this clock covers every entry of `other`
    #[wasm_bindgen(js_name = includes)]
    pub fn includes(&self, other: &WasmVectorClock) -> bool {
        self.inner.includes(&other.inner)
    }

    /// Merge another vector clock into this one
    #[wasm_bindgen(js_name = merge)]
    pub fn merge(&mut self, other: &WasmVectorClock) {
        self.inner.merge(&other.inner);
    }

    /// Export as JSON object of actor to sequence number
    #[wasm_bindgen(js_name = toJSON)]
    pub fn to_json(&self) -> String {
        let map: serde_json::Map<String, serde_json::Value> = self
            .inner
            .actors()
            .map(|actor| (actor.clone(), self.inner.get(actor).into()))
            .collect();
        serde_json::Value::Object(map).to_string()
    }
}
