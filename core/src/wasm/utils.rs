//! WASM utility functions

use crate::error::DocError;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in browser
#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Convert a document error into a JS exception value
pub(crate) fn to_js_error(err: DocError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Parse a JSON string argument
pub(crate) fn parse_json(json: &str) -> Result<serde_json::Value, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Invalid JSON: {}", e)))
}
