//! WASM bindings for Convergent
//!
//! This module provides JavaScript-friendly bindings for the document engine.
//! Values cross the boundary as JSON strings and locations as `/`-separated
//! paths such as `cards/0/done`.

pub mod bindings;
pub mod utils;

// Re-export main types
pub use bindings::{WasmDocument, WasmVectorClock};
