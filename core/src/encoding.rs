//! Encoding layer - persist documents as their change log
//!
//! A saved document is a versioned JSON object holding every change in
//! application order. Loading replays the changes, so the loaded document
//! has the same history, heads and visible state as the saved one. Change
//! hashes are recomputed on load and tampered changes are rejected.

use crate::change::Change;
use crate::config::InitOptions;
use crate::document::Document;
use crate::error::{DocError, Result};
use crate::ActorId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Current on-disk format version
pub const FORMAT_VERSION: u32 = 1;

/// Serialized form of a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedDocument {
    pub version: u32,
    pub changes: Vec<Change>,
}

impl Document {
    /// Encode the full change log
    pub fn save(&self) -> Result<Vec<u8>> {
        let saved = SavedDocument {
            version: FORMAT_VERSION,
            changes: self.changes().iter().map(|c| (**c).clone()).collect(),
        };
        let bytes = serde_json::to_vec(&saved)?;
        tracing::debug!(changes = saved.changes.len(), bytes = bytes.len(), "Saved document");
        Ok(bytes)
    }

    /// Decode a saved document under a fresh random actor
    pub fn load(bytes: &[u8]) -> Result<Document> {
        Self::load_with_options(bytes, InitOptions::default())
    }

    /// Decode a saved document, attributing future changes to `actor`
    pub fn load_with_actor(bytes: &[u8], actor: impl Into<ActorId>) -> Result<Document> {
        Self::load_with_options(bytes, InitOptions::new().with_actor(actor))
    }

    pub fn load_with_options(bytes: &[u8], options: InitOptions) -> Result<Document> {
        // Check the version before committing to a layout
        let raw: serde_json::Value = serde_json::from_slice(bytes)?;
        let version = raw
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0);
        if version != u64::from(FORMAT_VERSION) {
            return Err(DocError::UnsupportedVersion(
                u32::try_from(version).unwrap_or(u32::MAX),
            ));
        }

        let saved: SavedDocument = serde_json::from_value(raw)?;
        let mut doc = Document::with_options(options);
        let count = saved.changes.len();
        doc.apply_in_place(saved.changes.into_iter().map(Arc::new))?;

        tracing::debug!(actor = %doc.actor(), changes = count, "Loaded document");
        Ok(doc)
    }
}
