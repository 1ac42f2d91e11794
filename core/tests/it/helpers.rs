use std::sync::Arc;

use convergent_core::{
    time::FixedClock, Document, InitOptions, ObjId, ObjType, Path, ReadDoc, Result, ROOT,
};
use serde_json::json;

/// Empty document with a fixed actor and deterministic timestamps
pub fn doc(actor: &str) -> Document {
    Document::with_options(
        InitOptions::new()
            .with_actor(actor)
            .with_clock(Arc::new(FixedClock::new(1_700_000_000_000))),
    )
}

/// Object at a `/`-separated path
pub fn obj(doc: &impl ReadDoc, path: &str) -> Result<ObjId> {
    doc.object_at(&Path::parse(path))
}

/// Document holding the two quickstart cards
pub fn board(actor: &str) -> Document {
    doc(actor)
        .change("Add card", |tx| {
            let cards = tx.put_object(&ROOT, "cards", ObjType::List)?;
            tx.push_json(
                &cards,
                &json!({"title": "Rewrite everything in Clojure", "done": false}),
            )?;
            tx.push_json(
                &cards,
                &json!({"title": "Rewrite everything in Haskell", "done": false}),
            )
        })
        .unwrap()
}

/// Visible state and heads, for comparing replicas
pub fn state(doc: &Document) -> (serde_json::Value, Vec<convergent_core::ChangeHash>) {
    (doc.to_json(), doc.heads())
}
