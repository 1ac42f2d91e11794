//! Exchanging changes between replicas and persistence

use std::sync::Arc;

use convergent_core::{Change, DocError, Document, ReadDoc, ROOT};
use serde_json::json;

use crate::helpers::{board, doc, obj, state};

#[test]
fn changes_since_heads_bring_peer_up_to_date() {
    let laptop = board("laptop");
    let phone = doc("phone").merge(&laptop).unwrap();

    let laptop = laptop
        .change("Mark card as done", |tx| {
            let card = obj(tx, "cards/0")?;
            tx.put(&card, "done", true)
        })
        .unwrap();

    let missing = laptop.get_changes(&phone.heads());
    assert_eq!(missing.len(), 1);

    let phone = phone.apply_changes(missing).unwrap();
    assert_eq!(phone.to_json(), laptop.to_json());
    assert_eq!(phone.heads(), laptop.heads());
}

#[test]
fn applying_known_changes_is_a_noop() {
    let d = board("a");
    let again = d.apply_changes(d.changes().to_vec()).unwrap();
    assert_eq!(state(&again), state(&d));
    assert_eq!(again.history_len(), d.history_len());
}

#[test]
fn missing_dependency_is_reported() {
    let d = board("a")
        .change("second", |tx| tx.put(&ROOT, "x", 1))
        .unwrap();
    let tail: Vec<Arc<Change>> = d.changes()[1..].to_vec();

    let result = doc("b").apply_changes(tail);
    assert!(matches!(result, Err(DocError::MissingDependencies { .. })));
    assert_eq!(doc("b").get_missing_deps(&d.heads()), d.heads());
}

#[test]
fn save_and_load_keep_state_and_history() {
    let d = board("a")
        .change("Count", |tx| {
            tx.put(&ROOT, "views", convergent_core::ScalarValue::Counter(1))?;
            tx.increment(&ROOT, "views", 2)
        })
        .unwrap();

    let loaded = Document::load(&d.save().unwrap()).unwrap();
    assert_eq!(state(&loaded), state(&d));
    assert_eq!(loaded.get(&ROOT, "views").unwrap().unwrap().as_i64(), Some(3));

    let messages: Vec<_> = loaded
        .get_history()
        .unwrap()
        .iter()
        .map(|e| e.message().unwrap().to_string())
        .collect();
    assert_eq!(messages, vec!["Add card", "Count"]);
}

#[test]
fn loaded_document_merges_with_saved_source() {
    let d = board("a");
    let loaded = Document::load_with_actor(&d.save().unwrap(), "b").unwrap();
    let edited = loaded
        .change("Delete card", |tx| {
            let cards = obj(tx, "cards")?;
            tx.delete(&cards, 0usize)
        })
        .unwrap();

    let merged = d.merge(&edited).unwrap();
    assert_eq!(
        merged.to_json()["cards"],
        json!([{"title": "Rewrite everything in Haskell", "done": false}])
    );
}

#[test]
fn change_serializes_with_hex_hash() {
    let d = board("a");
    let change = &d.changes()[0];
    let value = serde_json::to_value(change.as_ref()).unwrap();

    assert_eq!(value["hash"], json!(change.hash().to_string()));
    assert_eq!(value["message"], json!("Add card"));

    let decoded: Change = serde_json::from_value(value).unwrap();
    assert_eq!(decoded.hash(), change.hash());
}
