//! The two-replica card board walkthrough

use convergent_core::{change, get_history, init, merge, ReadDoc, ROOT};
use serde_json::json;

use crate::helpers::{board, doc, obj};

#[test]
fn merge_into_fresh_document_copies_cards() {
    let doc1 = board("laptop");
    let doc2 = merge(&init(), &doc1).unwrap();

    assert_eq!(doc2.to_json()["cards"], doc1.to_json()["cards"]);
    assert_ne!(doc2.actor(), doc1.actor());
}

#[test]
fn done_and_delete_on_separate_replicas_converge() {
    let doc1 = board("laptop");
    let doc2 = merge(&doc("phone"), &doc1).unwrap();

    let doc1 = change(&doc1, "Mark card as done", |tx| {
        let card = obj(tx, "cards/0")?;
        tx.put(&card, "done", true)
    })
    .unwrap();

    let doc2 = change(&doc2, "Delete card", |tx| {
        let cards = obj(tx, "cards")?;
        tx.delete(&cards, 1usize)
    })
    .unwrap();

    let final_doc = merge(&doc1, &doc2).unwrap();
    let expected = json!([{"title": "Rewrite everything in Clojure", "done": true}]);
    assert_eq!(final_doc.to_json()["cards"], expected);

    // Either merge direction gives the same board
    assert_eq!(merge(&doc2, &doc1).unwrap().to_json(), final_doc.to_json());
}

#[test]
fn history_of_final_document() {
    let doc1 = board("laptop");
    let doc2 = merge(&doc("phone"), &doc1).unwrap();
    let doc1 = change(&doc1, "Mark card as done", |tx| {
        let card = obj(tx, "cards/0")?;
        tx.put(&card, "done", true)
    })
    .unwrap();
    let doc2 = change(&doc2, "Delete card", |tx| {
        let cards = obj(tx, "cards")?;
        tx.delete(&cards, 1usize)
    })
    .unwrap();
    let final_doc = merge(&doc1, &doc2).unwrap();

    let history = get_history(&final_doc).unwrap();
    let summary: Vec<(&str, usize)> = history
        .iter()
        .map(|entry| {
            let cards = obj(entry, "cards").unwrap();
            (entry.message().unwrap(), entry.length(&cards).unwrap())
        })
        .collect();

    assert_eq!(
        summary,
        vec![("Add card", 2), ("Mark card as done", 2), ("Delete card", 1)]
    );

    // The last snapshot is the final document
    assert_eq!(history[2].snapshot.to_json(), final_doc.to_json());
    assert!(history[0].get(&ROOT, "cards").unwrap().is_some());
}

#[test]
fn concurrent_done_edits_agree() {
    let doc1 = board("laptop");
    let doc2 = merge(&doc("phone"), &doc1).unwrap();

    let doc1 = change(&doc1, "Mark done", |tx| {
        let card = obj(tx, "cards/1")?;
        tx.put(&card, "done", true)
    })
    .unwrap();
    let doc2 = change(&doc2, "Mark not done", |tx| {
        let card = obj(tx, "cards/1")?;
        tx.put(&card, "done", false)
    })
    .unwrap();

    let a = merge(&doc1, &doc2).unwrap();
    let b = merge(&doc2, &doc1).unwrap();
    assert_eq!(a.to_json(), b.to_json());

    // Equal counters, so the greater actor id wins
    let card = obj(&a, "cards/1").unwrap();
    assert_eq!(a.get(&card, "done").unwrap().unwrap().as_bool(), Some(false));
    assert_eq!(a.get_all(&card, "done").unwrap().len(), 2);
}
