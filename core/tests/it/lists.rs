//! Concurrent list editing

use convergent_core::{DocError, ObjType, ReadDoc, ROOT};
use serde_json::json;

use crate::helpers::{doc, obj};

fn list_doc(items: &[&str]) -> convergent_core::Document {
    doc("base")
        .change("init", |tx| {
            let list = tx.put_object(&ROOT, "list", ObjType::List)?;
            for item in items {
                tx.push(&list, *item)?;
            }
            Ok(())
        })
        .unwrap()
}

#[test]
fn concurrent_inserts_at_same_position_keep_both() {
    let base = list_doc(&["a", "d"]);
    let left = base
        .fork_with_actor("left")
        .change("insert b", |tx| {
            let list = obj(tx, "list")?;
            tx.insert(&list, 1, "b")
        })
        .unwrap();
    let right = base
        .fork_with_actor("right")
        .change("insert c", |tx| {
            let list = obj(tx, "list")?;
            tx.insert(&list, 1, "c")
        })
        .unwrap();

    let lr = left.merge(&right).unwrap();
    let rl = right.merge(&left).unwrap();
    assert_eq!(lr.to_json(), rl.to_json());

    // Equal counters: the greater actor's element comes first
    assert_eq!(lr.to_json()["list"], json!(["a", "c", "b", "d"]));
}

#[test]
fn concurrent_runs_do_not_interleave() {
    let base = list_doc(&[]);
    let left = base
        .fork_with_actor("left")
        .change("left run", |tx| {
            let list = obj(tx, "list")?;
            for item in ["l1", "l2", "l3"] {
                tx.push(&list, item)?;
            }
            Ok(())
        })
        .unwrap();
    let right = base
        .fork_with_actor("right")
        .change("right run", |tx| {
            let list = obj(tx, "list")?;
            for item in ["r1", "r2"] {
                tx.push(&list, item)?;
            }
            Ok(())
        })
        .unwrap();

    let merged = left.merge(&right).unwrap();
    assert_eq!(
        merged.to_json()["list"],
        json!(["r1", "r2", "l1", "l2", "l3"])
    );
    assert_eq!(right.merge(&left).unwrap().to_json(), merged.to_json());
}

#[test]
fn concurrent_delete_of_same_element() {
    let base = list_doc(&["a", "b", "c"]);
    let delete_b = |actor: &str| {
        base.fork_with_actor(actor)
            .change("delete b", |tx| {
                let list = obj(tx, "list")?;
                tx.delete(&list, 1usize)
            })
            .unwrap()
    };

    let merged = delete_b("x").merge(&delete_b("y")).unwrap();
    assert_eq!(merged.to_json()["list"], json!(["a", "c"]));
}

#[test]
fn insert_after_concurrently_deleted_element() {
    let base = list_doc(&["a", "b"]);
    let deleted = base
        .fork_with_actor("x")
        .change("delete b", |tx| {
            let list = obj(tx, "list")?;
            tx.delete(&list, 1usize)
        })
        .unwrap();
    let appended = base
        .fork_with_actor("y")
        .change("append c", |tx| {
            let list = obj(tx, "list")?;
            tx.push(&list, "c")
        })
        .unwrap();

    let merged = deleted.merge(&appended).unwrap();
    assert_eq!(merged.to_json()["list"], json!(["a", "c"]));
}

#[test]
fn overwrite_list_element() {
    let d = list_doc(&["a", "b"])
        .change("replace", |tx| {
            let list = obj(tx, "list")?;
            tx.put(&list, 0usize, "z")
        })
        .unwrap();

    let list = obj(&d, "list").unwrap();
    assert_eq!(d.length(&list).unwrap(), 2);
    assert_eq!(d.to_json()["list"], json!(["z", "b"]));
}

#[test]
fn out_of_bounds_edits_fail() {
    let base = list_doc(&["a"]);
    let result = base.change("bad", |tx| {
        let list = obj(tx, "list")?;
        tx.insert(&list, 3, "x")
    });
    assert!(matches!(
        result,
        Err(DocError::IndexOutOfBounds { index: 3, length: 1 })
    ));

    let result = base.change("bad", |tx| {
        let list = obj(tx, "list")?;
        tx.delete(&list, 1usize)
    });
    assert!(matches!(result, Err(DocError::IndexOutOfBounds { .. })));
}
