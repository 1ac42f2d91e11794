//! Path addressing and the JSON views behind the JavaScript bindings

use convergent_core::{DocError, ObjType, Path, Prop, ReadDoc, ScalarValue, ROOT};
use serde_json::json;

use crate::helpers::{board, doc, obj};

#[test]
fn resolve_path_into_list_item() {
    let d = board("a");
    let (parent, prop) = d.resolve_path(&Path::parse("cards/0/done")).unwrap();

    assert_eq!(parent, obj(&d, "cards/0").unwrap());
    assert_eq!(prop, Prop::Map("done".into()));
}

#[test]
fn numeric_segment_under_map_is_a_key() {
    let d = doc("a")
        .change("scores", |tx| {
            tx.put_object(&ROOT, "scores", ObjType::Map)?;
            Ok(())
        })
        .unwrap();
    let (parent, prop) = d.resolve_path(&Path::parse("scores/1")).unwrap();
    assert_eq!(parent, obj(&d, "scores").unwrap());
    assert_eq!(prop, Prop::Map("1".into()));

    let d = d
        .change("level one", |tx| {
            let (obj, prop) = tx.resolve_path(&Path::parse("scores/1"))?;
            tx.put(&obj, prop, 10)
        })
        .unwrap();
    assert_eq!(d.to_json(), json!({"scores": {"1": 10}}));
    assert_eq!(d.get_path_json(&Path::parse("scores/1")).unwrap(), Some(json!(10)));
}

#[test]
fn numeric_segment_under_list_is_an_index() {
    let d = board("a");
    let (parent, prop) = d.resolve_path(&Path::parse("cards/1")).unwrap();
    assert_eq!(parent, obj(&d, "cards").unwrap());
    assert_eq!(prop, Prop::Seq(1));
}

#[test]
fn resolve_path_rejects_root_and_missing_parents() {
    let d = board("a");
    assert!(matches!(
        d.resolve_path(&Path::parse("/")),
        Err(DocError::InvalidPath(_))
    ));
    assert!(matches!(
        d.resolve_path(&Path::parse("missing/x")),
        Err(DocError::InvalidPath(_))
    ));
    // Parent is a scalar
    assert!(matches!(
        d.resolve_path(&Path::parse("cards/0/done/x")),
        Err(DocError::InvalidPath(_))
    ));
}

#[test]
fn get_path_json_returns_objects_and_scalars() {
    let d = board("a");

    assert_eq!(
        d.get_path_json(&Path::parse("cards/1")).unwrap(),
        Some(json!({"title": "Rewrite everything in Haskell", "done": false}))
    );
    assert_eq!(
        d.get_path_json(&Path::parse("cards/0/done")).unwrap(),
        Some(json!(false))
    );
    assert_eq!(d.get_path_json(&Path::root()).unwrap(), Some(d.to_json()));
    assert_eq!(d.get_path_json(&Path::parse("cards/7")).unwrap(), None);
}

#[test]
fn history_summary_has_js_fields() {
    let d = board("a")
        .change("Mark card as done", |tx| {
            let (obj, prop) = tx.resolve_path(&Path::parse("cards/0/done"))?;
            tx.put(&obj, prop, true)
        })
        .unwrap();
    let history = d.get_history().unwrap();
    let summary = history[1].to_summary_json();

    assert_eq!(summary["hash"], json!(history[1].hash().to_string()));
    assert_eq!(summary["actor"], json!("a"));
    assert_eq!(summary["seq"], json!(2));
    assert!(summary["time"].is_i64());
    assert_eq!(summary["message"], json!("Mark card as done"));
    assert_eq!(summary["snapshot"]["cards"][0]["done"], json!(true));
    assert_eq!(summary["snapshot"], d.to_json());
}

#[test]
fn path_writes_reject_overflow_and_non_finite_floats() {
    let d = doc("a")
        .change("stats", |tx| {
            tx.put_json(&ROOT, "stats", &json!({}))?;
            let stats = tx.object_at(&Path::parse("stats"))?;
            tx.put(&stats, "hits", ScalarValue::Counter(i64::MAX - 1))
        })
        .unwrap();

    let overflow = d.change("bump", |tx| {
        let (obj, prop) = tx.resolve_path(&Path::parse("stats/hits"))?;
        tx.increment(&obj, prop, 5)
    });
    assert!(matches!(overflow, Err(DocError::CounterOverflow { .. })));

    let nan = d.change("ratio", |tx| {
        let (obj, prop) = tx.resolve_path(&Path::parse("stats/ratio"))?;
        tx.put(&obj, prop, f64::NAN)
    });
    assert!(matches!(nan, Err(DocError::NonFiniteFloat(_))));

    // The rejected changes left nothing behind
    assert_eq!(d.history_len(), 1);
    assert_eq!(
        d.get_path_json(&Path::parse("stats/hits")).unwrap(),
        Some(json!(i64::MAX - 1))
    );
    let reloaded = convergent_core::Document::load(&d.save().unwrap()).unwrap();
    assert_eq!(reloaded.to_json(), d.to_json());
}
