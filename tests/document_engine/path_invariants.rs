//! Path Resolution Invariants
//!
//! **Invariant**: a segment is a key in an object and an index in an array,
//! decided against the value being traversed.

use crate::test_utils::*;
use docpath::{resolve, Segment};
use docpath_core::path::{require, set_at_path, unset_at_path};
use proptest::prelude::*;

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn test_same_token_is_key_or_index() {
    let doc = json!({"3": "key three", "list": ["a", "b", "c", "d"]});
    assert_eq!(resolve(&doc, &path("3")), Some(&json!("key three")));
    assert_eq!(resolve(&doc, &path("list.3")), Some(&json!("d")));
}

#[test]
fn test_empty_path_is_root() {
    let doc = patient_record();
    assert_eq!(resolve(&doc, &DocPath::root()), Some(&doc));
}

#[test]
fn test_no_partial_results() {
    let doc = patient_record();
    assert_eq!(resolve(&doc, &path("Medical_Record.Diagnostics.3.code")), None);
    assert_eq!(resolve(&doc, &path("Medical_Record.Blood_Type.0")), None);
    assert_eq!(resolve(&doc, &path("Medical_Record.Diagnostics.-1")), None);
    assert_eq!(resolve(&doc, &path("Medical_Record.Diagnostics.code")), None);
}

#[test]
fn test_require_reports_path() {
    let doc = patient_record();
    let err = require(&doc, &path("Medical_Record.Missing")).unwrap_err();
    assert_eq!(
        err,
        Error::PathNotFound {
            path: "Medical_Record.Missing".to_string()
        }
    );
}

#[test]
fn test_resolution_does_not_mutate() {
    let doc = patient_record();
    let before = doc.clone();
    let _ = resolve(&doc, &path("Medical_Record.Diagnostics.0.detail"));
    let _ = resolve(&doc, &path("nope.nothing"));
    assert_eq!(doc, before);
}

// =============================================================================
// Parent
// =============================================================================

#[test]
fn test_parent_navigation() {
    let p = path("Medical_Record.Diagnostics.0");
    let up = p.parent().unwrap();
    assert_eq!(up.to_string(), "Medical_Record.Diagnostics");
    assert_eq!(up.parent().unwrap().to_string(), "Medical_Record");
    assert_eq!(path("Medical_Record").parent(), None);
}

// =============================================================================
// In-place edits
// =============================================================================

#[test]
fn test_set_creates_intermediate_objects() {
    let mut doc = json!({});
    set_at_path(&mut doc, &path("a.b.c"), json!(1)).unwrap();
    assert_eq!(doc, json!({"a": {"b": {"c": 1}}}));
}

#[test]
fn test_set_through_leaf_is_mismatch() {
    let mut doc = json!({"a": "leaf"});
    assert!(matches!(
        set_at_path(&mut doc, &path("a.b"), json!(1)),
        Err(Error::TypeMismatch { .. })
    ));
    assert_eq!(doc, json!({"a": "leaf"}));
}

#[test]
fn test_unset_keeps_sibling_order() {
    let mut doc: Value = serde_json::from_str(r#"{"z": 1, "m": 2, "a": 3}"#).unwrap();
    unset_at_path(&mut doc, &path("m")).unwrap();
    let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["z", "a"]);
}

#[test]
fn test_dotted_keys_are_unaddressable() {
    let doc = json!({"a.b": 1});
    assert_eq!(resolve(&doc, &path("a.b")), None);
}

// =============================================================================
// Properties
// =============================================================================

fn segment_token() -> impl Strategy<Value = String> {
    prop_oneof!["[a-zA-Z_]{1,8}", "[0-9]{1,3}"]
}

proptest! {
    #[test]
    fn test_parent_symmetry(
        parent in prop::collection::vec(segment_token(), 1..6),
        last in segment_token()
    ) {
        let q = DocPath::from_segments(parent.into_iter().map(Segment::new).collect());
        let child = q.clone().child(last.as_str());
        prop_assert_eq!(child.parent(), Some(q));
    }

    #[test]
    fn test_path_string_round_trip(segments in prop::collection::vec(segment_token(), 0..6)) {
        let p = DocPath::from_segments(segments.into_iter().map(Segment::new).collect());
        let reparsed: DocPath = p.to_string().parse().unwrap();
        prop_assert_eq!(reparsed, p);
    }
}
