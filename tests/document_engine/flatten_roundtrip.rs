//! Flatten / Unflatten Round-Trip
//!
//! **Invariant**: re-nesting a flattened value reconstructs it, for keys
//! without `.` and non-empty containers.

use crate::test_utils::*;
use docpath::{
    flatten, infer_value, unflatten, unflatten_record, unflatten_with_report, ContainerPolicy,
    FlatRecord, Provenance, ValueExt,
};
use proptest::prelude::*;

// =============================================================================
// Examples
// =============================================================================

#[test]
fn test_flatten_example_order() {
    let flat = flatten(&json!({"a": {"b": 1, "c": [2, 3]}})).unwrap();
    let entries: Vec<(&str, &Value)> = flat.iter().collect();
    assert_eq!(
        entries,
        vec![("a.b", &json!(1)), ("a.c.0", &json!(2)), ("a.c.1", &json!(3))]
    );
}

#[test]
fn test_coercion_examples() {
    assert_eq!(
        unflatten([("patient.id", "42")]).unwrap(),
        json!({"patient": {"id": 42}})
    );
    assert_eq!(
        unflatten([("tags", "['x','y']")]).unwrap(),
        json!({"tags": ["x", "y"]})
    );
    assert_eq!(unflatten([("notes", "hello")]).unwrap(), json!({"notes": "hello"}));
}

#[test]
fn test_collision_later_structure_wins() {
    assert_eq!(
        unflatten([("a", "x"), ("a.b", "y")]).unwrap(),
        json!({"a": {"b": "y"}})
    );
}

#[test]
fn test_empty_fields_create_nothing() {
    assert_eq!(unflatten([("a", ""), ("b.c", "")]).unwrap(), json!({}));
}

#[test]
fn test_provenance_reports_each_branch() {
    let out = unflatten_with_report(
        [
            ("strict", r#"{"a": 1}"#),
            ("relaxed", "{'a': 1,}"),
            ("broken", "[not, valid"),
            ("odd", "[not valid]"),
            ("ID", "0042"),
        ],
        ContainerPolicy::RestoreArrays,
    )
    .unwrap();

    let provenance: Vec<Provenance> = out.report.iter().map(|r| r.provenance).collect();
    assert_eq!(
        provenance,
        vec![
            Provenance::ParsedAsStructured,
            Provenance::ParsedAsLiteral,
            Provenance::KeptAsString,
            Provenance::KeptAsString,
            Provenance::NumericId,
        ]
    );
    assert_eq!(out.value["odd"], json!("[not valid]"));
    assert_eq!(out.value["ID"], json!(42));
}

#[test]
fn test_id_rule_only_at_last_segment() {
    assert_eq!(
        unflatten([("id.name", "7")]).unwrap(),
        json!({"id": {"name": "7"}})
    );
    assert_eq!(unflatten([("id", "12a")]).unwrap(), json!({"id": "12a"}));
}

#[test]
fn test_non_contiguous_indices_degrade_to_object() {
    let mut record = FlatRecord::new();
    record.insert("items.0", json!("a"));
    record.insert("items.2", json!("c"));
    assert_eq!(
        unflatten_record(&record).unwrap(),
        json!({"items": {"0": "a", "2": "c"}})
    );
}

#[test]
fn test_objects_only_policy() {
    let out =
        unflatten_with_report([("l.0", "a"), ("l.1", "b")], ContainerPolicy::ObjectsOnly).unwrap();
    assert_eq!(out.value, json!({"l": {"0": "a", "1": "b"}}));
}

#[test]
fn test_bracketed_only_inference() {
    assert_eq!(infer_value("42").value, json!("42"));
    assert_eq!(infer_value("true").value, json!("true"));
    assert_eq!(infer_value("  [1, 2] ").value, json!([1, 2]));
}

// =============================================================================
// Properties
// =============================================================================

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z ]{1,8}".prop_map(Value::String),
    ]
}

fn key() -> impl Strategy<Value = String> {
    "[a-z_]{1,6}"
}

fn tree(leaves: BoxedStrategy<Value>) -> impl Strategy<Value = Value> {
    leaves.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(Value::Array),
            prop::collection::vec((key(), inner), 1..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect())),
        ]
    })
}

fn document(leaves: BoxedStrategy<Value>) -> impl Strategy<Value = Value> {
    prop::collection::vec((key(), tree(leaves)), 1..5)
        .prop_map(|entries| Value::Object(entries.into_iter().collect()))
}

proptest! {
    #[test]
    fn test_roundtrip_flatten_unflatten(doc in document(leaf().boxed())) {
        let flat = flatten(&doc).unwrap();
        prop_assert!(flat.iter().all(|(_, v)| v.is_leaf()));
        prop_assert_eq!(unflatten_record(&flat).unwrap(), doc);
    }

    #[test]
    fn test_roundtrip_through_form_fields(
        doc in document("[a-zA-Z ]{1,8}".prop_map(Value::String).boxed())
    ) {
        let fields = flatten(&doc).unwrap().to_form_fields();
        prop_assert_eq!(unflatten(fields).unwrap(), doc);
    }

    #[test]
    fn test_resolution_is_deterministic(
        doc in document(leaf().boxed()),
        pick in any::<prop::sample::Index>()
    ) {
        let flat = flatten(&doc).unwrap();
        let keys: Vec<&str> = flat.keys().collect();
        let key = keys[pick.index(keys.len())];
        let p = path(key);
        let first = docpath::resolve(&doc, &p).cloned();
        let second = docpath::resolve(&doc, &p).cloned();
        prop_assert_eq!(first.as_ref(), flat.get(key));
        prop_assert_eq!(first, second);
    }
}
