//! Mutation Invariants
//!
//! **Invariant**: appends grow an array by exactly one at the end; deletes by
//! index shrink it by exactly one and shift later elements down.

use crate::test_utils::*;
use docpath::{AddOutcome, DeleteOutcome, EngineConfig, KeyValue, MutationEngine};
use docpath::{DocumentStore, InMemoryStore};
use proptest::prelude::*;
use std::sync::Arc;

// =============================================================================
// Append
// =============================================================================

#[test]
fn test_append_composite_row_from_form() {
    let (engine, id) = setup_doc(patient_record());
    let fields = [
        ("code", "Z99"),
        ("date", "2024-06-30"),
        ("detail.severity", "high"),
        ("codes", "['a', 'b']"),
        ("notes", ""),
    ];

    let outcome = engine
        .mutation()
        .add_any(&admin(), &id, &path("Medical_Record.Diagnostics"), &fields)
        .unwrap();
    assert_eq!(outcome, AddOutcome::Appended(4));

    let rows = array_at(&engine, &id, "Medical_Record.Diagnostics");
    assert_eq!(
        rows[3],
        json!({
            "code": "Z99",
            "date": "2024-06-30",
            "detail": {"severity": "high"},
            "codes": ["a", "b"]
        })
    );
}

#[test]
fn test_append_to_scalar_is_mismatch() {
    let (engine, id) = setup_doc(patient_record());
    let err = engine
        .mutation()
        .append_item(&admin(), &id, &path("Medical_Record.Blood_Type"), json!("x"))
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { expected: "array", found: "string", .. }));
}

// =============================================================================
// AddKey
// =============================================================================

#[test]
fn test_add_key_then_nest() {
    let (engine, id) = setup_doc(patient_record());
    let m = engine.mutation();
    m.add_key(&admin(), &id, &path("Medical_Record"), "Vitals", KeyValue::EmptyObject)
        .unwrap();
    m.add_key(&admin(), &id, &path("Medical_Record.Vitals"), "pulse", KeyValue::Scalar(json!(61)))
        .unwrap();
    assert_eq!(value_at(&engine, &id, "Medical_Record.Vitals"), json!({"pulse": 61}));
}

#[test]
fn test_add_key_routes_arrays_elsewhere() {
    let (engine, id) = setup_doc(patient_record());
    let err = engine
        .mutation()
        .add_key(&admin(), &id, &path("Medical_Record.Allergies"), "k", KeyValue::Scalar(json!(1)))
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));

    // The add form on the same path appends instead.
    let outcome = engine
        .mutation()
        .add_any(&admin(), &id, &path("Medical_Record.Allergies"), &[("new_item", "Dust")])
        .unwrap();
    assert_eq!(outcome, AddOutcome::Appended(4));
}

// =============================================================================
// AddColumn
// =============================================================================

#[test]
fn test_add_column_touches_every_row() {
    let (engine, id) = setup_doc(patient_record());
    let changed = engine
        .mutation()
        .add_column(&admin(), &id, &path("Medical_Record.Diagnostics"), "status", json!("open"))
        .unwrap();
    assert_eq!(changed, 3);
    for row in array_at(&engine, &id, "Medical_Record.Diagnostics") {
        assert_eq!(row["status"], json!("open"));
    }
}

// =============================================================================
// DeleteAt
// =============================================================================

#[test]
fn test_delete_key() {
    let (engine, id) = setup_doc(patient_record());
    let outcome = engine
        .mutation()
        .delete_at(&admin(), &id, &path("Medical_Record"), "Blood_Type")
        .unwrap();
    assert_eq!(outcome, DeleteOutcome::Removed(json!("O-")));
    assert!(engine
        .query()
        .resolve(&id, &path("Medical_Record.Blood_Type"))
        .is_err());
}

#[test]
fn test_delete_missing_path() {
    let (engine, id) = setup_doc(patient_record());
    assert!(matches!(
        engine.mutation().delete_at(&admin(), &id, &path("Nope"), "0"),
        Err(Error::PathNotFound { .. })
    ));
}

#[test]
fn test_mutations_fail_for_unknown_document() {
    let engine = create_engine();
    let err = engine
        .mutation()
        .delete_at(&admin(), &DocumentId::new(), &DocPath::root(), "a")
        .unwrap_err();
    assert!(matches!(err, Error::DocumentNotFound { .. }));
}

#[test]
fn test_invalid_identifier_rejected_before_store() {
    let err = "row-7".parse::<DocumentId>().unwrap_err();
    assert!(matches!(err, Error::IdentifierInvalid(_)));
    assert!(!err.is_retryable());
}

// =============================================================================
// Properties
// =============================================================================

fn engine_with_array(items: Vec<i64>) -> (MutationEngine, Arc<InMemoryStore>, DocumentId) {
    let store = Arc::new(InMemoryStore::new());
    let id = store.insert(json!({ "items": items })).unwrap();
    (MutationEngine::new(store.clone(), EngineConfig::default()), store, id)
}

fn items_of(store: &InMemoryStore, id: &DocumentId) -> Vec<Value> {
    let doc = store.find_by_id(id).unwrap().unwrap();
    doc.value["items"].as_array().cloned().unwrap_or_default()
}

proptest! {
    #[test]
    fn test_append_invariant(
        items in prop::collection::vec(any::<i64>(), 0..12),
        item in any::<i64>()
    ) {
        let (engine, store, id) = engine_with_array(items.clone());
        let before = items_of(&store, &id);

        let len = engine.append_item(&admin(), &id, &path("items"), json!(item)).unwrap();

        let after = items_of(&store, &id);
        prop_assert_eq!(len, before.len() + 1);
        prop_assert_eq!(after.len(), before.len() + 1);
        prop_assert_eq!(&after[..before.len()], &before[..]);
        prop_assert_eq!(after.last(), Some(&json!(item)));
    }

    #[test]
    fn test_delete_by_index_invariant(
        items in prop::collection::vec(any::<i64>(), 1..12),
        pick in any::<prop::sample::Index>()
    ) {
        let (engine, store, id) = engine_with_array(items.clone());
        let before = items_of(&store, &id);
        let i = pick.index(before.len());

        let outcome = engine.delete_at(&admin(), &id, &path("items"), &i.to_string()).unwrap();

        let after = items_of(&store, &id);
        prop_assert_eq!(outcome, DeleteOutcome::Removed(before[i].clone()));
        prop_assert_eq!(after.len(), before.len() - 1);
        prop_assert_eq!(&after[..i], &before[..i]);
        prop_assert_eq!(&after[i..], &before[i + 1..]);
    }
}
