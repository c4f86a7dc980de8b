//! Query and View Tests
//!
//! Top-level filters are pushed to the store; sub-path filters and sorts run
//! on the resolved value. All comparisons are on stringified values.

use crate::test_utils::*;
use docpath::{
    refine, Export, ExportFormat, FieldFilter, FieldType, Refine, SortBy, SortSpec, TextFilter,
    ViewContent,
};

fn seeded() -> (DocumentEngine, Vec<DocumentId>) {
    let engine = create_engine();
    let ids = [
        json!({"Name": "Amy Pond", "Ward": "B", "Age": 9}),
        json!({"Name": "Rory Williams", "Ward": "A", "Age": 10}),
        json!({"Name": "Clara Oswald", "Ward": "C", "Age": 2}),
    ]
    .into_iter()
    .map(|d| engine.mutation().insert_document(&admin(), d).unwrap())
    .collect();
    (engine, ids)
}

fn names(docs: &[docpath::Document]) -> Vec<String> {
    docs.iter()
        .map(|d| d.value["Name"].as_str().unwrap_or_default().to_string())
        .collect()
}

// =============================================================================
// Top level
// =============================================================================

#[test]
fn test_list_natural_order() {
    let (engine, _) = seeded();
    assert_eq!(
        names(&engine.query().list(None, None).unwrap()),
        vec!["Amy Pond", "Rory Williams", "Clara Oswald"]
    );
}

#[test]
fn test_list_substring_filter_is_case_insensitive() {
    let (engine, _) = seeded();
    let filter = FieldFilter::contains("Name", "O");
    assert_eq!(
        names(&engine.query().list(Some(&filter), None).unwrap()),
        vec!["Amy Pond", "Rory Williams", "Clara Oswald"]
    );
    let filter = FieldFilter::contains("Name", "will");
    assert_eq!(
        names(&engine.query().list(Some(&filter), None).unwrap()),
        vec!["Rory Williams"]
    );
}

#[test]
fn test_list_regex_filter() {
    let (engine, _) = seeded();
    let filter = FieldFilter::regex("Ward", "^[ab]$");
    assert_eq!(
        names(&engine.query().list(Some(&filter), None).unwrap()),
        vec!["Amy Pond", "Rory Williams"]
    );
    let bad = FieldFilter::regex("Ward", "[");
    assert!(matches!(engine.query().list(Some(&bad), None), Err(Error::InvalidInput(_))));
}

#[test]
fn test_list_sort_is_textual() {
    let (engine, _) = seeded();
    let sort = SortSpec::field("Age");
    assert_eq!(
        names(&engine.query().list(None, Some(&sort)).unwrap()),
        vec!["Rory Williams", "Clara Oswald", "Amy Pond"]
    );
    let sort = SortSpec::field("Ward").descending();
    assert_eq!(
        names(&engine.query().list(None, Some(&sort)).unwrap()),
        vec!["Clara Oswald", "Amy Pond", "Rory Williams"]
    );
}

#[test]
fn test_nth_addresses_by_position() {
    let (engine, ids) = seeded();
    assert_eq!(engine.query().nth(2).unwrap().id, ids[2]);
    assert!(engine.query().nth(3).unwrap_err().is_not_found());
}

// =============================================================================
// Sub-path
// =============================================================================

#[test]
fn test_filter_example() {
    let value = json!([{"name": "Amy"}, {"name": "Bob"}]);
    let spec = Refine {
        filter: Some(TextFilter::in_field("name", "am")),
        sort: None,
    };
    assert_eq!(refine(&value, &spec), json!([{"name": "Amy"}]));
}

#[test]
fn test_refine_sub_path() {
    let (engine, id) = setup_doc(patient_record());
    let spec = Refine {
        filter: Some(TextFilter::in_field("date", "2024")),
        sort: Some(SortSpec::field("date")),
    };
    let value = engine
        .query()
        .refine(&id, &path("Medical_Record.Diagnostics"), &spec)
        .unwrap();
    let codes: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["J45", "K21"]);
}

#[test]
fn test_refine_object_entries() {
    let (engine, id) = setup_doc(patient_record());
    let spec = Refine {
        filter: Some(TextFilter::anywhere("blood")),
        sort: Some(SortSpec::by(SortBy::Key)),
    };
    let value = engine.query().refine(&id, &path("Medical_Record"), &spec).unwrap();
    assert_eq!(value, json!({"Blood_Type": "O-"}));
}

// =============================================================================
// Views and exports
// =============================================================================

#[test]
fn test_detail_view_of_table() {
    let (engine, id) = setup_doc(patient_record());
    let view = engine
        .query()
        .view(&id, &path("Medical_Record.Diagnostics"), &Refine::none())
        .unwrap();
    assert_eq!(view.title, "Diagnostics");
    assert_eq!(view.parent_path.as_deref(), Some("Medical_Record"));
    let ViewContent::Table(table) = view.content else {
        panic!("expected a table");
    };
    assert_eq!(table.columns, vec!["code", "date", "detail.severity", "notes"]);
    assert_eq!(table.rows.len(), 3);
}

#[test]
fn test_detail_view_of_scalar_list() {
    let (engine, id) = setup_doc(patient_record());
    let spec = Refine {
        filter: None,
        sort: Some(SortSpec::by(SortBy::Value)),
    };
    let view = engine
        .query()
        .view(&id, &path("Medical_Record.Allergies"), &spec)
        .unwrap();
    assert_eq!(view.kind, FieldType::List);
    assert_eq!(
        view.content,
        ViewContent::Raw(json!(["Latex", "Pollen", "penicillin"]))
    );
}

#[test]
fn test_index_columns_and_types() {
    let (engine, _) = setup_doc(patient_record());
    assert_eq!(
        engine.query().columns().unwrap(),
        vec!["Name", "Patient_ID", "Medical_Record"]
    );
    let types = engine.query().field_types().unwrap();
    assert_eq!(types[2], ("Medical_Record".to_string(), FieldType::Dict));
}

#[test]
fn test_tabular_export_omits_missing_columns() {
    let (engine, id) = setup_doc(patient_record());
    let export = engine
        .query()
        .export_path(
            &id,
            &path("Medical_Record.Diagnostics"),
            &Refine::none(),
            ExportFormat::Tabular,
        )
        .unwrap();
    let Export::Tabular(table) = export else {
        panic!("expected tabular export");
    };
    assert_eq!(table.rows[1].get("notes"), None);
    assert_eq!(table.rows[2].get("notes"), Some(&json!("seasonal")));
}

#[test]
fn test_structured_collection_export_embeds_ids() {
    let (engine, ids) = seeded();
    let Export::Structured(Value::Array(records)) = engine
        .query()
        .export_collection(None, None, ExportFormat::Structured)
        .unwrap()
    else {
        panic!("expected structured array export");
    };
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["_id"], json!(ids[0].to_string()));
}
