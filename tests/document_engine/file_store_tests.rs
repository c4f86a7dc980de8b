//! Persistence Tests
//!
//! JSON file store, config file and collection import through the engine.

use crate::test_utils::*;
use docpath::{DocumentStore, EngineConfig, JsonFileStore, KeyValue};
use tempfile::TempDir;

#[test]
fn test_engine_round_trip_through_disk() {
    let dir = TempDir::new().unwrap();
    let id = {
        let engine = DocumentEngine::open(dir.path()).unwrap();
        let id = engine
            .mutation()
            .insert_document(&admin(), patient_record())
            .unwrap();
        engine
            .mutation()
            .add_key(&admin(), &id, &path("Medical_Record"), "Ward", KeyValue::Scalar(json!("B")))
            .unwrap();
        engine
            .mutation()
            .delete_at(&admin(), &id, &path("Medical_Record.Diagnostics"), "0")
            .unwrap();
        id
    };

    let engine = DocumentEngine::open(dir.path()).unwrap();
    assert_eq!(value_at(&engine, &id, "Medical_Record.Ward"), json!("B"));
    assert_eq!(
        value_at(&engine, &id, "Medical_Record.Diagnostics.0.code"),
        json!("E11")
    );
}

#[test]
fn test_config_points_at_data_file() {
    let dir = TempDir::new().unwrap();
    let config = EngineConfig {
        data_file: "patients.json".to_string(),
        ..EngineConfig::default()
    };
    config.write_to_file(&dir.path().join("docpath.toml")).unwrap();

    let engine = DocumentEngine::open(dir.path()).unwrap();
    engine
        .mutation()
        .insert_document(&admin(), json!({"Name": "Amy"}))
        .unwrap();

    assert!(dir.path().join("patients.json").exists());
    assert!(!dir.path().join("data.json").exists());
}

#[test]
fn test_import_replaces_collection_on_disk() {
    let dir = TempDir::new().unwrap();
    let seed = dir.path().join("seed.json");
    std::fs::write(
        &seed,
        serde_json::to_string(&json!([patient_record(), {"Name": "Rory"}])).unwrap(),
    )
    .unwrap();

    let engine = DocumentEngine::open(dir.path()).unwrap();
    engine
        .mutation()
        .insert_document(&admin(), json!({"stale": true}))
        .unwrap();
    assert_eq!(engine.import(&admin(), &seed).unwrap(), 2);

    let store = JsonFileStore::open(dir.path().join("data.json")).unwrap();
    assert_eq!(store.count().unwrap(), 2);
    assert_eq!(engine.query().nth(1).unwrap().value, json!({"Name": "Rory"}));
}

#[test]
fn test_hand_edited_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("data.json"),
        r#"[{"Name": "Amy", "Tags": ["a"]}, "junk", {"Name": "Bob"}]"#,
    )
    .unwrap();

    let engine = DocumentEngine::open(dir.path()).unwrap();
    let docs = engine.query().list(None, None).unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(engine.query().columns().unwrap(), vec!["Name", "Tags"]);
}
