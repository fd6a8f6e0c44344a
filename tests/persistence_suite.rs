mod common;

use std::{
    fs,
    path::{Path, PathBuf},
};

use assert_fs::prelude::*;
use assert_fs::TempDir as FixtureDir;
use chrono::Duration;
use quanto_custa::{
    core::errors::CoreError,
    domain::{DecisionAction, PurchaseContext, RecordId, CURRENT_SCHEMA_VERSION},
    storage::{export_file_name, write_export, JsonStorage, StorageBackend},
};

use common::{reopen, setup_file_store, start_time};

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.tmp", existing),
        None => String::from("tmp"),
    };
    tmp.set_extension(ext);
    tmp
}

#[test]
fn decisions_survive_a_restart() {
    let (mut store, clock, base) = setup_file_store();
    store.update_profile(3520.0, 176.0).unwrap();
    let context = PurchaseContext::new(Some("Headphones"), Some("Electronics"), Some(8)).unwrap();
    store
        .record_decision(400.0, DecisionAction::Skip, context)
        .unwrap();
    store
        .add_quarantine_item(150.0, Duration::hours(24), PurchaseContext::default())
        .unwrap();

    let reopened = reopen(&base, &clock);
    let state = reopened.state();
    assert!(reopened.load_warning().is_none());
    assert_eq!(state.profile.hourly_rate(), 20.0);
    assert_eq!(state.decisions.len(), 1);
    assert_eq!(state.decisions[0].hours_equivalent, 20.0);
    assert_eq!(
        state.decisions[0].context.description.as_deref(),
        Some("Headphones")
    );
    assert_eq!(state.quarantine.len(), 1);
    assert_eq!(state.quarantine[0].target_time, start_time() + Duration::hours(24));
}

#[test]
fn atomic_save_failure_preserves_original_file() {
    let (mut store, _clock, base) = setup_file_store();
    store.update_profile(2000.0, 160.0).unwrap();
    let state_path = base.join("state.json");
    let original = fs::read_to_string(&state_path).expect("read original file");

    // A directory at the temp path makes File::create fail.
    fs::create_dir_all(tmp_path_for(&state_path)).unwrap();

    let result = store.record_decision(99.0, DecisionAction::Buy, PurchaseContext::default());
    assert!(
        matches!(result, Err(CoreError::Storage(_))),
        "expected the save to fail when the temp path is a directory"
    );
    assert!(
        store.state().decisions.is_empty(),
        "a failed save must not change the in-memory state"
    );

    let current = fs::read_to_string(&state_path).expect("read after failure");
    assert_eq!(
        current, original,
        "atomic save failure must not corrupt the original file"
    );
}

#[test]
fn corrupt_state_file_falls_back_to_defaults() {
    let (store, clock, base) = setup_file_store();
    drop(store);
    fs::write(base.join("state.json"), "{ this is not json").unwrap();

    let reopened = reopen(&base, &clock);
    assert!(reopened.load_warning().is_some());
    assert!(reopened.state().decisions.is_empty());
    assert_eq!(reopened.challenge().len(), 100);
    assert!(!reopened.state().onboarded);
}

#[test]
fn legacy_waiting_item_fields_are_understood() {
    let fixture = FixtureDir::new().unwrap();
    fixture
        .child("state.json")
        .write_str(
            r#"{
                "settings": {"salary": 1760, "hours": 176},
                "waitingItems": [
                    {"id": "1712000000000", "nome": "Bike", "valor": 900, "hours": "90.0", "lembrete_timestamp": 1712003600000}
                ]
            }"#,
        )
        .unwrap();

    let storage = JsonStorage::new(Some(fixture.path().to_path_buf())).unwrap();
    let state = storage.load().unwrap().expect("state present");
    let item = &state.quarantine[0];
    assert_eq!(item.id, RecordId(1_712_000_000_000));
    assert_eq!(item.context.description.as_deref(), Some("Bike"));
    assert_eq!(item.price, 900.0);
    assert_eq!(item.hours_equivalent, 90.0);
    assert_eq!(item.target_time.timestamp_millis(), 1_712_003_600_000);
    assert!(!item.notified);
}

#[test]
fn export_then_import_replaces_state() {
    let (mut store, clock, base) = setup_file_store();
    store.update_profile(3000.0, 150.0).unwrap();
    store.toggle_envelope(9).unwrap();
    store
        .record_decision(60.0, DecisionAction::Skip, PurchaseContext::default())
        .unwrap();

    let document = store.export_document().unwrap();
    assert_eq!(document.file_name, export_file_name(start_time().date_naive()));
    let export_dir = base.join("exports");
    let written = write_export(&export_dir, &document).unwrap();
    assert!(written.ends_with("quanto-custa-backup-2025-03-14.json"));

    store.reset().unwrap();
    assert!(store.state().decisions.is_empty());
    assert!(!base.join("state.json").exists());

    let text = fs::read_to_string(&written).unwrap();
    store.import_document(&text).unwrap();
    assert_eq!(store.state().decisions.len(), 1);
    assert_eq!(store.challenge().filled_total(), 10.0);
    assert_eq!(store.profile().hourly_rate(), 20.0);

    let reopened = reopen(&base, &clock);
    assert_eq!(reopened.state().decisions.len(), 1);
}

#[test]
fn import_missing_required_field_is_rejected() {
    let (mut store, _clock, base) = setup_file_store();
    store
        .record_decision(25.0, DecisionAction::Buy, PurchaseContext::default())
        .unwrap();
    let before = fs::read_to_string(base.join("state.json")).unwrap();

    let err = store
        .import_document(r#"{"settings": {"salary": 1, "hours": 1}, "envelopes": []}"#)
        .unwrap_err();
    match err {
        CoreError::InvalidImport(message) => assert!(message.contains("challengeSettings")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.state().decisions.len(), 1);
    assert_eq!(fs::read_to_string(base.join("state.json")).unwrap(), before);
}

#[test]
fn import_rejects_non_json_and_newer_schema() {
    let (mut store, _clock, _base) = setup_file_store();
    assert!(matches!(
        store.import_document("hello"),
        Err(CoreError::InvalidImport(_))
    ));
    let newer = format!(
        r#"{{"schemaVersion": {}, "settings": {{}}, "challengeSettings": {{}}, "envelopes": []}}"#,
        CURRENT_SCHEMA_VERSION + 1
    );
    assert!(matches!(
        store.import_document(&newer),
        Err(CoreError::InvalidImport(_))
    ));
}

#[test]
fn ids_stay_unique_after_importing_future_ids() {
    let (mut store, _clock, _base) = setup_file_store();
    let far_future = 4_000_000_000_000u64;
    let document = format!(
        r#"{{
            "settings": {{"salary": 1000, "hours": 100}},
            "challengeSettings": {{"targetGoal": 10, "strategy": "more_envelopes"}},
            "envelopes": [],
            "decisions": [{{"id": {far_future}, "price": 5, "hours": 0.5, "action": "skip", "timestamp": 1712000000000}}]
        }}"#
    );
    store.import_document(&document).unwrap();
    assert_eq!(store.challenge().len(), 4);

    let record = store
        .record_decision(7.0, DecisionAction::Buy, PurchaseContext::default())
        .unwrap();
    assert!(record.id.value() > far_future);
}
