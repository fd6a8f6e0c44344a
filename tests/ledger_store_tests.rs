mod common;

use chrono::Duration;
use quanto_custa::{
    core::errors::CoreError,
    domain::{ChallengeStrategy, DecisionAction, PurchaseContext, RecordId},
};
use rand::{rngs::StdRng, SeedableRng};

use common::{setup_memory_store, start_time};

fn named(description: &str) -> PurchaseContext {
    PurchaseContext::new(Some(description), None, None).unwrap()
}

#[test]
fn totals_combine_skips_and_envelopes() {
    let (mut store, _storage, _clock) = setup_memory_store();
    store.update_profile(4000.0, 160.0).unwrap();
    store
        .record_decision(100.0, DecisionAction::Skip, named("Sneakers"))
        .unwrap();
    store
        .record_decision(50.0, DecisionAction::Buy, named("Groceries"))
        .unwrap();
    store.toggle_envelope(4).unwrap();
    store.toggle_envelope(19).unwrap();

    let totals = store.totals();
    assert_eq!(totals.skipped_total, 100.0);
    assert_eq!(totals.spent_total, 50.0);
    assert_eq!(totals.envelope_total, 25.0);
    assert_eq!(totals.total_saved, 125.0);
    assert_eq!(totals.hours_recovered, 5.0);
    assert_eq!(totals.skipped_count, 1);
    assert_eq!(totals.bought_count, 1);
    assert_eq!(totals.filled_envelopes, 2);
    assert_eq!(totals.envelope_count, 100);
}

#[test]
fn decisions_without_salary_cost_zero_hours() {
    let (mut store, _storage, _clock) = setup_memory_store();
    let record = store
        .record_decision(80.0, DecisionAction::Skip, PurchaseContext::default())
        .unwrap();
    assert_eq!(record.hours_equivalent, 0.0);
    assert_eq!(store.totals().hours_recovered, 0.0);
}

#[test]
fn invalid_profile_leaves_previous_values() {
    let (mut store, storage, _clock) = setup_memory_store();
    store.update_profile(3000.0, 150.0).unwrap();
    assert!(matches!(
        store.update_profile(0.0, 150.0),
        Err(CoreError::InvalidInput(_))
    ));
    assert!(store.update_profile(3000.0, f64::NAN).is_err());
    assert_eq!(store.profile().hourly_rate(), 20.0);
    assert_eq!(storage.save_count(), 1);
}

#[test]
fn ids_are_unique_within_the_same_millisecond() {
    let (mut store, _storage, _clock) = setup_memory_store();
    let first = store
        .record_decision(10.0, DecisionAction::Buy, PurchaseContext::default())
        .unwrap();
    let second = store
        .add_quarantine_item(20.0, Duration::hours(1), PurchaseContext::default())
        .unwrap();
    let third = store
        .record_decision(30.0, DecisionAction::Skip, PurchaseContext::default())
        .unwrap();
    assert_eq!(first.id.value(), start_time().timestamp_millis() as u64);
    assert!(second.id > first.id);
    assert!(third.id > second.id);
}

#[test]
fn deleting_unknown_records_is_a_silent_no_op() {
    let (mut store, storage, _clock) = setup_memory_store();
    let record = store
        .record_decision(10.0, DecisionAction::Buy, PurchaseContext::default())
        .unwrap();
    let saves = storage.save_count();

    assert!(!store.delete_decision(RecordId(42)).unwrap());
    assert!(!store.delete_quarantine_item(RecordId(42)).unwrap());
    assert_eq!(storage.save_count(), saves);

    assert!(store.delete_decision(record.id).unwrap());
    assert!(store.state().decisions.is_empty());
}

#[test]
fn sweep_notifies_each_due_item_once() {
    let (mut store, storage, clock) = setup_memory_store();
    store
        .add_quarantine_item(300.0, Duration::hours(1), named("Jacket"))
        .unwrap();
    store
        .add_quarantine_item(90.0, Duration::hours(24), named("Game"))
        .unwrap();

    assert!(store.sweep_due_reminders().unwrap().is_empty());

    clock.advance(Duration::minutes(61));
    let notices = store.sweep_due_reminders().unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].description.as_deref(), Some("Jacket"));
    assert_eq!(store.due_items().len(), 1);

    let saves = storage.save_count();
    assert!(store.sweep_due_reminders().unwrap().is_empty());
    assert_eq!(storage.save_count(), saves, "a quiet sweep does not save");

    clock.advance(Duration::days(1));
    let notices = store.sweep_due_reminders().unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].price, 90.0);
    assert_eq!(store.due_items().len(), 2);
    assert!(store.state().quarantine.iter().all(|item| item.notified));
}

#[test]
fn failed_save_keeps_memory_and_storage_in_step() {
    let (mut store, storage, _clock) = setup_memory_store();
    store
        .record_decision(10.0, DecisionAction::Skip, PurchaseContext::default())
        .unwrap();
    storage.fail_saves(true);

    assert!(store
        .record_decision(20.0, DecisionAction::Skip, PurchaseContext::default())
        .is_err());
    assert!(store.toggle_envelope(0).is_err());
    assert_eq!(store.state().decisions.len(), 1);
    assert_eq!(store.challenge().filled_count(), 0);

    let persisted = storage.snapshot().expect("first save landed");
    assert_eq!(&persisted.decisions, &store.state().decisions);
}

#[test]
fn challenge_regeneration_clears_filled_envelopes() {
    let (mut store, _storage, _clock) = setup_memory_store();
    store.toggle_envelope(0).unwrap();
    store.toggle_envelope(1).unwrap();
    assert_eq!(store.challenge().filled_total(), 3.0);

    let challenge = store
        .set_challenge(10_000.0, ChallengeStrategy::Scaled)
        .unwrap();
    assert_eq!(challenge.len(), 100);
    assert_eq!(challenge.filled_count(), 0);
    assert_eq!(challenge.values()[99], 198.0);

    let challenge = store
        .set_challenge(21.0, ChallengeStrategy::MoreEnvelopes)
        .unwrap();
    assert_eq!(challenge.values(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[test]
fn invalid_goal_keeps_current_challenge() {
    let (mut store, _storage, _clock) = setup_memory_store();
    assert!(store
        .set_challenge(-5.0, ChallengeStrategy::Scaled)
        .is_err());
    assert!(store
        .set_challenge(1.0e12, ChallengeStrategy::MoreEnvelopes)
        .is_err());
    assert_eq!(store.challenge().target_goal(), 5050.0);
}

#[test]
fn toggle_twice_restores_the_envelope() {
    let (mut store, _storage, _clock) = setup_memory_store();
    store.update_profile(3000.0, 150.0).unwrap();
    store
        .record_decision(30.0, DecisionAction::Skip, PurchaseContext::default())
        .unwrap();
    let before = store.totals().total_saved;
    assert_eq!(before, 30.0);

    let on = store.toggle_envelope(49).unwrap();
    assert!(on.filled);
    assert_eq!(on.value, 50.0);
    assert_eq!(store.totals().total_saved, before + on.value);

    let off = store.toggle_envelope(49).unwrap();
    assert!(!off.filled);
    assert_eq!(store.totals().total_saved, before);
    assert_eq!(store.challenge().filled_count(), 0);

    assert!(matches!(
        store.toggle_envelope(100),
        Err(CoreError::EnvelopeOutOfRange { index: 100, len: 100 })
    ));
}

#[test]
fn lucky_envelope_only_picks_unfilled_ones() {
    let (mut store, _storage, _clock) = setup_memory_store();
    store
        .set_challenge(6.0, ChallengeStrategy::MoreEnvelopes)
        .unwrap();
    store.toggle_envelope(0).unwrap();
    store.toggle_envelope(2).unwrap();

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        assert_eq!(store.lucky_envelope(&mut rng), Some(1));
    }

    store.toggle_envelope(1).unwrap();
    assert_eq!(store.lucky_envelope(&mut rng), None);
}

#[test]
fn reset_returns_to_defaults() {
    let (mut store, storage, _clock) = setup_memory_store();
    store.update_profile(1000.0, 100.0).unwrap();
    store.complete_onboarding().unwrap();
    store.reset().unwrap();
    assert!(!store.state().onboarded);
    assert!(!store.profile().is_configured());
    assert!(storage.snapshot().is_none());
}
