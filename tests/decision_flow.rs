mod common;

use chrono::Duration;
use quanto_custa::{
    core::{errors::CoreError, DecisionEngine, DecisionState},
    domain::{DecisionAction, PurchaseContext, RecordId, WaitOption},
};

use common::{setup_memory_store, start_time};

#[test]
fn evaluation_shows_time_cost_and_projection() {
    let (mut store, _storage, _clock) = setup_memory_store();
    store.update_profile(3520.0, 176.0).unwrap();
    let mut engine = DecisionEngine::new();

    let evaluation = engine
        .start_evaluation(&mut store, 100.0)
        .unwrap()
        .cloned()
        .expect("evaluation opened");
    assert_eq!(evaluation.hourly_rate, 20.0);
    assert_eq!(evaluation.time_cost_hours, 5.0);
    assert_eq!(evaluation.projection_years, 10);
    assert!((evaluation.future_value - 259.374_246_01).abs() < 1e-6);
    assert!(!evaluation.is_review());
}

#[test]
fn non_positive_prices_do_not_open_an_evaluation() {
    let (mut store, _storage, _clock) = setup_memory_store();
    let mut engine = DecisionEngine::new();
    engine.start_evaluation(&mut store, 40.0).unwrap();

    for price in [0.0, -3.0, f64::NAN, f64::INFINITY] {
        assert!(engine.start_evaluation(&mut store, price).unwrap().is_none());
    }
    assert_eq!(engine.current().map(|evaluation| evaluation.price), Some(40.0));
}

#[test]
fn buying_needs_an_explicit_confirmation() {
    let (mut store, _storage, _clock) = setup_memory_store();
    store.update_profile(2000.0, 100.0).unwrap();
    let mut engine = DecisionEngine::new();
    engine.start_evaluation(&mut store, 60.0).unwrap();
    engine
        .attach_context(PurchaseContext::new(Some("Book"), Some("Leisure"), Some(4)).unwrap())
        .unwrap();

    assert!(matches!(
        engine.confirm_buy(&mut store),
        Err(CoreError::InvalidOperation(_))
    ));
    engine.request_buy().unwrap();
    assert!(engine.awaiting_confirmation());

    engine.decline_buy().unwrap();
    assert!(matches!(engine.state(), DecisionState::Evaluating(_)));
    assert!(store.state().decisions.is_empty());

    engine.request_buy().unwrap();
    let record = engine.confirm_buy(&mut store).unwrap();
    assert_eq!(record.action, DecisionAction::Buy);
    assert_eq!(record.hours_equivalent, 3.0);
    assert_eq!(record.context.category.as_deref(), Some("Leisure"));
    assert!(engine.is_idle());
    assert_eq!(store.state().decisions.len(), 1);
}

#[test]
fn skip_records_savings_and_returns_to_idle() {
    let (mut store, _storage, _clock) = setup_memory_store();
    let mut engine = DecisionEngine::new();
    engine.start_evaluation(&mut store, 35.5).unwrap();
    let record = engine.confirm_skip(&mut store).unwrap();
    assert!(record.is_skip());
    assert_eq!(store.totals().skipped_total, 35.5);
    assert!(engine.is_idle());

    assert!(engine.confirm_skip(&mut store).is_err());
    assert_eq!(store.state().decisions.len(), 1);
}

#[test]
fn deferred_item_can_be_reviewed_and_decided() {
    let (mut store, _storage, clock) = setup_memory_store();
    let mut engine = DecisionEngine::new();
    engine.start_evaluation(&mut store, 250.0).unwrap();
    engine
        .attach_context(PurchaseContext::new(Some("Watch"), None, Some(9)).unwrap())
        .unwrap();
    let item = engine
        .defer_decision(&mut store, WaitOption::ThreeDays)
        .unwrap();
    assert_eq!(item.target_time, start_time() + Duration::hours(72));
    assert!(engine.is_idle());

    clock.advance(Duration::hours(72));
    assert_eq!(store.sweep_due_reminders().unwrap().len(), 1);

    let evaluation = engine
        .review_deferred(&mut store, item.id)
        .unwrap()
        .cloned()
        .expect("item found");
    assert_eq!(evaluation.reviewed_id(), Some(item.id));
    assert_eq!(evaluation.context.description.as_deref(), Some("Watch"));
    assert!(store.state().quarantine.is_empty());

    assert!(matches!(
        engine.defer_decision(&mut store, WaitOption::OneHour),
        Err(CoreError::InvalidOperation(_))
    ));

    let record = engine.confirm_skip(&mut store).unwrap();
    assert_eq!(record.price, 250.0);
    assert!(store.state().quarantine.is_empty());
}

#[test]
fn cancelling_a_review_puts_the_item_back() {
    let (mut store, _storage, _clock) = setup_memory_store();
    let mut engine = DecisionEngine::new();
    let first = store
        .add_quarantine_item(10.0, Duration::hours(1), PurchaseContext::default())
        .unwrap();
    let second = store
        .add_quarantine_item(20.0, Duration::hours(1), PurchaseContext::default())
        .unwrap();

    engine.review_deferred(&mut store, first.id).unwrap();
    assert_eq!(store.state().quarantine.len(), 1);

    // Reviewing another item first returns the current one.
    engine.review_deferred(&mut store, second.id).unwrap();
    let waiting: Vec<RecordId> = store.state().quarantine.iter().map(|item| item.id).collect();
    assert_eq!(waiting, vec![first.id]);

    engine.cancel(&mut store).unwrap();
    let waiting: Vec<RecordId> = store.state().quarantine.iter().map(|item| item.id).collect();
    assert_eq!(waiting, vec![first.id, second.id]);
    assert!(engine.is_idle());
}

#[test]
fn reviewing_an_unknown_id_keeps_the_current_evaluation() {
    let (mut store, _storage, _clock) = setup_memory_store();
    let mut engine = DecisionEngine::new();
    engine.start_evaluation(&mut store, 12.0).unwrap();
    assert!(engine
        .review_deferred(&mut store, RecordId(1))
        .unwrap()
        .is_none());
    assert_eq!(engine.current().map(|evaluation| evaluation.price), Some(12.0));
}

#[test]
fn failed_save_keeps_the_evaluation_open() {
    let (mut store, storage, _clock) = setup_memory_store();
    let mut engine = DecisionEngine::new();
    engine.start_evaluation(&mut store, 75.0).unwrap();
    storage.fail_saves(true);

    assert!(engine.confirm_skip(&mut store).is_err());
    assert_eq!(engine.current().map(|evaluation| evaluation.price), Some(75.0));
    assert!(store.state().decisions.is_empty());

    storage.fail_saves(false);
    engine.confirm_skip(&mut store).unwrap();
    assert_eq!(store.state().decisions.len(), 1);
}

#[test]
fn projection_settings_apply_to_new_evaluations() {
    let (mut store, _storage, _clock) = setup_memory_store();
    let mut engine = DecisionEngine::with_projection(1, 0.5);
    let evaluation = engine
        .start_evaluation(&mut store, 100.0)
        .unwrap()
        .cloned()
        .unwrap();
    assert_eq!(evaluation.future_value, 150.0);

    engine.set_projection(2, 0.0);
    let evaluation = engine
        .start_evaluation(&mut store, 100.0)
        .unwrap()
        .cloned()
        .unwrap();
    assert_eq!(evaluation.future_value, 100.0);
    assert_eq!(evaluation.projection_years, 2);
}
