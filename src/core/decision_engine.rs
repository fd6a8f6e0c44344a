use tracing::{debug, info};

use crate::{
    core::{
        errors::{CoreError, Result},
        ledger_store::LedgerStore,
        services::{
            projection_model::{DEFAULT_RATE, DEFAULT_YEARS},
            ProjectionModel, WageModel,
        },
    },
    domain::{
        DecisionAction, DecisionRecord, PurchaseContext, QuarantineItem, RecordId, WaitOption,
    },
};

/// Where the purchase under evaluation came from.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationOrigin {
    Fresh,
    /// Pulled out of quarantine; restored there if the review is cancelled.
    Review(QuarantineItem),
}

/// A purchase being weighed, with the figures shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub price: f64,
    pub hourly_rate: f64,
    pub time_cost_hours: f64,
    pub future_value: f64,
    pub projection_years: u32,
    pub context: PurchaseContext,
    pub origin: EvaluationOrigin,
}

impl Evaluation {
    pub fn is_review(&self) -> bool {
        matches!(self.origin, EvaluationOrigin::Review(_))
    }

    pub fn reviewed_id(&self) -> Option<RecordId> {
        match &self.origin {
            EvaluationOrigin::Review(item) => Some(item.id),
            EvaluationOrigin::Fresh => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DecisionState {
    #[default]
    Idle,
    Evaluating(Evaluation),
    /// Buy was chosen and awaits the explicit second confirmation.
    ConfirmingBuy(Evaluation),
}

/// Drives one purchase at a time from price entry to a recorded outcome.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    state: DecisionState,
    projection_years: u32,
    projection_rate: f64,
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionEngine {
    pub fn new() -> Self {
        Self::with_projection(DEFAULT_YEARS, DEFAULT_RATE)
    }

    pub fn with_projection(years: u32, rate: f64) -> Self {
        Self {
            state: DecisionState::Idle,
            projection_years: years,
            projection_rate: rate,
        }
    }

    /// Applies to evaluations started afterwards.
    pub fn set_projection(&mut self, years: u32, rate: f64) {
        self.projection_years = years;
        self.projection_rate = rate;
    }

    pub fn state(&self) -> &DecisionState {
        &self.state
    }

    pub fn current(&self) -> Option<&Evaluation> {
        match &self.state {
            DecisionState::Idle => None,
            DecisionState::Evaluating(evaluation) | DecisionState::ConfirmingBuy(evaluation) => {
                Some(evaluation)
            }
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, DecisionState::Idle)
    }

    pub fn awaiting_confirmation(&self) -> bool {
        matches!(self.state, DecisionState::ConfirmingBuy(_))
    }

    /// Opens an evaluation for `price`. Non-positive or non-finite prices
    /// change nothing and yield `None`. Any evaluation in progress is
    /// cancelled first.
    pub fn start_evaluation(
        &mut self,
        store: &mut LedgerStore,
        price: f64,
    ) -> Result<Option<&Evaluation>> {
        if !price.is_finite() || price <= 0.0 {
            return Ok(None);
        }
        self.cancel(store)?;
        let evaluation = self.evaluate(
            store,
            price,
            PurchaseContext::default(),
            EvaluationOrigin::Fresh,
        );
        debug!(price, hours = evaluation.time_cost_hours, "evaluation started");
        self.state = DecisionState::Evaluating(evaluation);
        Ok(self.current())
    }

    pub fn attach_context(&mut self, context: PurchaseContext) -> Result<&Evaluation> {
        match &mut self.state {
            DecisionState::Idle => Err(nothing_pending()),
            DecisionState::Evaluating(evaluation) | DecisionState::ConfirmingBuy(evaluation) => {
                evaluation.context = context;
                Ok(evaluation)
            }
        }
    }

    /// First half of a purchase: the caller must confirm before anything is
    /// recorded.
    pub fn request_buy(&mut self) -> Result<&Evaluation> {
        let state = std::mem::take(&mut self.state);
        self.state = match state {
            DecisionState::Idle => return Err(nothing_pending()),
            DecisionState::Evaluating(evaluation) | DecisionState::ConfirmingBuy(evaluation) => {
                DecisionState::ConfirmingBuy(evaluation)
            }
        };
        self.current().ok_or_else(nothing_pending)
    }

    /// Backs out of the buy confirmation, keeping the evaluation open.
    pub fn decline_buy(&mut self) -> Result<&Evaluation> {
        let state = std::mem::take(&mut self.state);
        match state {
            DecisionState::ConfirmingBuy(evaluation) => {
                self.state = DecisionState::Evaluating(evaluation);
                self.current().ok_or_else(nothing_pending)
            }
            other => {
                self.state = other;
                Err(CoreError::InvalidOperation(
                    "no purchase is awaiting confirmation".into(),
                ))
            }
        }
    }

    pub fn confirm_buy(&mut self, store: &mut LedgerStore) -> Result<DecisionRecord> {
        let evaluation = match &self.state {
            DecisionState::ConfirmingBuy(evaluation) => evaluation,
            DecisionState::Evaluating(_) => {
                return Err(CoreError::InvalidOperation(
                    "ask to buy first, then confirm".into(),
                ))
            }
            DecisionState::Idle => return Err(nothing_pending()),
        };
        let record =
            store.record_decision(evaluation.price, DecisionAction::Buy, evaluation.context.clone())?;
        self.state = DecisionState::Idle;
        Ok(record)
    }

    /// Records a skip; the price counts toward savings.
    pub fn confirm_skip(&mut self, store: &mut LedgerStore) -> Result<DecisionRecord> {
        let evaluation = self.current().ok_or_else(nothing_pending)?;
        let record = store.record_decision(
            evaluation.price,
            DecisionAction::Skip,
            evaluation.context.clone(),
        )?;
        self.state = DecisionState::Idle;
        Ok(record)
    }

    /// Parks the purchase for `wait`. Not available for reviewed items.
    pub fn defer_decision(
        &mut self,
        store: &mut LedgerStore,
        wait: WaitOption,
    ) -> Result<QuarantineItem> {
        let evaluation = self.current().ok_or_else(nothing_pending)?;
        if evaluation.is_review() {
            return Err(CoreError::InvalidOperation(
                "a reviewed item can only be bought or skipped".into(),
            ));
        }
        let item = store.add_quarantine_item(
            evaluation.price,
            wait.duration(),
            evaluation.context.clone(),
        )?;
        self.state = DecisionState::Idle;
        Ok(item)
    }

    /// Pulls a waiting item back into evaluation. Unknown ids yield `None`
    /// and leave the current evaluation alone.
    pub fn review_deferred(
        &mut self,
        store: &mut LedgerStore,
        id: RecordId,
    ) -> Result<Option<&Evaluation>> {
        if store.state().quarantine_item(id).is_none() {
            return Ok(None);
        }
        self.cancel(store)?;
        let item = match store.resolve_quarantine_item(id)? {
            Some(item) => item,
            None => return Ok(None),
        };
        let evaluation = self.evaluate(
            store,
            item.price,
            item.context.clone(),
            EvaluationOrigin::Review(item),
        );
        info!(id = %id, "waiting item under review");
        self.state = DecisionState::Evaluating(evaluation);
        Ok(self.current())
    }

    /// Drops the evaluation. A reviewed item goes back into quarantine.
    pub fn cancel(&mut self, store: &mut LedgerStore) -> Result<()> {
        let state = std::mem::take(&mut self.state);
        let evaluation = match state {
            DecisionState::Idle => return Ok(()),
            DecisionState::Evaluating(evaluation) | DecisionState::ConfirmingBuy(evaluation) => {
                evaluation
            }
        };
        if let EvaluationOrigin::Review(item) = &evaluation.origin {
            if let Err(err) = store.restore_quarantine_item(item.clone()) {
                self.state = DecisionState::Evaluating(evaluation);
                return Err(err);
            }
        }
        debug!("evaluation cancelled");
        Ok(())
    }

    fn evaluate(
        &self,
        store: &LedgerStore,
        price: f64,
        context: PurchaseContext,
        origin: EvaluationOrigin,
    ) -> Evaluation {
        let hourly_rate = store.profile().hourly_rate();
        Evaluation {
            price,
            hourly_rate,
            time_cost_hours: WageModel::time_cost(price, hourly_rate),
            future_value: ProjectionModel::future_value(
                price,
                self.projection_years,
                self.projection_rate,
            ),
            projection_years: self.projection_years,
            context,
            origin,
        }
    }
}

fn nothing_pending() -> CoreError {
    CoreError::InvalidOperation("no purchase is being evaluated".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::time::ManualClock, storage::MemoryStorage};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn setup() -> (DecisionEngine, LedgerStore) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 2, 8, 0, 0).unwrap());
        let mut store = LedgerStore::open(Box::new(MemoryStorage::new()), Arc::new(clock));
        store.update_profile(3000.0, 150.0).unwrap();
        (DecisionEngine::new(), store)
    }

    #[test]
    fn zero_price_never_opens_evaluation() {
        let (mut engine, mut store) = setup();
        assert!(engine.start_evaluation(&mut store, 0.0).unwrap().is_none());
        assert!(engine.start_evaluation(&mut store, f64::NAN).unwrap().is_none());
        assert!(engine.is_idle());
    }

    #[test]
    fn evaluation_shows_hours_and_projection() {
        let (mut engine, mut store) = setup();
        let evaluation = engine.start_evaluation(&mut store, 1000.0).unwrap().unwrap();
        assert_eq!(evaluation.time_cost_hours, 50.0);
        assert!((evaluation.future_value - 2593.742460100002).abs() < 1e-6);
    }

    #[test]
    fn buy_requires_confirmation() {
        let (mut engine, mut store) = setup();
        engine.start_evaluation(&mut store, 90.0).unwrap();
        assert!(engine.confirm_buy(&mut store).is_err());
        assert!(store.state().decisions.is_empty());

        engine.request_buy().unwrap();
        engine.decline_buy().unwrap();
        assert!(engine.confirm_buy(&mut store).is_err());

        engine.request_buy().unwrap();
        let record = engine.confirm_buy(&mut store).unwrap();
        assert_eq!(record.action, DecisionAction::Buy);
        assert!(engine.is_idle());
    }

    #[test]
    fn skip_is_allowed_while_confirming() {
        let (mut engine, mut store) = setup();
        engine.start_evaluation(&mut store, 40.0).unwrap();
        engine.request_buy().unwrap();
        let record = engine.confirm_skip(&mut store).unwrap();
        assert!(record.is_skip());
        assert_eq!(store.totals().skipped_total, 40.0);
    }

    #[test]
    fn review_cannot_be_deferred_again() {
        let (mut engine, mut store) = setup();
        engine.start_evaluation(&mut store, 200.0).unwrap();
        let item = engine.defer_decision(&mut store, WaitOption::OneHour).unwrap();

        let evaluation = engine.review_deferred(&mut store, item.id).unwrap().unwrap();
        assert_eq!(evaluation.price, 200.0);
        assert!(store.state().quarantine.is_empty());
        let err = engine
            .defer_decision(&mut store, WaitOption::OneDay)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidOperation(_)));
    }

    #[test]
    fn cancelling_review_restores_item() {
        let (mut engine, mut store) = setup();
        engine.start_evaluation(&mut store, 75.0).unwrap();
        let context = PurchaseContext::new(Some("Headphones"), Some("Electronics"), Some(8)).unwrap();
        engine.attach_context(context.clone()).unwrap();
        let item = engine.defer_decision(&mut store, WaitOption::OneWeek).unwrap();
        assert_eq!(item.context, context);

        engine.review_deferred(&mut store, item.id).unwrap();
        engine.cancel(&mut store).unwrap();
        assert_eq!(store.state().quarantine, vec![item]);
        assert!(engine.is_idle());
    }

    #[test]
    fn unknown_review_keeps_current_evaluation() {
        let (mut engine, mut store) = setup();
        engine.start_evaluation(&mut store, 12.0).unwrap();
        assert!(engine
            .review_deferred(&mut store, RecordId(1))
            .unwrap()
            .is_none());
        assert_eq!(engine.current().map(|e| e.price), Some(12.0));
    }

    #[test]
    fn new_evaluation_replaces_review_and_restores_item() {
        let (mut engine, mut store) = setup();
        engine.start_evaluation(&mut store, 60.0).unwrap();
        let item = engine.defer_decision(&mut store, WaitOption::OneDay).unwrap();
        engine.review_deferred(&mut store, item.id).unwrap();
        engine.start_evaluation(&mut store, 5.0).unwrap();
        assert_eq!(store.state().quarantine.len(), 1);
        assert!(!engine.current().unwrap().is_review());
    }
}
