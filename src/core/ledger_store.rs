use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::{seq::SliceRandom, Rng};
use tracing::{debug, info, warn};

use crate::{
    core::{
        errors::{CoreError, Result},
        services::{SavingsTotals, SummaryService},
        time::Clock,
    },
    domain::{
        common::take_by_id, AppState, ChallengeStrategy, DecisionAction, DecisionRecord,
        EnvelopeToggle, IdGenerator, Profile, PurchaseContext, QuarantineItem, RecordId,
        ReminderNotice, SavingsChallenge, CURRENT_SCHEMA_VERSION,
    },
    storage::{parse_import_document, render_export, ExportDocument, StorageBackend},
};

/// Owns the application state and keeps it in step with storage.
///
/// Every mutation runs against a copy of the state; the copy is persisted
/// and only then replaces the live state, so a failed save changes nothing.
pub struct LedgerStore {
    state: AppState,
    storage: Box<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
    ids: IdGenerator,
    load_warning: Option<String>,
}

impl LedgerStore {
    /// Loads persisted state. Unreadable storage is logged and replaced by
    /// the default state rather than failing.
    pub fn open(storage: Box<dyn StorageBackend>, clock: Arc<dyn Clock>) -> Self {
        let (state, load_warning) = match storage.load() {
            Ok(Some(state)) => (state, None),
            Ok(None) => (AppState::default(), None),
            Err(err) => {
                warn!(error = %err, "stored state is unreadable, starting from defaults");
                (AppState::default(), Some(err.to_string()))
            }
        };
        let ids = IdGenerator::seeded(state.max_record_id());
        debug!(
            decisions = state.decisions.len(),
            waiting = state.quarantine.len(),
            "ledger opened"
        );
        Self {
            state,
            storage,
            clock,
            ids,
            load_warning,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn profile(&self) -> &Profile {
        &self.state.profile
    }

    pub fn challenge(&self) -> &SavingsChallenge {
        &self.state.challenge
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Reason the stored state was discarded on open, if it was.
    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    pub fn update_profile(&mut self, salary: f64, hours_per_month: f64) -> Result<&Profile> {
        if !salary.is_finite() || salary <= 0.0 {
            return Err(CoreError::InvalidInput(
                "salary must be greater than zero".into(),
            ));
        }
        if !hours_per_month.is_finite() || hours_per_month <= 0.0 {
            return Err(CoreError::InvalidInput(
                "monthly hours must be greater than zero".into(),
            ));
        }
        self.mutate(|state, _, _| {
            state.profile = Profile::new(salary, hours_per_month);
            Ok(())
        })?;
        info!(
            hourly_rate = self.state.profile.hourly_rate(),
            "profile updated"
        );
        Ok(&self.state.profile)
    }

    pub fn complete_onboarding(&mut self) -> Result<()> {
        if self.state.onboarded {
            return Ok(());
        }
        self.mutate(|state, _, _| {
            state.onboarded = true;
            Ok(())
        })
    }

    pub fn record_decision(
        &mut self,
        price: f64,
        action: DecisionAction,
        context: PurchaseContext,
    ) -> Result<DecisionRecord> {
        ensure_price(price)?;
        let record = self.mutate(|state, ids, now| {
            let record = DecisionRecord {
                id: ids.next(now),
                price,
                hours_equivalent: state.profile.time_cost(price),
                action,
                timestamp: now,
                context,
            };
            state.decisions.push(record.clone());
            Ok(record)
        })?;
        info!(id = %record.id, price, action = %action, "decision recorded");
        Ok(record)
    }

    /// Removes a decision. Returns `false`, without touching storage, when
    /// the id is unknown.
    pub fn delete_decision(&mut self, id: RecordId) -> Result<bool> {
        if self.state.decision(id).is_none() {
            return Ok(false);
        }
        self.mutate(|state, _, _| {
            take_by_id(&mut state.decisions, id);
            Ok(())
        })?;
        info!(id = %id, "decision deleted");
        Ok(true)
    }

    /// Removes a waiting item. Unknown ids are a silent no-op.
    pub fn delete_quarantine_item(&mut self, id: RecordId) -> Result<bool> {
        if self.state.quarantine_item(id).is_none() {
            return Ok(false);
        }
        self.mutate(|state, _, _| {
            take_by_id(&mut state.quarantine, id);
            Ok(())
        })?;
        info!(id = %id, "waiting item discarded");
        Ok(true)
    }

    pub fn add_quarantine_item(
        &mut self,
        price: f64,
        delay: Duration,
        context: PurchaseContext,
    ) -> Result<QuarantineItem> {
        ensure_price(price)?;
        if delay < Duration::zero() {
            return Err(CoreError::InvalidInput("wait cannot be negative".into()));
        }
        let item = self.mutate(|state, ids, now| {
            let item = QuarantineItem {
                id: ids.next(now),
                price,
                hours_equivalent: state.profile.time_cost(price),
                context,
                target_time: now + delay,
                notified: false,
            };
            state.quarantine.push(item.clone());
            Ok(item)
        })?;
        info!(id = %item.id, price, due = %item.target_time, "decision deferred");
        Ok(item)
    }

    /// Takes an item out of quarantine so it can be decided.
    pub fn resolve_quarantine_item(&mut self, id: RecordId) -> Result<Option<QuarantineItem>> {
        if self.state.quarantine_item(id).is_none() {
            return Ok(None);
        }
        self.mutate(|state, _, _| Ok(take_by_id(&mut state.quarantine, id)))
    }

    /// Puts a previously resolved item back. Returns `false` if an item with
    /// the same id is already waiting.
    pub fn restore_quarantine_item(&mut self, item: QuarantineItem) -> Result<bool> {
        if self.state.quarantine_item(item.id).is_some() {
            return Ok(false);
        }
        let id = item.id;
        self.mutate(|state, _, _| {
            state.quarantine.push(item);
            state.quarantine.sort_by_key(|waiting| waiting.id);
            Ok(())
        })?;
        debug!(id = %id, "waiting item restored");
        Ok(true)
    }

    /// Marks newly due items as notified and reports each one exactly once.
    pub fn sweep_due_reminders(&mut self) -> Result<Vec<ReminderNotice>> {
        let now = self.clock.now();
        if !self.state.quarantine.iter().any(|item| item.needs_notice(now)) {
            return Ok(Vec::new());
        }
        let notices = self.mutate(|state, _, _| {
            let mut notices = Vec::new();
            for item in state.quarantine.iter_mut() {
                if item.needs_notice(now) {
                    item.notified = true;
                    notices.push(ReminderNotice::from(&*item));
                }
            }
            Ok(notices)
        })?;
        debug!(count = notices.len(), "reminder sweep notified items");
        Ok(notices)
    }

    pub fn due_items(&self) -> Vec<&QuarantineItem> {
        SummaryService::due_items(&self.state, self.clock.now())
    }

    /// Regenerates the challenge; every envelope starts unfilled.
    pub fn set_challenge(
        &mut self,
        goal: f64,
        strategy: ChallengeStrategy,
    ) -> Result<&SavingsChallenge> {
        let challenge = SavingsChallenge::generate(goal, strategy)?;
        let envelopes = challenge.len();
        self.mutate(|state, _, _| {
            state.challenge = challenge;
            Ok(())
        })?;
        info!(goal, strategy = %strategy, envelopes, "challenge regenerated");
        Ok(&self.state.challenge)
    }

    pub fn toggle_envelope(&mut self, index: usize) -> Result<EnvelopeToggle> {
        let len = self.state.challenge.len();
        if index >= len {
            return Err(CoreError::EnvelopeOutOfRange { index, len });
        }
        let toggle = self.mutate(|state, _, _| state.challenge.toggle(index))?;
        debug!(index, filled = toggle.filled, "envelope toggled");
        Ok(toggle)
    }

    /// Picks a random unfilled envelope, `None` once all are filled.
    pub fn lucky_envelope<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        self.state.challenge.unfilled_indices().choose(rng).copied()
    }

    pub fn totals(&self) -> SavingsTotals {
        SummaryService::totals(&self.state)
    }

    pub fn export_document(&self) -> Result<ExportDocument> {
        render_export(&self.state, self.clock.today())
    }

    /// Replaces the whole state with an imported document. A rejected
    /// document leaves state and storage untouched.
    pub fn import_document(&mut self, text: &str) -> Result<()> {
        let mut imported = parse_import_document(text)?;
        imported.schema_version = CURRENT_SCHEMA_VERSION;
        let seed = imported.max_record_id();
        let decisions = imported.decisions.len();
        self.mutate(move |state, ids, _| {
            *state = imported;
            *ids = IdGenerator::seeded(seed.max(ids.peek()));
            Ok(())
        })?;
        info!(decisions, "state imported");
        Ok(())
    }

    /// Wipes storage and returns to the default state.
    pub fn reset(&mut self) -> Result<()> {
        self.storage.clear()?;
        self.state = AppState::default();
        self.load_warning = None;
        info!("state reset to defaults");
        Ok(())
    }

    fn mutate<T, F>(&mut self, apply: F) -> Result<T>
    where
        F: FnOnce(&mut AppState, &mut IdGenerator, DateTime<Utc>) -> Result<T>,
    {
        let now = self.clock.now();
        let mut draft = self.state.clone();
        let mut ids = self.ids.clone();
        let output = apply(&mut draft, &mut ids, now)?;
        draft.touch(now);
        self.storage.save(&draft)?;
        self.state = draft;
        self.ids = ids;
        Ok(output)
    }
}

fn ensure_price(price: f64) -> Result<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(CoreError::InvalidInput(
            "price must be greater than zero".into(),
        ));
    }
    Ok(())
}
