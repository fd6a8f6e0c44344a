use chrono::{DateTime, Utc};

use crate::domain::{AppState, DecisionAction, QuarantineItem};

use super::WageModel;

/// Savings and spending figures derived from the stored state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SavingsTotals {
    pub skipped_total: f64,
    pub envelope_total: f64,
    pub total_saved: f64,
    pub spent_total: f64,
    pub hours_recovered: f64,
    pub filled_envelopes: usize,
    pub envelope_count: usize,
    pub skipped_count: usize,
    pub bought_count: usize,
}

pub struct SummaryService;

impl SummaryService {
    pub fn totals(state: &AppState) -> SavingsTotals {
        let mut totals = SavingsTotals::default();
        for record in &state.decisions {
            match record.action {
                DecisionAction::Skip => {
                    totals.skipped_total += record.price;
                    totals.skipped_count += 1;
                }
                DecisionAction::Buy => {
                    totals.spent_total += record.price;
                    totals.bought_count += 1;
                }
            }
        }
        totals.envelope_total = state.challenge.filled_total();
        totals.total_saved = totals.skipped_total + totals.envelope_total;
        totals.hours_recovered =
            WageModel::time_cost(totals.total_saved, state.profile.hourly_rate());
        totals.filled_envelopes = state.challenge.filled_count();
        totals.envelope_count = state.challenge.len();
        totals
    }

    /// Quarantine items whose wait is over, announced or not.
    pub fn due_items(state: &AppState, now: DateTime<Utc>) -> Vec<&QuarantineItem> {
        state
            .quarantine
            .iter()
            .filter(|item| item.is_due(now))
            .collect()
    }

    /// Share of the challenge goal already filled, between 0 and 1.
    pub fn challenge_progress(state: &AppState) -> f64 {
        let goal = state.challenge.target_goal();
        if goal <= 0.0 {
            return 0.0;
        }
        (state.challenge.filled_total() / goal).clamp(0.0, 1.0)
    }
}
