use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    challenge::{ChallengeStrategy, SavingsChallenge, BASELINE_GOAL},
    common::{find_by_id, Identifiable, RecordId},
    decision::DecisionRecord,
    profile::Profile,
    quarantine::QuarantineItem,
};

pub const CURRENT_SCHEMA_VERSION: u8 = 2;

/// Everything the application persists, written and read as one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StateDocument", into = "StateDocument")]
pub struct AppState {
    pub schema_version: u8,
    pub onboarded: bool,
    pub profile: Profile,
    pub challenge: SavingsChallenge,
    pub decisions: Vec<DecisionRecord>,
    pub quarantine: Vec<QuarantineItem>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            onboarded: false,
            profile: Profile::default(),
            challenge: SavingsChallenge::baseline(),
            decisions: Vec::new(),
            quarantine: Vec::new(),
            updated_at: None,
        }
    }
}

impl AppState {
    pub fn decision(&self, id: RecordId) -> Option<&DecisionRecord> {
        find_by_id(&self.decisions, id)
    }

    pub fn quarantine_item(&self, id: RecordId) -> Option<&QuarantineItem> {
        find_by_id(&self.quarantine, id)
    }

    /// Largest id in use, so freshly generated ids never collide.
    pub fn max_record_id(&self) -> u64 {
        self.decisions
            .iter()
            .map(Identifiable::id)
            .chain(self.quarantine.iter().map(Identifiable::id))
            .map(RecordId::value)
            .max()
            .unwrap_or(0)
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

// Wire layout shared with the browser version: camelCase keys, challenge
// settings and filled flags stored side by side.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateDocument {
    #[serde(default = "default_schema_version")]
    schema_version: u8,
    #[serde(default)]
    onboarded: bool,
    #[serde(default)]
    settings: Profile,
    #[serde(default)]
    challenge_settings: ChallengeSettings,
    #[serde(default)]
    decisions: Vec<DecisionRecord>,
    #[serde(default)]
    waiting_items: Vec<QuarantineItem>,
    #[serde(default)]
    envelopes: Vec<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChallengeSettings {
    #[serde(default = "default_goal")]
    target_goal: f64,
    #[serde(default = "default_strategy")]
    strategy: ChallengeStrategy,
    #[serde(default)]
    envelope_values: Vec<f64>,
}

impl Default for ChallengeSettings {
    fn default() -> Self {
        let baseline = SavingsChallenge::baseline();
        Self {
            target_goal: baseline.target_goal(),
            strategy: baseline.strategy(),
            envelope_values: baseline.values().to_vec(),
        }
    }
}

fn default_schema_version() -> u8 {
    CURRENT_SCHEMA_VERSION
}

fn default_goal() -> f64 {
    BASELINE_GOAL
}

fn default_strategy() -> ChallengeStrategy {
    ChallengeStrategy::MoreEnvelopes
}

impl From<StateDocument> for AppState {
    fn from(doc: StateDocument) -> Self {
        let settings = doc.challenge_settings;
        // Documents that only name a goal get their envelopes regenerated.
        // A goal that cannot be generated falls back to the whole baseline.
        let challenge = if settings.envelope_values.is_empty() {
            let generated = SavingsChallenge::generate(settings.target_goal, settings.strategy)
                .unwrap_or_else(|_| SavingsChallenge::baseline());
            SavingsChallenge::from_parts(
                generated.target_goal(),
                generated.strategy(),
                generated.values().to_vec(),
                doc.envelopes,
            )
        } else {
            SavingsChallenge::from_parts(
                settings.target_goal,
                settings.strategy,
                settings.envelope_values,
                doc.envelopes,
            )
        };
        let decisions = doc
            .decisions
            .into_iter()
            .map(|mut record| {
                record.context = record.context.normalized();
                record
            })
            .collect();
        let quarantine = doc
            .waiting_items
            .into_iter()
            .map(|mut item| {
                item.context = item.context.normalized();
                item
            })
            .collect();
        Self {
            schema_version: doc.schema_version,
            onboarded: doc.onboarded,
            profile: doc.settings,
            challenge,
            decisions,
            quarantine,
            updated_at: doc.updated_at,
        }
    }
}

impl From<AppState> for StateDocument {
    fn from(state: AppState) -> Self {
        Self {
            schema_version: state.schema_version,
            onboarded: state.onboarded,
            settings: state.profile,
            challenge_settings: ChallengeSettings {
                target_goal: state.challenge.target_goal(),
                strategy: state.challenge.strategy(),
                envelope_values: state.challenge.values().to_vec(),
            },
            envelopes: state.challenge.filled().to_vec(),
            decisions: state.decisions,
            waiting_items: state.quarantine,
            updated_at: state.updated_at,
        }
    }
}
