//! Record types persisted by the store.

pub mod challenge;
pub mod common;
pub mod decision;
pub mod profile;
pub mod quarantine;
pub mod state;

pub use challenge::{ChallengeStrategy, EnvelopeToggle, SavingsChallenge};
pub use common::{IdGenerator, Identifiable, PurchaseContext, RecordId};
pub use decision::{DecisionAction, DecisionRecord};
pub use profile::Profile;
pub use quarantine::{QuarantineItem, ReminderNotice, WaitOption};
pub use state::{AppState, CURRENT_SCHEMA_VERSION};

// Re-export common dependencies so consumers can rely on this module as a façade.
pub use chrono;
pub use serde;
