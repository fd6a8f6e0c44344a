pub mod decision_engine;
pub mod errors;
pub mod ledger_store;
pub mod services;
pub mod time;
pub mod utils;

pub use decision_engine::{DecisionEngine, DecisionState, Evaluation, EvaluationOrigin};
pub use ledger_store::LedgerStore;
