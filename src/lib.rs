#![doc(test(attr(deny(warnings))))]

//! Quanto Custa turns prices into hours of work and keeps a small ledger of
//! purchase decisions: what was bought, what was skipped, what is still
//! cooling off in quarantine, and how a savings envelope challenge is going.

pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("Quanto Custa tracing initialized.");
    });
}
