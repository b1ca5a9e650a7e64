#![doc(test(attr(deny(warnings))))]

//! Fintrack Core keeps a personal-finance tracker's allocation figures
//! honest: earnings fund budgets, budgets absorb transactions, and a
//! scheduled scanner raises alerts when budgets run hot or expire.

pub mod config;
pub mod dates;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod money;
pub mod notify;
pub mod store;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Fintrack Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
