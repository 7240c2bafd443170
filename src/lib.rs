#![doc(test(attr(deny(warnings))))]

//! Contribution Ledger records money contributions in US dollars and Cambodian
//! riel, keeps them in a durable key-value store, and turns them into CSV
//! exports and a printable HTML report.

pub mod cli;
pub mod config;
pub mod core;
pub mod csv;
pub mod currency;
pub mod errors;
pub mod ledger;
pub mod notify;
pub mod report;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!(build = %utils::build_info::current().summary(), "contribution ledger tracing initialized");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
