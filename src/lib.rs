#![doc(test(attr(deny(warnings))))]

//! Forecast Core expands recurring-payment rules, synthesizes implicit
//! schedules from structural account data (loans, credit cards, properties),
//! and projects account balances into the future.

pub mod currency;
pub mod domain;
pub mod errors;
pub mod forecast;
pub mod schedule;
pub mod transfers;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Forecast Core tracing initialized.");
    });
}
