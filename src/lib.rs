#![doc(test(attr(deny(warnings))))]

//! Expense Core keeps a local mirror of a user's finance document in sync with
//! a remote document store, and derives the income-cycle balance and reports
//! shown on top of it.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

pub use crate::core::{
    session::AuthSession,
    sync_store::{StoreState, SyncStore},
};
pub use errors::{Result, StoreError};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Expense Core tracing initialized.");
    });
}
