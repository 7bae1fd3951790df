//! simple_bank - ledger-style banking backend
//!
//! Accounts hold a balance; money moves only through transfers, each of
//! which writes one transfer record, a debit entry, a credit entry and two
//! balance updates in a single database transaction.
//!
//! # Modules
//!
//! - [`account`] - Account rows, parameters and input validation
//! - [`transfer`] - Transaction scope, transfer executor and ledger backends
//! - [`db`] - PostgreSQL pool and migrations
//! - [`gateway`] - HTTP API (axum)
//! - [`config`] - YAML configuration
//! - [`logging`] - tracing subscriber setup

pub mod account;
pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod transfer;

// Convenient re-exports at crate root
pub use account::{Account, Currency, ValidationError};
pub use transfer::{
    LedgerError, LedgerStore, MemoryBackend, PgBackend, Store, TransferExecutor,
    TransferTxParams, TransferTxResult,
};
