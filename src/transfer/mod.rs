//! Ledger core: atomic funds transfer
//!
//! # Architecture
//!
//! ```text
//! Store (facade)
//!   └─ TransferExecutor ── run_in_transaction ── TxBackend::begin/commit/rollback
//!                                │
//!                                └─ LedgerQueries (rows + balance updates on one tx)
//!                                      ├─ PgTx      (PostgreSQL)
//!                                      └─ MemoryTx  (in-process)
//! ```
//!
//! # Safety Invariants
//!
//! 1. **All or nothing**: the transfer row, both entries and both balance
//!    updates commit together or not at all
//! 2. **Lock order**: balance updates always lock the lower account id first
//! 3. **Conservation**: the debit entry is exactly the negation of the credit
//!    entry, so the sum of all balances never changes
//! 4. **No overdraft check**: balances may go negative

pub mod db;
pub mod error;
pub mod executor;
pub mod memory;
pub mod queries;
pub mod scope;
pub mod store;
pub mod types;


// Re-exports for convenience
pub use db::{PgBackend, PgTx};
pub use error::LedgerError;
pub use executor::{TransferExecutor, transfer_steps};
pub use memory::{FaultPoint, MemoryBackend, MemoryTx};
pub use queries::LedgerQueries;
pub use scope::{TxBackend, run_in_transaction};
pub use store::{LedgerStore, Store};
pub use types::{
    CreateEntryParams, CreateTransferParams, Entry, Transfer, TransferTxParams, TransferTxResult,
};
