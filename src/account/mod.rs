//! Bank accounts
//!
//! Row model, input validation, and the PostgreSQL statements for the
//! `accounts_tb` table.

pub mod models;
pub mod repository;
pub mod validation;

// Re-export commonly used types
pub use models::{
    Account, AddAccountBalanceParams, CreateAccountParams, ListAccountsParams,
    UpdateAccountParams,
};
pub use repository::AccountRepository;
pub use validation::{Currency, OwnerName, ValidationError};
