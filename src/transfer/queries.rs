//! Row-level primitives bound to one transactional handle
//!
//! Every method runs inside the transaction owned by the implementor, so a
//! write is only visible to other handles after that transaction commits.

use async_trait::async_trait;

use super::error::LedgerError;
use super::types::{CreateEntryParams, CreateTransferParams, Entry, Transfer};
use crate::account::{
    Account, AddAccountBalanceParams, CreateAccountParams, ListAccountsParams,
    UpdateAccountParams,
};

/// Ledger repository + balance updater over one open transaction
#[async_trait]
pub trait LedgerQueries: Send {
    // === Accounts ===

    async fn create_account(&mut self, params: CreateAccountParams)
    -> Result<Account, LedgerError>;

    async fn get_account(&mut self, id: i64) -> Result<Account, LedgerError>;

    async fn list_accounts(
        &mut self,
        params: ListAccountsParams,
    ) -> Result<Vec<Account>, LedgerError>;

    async fn update_account(&mut self, params: UpdateAccountParams)
    -> Result<Account, LedgerError>;

    async fn delete_account(&mut self, id: i64) -> Result<(), LedgerError>;

    /// Atomic read-modify-write of `balance += amount` on one row.
    ///
    /// Takes the row lock for the rest of the transaction. No floor is
    /// applied: the balance may go negative.
    async fn add_account_balance(
        &mut self,
        params: AddAccountBalanceParams,
    ) -> Result<Account, LedgerError>;

    // === Entries ===

    async fn create_entry(&mut self, params: CreateEntryParams) -> Result<Entry, LedgerError>;

    async fn get_entry(&mut self, id: i64) -> Result<Entry, LedgerError>;

    // === Transfers ===

    async fn create_transfer(
        &mut self,
        params: CreateTransferParams,
    ) -> Result<Transfer, LedgerError>;

    async fn get_transfer(&mut self, id: i64) -> Result<Transfer, LedgerError>;
}
