//! Store facade used by the HTTP layer
//!
//! Every call is its own transaction. `transfer_tx` delegates to
//! [`TransferExecutor`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::error::LedgerError;
use super::executor::TransferExecutor;
use super::queries::LedgerQueries;
use super::scope::{TxBackend, run_in_transaction};
use super::types::{Entry, Transfer, TransferTxParams, TransferTxResult};
use crate::account::{Account, CreateAccountParams, ListAccountsParams, UpdateAccountParams};

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_account(&self, params: CreateAccountParams) -> Result<Account, LedgerError>;

    async fn get_account(&self, id: i64) -> Result<Account, LedgerError>;

    async fn list_accounts(&self, params: ListAccountsParams)
    -> Result<Vec<Account>, LedgerError>;

    async fn update_account(&self, params: UpdateAccountParams) -> Result<Account, LedgerError>;

    async fn delete_account(&self, id: i64) -> Result<(), LedgerError>;

    async fn get_entry(&self, id: i64) -> Result<Entry, LedgerError>;

    async fn get_transfer(&self, id: i64) -> Result<Transfer, LedgerError>;

    /// Atomic transfer, see [`TransferExecutor::execute`]
    async fn transfer_tx(&self, params: TransferTxParams) -> Result<TransferTxResult, LedgerError>;

    async fn health_check(&self) -> Result<(), LedgerError>;
}

/// [`Store`] over any transactional backend
pub struct LedgerStore<B> {
    backend: Arc<B>,
    executor: TransferExecutor<B>,
}

impl<B: TxBackend> LedgerStore<B> {
    pub fn new(backend: B, transfer_timeout: Option<Duration>) -> Self {
        let backend = Arc::new(backend);
        let executor = TransferExecutor::new(Arc::clone(&backend)).with_timeout(transfer_timeout);
        Self { backend, executor }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[async_trait]
impl<B: TxBackend> Store for LedgerStore<B> {
    async fn create_account(&self, params: CreateAccountParams) -> Result<Account, LedgerError> {
        run_in_transaction(self.backend.as_ref(), move |q| {
            Box::pin(async move { q.create_account(params).await })
        })
        .await
    }

    async fn get_account(&self, id: i64) -> Result<Account, LedgerError> {
        run_in_transaction(self.backend.as_ref(), move |q| {
            Box::pin(async move { q.get_account(id).await })
        })
        .await
    }

    async fn list_accounts(
        &self,
        params: ListAccountsParams,
    ) -> Result<Vec<Account>, LedgerError> {
        run_in_transaction(self.backend.as_ref(), move |q| {
            Box::pin(async move { q.list_accounts(params).await })
        })
        .await
    }

    async fn update_account(&self, params: UpdateAccountParams) -> Result<Account, LedgerError> {
        run_in_transaction(self.backend.as_ref(), move |q| {
            Box::pin(async move { q.update_account(params).await })
        })
        .await
    }

    async fn delete_account(&self, id: i64) -> Result<(), LedgerError> {
        run_in_transaction(self.backend.as_ref(), move |q| {
            Box::pin(async move { q.delete_account(id).await })
        })
        .await
    }

    async fn get_entry(&self, id: i64) -> Result<Entry, LedgerError> {
        run_in_transaction(self.backend.as_ref(), move |q| {
            Box::pin(async move { q.get_entry(id).await })
        })
        .await
    }

    async fn get_transfer(&self, id: i64) -> Result<Transfer, LedgerError> {
        run_in_transaction(self.backend.as_ref(), move |q| {
            Box::pin(async move { q.get_transfer(id).await })
        })
        .await
    }

    async fn transfer_tx(&self, params: TransferTxParams) -> Result<TransferTxResult, LedgerError> {
        self.executor.execute(params).await
    }

    async fn health_check(&self) -> Result<(), LedgerError> {
        self.backend.ping().await
    }
}
