//! PostgreSQL ledger backend
//!
//! One `PgTx` wraps one `sqlx::Transaction`; every query runs on `&mut *tx`
//! so it joins that transaction. `UPDATE ... SET balance = balance + $1`
//! takes the row lock, which PostgreSQL holds until commit/rollback.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::error::LedgerError;
use super::queries::LedgerQueries;
use super::scope::TxBackend;
use super::types::{CreateEntryParams, CreateTransferParams, Entry, Transfer};
use crate::account::{
    Account, AccountRepository, AddAccountBalanceParams, CreateAccountParams, ListAccountsParams,
    UpdateAccountParams,
};

/// Hands out transactions from a connection pool
#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TxBackend for PgBackend {
    type Tx = PgTx;

    async fn begin(&self) -> Result<PgTx, LedgerError> {
        let tx = self.pool.begin().await?;
        Ok(PgTx { tx })
    }

    async fn commit(&self, tx: PgTx) -> Result<(), LedgerError> {
        tx.tx.commit().await?;
        Ok(())
    }

    async fn rollback(&self, tx: PgTx) -> Result<(), LedgerError> {
        tx.tx.rollback().await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), LedgerError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Open PostgreSQL transaction
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerQueries for PgTx {
    async fn create_account(
        &mut self,
        params: CreateAccountParams,
    ) -> Result<Account, LedgerError> {
        Ok(AccountRepository::create(&mut self.tx, &params).await?)
    }

    async fn get_account(&mut self, id: i64) -> Result<Account, LedgerError> {
        AccountRepository::get_by_id(&mut self.tx, id)
            .await?
            .ok_or_else(|| LedgerError::not_found("account", id))
    }

    async fn list_accounts(
        &mut self,
        params: ListAccountsParams,
    ) -> Result<Vec<Account>, LedgerError> {
        Ok(AccountRepository::list(&mut self.tx, params).await?)
    }

    async fn update_account(
        &mut self,
        params: UpdateAccountParams,
    ) -> Result<Account, LedgerError> {
        AccountRepository::update(&mut self.tx, &params)
            .await?
            .ok_or_else(|| LedgerError::not_found("account", params.id))
    }

    async fn delete_account(&mut self, id: i64) -> Result<(), LedgerError> {
        if AccountRepository::delete(&mut self.tx, id).await? {
            Ok(())
        } else {
            Err(LedgerError::not_found("account", id))
        }
    }

    async fn add_account_balance(
        &mut self,
        params: AddAccountBalanceParams,
    ) -> Result<Account, LedgerError> {
        AccountRepository::add_balance(&mut self.tx, params)
            .await?
            .ok_or_else(|| LedgerError::not_found("account", params.id))
    }

    async fn create_entry(&mut self, params: CreateEntryParams) -> Result<Entry, LedgerError> {
        let entry = sqlx::query_as::<_, Entry>(
            r#"
            INSERT INTO entries_tb (account_id, amount)
            VALUES ($1, $2)
            RETURNING id, account_id, amount, created_at
            "#,
        )
        .bind(params.account_id)
        .bind(params.amount)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(entry)
    }

    async fn get_entry(&mut self, id: i64) -> Result<Entry, LedgerError> {
        sqlx::query_as::<_, Entry>(
            "SELECT id, account_id, amount, created_at FROM entries_tb WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| LedgerError::not_found("entry", id))
    }

    async fn create_transfer(
        &mut self,
        params: CreateTransferParams,
    ) -> Result<Transfer, LedgerError> {
        let transfer = sqlx::query_as::<_, Transfer>(
            r#"
            INSERT INTO transfers_tb (from_account_id, to_account_id, amount)
            VALUES ($1, $2, $3)
            RETURNING id, from_account_id, to_account_id, amount, created_at
            "#,
        )
        .bind(params.from_account_id)
        .bind(params.to_account_id)
        .bind(params.amount)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(transfer)
    }

    async fn get_transfer(&mut self, id: i64) -> Result<Transfer, LedgerError> {
        sqlx::query_as::<_, Transfer>(
            r#"
            SELECT id, from_account_id, to_account_id, amount, created_at
            FROM transfers_tb
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| LedgerError::not_found("transfer", id))
    }
}
