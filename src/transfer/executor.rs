//! Atomic funds transfer
//!
//! One transfer is five writes inside one transaction:
//!
//! ```text
//! 1. INSERT transfer (from, to, amount)
//! 2. INSERT entry    (from, -amount)
//! 3. INSERT entry    (to,   +amount)
//! 4. balance += delta on the lower account id   ─┐ row locks always taken
//! 5. balance += delta on the higher account id  ─┘ in ascending id order
//! ```
//!
//! Taking balance locks in a single global order means two transfers over
//! the same pair in opposite directions can never wait on each other in a
//! cycle.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::error::LedgerError;
use super::queries::LedgerQueries;
use super::scope::{TxBackend, run_in_transaction};
use super::types::{CreateEntryParams, CreateTransferParams, TransferTxParams, TransferTxResult};
use crate::account::{Account, AddAccountBalanceParams};

/// Runs transfers against a transactional backend
pub struct TransferExecutor<B> {
    backend: Arc<B>,
    timeout: Option<Duration>,
}

impl<B> Clone for TransferExecutor<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            timeout: self.timeout,
        }
    }
}

impl<B: TxBackend> TransferExecutor<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            timeout: None,
        }
    }

    /// Bound the whole transfer, lock waits included
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Move `amount` from one account to another, all or nothing.
    ///
    /// No overdraft check is made. `from == to` is accepted and nets to zero.
    pub async fn execute(&self, params: TransferTxParams) -> Result<TransferTxResult, LedgerError> {
        if params.amount <= 0 {
            return Err(LedgerError::InvalidAmount(params.amount));
        }

        let work = run_in_transaction(self.backend.as_ref(), move |q| {
            Box::pin(transfer_steps(q, params))
        });

        // Dropping `work` on deadline drops the open handle, which rolls it back.
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, work).await {
                Ok(result) => result,
                Err(_) => Err(LedgerError::Timeout(limit)),
            },
            None => work.await,
        };

        match &result {
            Ok(r) => info!(
                transfer_id = r.transfer.id,
                from_account_id = params.from_account_id,
                to_account_id = params.to_account_id,
                amount = params.amount,
                "Transfer committed"
            ),
            Err(e) => warn!(
                from_account_id = params.from_account_id,
                to_account_id = params.to_account_id,
                amount = params.amount,
                error = %e,
                "Transfer failed"
            ),
        }

        result
    }
}

/// The five writes of one transfer, on an already-open transaction
pub async fn transfer_steps<Q>(
    q: &mut Q,
    params: TransferTxParams,
) -> Result<TransferTxResult, LedgerError>
where
    Q: LedgerQueries + ?Sized,
{
    let TransferTxParams {
        from_account_id,
        to_account_id,
        amount,
    } = params;

    let transfer = q
        .create_transfer(CreateTransferParams {
            from_account_id,
            to_account_id,
            amount,
        })
        .await?;

    let from_entry = q
        .create_entry(CreateEntryParams {
            account_id: from_account_id,
            amount: -amount,
        })
        .await?;

    let to_entry = q
        .create_entry(CreateEntryParams {
            account_id: to_account_id,
            amount,
        })
        .await?;

    // On a self-transfer the debit goes first.
    let (from_account, to_account) = if from_account_id <= to_account_id {
        add_money(q, from_account_id, -amount, to_account_id, amount).await?
    } else {
        let (to_account, from_account) =
            add_money(q, to_account_id, amount, from_account_id, -amount).await?;
        (from_account, to_account)
    };

    Ok(TransferTxResult {
        transfer,
        from_account,
        to_account,
        from_entry,
        to_entry,
    })
}

async fn add_money<Q>(
    q: &mut Q,
    account_id1: i64,
    amount1: i64,
    account_id2: i64,
    amount2: i64,
) -> Result<(Account, Account), LedgerError>
where
    Q: LedgerQueries + ?Sized,
{
    let account1 = q
        .add_account_balance(AddAccountBalanceParams {
            id: account_id1,
            amount: amount1,
        })
        .await?;
    let account2 = q
        .add_account_balance(AddAccountBalanceParams {
            id: account_id2,
            amount: amount2,
        })
        .await?;
    Ok((account1, account2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{CreateAccountParams, ListAccountsParams, UpdateAccountParams};
    use crate::transfer::memory::MemoryBackend;
    use crate::transfer::types::{Entry, Transfer};
    use async_trait::async_trait;
    use chrono::Utc;

    /// Records the order of writes and fabricates rows
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    fn row(id: i64, balance: i64) -> Account {
        Account {
            id,
            owner: "rec".to_string(),
            balance,
            currency: "USD".to_string(),
            created_at: Utc::now(),
        }
    }

    #[async_trait]
    impl LedgerQueries for Recorder {
        async fn create_account(
            &mut self,
            _params: CreateAccountParams,
        ) -> Result<Account, LedgerError> {
            unreachable!()
        }

        async fn get_account(&mut self, _id: i64) -> Result<Account, LedgerError> {
            unreachable!()
        }

        async fn list_accounts(
            &mut self,
            _params: ListAccountsParams,
        ) -> Result<Vec<Account>, LedgerError> {
            unreachable!()
        }

        async fn update_account(
            &mut self,
            _params: UpdateAccountParams,
        ) -> Result<Account, LedgerError> {
            unreachable!()
        }

        async fn delete_account(&mut self, _id: i64) -> Result<(), LedgerError> {
            unreachable!()
        }

        async fn add_account_balance(
            &mut self,
            params: AddAccountBalanceParams,
        ) -> Result<Account, LedgerError> {
            self.calls
                .push(format!("balance {} {:+}", params.id, params.amount));
            Ok(row(params.id, params.amount))
        }

        async fn create_entry(&mut self, params: CreateEntryParams) -> Result<Entry, LedgerError> {
            self.calls
                .push(format!("entry {} {:+}", params.account_id, params.amount));
            Ok(Entry {
                id: self.calls.len() as i64,
                account_id: params.account_id,
                amount: params.amount,
                created_at: Utc::now(),
            })
        }

        async fn get_entry(&mut self, _id: i64) -> Result<Entry, LedgerError> {
            unreachable!()
        }

        async fn create_transfer(
            &mut self,
            params: CreateTransferParams,
        ) -> Result<Transfer, LedgerError> {
            self.calls.push(format!(
                "transfer {}->{} {}",
                params.from_account_id, params.to_account_id, params.amount
            ));
            Ok(Transfer {
                id: 1,
                from_account_id: params.from_account_id,
                to_account_id: params.to_account_id,
                amount: params.amount,
                created_at: Utc::now(),
            })
        }

        async fn get_transfer(&mut self, _id: i64) -> Result<Transfer, LedgerError> {
            unreachable!()
        }
    }

    fn params(from: i64, to: i64, amount: i64) -> TransferTxParams {
        TransferTxParams {
            from_account_id: from,
            to_account_id: to,
            amount,
        }
    }

    #[tokio::test]
    async fn test_write_order_low_to_high() {
        let mut rec = Recorder::default();
        let result = transfer_steps(&mut rec, params(1, 2, 10)).await.unwrap();

        assert_eq!(
            rec.calls,
            vec![
                "transfer 1->2 10",
                "entry 1 -10",
                "entry 2 +10",
                "balance 1 -10",
                "balance 2 +10",
            ]
        );
        assert_eq!(result.from_account.id, 1);
        assert_eq!(result.to_account.id, 2);
    }

    #[tokio::test]
    async fn test_write_order_high_to_low_locks_lower_id_first() {
        let mut rec = Recorder::default();
        let result = transfer_steps(&mut rec, params(7, 3, 5)).await.unwrap();

        assert_eq!(
            rec.calls,
            vec![
                "transfer 7->3 5",
                "entry 7 -5",
                "entry 3 +5",
                "balance 3 +5",
                "balance 7 -5",
            ]
        );
        // result fields are still reported by role, not by lock order
        assert_eq!(result.from_account.id, 7);
        assert_eq!(result.from_account.balance, -5);
        assert_eq!(result.to_account.id, 3);
        assert_eq!(result.to_account.balance, 5);
    }

    #[tokio::test]
    async fn test_self_transfer_debits_first() {
        let mut rec = Recorder::default();
        transfer_steps(&mut rec, params(4, 4, 1)).await.unwrap();
        assert_eq!(&rec.calls[3..], ["balance 4 -1", "balance 4 +1"]);
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected_before_begin() {
        let backend = Arc::new(MemoryBackend::new());
        let executor = TransferExecutor::new(Arc::clone(&backend));

        for amount in [0, -1] {
            let err = executor.execute(params(1, 2, amount)).await.unwrap_err();
            assert!(matches!(err, LedgerError::InvalidAmount(a) if a == amount));
        }
        assert_eq!(backend.commit_count(), 0);
        assert_eq!(backend.rollback_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_account_rolls_back() {
        let backend = Arc::new(MemoryBackend::new());
        let executor = TransferExecutor::new(Arc::clone(&backend));

        let err = executor.execute(params(1, 2, 10)).await.unwrap_err();
        assert!(matches!(err, LedgerError::Constraint(_)));
        assert_eq!(backend.rollback_count(), 1);
        assert_eq!(backend.transfer_count(), 0);
    }
}
