//! In-process transactional ledger store
//!
//! Mirrors the guarantees the transfer engine expects from PostgreSQL:
//!
//! - **Row locks**: `add_account_balance`, `update_account` and
//!   `delete_account` take a per-account lock held until commit/rollback.
//!   Re-locking a row the transaction already holds is a no-op.
//! - **Isolation**: writes are buffered in the transaction and invisible to
//!   other handles until commit (read committed).
//! - **Atomic commit**: the whole write set is published under one write
//!   guard, then row locks are released.
//! - **Lock wait timeout**: a lock that can't be acquired within
//!   `lock_timeout` fails the statement with `LockTimeout` instead of
//!   waiting forever.
//!
//! `inject_fault` arms one-shot failures at named points for tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

use super::error::LedgerError;
use super::queries::LedgerQueries;
use super::scope::TxBackend;
use super::types::{CreateEntryParams, CreateTransferParams, Entry, Transfer};
use crate::account::{
    Account, AddAccountBalanceParams, CreateAccountParams, ListAccountsParams,
    UpdateAccountParams,
};

/// Default wait for a contended row lock
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Places where a one-shot failure can be injected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    Begin,
    CreateTransfer,
    CreateEntry,
    AddBalance,
    Commit,
    Rollback,
}

struct Shared {
    accounts: DashMap<i64, Account>,
    entries: DashMap<i64, Entry>,
    transfers: DashMap<i64, Transfer>,
    row_locks: DashMap<i64, Arc<Mutex<()>>>,
    /// Readers take it shared; commit takes it exclusive to publish a write set
    commit_gate: RwLock<()>,
    next_account_id: AtomicI64,
    next_entry_id: AtomicI64,
    next_transfer_id: AtomicI64,
    lock_timeout: Duration,
    /// FaultPoint -> number of hits to let through before failing once
    faults: DashMap<FaultPoint, u32>,
    open_txs: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

impl Shared {
    fn check_fault(&self, point: FaultPoint) -> Result<(), LedgerError> {
        // Decrement and removal happen under one shard lock.
        match self.faults.entry(point) {
            MapEntry::Occupied(mut skip) if *skip.get() > 0 => {
                *skip.get_mut() -= 1;
                Ok(())
            }
            MapEntry::Occupied(armed) => {
                armed.remove();
                Err(LedgerError::Storage(format!("injected fault at {:?}", point)))
            }
            MapEntry::Vacant(_) => Ok(()),
        }
    }
}

/// In-process backend; cheap to clone, clones share the same data
#[derive(Clone)]
pub struct MemoryBackend {
    shared: Arc<Shared>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_lock_timeout(DEFAULT_LOCK_TIMEOUT)
    }

    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                accounts: DashMap::new(),
                entries: DashMap::new(),
                transfers: DashMap::new(),
                row_locks: DashMap::new(),
                commit_gate: RwLock::new(()),
                next_account_id: AtomicI64::new(1),
                next_entry_id: AtomicI64::new(1),
                next_transfer_id: AtomicI64::new(1),
                lock_timeout,
                faults: DashMap::new(),
                open_txs: AtomicUsize::new(0),
                commits: AtomicUsize::new(0),
                rollbacks: AtomicUsize::new(0),
            }),
        }
    }

    /// Fail the (`skip` + 1)-th hit of `point`, once
    pub fn inject_fault(&self, point: FaultPoint, skip: u32) {
        self.shared.faults.insert(point, skip);
    }

    pub fn open_transactions(&self) -> usize {
        self.shared.open_txs.load(Ordering::SeqCst)
    }

    pub fn commit_count(&self) -> usize {
        self.shared.commits.load(Ordering::SeqCst)
    }

    pub fn rollback_count(&self) -> usize {
        self.shared.rollbacks.load(Ordering::SeqCst)
    }

    pub fn account_count(&self) -> usize {
        self.shared.accounts.len()
    }

    pub fn entry_count(&self) -> usize {
        self.shared.entries.len()
    }

    pub fn transfer_count(&self) -> usize {
        self.shared.transfers.len()
    }

    pub fn committed_account(&self, id: i64) -> Option<Account> {
        self.shared.accounts.get(&id).map(|a| a.value().clone())
    }

    /// Sum of all committed balances
    pub fn total_balance(&self) -> i64 {
        self.shared.accounts.iter().map(|a| a.balance).sum()
    }
}

#[async_trait]
impl TxBackend for MemoryBackend {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, LedgerError> {
        self.shared.check_fault(FaultPoint::Begin)?;
        self.shared.open_txs.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryTx {
            shared: Arc::clone(&self.shared),
            guards: HashMap::new(),
            accounts: BTreeMap::new(),
            created: BTreeSet::new(),
            deleted: BTreeSet::new(),
            entries: Vec::new(),
            transfers: Vec::new(),
            committed: false,
        })
    }

    async fn commit(&self, mut tx: MemoryTx) -> Result<(), LedgerError> {
        // On failure `tx` is dropped here, which discards the write set.
        self.shared.check_fault(FaultPoint::Commit)?;

        {
            let _gate = self.shared.commit_gate.write().await;
            for id in std::mem::take(&mut tx.deleted) {
                self.shared.accounts.remove(&id);
                self.shared.row_locks.remove(&id);
            }
            for (id, account) in std::mem::take(&mut tx.accounts) {
                self.shared.accounts.insert(id, account);
            }
            for entry in std::mem::take(&mut tx.entries) {
                self.shared.entries.insert(entry.id, entry);
            }
            for transfer in std::mem::take(&mut tx.transfers) {
                self.shared.transfers.insert(transfer.id, transfer);
            }
            tx.committed = true;
        }

        self.shared.commits.fetch_add(1, Ordering::SeqCst);
        // Row locks are released only now, after the write set is visible.
        drop(tx);
        Ok(())
    }

    async fn rollback(&self, tx: MemoryTx) -> Result<(), LedgerError> {
        self.shared.check_fault(FaultPoint::Rollback)?;
        drop(tx);
        self.shared.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn ping(&self) -> Result<(), LedgerError> {
        Ok(())
    }
}

/// Open transaction on a [`MemoryBackend`]
pub struct MemoryTx {
    shared: Arc<Shared>,
    guards: HashMap<i64, OwnedMutexGuard<()>>,
    /// Account rows inserted or modified by this transaction
    accounts: BTreeMap<i64, Account>,
    created: BTreeSet<i64>,
    deleted: BTreeSet<i64>,
    entries: Vec<Entry>,
    transfers: Vec<Transfer>,
    committed: bool,
}

impl Drop for MemoryTx {
    fn drop(&mut self) {
        if !self.committed {
            for id in &self.created {
                self.shared.row_locks.remove(id);
            }
        }
        self.shared.open_txs.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MemoryTx {
    /// Every statement is a suspension point, like a round trip to a server
    async fn statement(&self) {
        tokio::task::yield_now().await;
    }

    async fn lock_row(&mut self, id: i64) -> Result<(), LedgerError> {
        if self.guards.contains_key(&id) {
            return Ok(());
        }

        let lock = self
            .shared
            .row_locks
            .get(&id)
            .map(|l| Arc::clone(l.value()))
            .ok_or_else(|| LedgerError::not_found("account", id))?;

        let guard = tokio::time::timeout(self.shared.lock_timeout, lock.lock_owned())
            .await
            .map_err(|_| LedgerError::LockTimeout(id))?;

        debug!(account_id = id, "Row lock acquired");
        self.guards.insert(id, guard);
        Ok(())
    }

    /// Account as seen by this transaction
    async fn visible_account(&self, id: i64) -> Option<Account> {
        if self.deleted.contains(&id) {
            return None;
        }
        if let Some(account) = self.accounts.get(&id) {
            return Some(account.clone());
        }
        let _gate = self.shared.commit_gate.read().await;
        self.shared.accounts.get(&id).map(|a| a.value().clone())
    }

    async fn require_account(&self, id: i64) -> Result<Account, LedgerError> {
        self.visible_account(id)
            .await
            .ok_or_else(|| LedgerError::not_found("account", id))
    }

    /// Foreign-key check for rows that reference `accounts`
    async fn check_reference(&self, table: &str, account_id: i64) -> Result<(), LedgerError> {
        if self.visible_account(account_id).await.is_none() {
            return Err(LedgerError::Constraint(format!(
                "insert on {} references missing account {}",
                table, account_id
            )));
        }
        Ok(())
    }

    async fn is_referenced(&self, account_id: i64) -> bool {
        let local = self.entries.iter().any(|e| e.account_id == account_id)
            || self
                .transfers
                .iter()
                .any(|t| t.from_account_id == account_id || t.to_account_id == account_id);
        if local {
            return true;
        }
        let _gate = self.shared.commit_gate.read().await;
        self.shared.entries.iter().any(|e| e.account_id == account_id)
            || self
                .shared
                .transfers
                .iter()
                .any(|t| t.from_account_id == account_id || t.to_account_id == account_id)
    }
}

#[async_trait]
impl LedgerQueries for MemoryTx {
    async fn create_account(
        &mut self,
        params: CreateAccountParams,
    ) -> Result<Account, LedgerError> {
        self.statement().await;

        let id = self.shared.next_account_id.fetch_add(1, Ordering::SeqCst);
        let lock = Arc::new(Mutex::new(()));
        let guard = Arc::clone(&lock)
            .try_lock_owned()
            .map_err(|_| LedgerError::Storage(format!("fresh row lock {} already held", id)))?;
        self.shared.row_locks.insert(id, lock);
        self.guards.insert(id, guard);

        let account = Account {
            id,
            owner: params.owner,
            balance: params.balance,
            currency: params.currency,
            created_at: Utc::now(),
        };
        self.created.insert(id);
        self.accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn get_account(&mut self, id: i64) -> Result<Account, LedgerError> {
        self.statement().await;
        self.require_account(id).await
    }

    async fn list_accounts(
        &mut self,
        params: ListAccountsParams,
    ) -> Result<Vec<Account>, LedgerError> {
        self.statement().await;

        let mut rows: BTreeMap<i64, Account> = {
            let _gate = self.shared.commit_gate.read().await;
            self.shared
                .accounts
                .iter()
                .map(|a| (*a.key(), a.value().clone()))
                .collect()
        };
        for (id, account) in &self.accounts {
            rows.insert(*id, account.clone());
        }
        for id in &self.deleted {
            rows.remove(id);
        }

        let offset = usize::try_from(params.offset).unwrap_or(0);
        let limit = usize::try_from(params.limit).unwrap_or(0);
        Ok(rows.into_values().skip(offset).take(limit).collect())
    }

    async fn update_account(
        &mut self,
        params: UpdateAccountParams,
    ) -> Result<Account, LedgerError> {
        self.statement().await;
        self.lock_row(params.id).await?;

        let mut account = self.require_account(params.id).await?;
        account.owner = params.owner;
        account.balance = params.balance;
        account.currency = params.currency;
        self.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn delete_account(&mut self, id: i64) -> Result<(), LedgerError> {
        self.statement().await;
        self.lock_row(id).await?;
        self.require_account(id).await?;

        if self.is_referenced(id).await {
            return Err(LedgerError::Constraint(format!(
                "account {} is still referenced by ledger rows",
                id
            )));
        }
        self.accounts.remove(&id);
        self.deleted.insert(id);
        Ok(())
    }

    async fn add_account_balance(
        &mut self,
        params: AddAccountBalanceParams,
    ) -> Result<Account, LedgerError> {
        self.shared.check_fault(FaultPoint::AddBalance)?;
        self.statement().await;
        self.lock_row(params.id).await?;

        let mut account = self.require_account(params.id).await?;
        account.balance = account
            .balance
            .checked_add(params.amount)
            .ok_or_else(|| LedgerError::Storage(format!("bigint out of range on account {}", params.id)))?;
        self.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn create_entry(&mut self, params: CreateEntryParams) -> Result<Entry, LedgerError> {
        self.shared.check_fault(FaultPoint::CreateEntry)?;
        self.statement().await;
        self.check_reference("entries", params.account_id).await?;

        let entry = Entry {
            id: self.shared.next_entry_id.fetch_add(1, Ordering::SeqCst),
            account_id: params.account_id,
            amount: params.amount,
            created_at: Utc::now(),
        };
        self.entries.push(entry.clone());
        Ok(entry)
    }

    async fn get_entry(&mut self, id: i64) -> Result<Entry, LedgerError> {
        self.statement().await;
        if let Some(entry) = self.entries.iter().find(|e| e.id == id) {
            return Ok(entry.clone());
        }
        let _gate = self.shared.commit_gate.read().await;
        self.shared
            .entries
            .get(&id)
            .map(|e| e.value().clone())
            .ok_or_else(|| LedgerError::not_found("entry", id))
    }

    async fn create_transfer(
        &mut self,
        params: CreateTransferParams,
    ) -> Result<Transfer, LedgerError> {
        self.shared.check_fault(FaultPoint::CreateTransfer)?;
        self.statement().await;
        if params.amount <= 0 {
            return Err(LedgerError::Constraint(format!(
                "transfers amount must be positive, got {}",
                params.amount
            )));
        }
        self.check_reference("transfers", params.from_account_id).await?;
        self.check_reference("transfers", params.to_account_id).await?;

        let transfer = Transfer {
            id: self.shared.next_transfer_id.fetch_add(1, Ordering::SeqCst),
            from_account_id: params.from_account_id,
            to_account_id: params.to_account_id,
            amount: params.amount,
            created_at: Utc::now(),
        };
        self.transfers.push(transfer.clone());
        Ok(transfer)
    }

    async fn get_transfer(&mut self, id: i64) -> Result<Transfer, LedgerError> {
        self.statement().await;
        if let Some(transfer) = self.transfers.iter().find(|t| t.id == id) {
            return Ok(transfer.clone());
        }
        let _gate = self.shared.commit_gate.read().await;
        self.shared
            .transfers
            .get(&id)
            .map(|t| t.value().clone())
            .ok_or_else(|| LedgerError::not_found("transfer", id))
    }
}
