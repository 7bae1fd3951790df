//! Ledger row types and transfer parameters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::account::Account;

/// Immutable signed ledger line attached to one account
///
/// Debits are negative, credits positive. Entries are only ever created in
/// pairs by a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Entry {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 1)]
    pub account_id: i64,
    #[schema(example = json!(-10))]
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Immutable record of a completed money movement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Transfer {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 1)]
    pub from_account_id: i64,
    #[schema(example = 2)]
    pub to_account_id: i64,
    #[schema(example = 10)]
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct CreateEntryParams {
    pub account_id: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct CreateTransferParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
}

/// Input of the atomic transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TransferTxParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    /// Minor currency units, strictly positive
    pub amount: i64,
}

/// Everything one committed transfer wrote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TransferTxResult {
    pub transfer: Transfer,
    pub from_account: Account,
    pub to_account: Account,
    pub from_entry: Entry,
    pub to_entry: Entry,
}

impl TransferTxResult {
    /// Debit and credit cancel out
    pub fn is_balanced(&self) -> bool {
        self.from_entry.amount + self.to_entry.amount == 0
            && self.to_entry.amount == self.transfer.amount
    }
}
