//! Data models for bank accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Bank account row
///
/// `balance` is kept in minor currency units (cents) and may go negative:
/// no floor is enforced by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Account {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "alice")]
    pub owner: String,
    #[schema(example = 10000)]
    pub balance: i64,
    #[schema(example = "USD")]
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// Parameters for inserting a new account
#[derive(Debug, Clone)]
pub struct CreateAccountParams {
    pub owner: String,
    pub balance: i64,
    pub currency: String,
}

/// Whole-row replacement of an existing account
#[derive(Debug, Clone)]
pub struct UpdateAccountParams {
    pub id: i64,
    pub owner: String,
    pub balance: i64,
    pub currency: String,
}

/// Page of accounts ordered by id
#[derive(Debug, Clone, Copy)]
pub struct ListAccountsParams {
    pub limit: i64,
    pub offset: i64,
}

/// Signed balance delta applied to one account
#[derive(Debug, Clone, Copy)]
pub struct AddAccountBalanceParams {
    pub id: i64,
    pub amount: i64,
}
