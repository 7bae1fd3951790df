//! Request DTOs and their validation
//!
//! Each request deserializes loosely, then `validate()` turns it into the
//! core parameter type or a [`ValidationError`].

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::account::validation::{at_least, in_range, positive_id};
use crate::account::{
    CreateAccountParams, Currency, ListAccountsParams, OwnerName, UpdateAccountParams,
    ValidationError,
};
use crate::transfer::TransferTxParams;

pub const MIN_PAGE_SIZE: i64 = 5;
pub const MAX_PAGE_SIZE: i64 = 10;

/// Open a new account with zero balance
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAccountRequest {
    #[schema(example = "alice")]
    pub owner: String,
    #[schema(example = "USD")]
    pub currency: String,
}

impl CreateAccountRequest {
    pub fn validate(self) -> Result<CreateAccountParams, ValidationError> {
        let owner = OwnerName::new(&self.owner)?;
        let currency = Currency::new(&self.currency)?;
        Ok(CreateAccountParams {
            owner: owner.into_string(),
            balance: 0,
            currency: currency.into_string(),
        })
    }
}

/// Replace every mutable column of an account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateAccountRequest {
    #[schema(example = "alice")]
    pub owner: String,
    #[schema(example = 5000)]
    pub balance: i64,
    #[schema(example = "EUR")]
    pub currency: String,
}

impl UpdateAccountRequest {
    pub fn validate(self, id: i64) -> Result<UpdateAccountParams, ValidationError> {
        let id = positive_id("id", id)?;
        let owner = OwnerName::new(&self.owner)?;
        let currency = Currency::new(&self.currency)?;
        Ok(UpdateAccountParams {
            id,
            owner: owner.into_string(),
            balance: self.balance,
            currency: currency.into_string(),
        })
    }
}

/// 1-based paging over accounts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListAccountsQuery {
    /// Page number, starting at 1
    pub page_id: i64,
    /// Rows per page, 5 to 10
    pub page_size: i64,
}

impl ListAccountsQuery {
    pub fn validate(self) -> Result<ListAccountsParams, ValidationError> {
        let page_id = at_least_one("page_id", self.page_id)?;
        let page_size = in_range("page_size", self.page_size, MIN_PAGE_SIZE, MAX_PAGE_SIZE)?;
        Ok(ListAccountsParams {
            limit: page_size,
            offset: (page_id - 1) * page_size,
        })
    }
}

fn at_least_one(field: &'static str, value: i64) -> Result<i64, ValidationError> {
    // bounded so the offset can't overflow
    in_range(field, value, 1, i64::MAX / MAX_PAGE_SIZE)
}

/// Money movement between two accounts of the same currency
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransferRequest {
    #[schema(example = 1)]
    pub from_account_id: i64,
    #[schema(example = 2)]
    pub to_account_id: i64,
    /// Minor currency units
    #[schema(example = 10)]
    pub amount: i64,
    #[schema(example = "USD")]
    pub currency: String,
}

impl TransferRequest {
    /// Shape checks only; account existence and currency match need the store
    pub fn validate(&self) -> Result<(TransferTxParams, Currency), ValidationError> {
        let params = TransferTxParams {
            from_account_id: positive_id("from_account_id", self.from_account_id)?,
            to_account_id: positive_id("to_account_id", self.to_account_id)?,
            amount: at_least("amount", self.amount, 1)?,
        };
        Ok((params, Currency::new(&self.currency)?))
    }
}
