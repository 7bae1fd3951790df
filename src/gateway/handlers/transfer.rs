//! Transfer handlers and ledger row lookups

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, TransferRequest, error_codes, ok};
use crate::account::Currency;
use crate::account::validation::positive_id;
use crate::transfer::{Entry, Transfer, TransferTxResult};

/// Move money between two accounts of the same currency
///
/// Both accounts are looked up one after the other; the first lookup that
/// fails decides the response.
#[utoipa::path(
    post,
    path = "/api/v1/transfers",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Transfer committed", body = TransferTxResult, content_type = "application/json"),
        (status = 400, description = "Invalid parameters or currency mismatch"),
        (status = 404, description = "Account not found"),
        (status = 500, description = "Transfer rolled back (storage or constraint failure)")
    ),
    tag = "Transfer"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult<TransferTxResult> {
    let Json(req) = body?;
    let (params, currency) = req.validate()?;

    validate_account(&state, params.from_account_id, &currency).await?;
    validate_account(&state, params.to_account_id, &currency).await?;

    let result = state.store.transfer_tx(params).await?;
    ok(result)
}

async fn validate_account(
    state: &AppState,
    account_id: i64,
    currency: &Currency,
) -> Result<(), ApiError> {
    let account = state.store.get_account(account_id).await?;
    if account.currency != currency.as_str() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            error_codes::CURRENCY_MISMATCH,
            format!(
                "account [{}] currency mismatch: {} vs {}",
                account_id, account.currency, currency
            ),
        ));
    }
    Ok(())
}

/// Get one transfer record
#[utoipa::path(
    get,
    path = "/api/v1/transfers/{id}",
    params(("id" = i64, Path, description = "Transfer ID")),
    responses(
        (status = 200, description = "Transfer", body = Transfer, content_type = "application/json"),
        (status = 404, description = "Transfer not found")
    ),
    tag = "Transfer"
)]
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Transfer> {
    let Path(id) = path?;
    let id = positive_id("id", id)?;
    ok(state.store.get_transfer(id).await?)
}

/// Get one ledger entry
#[utoipa::path(
    get,
    path = "/api/v1/entries/{id}",
    params(("id" = i64, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Entry", body = Entry, content_type = "application/json"),
        (status = 404, description = "Entry not found")
    ),
    tag = "Transfer"
)]
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Entry> {
    let Path(id) = path?;
    let id = positive_id("id", id)?;
    ok(state.store.get_entry(id).await?)
}
