//! Account handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};

use super::super::state::AppState;
use super::super::types::{
    ApiResult, CreateAccountRequest, DeletedData, ListAccountsQuery, UpdateAccountRequest, ok,
};
use crate::account::Account;
use crate::account::validation::positive_id;

/// Open an account with zero balance
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 200, description = "Account created", body = Account, content_type = "application/json"),
        (status = 400, description = "Invalid owner or currency")
    ),
    tag = "Account"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> ApiResult<Account> {
    let Json(req) = body?;
    let params = req.validate()?;
    let account = state.store.create_account(params).await?;
    tracing::info!(account_id = account.id, owner = %account.owner, "Account created");
    ok(account)
}

/// Get one account
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}",
    params(("id" = i64, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account", body = Account, content_type = "application/json"),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Account not found")
    ),
    tag = "Account"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Account> {
    let Path(id) = path?;
    let id = positive_id("id", id)?;
    ok(state.store.get_account(id).await?)
}

/// Page through accounts ordered by id
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    params(ListAccountsQuery),
    responses(
        (status = 200, description = "Accounts page", body = Vec<Account>, content_type = "application/json"),
        (status = 400, description = "Invalid paging parameters")
    ),
    tag = "Account"
)]
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListAccountsQuery>, QueryRejection>,
) -> ApiResult<Vec<Account>> {
    let Query(query) = query?;
    let params = query.validate()?;
    ok(state.store.list_accounts(params).await?)
}

/// Replace owner, balance and currency
#[utoipa::path(
    put,
    path = "/api/v1/accounts/{id}",
    params(("id" = i64, Path, description = "Account ID")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Updated account", body = Account, content_type = "application/json"),
        (status = 400, description = "Invalid parameters"),
        (status = 404, description = "Account not found")
    ),
    tag = "Account"
)]
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> ApiResult<Account> {
    let Path(id) = path?;
    let Json(req) = body?;
    let params = req.validate(id)?;
    let account = state.store.update_account(params).await?;
    tracing::info!(account_id = account.id, balance = account.balance, "Account updated");
    ok(account)
}

/// Delete an account that no entry or transfer references
#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{id}",
    params(("id" = i64, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account deleted", body = DeletedData, content_type = "application/json"),
        (status = 404, description = "Account not found"),
        (status = 500, description = "Account still referenced by ledger rows")
    ),
    tag = "Account"
)]
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<DeletedData> {
    let Path(id) = path?;
    let id = positive_id("id", id)?;
    state.store.delete_account(id).await?;
    tracing::info!(account_id = id, "Account deleted");
    ok(DeletedData { id })
}
