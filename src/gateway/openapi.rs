//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::OpenApi;

use crate::account::Account;
use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{
    CreateAccountRequest, DeletedData, TransferRequest, UpdateAccountRequest,
};
use crate::transfer::{Entry, Transfer, TransferTxResult};

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Simple Bank API",
        version = "1.0.0",
        description = "Accounts, ledger entries and atomic money transfers.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        crate::gateway::handlers::create_account,
        crate::gateway::handlers::list_accounts,
        crate::gateway::handlers::get_account,
        crate::gateway::handlers::update_account,
        crate::gateway::handlers::delete_account,
        crate::gateway::handlers::create_transfer,
        crate::gateway::handlers::get_transfer,
        crate::gateway::handlers::get_entry,
    ),
    components(
        schemas(
            HealthResponse,
            Account,
            Entry,
            Transfer,
            TransferTxResult,
            CreateAccountRequest,
            UpdateAccountRequest,
            TransferRequest,
            DeletedData,
        )
    ),
    tags(
        (name = "Account", description = "Account management"),
        (name = "Transfer", description = "Money transfers and ledger entries"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
