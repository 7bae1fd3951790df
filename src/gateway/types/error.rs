//! Handler error type
//!
//! `ApiError` carries the HTTP status and the envelope code; it renders as
//! `ApiResponse<()>` so every failure has the same shape as a success.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::response::{ApiResponse, error_codes};
use crate::account::ValidationError;
use crate::transfer::LedgerError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

/// Result type returned by every JSON handler
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Wrap `data` in a success envelope
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error_codes::NOT_FOUND, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            msg,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::error(self.code, self.msg))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::bad_request(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::bad_request(format!("Invalid JSON: {}", e.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        ApiError::bad_request(format!("Invalid query: {}", e.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self {
        ApiError::bad_request(format!("Invalid path: {}", e.body_text()))
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        match e.http_status() {
            400 => ApiError::bad_request(e.to_string()),
            404 => ApiError::not_found(e.to_string()),
            _ => {
                // Storage details stay in the log
                tracing::error!(error = %e, code = e.code(), "Request failed");
                ApiError::internal("internal error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_error_mapping() {
        let e = ApiError::from(LedgerError::not_found("account", 5));
        assert_eq!(e.status, StatusCode::NOT_FOUND);
        assert_eq!(e.code, error_codes::NOT_FOUND);

        let e = ApiError::from(LedgerError::Constraint("violates foreign key".into()));
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.code, error_codes::INTERNAL_ERROR);
        assert!(!e.msg.contains("foreign"));

        let e = ApiError::from(LedgerError::InvalidAmount(0));
        assert_eq!(e.status, StatusCode::BAD_REQUEST);

        let e = ApiError::from(LedgerError::Storage("disk on fire".into()));
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!e.msg.contains("disk"));
    }

    #[tokio::test]
    async fn test_transfer_to_vanished_account_is_internal_error() {
        use crate::account::CreateAccountParams;
        use crate::transfer::{LedgerStore, MemoryBackend, Store, TransferTxParams};

        let store = LedgerStore::new(MemoryBackend::new(), None);
        let from = store
            .create_account(CreateAccountParams {
                owner: "alice".to_string(),
                balance: 50,
                currency: "USD".to_string(),
            })
            .await
            .unwrap();

        let err = store
            .transfer_tx(TransferTxParams {
                from_account_id: from.id,
                to_account_id: 777,
                amount: 10,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Constraint(_)));

        let e = ApiError::from(err);
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.code, error_codes::INTERNAL_ERROR);
    }

    #[test]
    fn test_validation_error_is_bad_request() {
        let e = ApiError::from(ValidationError::UnsupportedCurrency("XYZ".into()));
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.code, error_codes::INVALID_PARAMETER);
        assert!(e.msg.contains("XYZ"));
    }
}
