//! Gateway types module
//!
//! - [`request`]: Request DTOs and validation
//! - [`response`]: Response envelope and error codes
//! - [`error`]: `ApiError` and the status mapping

pub mod error;
pub mod request;
pub mod response;

// Re-export commonly used types at module root
pub use error::{ApiError, ApiResult, ok};
pub use request::{
    CreateAccountRequest, ListAccountsQuery, TransferRequest, UpdateAccountRequest,
};
pub use response::{ApiResponse, DeletedData, error_codes};
