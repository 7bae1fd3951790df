//! Input validation for account fields
//!
//! Validated newtypes for currency codes and owner names, plus the
//! positive-id / positive-amount checks shared by the HTTP handlers.
//! All fields are private to force validation through the public API.

use std::fmt;

/// Currencies an account may be opened in
pub const SUPPORTED_CURRENCIES: [&str; 4] = ["USD", "EUR", "CAD", "AUD"];

// ============================================================================
// Validation Errors
// ============================================================================

/// Validation errors for account-facing input
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("Unsupported currency: '{0}' (expected one of USD, EUR, CAD, AUD)")]
    UnsupportedCurrency(String),

    #[error("Invalid length for {field}: expected {min}-{max}, got {actual}")]
    InvalidLength {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("{field} must be at least {min}, got {actual}")]
    TooSmall {
        field: &'static str,
        min: i64,
        actual: i64,
    },

    #[error("{field} must be at most {max}, got {actual}")]
    TooLarge {
        field: &'static str,
        max: i64,
        actual: i64,
    },
}

// ============================================================================
// Currency - Validated Currency Code (Private Fields)
// ============================================================================

/// Validated ISO currency code from the supported set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Currency(String);

impl Currency {
    /// Create a new validated Currency
    ///
    /// Codes are matched exactly: `usd` is rejected.
    ///
    /// # Examples
    /// ```
    /// use simple_bank::account::validation::Currency;
    ///
    /// let usd = Currency::new("USD").unwrap();
    /// assert_eq!(usd.as_str(), "USD");
    ///
    /// assert!(Currency::new("XYZ").is_err());
    /// ```
    pub fn new(code: &str) -> Result<Self, ValidationError> {
        if SUPPORTED_CURRENCIES.contains(&code) {
            Ok(Self(code.to_string()))
        } else {
            Err(ValidationError::UnsupportedCurrency(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Currency {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// OwnerName - Validated Owner Name (Private Fields)
// ============================================================================

/// Validated account owner name (trimmed, 1-64 chars)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerName(String);

impl OwnerName {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        let len = name.chars().count();
        if len == 0 || len > 64 {
            return Err(ValidationError::InvalidLength {
                field: "owner",
                min: 1,
                max: 64,
                actual: len,
            });
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for OwnerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Scalar checks
// ============================================================================

/// Row ids are BIGSERIAL, so anything below 1 can never match
pub fn positive_id(field: &'static str, id: i64) -> Result<i64, ValidationError> {
    at_least(field, id, 1)
}

/// Reject values below `min`
pub fn at_least(field: &'static str, value: i64, min: i64) -> Result<i64, ValidationError> {
    if value < min {
        return Err(ValidationError::TooSmall {
            field,
            min,
            actual: value,
        });
    }
    Ok(value)
}

/// Reject values outside `min..=max`
pub fn in_range(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<i64, ValidationError> {
    at_least(field, value, min)?;
    if value > max {
        return Err(ValidationError::TooLarge {
            field,
            max,
            actual: value,
        });
    }
    Ok(value)
}
