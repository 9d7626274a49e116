//! # Error Types
//!
//! Domain-specific error types for jobcost-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  jobcost-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  jobcost-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Desktop errors (in app)                                               │
//! │  ├── ReportError      - PDF generation failures                        │
//! │  └── ApiError         - What the UI sees (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → UI notification        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A machine type's custom field schema could not be interpreted.
    ///
    /// ## When This Occurs
    /// - The stored JSON is not an array of field descriptors
    /// - Two fields share a name
    /// - A `select` field declares no options
    #[error("Invalid custom fields schema: {reason}")]
    InvalidFieldSchema { reason: String },

    /// Machine entry custom data does not satisfy its machine type's schema.
    #[error("Invalid value for {field}: {reason}")]
    InvalidCustomData { field: String, reason: String },

    /// A job number did not match `JOB-YYYYMMDD-NNN`.
    #[error("Invalid job number: {0}")]
    InvalidJobNumber(String),

    /// A cost figure is too large to price safely.
    ///
    /// ## When This Occurs
    /// - quantity × rate does not fit in paise
    /// - The grand total is above [`crate::MAX_JOB_TOTAL_PAISE`]
    #[error("{field} exceeds the maximum of {max}")]
    AmountTooLarge { field: String, max: Money },

    /// Unknown report type requested.
    #[error("Unknown report type: {0}")]
    UnknownReportType(String),

    /// Validation error (wraps ValidationError).
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when form input doesn't meet requirements.
/// Used for early validation before anything touches the database.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be greater than 0")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (e.g., unparseable date, bad JSON).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// A reference (customer, item, ...) was not selected.
    #[error("Please select {what}")]
    NotSelected { what: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::MustBePositive {
            field: "Quantity".to_string(),
        };
        assert_eq!(err.to_string(), "Quantity must be greater than 0");

        let err = ValidationError::NotSelected {
            what: "a customer".to_string(),
        };
        assert_eq!(err.to_string(), "Please select a customer");
    }

    #[test]
    fn test_schema_error_message() {
        let err = CoreError::InvalidFieldSchema {
            reason: "duplicate field 'size'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid custom fields schema: duplicate field 'size'"
        );
    }

    #[test]
    fn test_amount_too_large_message() {
        let err = CoreError::AmountTooLarge {
            field: "Total".to_string(),
            max: Money::from_paise(crate::MAX_JOB_TOTAL_PAISE),
        };
        assert_eq!(
            err.to_string(),
            "Total exceeds the maximum of ₹1,00,00,00,00,000.00"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
