//! # API Error Type
//!
//! Unified error type returned to the UI for every channel.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in JobCost Pro                            │
//! │                                                                         │
//! │  UI                          Rust Backend                               │
//! │  ──                          ────────────                               │
//! │                                                                         │
//! │  invoke('categories:delete', [4])                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Channel handler                                                 │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::InUse { .. } ────────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Validation Error? ─── CoreError::Validation ──── ApiError ────►│  │
//! │  │         │                                          ▲            │  │
//! │  │         ▼                                          │            │  │
//! │  │  Report Error? ─── ReportError::MissingParameter ──┘            │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄────────────────────────────────────────────────────────────────────  │
//! │                                                                         │
//! │  { "ok": false, "error": {                                              │
//! │      "code": "BUSINESS_LOGIC",                                          │
//! │      "message": "Cannot delete category: 2 item(s) still ..." } }       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use crate::reports::ReportError;
use jobcost_core::{CoreError, ValidationError};
use jobcost_db::DbError;

/// API error returned from a channel.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Customer 12 not found"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Record not found
    NotFound,

    /// Input validation failed, duplicate name or bad reference
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Operation refused by a business rule (e.g. delete guard)
    BusinessLogic,

    /// Report could not be produced
    ReportError,

    /// Anything else
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            err @ DbError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, err.to_string()),
            err @ DbError::UniqueViolation { .. } => ApiError::validation(err.to_string()),
            err @ DbError::ForeignKeyViolation { .. } => {
                tracing::warn!("Foreign key violation: {}", err);
                ApiError::validation(err.to_string())
            }
            err @ DbError::InUse { .. } => ApiError::new(ErrorCode::BusinessLogic, err.to_string()),
            DbError::Invalid(core) => ApiError::from(core),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Data(db) => ApiError::from(db),
            err @ (ReportError::MissingParameter { .. } | ReportError::InvalidRange { .. }) => {
                ApiError::validation(err.to_string())
            }
            err => {
                tracing::error!("Report generation failed: {}", err);
                ApiError::new(ErrorCode::ReportError, err.to_string())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_codes() {
        let err = ApiError::from(DbError::not_found("Customer", 12));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Customer 12 not found");

        let err = ApiError::from(DbError::InUse {
            entity: "category".to_string(),
            dependent: "item".to_string(),
            count: 2,
        });
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert!(err.message.starts_with("Cannot delete category: 2 item(s)"));

        let err = ApiError::from(DbError::ForeignKeyViolation {
            message: "the record is linked to other records".to_string(),
        });
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = ApiError::from(DbError::QueryFailed("disk I/O error".to_string()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database operation failed");
    }

    #[test]
    fn test_validation_passes_message_through() {
        let err = ApiError::from(DbError::from(ValidationError::NotSelected {
            what: "a customer".to_string(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Please select a customer");
    }

    #[test]
    fn test_serializes_screaming_code() {
        let json = serde_json::to_value(ApiError::internal("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"code": "INTERNAL", "message": "boom"}));
    }
}
