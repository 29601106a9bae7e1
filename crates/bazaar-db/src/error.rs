//! # Database Error Types
//!
//! Error types for database operations and for the settlement surface.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Classified by sqlx ErrorKind / result code    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OrderError::Persistence ← or OrderError::Rejected(CoreError)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  HTTP layer branches on OrderError::kind()                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bazaar_core::{CoreError, ErrorKind, ValidationError};
use thiserror::Error;

// SQLite primary result codes (the low byte of an extended code).
const SQLITE_BUSY: i64 = 5;
const SQLITE_LOCKED: i64 = 6;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate product slug
    /// - Duplicate invoice code (same buyer, same microsecond)
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// CHECK constraint violation (negative stock, zero quantity).
    #[error("Check constraint violated: {0}")]
    CheckViolation(String),

    /// Another connection held the write lock longer than `busy_timeout`.
    ///
    /// Retryable: the unit of work was rolled back and nothing was written.
    #[error("Database is busy: {0}")]
    Busy(String),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Configuration value could not be parsed.
    #[error("Invalid configuration for {0}")]
    InvalidConfig(String),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Whether the caller may retry the whole operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DbError::Busy(_) | DbError::PoolExhausted)
    }
}

fn is_busy_code(code: Option<&str>) -> bool {
    code.and_then(|c| c.parse::<i64>().ok())
        .map(|c| matches!(c & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
        .unwrap_or(false)
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound          → DbError::NotFound
/// Database + ErrorKind::Unique…     → DbError::UniqueViolation
/// Database + ErrorKind::ForeignKey… → DbError::ForeignKeyViolation
/// Database + ErrorKind::Check…      → DbError::CheckViolation
/// Database + SQLITE_BUSY/LOCKED     → DbError::Busy
/// sqlx::Error::PoolTimedOut         → DbError::PoolExhausted
/// Other                             → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();
                match db_err.kind() {
                    sqlx::error::ErrorKind::UniqueViolation => DbError::UniqueViolation(msg),
                    sqlx::error::ErrorKind::ForeignKeyViolation => {
                        DbError::ForeignKeyViolation(msg)
                    }
                    sqlx::error::ErrorKind::CheckViolation => DbError::CheckViolation(msg),
                    _ if is_busy_code(db_err.code().as_deref()) => DbError::Busy(msg),
                    _ => DbError::QueryFailed(msg),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Order Error
// =============================================================================

/// The single terminal failure of a settlement or order read.
#[derive(Debug, Error)]
pub enum OrderError {
    /// A business rule rejected the request. Never retried.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// Storage failed. The unit of work was rolled back.
    #[error("Persistence error: {0}")]
    Persistence(#[from] DbError),
}

impl OrderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::Rejected(err) => err.kind(),
            OrderError::Persistence(_) => ErrorKind::Persistence,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            OrderError::Rejected(_) => false,
            OrderError::Persistence(err) => err.is_retryable(),
        }
    }
}

impl From<ValidationError> for OrderError {
    fn from(err: ValidationError) -> Self {
        OrderError::Rejected(CoreError::Validation(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_codes() {
        assert!(is_busy_code(Some("5")));
        assert!(is_busy_code(Some("6")));
        // SQLITE_BUSY_SNAPSHOT
        assert!(is_busy_code(Some("517")));
        assert!(!is_busy_code(Some("19")));
        assert!(!is_busy_code(None));
    }

    #[test]
    fn test_order_error_kinds() {
        let err: OrderError = CoreError::ProductNotFound(3).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!err.is_retryable());

        let err: OrderError = DbError::Busy("locked".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(err.is_retryable());

        let err: OrderError = ValidationError::Required {
            field: "lines".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_not_found_message() {
        let err = DbError::not_found("Product", 12);
        assert_eq!(err.to_string(), "Product not found: 12");
    }
}
