//! # Error Types
//!
//! Domain-specific error types for bazaar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bazaar-core errors (this file)                                        │
//! │  ├── ValidationError  - Request shape failures (before any I/O)        │
//! │  ├── CoreError        - Business rejections during settlement          │
//! │  └── ErrorKind        - The flat taxonomy callers branch on            │
//! │                                                                         │
//! │  bazaar-db errors (separate crate)                                     │
//! │  ├── DbError          - Storage failures                               │
//! │  └── OrderError       - Rejected(CoreError) | Persistence(DbError)     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → OrderError → HTTP layer           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, requested quantity)
//! 3. Errors are enum variants, never String matching
//! 4. Each variant maps to exactly one [`ErrorKind`]

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{AddressId, OrderId, ProductId, UserId};

// =============================================================================
// Error Kind
// =============================================================================

/// The kinds of failure a settlement or order read can end in.
///
/// An HTTP layer maps these to status codes; nothing downstream should ever
/// inspect the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Empty cart or malformed line, rejected before any transaction.
    Validation,
    /// Shipping address, product or order does not exist (or is not yours).
    NotFound,
    /// Shipping address exists but belongs to another user.
    AccessDenied,
    /// A line asked for more than the locked stock.
    InsufficientStock,
    /// Storage failure unrelated to business rules.
    Persistence,
}

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised while settling or reading orders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Shipping address id does not exist.
    #[error("Shipping address not found: {0}")]
    AddressNotFound(AddressId),

    /// Shipping address belongs to someone other than the buyer.
    #[error("Access denied: shipping address {address_id} does not belong to user {buyer_id}")]
    AccessDenied {
        address_id: AddressId,
        buyer_id: UserId,
    },

    /// Cart references a product id that does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Requested quantity exceeds the stock observed under the lock.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart line: product 7, qty 3
    ///      │
    ///      ▼
    /// Locked stock: 2
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 7, available: 2, requested: 3 }
    ///      │
    ///      ▼
    /// Whole settlement rolled back, nothing decremented
    /// ```
    #[error("Insufficient stock for product {product_id} ({name}): available {available}, requested {requested}")]
    InsufficientStock {
        product_id: ProductId,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Order does not exist or is owned by another user.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// A line total or order total does not fit in the money type.
    #[error("Amount overflow while pricing product {product_id}")]
    AmountOverflow { product_id: ProductId },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Classifies this error for callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::AddressNotFound(_)
            | CoreError::ProductNotFound(_)
            | CoreError::OrderNotFound(_) => ErrorKind::NotFound,
            CoreError::AccessDenied { .. } => ErrorKind::AccessDenied,
            CoreError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            CoreError::AmountOverflow { .. } | CoreError::Validation(_) => ErrorKind::Validation,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a request doesn't have the right shape. They are raised
/// before a unit of work is opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
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
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., slug with spaces).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: 7,
            name: "Kopi Luwak 250g".to_string(),
            available: 2,
            requested: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 7 (Kopi Luwak 250g): available 2, requested 3"
        );

        let err = CoreError::AccessDenied {
            address_id: 4,
            buyer_id: 9,
        };
        assert_eq!(
            err.to_string(),
            "Access denied: shipping address 4 does not belong to user 9"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "lines".to_string(),
        };
        assert_eq!(err.to_string(), "lines is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "payment_method".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(CoreError::AddressNotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(CoreError::ProductNotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(CoreError::OrderNotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(
            CoreError::AccessDenied {
                address_id: 1,
                buyer_id: 2
            }
            .kind(),
            ErrorKind::AccessDenied
        );
        assert_eq!(
            CoreError::InsufficientStock {
                product_id: 1,
                name: String::new(),
                available: 0,
                requested: 1,
            }
            .kind(),
            ErrorKind::InsufficientStock
        );
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::InsufficientStock).unwrap();
        assert_eq!(json, "\"insufficient_stock\"");
    }
}
