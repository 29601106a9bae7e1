//! # Validation Module
//!
//! Request shape validation for settlement and the collaborator inserts.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP layer (outside this workspace)                          │
//! │  └── Deserialization, authenticated buyer id                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (before any transaction is opened)               │
//! │  ├── Cart non-empty, bounded                                           │
//! │  ├── Quantities positive, bounded                                      │
//! │  └── Payment method present                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Settlement (inside the transaction)                          │
//! │  ├── Address ownership                                                 │
//! │  └── Stock sufficiency under the lock                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0), CHECK (quantity > 0)                          │
//! │  └── UNIQUE (invoice_code), UNIQUE (slug)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::CartLine;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY, MAX_PAYMENT_METHOD_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Cart Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates the cart as a whole.
///
/// ## Rules
/// - At least one line
/// - At most MAX_CART_LINES lines
/// - Every product id positive, every quantity valid
///
/// Repeated product ids are allowed; settlement re-reads stock for each line.
pub fn validate_cart_lines(lines: &[CartLine]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "lines".to_string(),
        });
    }

    if lines.len() > MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "lines".to_string(),
            min: 1,
            max: MAX_CART_LINES as i64,
        });
    }

    for line in lines {
        validate_id("product_id", line.product_id)?;
        validate_quantity(line.quantity)?;
    }

    Ok(())
}

/// Validates the free-form payment method string.
pub fn validate_payment_method(method: &str) -> ValidationResult<()> {
    let method = method.trim();

    if method.is_empty() {
        return Err(ValidationError::Required {
            field: "payment_method".to_string(),
        });
    }

    if method.chars().count() > MAX_PAYMENT_METHOD_LEN {
        return Err(ValidationError::TooLong {
            field: "payment_method".to_string(),
            max: MAX_PAYMENT_METHOD_LEN,
        });
    }

    Ok(())
}

/// Validates a row id supplied by the caller.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Product Validators
// =============================================================================

/// Validates a product name (1..=255 characters).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 255 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 255,
        });
    }

    Ok(())
}

/// Validates a product slug.
///
/// ## Rules
/// - Must not be empty, at most 255 characters
/// - Lowercase ASCII letters, digits and hyphens only
///
/// ## Example
/// ```rust
/// use bazaar_core::validation::validate_slug;
///
/// assert!(validate_slug("kopi-luwak-250g").is_ok());
/// assert!(validate_slug("Kopi Luwak").is_err());
/// ```
pub fn validate_slug(slug: &str) -> ValidationResult<()> {
    if slug.is_empty() {
        return Err(ValidationError::Required {
            field: "slug".to_string(),
        });
    }

    if slug.len() > 255 {
        return Err(ValidationError::TooLong {
            field: "slug".to_string(),
            max: 255,
        });
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "slug".to_string(),
            reason: "must contain only lowercase letters, digits, and hyphens".to_string(),
        });
    }

    Ok(())
}

/// Validates a price in the smallest currency unit. Zero is allowed.
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an initial stock level.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
