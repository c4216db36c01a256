//! # Validation Module
//!
//! Input validation for attendee and order data.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Host order form                                              │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Service commands (Rust)                                      │
//! │  └── THIS MODULE: domain rule validation                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints (field names per event)                        │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a person-name field (first name, surname).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 255 characters
pub fn validate_person_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > 255 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 255,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - Must contain exactly one `@` with text on both sides
/// - Must not contain whitespace
/// - Must be at most 254 characters
///
/// This is deliberately a shape check, not RFC 5321 parsing; deliverability
/// is the mail layer's problem.
///
/// ## Example
/// ```rust
/// use boxoffice_core::validation::validate_email;
///
/// assert!(validate_email("ada@example.com").is_ok());
/// assert!(validate_email("").is_err());
/// assert!(validate_email("no-at-sign").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
        });
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next();

    let shape_ok = match domain {
        Some(domain) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !shape_ok {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain".to_string(),
        });
    }

    Ok(())
}

/// Validates a user-field machine key.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Alphanumeric plus hyphens and underscores (answers are keyed by it)
pub fn validate_field_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "field name".to_string(),
        });
    }

    if name.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "field name".to_string(),
            max: 50,
        });
    }

    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "field name".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an order quantity against a ticket's order bounds.
///
/// ## Rules
/// - Must be within `order_min..=order_max` of the ticket being bought
///
/// ## Example
/// ```rust
/// use boxoffice_core::validation::validate_order_quantity;
///
/// // Default bounds: 1 to 5 tickets per order
/// assert!(validate_order_quantity(3, 1, 5).is_ok());
/// assert!(validate_order_quantity(0, 1, 5).is_err());
/// assert!(validate_order_quantity(6, 1, 5).is_err());
/// ```
pub fn validate_order_quantity(quantity: i32, order_min: i32, order_max: i32) -> ValidationResult<()> {
    if quantity < order_min || quantity > order_max {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: order_min as i64,
            max: order_max as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// Host pages hand us event ids as plain strings; catch typos before
/// they turn into confusing empty query results.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_person_name() {
        assert!(validate_person_name("first name", "Ada").is_ok());
        assert!(validate_person_name("first name", "").is_err());
        assert!(validate_person_name("first name", "   ").is_err());
        assert!(validate_person_name("surname", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("a@b").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@missing-local").is_err());
        assert!(validate_email("missing-domain@").is_err());
        assert!(validate_email("two@at@signs").is_err());
        assert!(validate_email("spaced name@example.com").is_err());
    }

    #[test]
    fn test_validate_field_name() {
        assert!(validate_field_name("FirstName").is_ok());
        assert!(validate_field_name("dietary_wishes").is_ok());
        assert!(validate_field_name("t-shirt-size").is_ok());

        assert!(validate_field_name("").is_err());
        assert!(validate_field_name("has space").is_err());
        assert!(validate_field_name(&"A".repeat(60)).is_err());
    }

    #[test]
    fn test_validate_order_quantity() {
        assert!(validate_order_quantity(1, 1, 5).is_ok());
        assert!(validate_order_quantity(5, 1, 5).is_ok());

        assert!(validate_order_quantity(0, 1, 5).is_err());
        assert!(validate_order_quantity(6, 1, 5).is_err());

        // Ticket-specific bounds override the defaults
        assert!(validate_order_quantity(8, 2, 10).is_ok());
        assert!(validate_order_quantity(1, 2, 10).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
