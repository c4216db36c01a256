//! # Error Types
//!
//! Domain-specific error types for boxoffice-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  boxoffice-core errors (this file)                                     │
//! │  ├── CoreError        - Domain rule violations, host wiring mistakes   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  boxoffice-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  boxoffice-service errors (separate crate)                             │
//! │  └── ServiceError     - What the host CMS sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ServiceError → Host     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (method name, page type, status)
//! 3. Errors are enum variants, never String
//! 4. "Not configured" is NOT an error: availability reads degrade to
//!    `None`/`false` instead of failing

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
///
/// These errors represent domain rule violations or host integration
/// mistakes. Integration mistakes (missing overrides) are fatal and should
/// fail a deployment, not be swallowed.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The host page type did not implement a required accessor.
    ///
    /// ## When This Occurs
    /// - The host attached ticketing to a page type but forgot to
    ///   implement `event_title()`, `event_start_date()` or
    ///   `event_address()`
    /// - Detected at facade construction, not on first use, so the
    ///   mistake surfaces in smoke tests rather than in production reads
    #[error("{page_type} must implement {method}() to be used as an event page")]
    MissingOverride {
        method: &'static str,
        page_type: String,
    },

    /// Reservation is not in a state that allows the requested transition.
    ///
    /// ## When This Occurs
    /// - Marking a cancelled reservation as paid
    /// - Expiring a reservation that already completed payment
    /// - Any move out of a terminal state (paid, cancelled, expired)
    #[error("Reservation is {current}, cannot transition to {requested}")]
    InvalidTransition { current: String, requested: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Builds the missing-override error for a host accessor.
    pub fn missing_override(method: &'static str, page_type: impl Into<String>) -> Self {
        Self::MissingOverride {
            method,
            page_type: page_type.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when attendee or ticket input doesn't meet
/// requirements. Used for early validation before anything is persisted.
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

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., malformed email address).
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
    fn test_missing_override_message_names_method_and_type() {
        let err = CoreError::missing_override("event_title", "CalendarPage");
        assert_eq!(
            err.to_string(),
            "CalendarPage must implement event_title() to be used as an event page"
        );
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = CoreError::InvalidTransition {
            current: "cancelled".to_string(),
            requested: "paid".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Reservation is cancelled, cannot transition to paid"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "email".to_string(),
        };
        assert_eq!(err.to_string(), "email is required");

        let err = ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: 5,
        };
        assert_eq!(err.to_string(), "quantity must be between 1 and 5");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "email".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
