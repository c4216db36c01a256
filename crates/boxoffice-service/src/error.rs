//! # Service Error Types
//!
//! Error types for the host-facing facade.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Service Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Selling     │  │      Passthrough        │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  EventNotFound  │  │  Page (CoreError)       │ │
//! │  │  ConfigLoad/    │  │  ForeignTicket  │  │  Validation             │ │
//! │  │  SaveFailed     │  │  TicketNotOnSale│  │  Database (DbError)     │ │
//! │  │                 │  │  SoldOut        │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  A sold-out refusal reaches callers on two roads: `SoldOut` from the   │
//! │  pre-check in reserve(), and `Database(CapacityExceeded)` when the     │
//! │  payment transaction loses a race. `is_sold_out()` covers both.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use boxoffice_core::{CoreError, ValidationError};
use boxoffice_db::DbError;

/// Result type alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error type covering the facade's failure modes.
#[derive(Debug, Error)]
pub enum ServiceError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid service configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Selling Errors
    // =========================================================================
    /// The page has no event record yet; the creation hook never ran.
    #[error("No event record for page event {0}")]
    EventNotFound(String),

    /// A reservation lookup came up empty for this event.
    #[error("Reservation {0} not found for this event")]
    ReservationNotFound(String),

    /// An attendee lookup came up empty for this event.
    #[error("Attendee {0} not found for this event")]
    AttendeeNotFound(String),

    /// An order referenced a ticket belonging to a different event.
    #[error("Ticket {ticket_id} does not belong to event {event_id}")]
    ForeignTicket {
        ticket_id: String,
        event_id: String,
    },

    /// An order referenced a ticket whose sale window is not open.
    #[error("Ticket \"{title}\" is not on sale")]
    TicketNotOnSale { title: String },

    /// The order asks for more seats than the event has left.
    #[error("Not enough seats left: {available} available, {requested} requested")]
    SoldOut { available: i64, requested: i64 },

    // =========================================================================
    // Passthrough Errors
    // =========================================================================
    /// Domain rule violation, including page-contract errors.
    #[error(transparent)]
    Page(#[from] CoreError),

    /// Input validation failure.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Storage failure.
    #[error(transparent)]
    Database(#[from] DbError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ServiceError {
    fn from(err: toml::de::Error) -> Self {
        ServiceError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ServiceError {
    fn from(err: toml::ser::Error) -> Self {
        ServiceError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ServiceError {
    /// True when the error means the host set things up wrong: a broken
    /// config file or a page type missing a required accessor. These
    /// should fail loudly at startup, not be retried.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ServiceError::InvalidConfig(_)
                | ServiceError::ConfigLoadFailed(_)
                | ServiceError::ConfigSaveFailed(_)
                | ServiceError::Page(CoreError::MissingOverride { .. })
        )
    }

    /// True when the buyer lost out on seats, whichever layer refused
    /// them. Hosts typically answer this one with the waiting list.
    pub fn is_sold_out(&self) -> bool {
        matches!(
            self,
            ServiceError::SoldOut { .. }
                | ServiceError::Database(DbError::CapacityExceeded { .. })
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_configuration() {
        let missing = ServiceError::Page(CoreError::missing_override("event_title", "NewsPage"));
        assert!(missing.is_configuration());
        assert!(ServiceError::InvalidConfig("bad".into()).is_configuration());

        let sold_out = ServiceError::SoldOut {
            available: 0,
            requested: 2,
        };
        assert!(!sold_out.is_configuration());
    }

    #[test]
    fn test_is_sold_out_covers_both_roads() {
        let pre_check = ServiceError::SoldOut {
            available: 1,
            requested: 2,
        };
        let race_loss =
            ServiceError::Database(DbError::capacity_exceeded("event", 1, 2));

        assert!(pre_check.is_sold_out());
        assert!(race_loss.is_sold_out());
        assert!(!ServiceError::EventNotFound("event".into()).is_sold_out());
    }
}
