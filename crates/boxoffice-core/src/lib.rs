//! # boxoffice-core: Pure Domain Logic for Boxoffice
//!
//! This crate is the **heart** of Boxoffice. It contains the availability
//! and capacity rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Boxoffice Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     Host CMS (external)                         │   │
//! │  │    Event pages ──► admin screens ──► ticket-selling flows      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ EventPage contract                     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               boxoffice-service (Facade Layer)                  │   │
//! │  │    guest_list_status, availability, sale_pending, reserve, ...  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ boxoffice-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌────────────┐ ┌──────────┐ ┌───────┐ ┌────────┐ │   │
//! │  │  │  types  │ │sale_window │ │ capacity │ │ clock │ │ money  │ │   │
//! │  │  │ Ticket  │ │ resolution │ │  report  │ │ trait │ │ cents  │ │   │
//! │  │  │Attendee │ │ pending/   │ │ sold-out │ │ fixed │ │        │ │   │
//! │  │  │  ...    │ │ expired    │ │  flags   │ │ /sys  │ │        │ │   │
//! │  │  └─────────┘ └────────────┘ └──────────┘ └───────┘ └────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 boxoffice-db (Database Layer)                   │   │
//! │  │         SQLite queries, migrations, guest-list join             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Event, Ticket, Attendee, Reservation, ...)
//! - [`sale_window`] - When a ticket can be sold
//! - [`capacity`] - Seat accounting over the guest list
//! - [`clock`] - Time source abstraction (freeze it in tests)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: availability answers are functions of (snapshot, now)
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Degrade, don't throw**: "not configured" resolves to `None`/`false`,
//!    never to an error
//!
//! ## Example Usage
//!
//! ```rust
//! use boxoffice_core::money::Money;
//! use boxoffice_core::sale_window::{resolve_sale_window, SaleThresholds};
//! use boxoffice_core::types::Ticket;
//! use chrono::{TimeZone, Utc};
//!
//! let event_start = Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap();
//! let ticket = Ticket::new("event", "Early bird", Money::from_cents(1500));
//!
//! // No explicit dates: window derives from the event start
//! let window = resolve_sale_window(&ticket, Some(event_start), &SaleThresholds::default());
//! let wednesday_before = Utc.with_ymd_and_hms(2023, 11, 29, 12, 0, 0).unwrap();
//! assert!(window.is_open(wednesday_before));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod capacity;
pub mod clock;
pub mod error;
pub mod money;
pub mod sale_window;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use boxoffice_core::Money` instead of
// `use boxoffice_core::money::Money`

pub use capacity::{CapacityReport, CheckedInCount};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use sale_window::{SaleThresholds, SaleWindow};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default event capacity when the organizer has not set one.
///
/// ## Why 50?
/// Small enough that a forgotten capacity field cannot quietly oversell a
/// venue, large enough to be useful for the meetups and workshops this
/// engine typically serves. Overridable per event and in configuration.
pub const DEFAULT_EVENT_CAPACITY: i32 = 50;

/// Default smallest ticket order.
pub const DEFAULT_ORDER_MIN: i32 = 1;

/// Default largest ticket order.
///
/// ## Business Reason
/// Keeps one buyer from draining a small event's capacity in a single
/// order. Overridable per event and per ticket type.
pub const DEFAULT_ORDER_MAX: i32 = 5;
