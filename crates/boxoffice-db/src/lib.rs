//! # boxoffice-db: Database Layer for Boxoffice
//!
//! This crate provides database access for the Boxoffice ticketing engine.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Boxoffice Data Flow                               │
//! │                                                                         │
//! │  Facade call (guest_list_status, reserve, ...)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  boxoffice-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (attendee.rs,  │    │  (embedded)  │  │   │
//! │  │   │               │    │  reservation,  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  ticket, ...)  │    │ 001_init.sql │  │   │
//! │  │   │ Management    │    │                │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   The guest-list LEFT JOIN and the pay-inside-capacity         │   │
//! │  │   transaction live here and nowhere else.                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │          wherever the host points DbConfig (file or memory)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (event, ticket, attendee, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use boxoffice_db::{Database, DbConfig};
//!
//! // Create database with default config
//! let config = DbConfig::new("path/to/boxoffice.db");
//! let db = Database::new(config).await?;
//!
//! // Use repositories
//! let guests = db.attendees().guest_list(&event_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::attendee::AttendeeRepository;
pub use repository::event::EventRepository;
pub use repository::reservation::ReservationRepository;
pub use repository::ticket::TicketRepository;
pub use repository::user_field::UserFieldRepository;
pub use repository::waiting_list::WaitingListRepository;
