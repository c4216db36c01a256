//! # boxoffice-service: The Host-Facing Facade
//!
//! This crate is what a host CMS links against. It wires the pure domain
//! rules from `boxoffice-core` to the SQLite storage in `boxoffice-db`
//! and exposes one facade per event page.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Host CMS (external)                             │
//! │                                                                         │
//! │   impl EventPage for ConcertPage { event_id, event_title, ... }        │
//! └─────────────────────────────┬───────────────────────────────────────────┘
//! │                             │
//! ┌─────────────────────────────▼───────────────────────────────────────────┐
//! │              ★ boxoffice-service (THIS CRATE) ★                        │
//! │                                                                         │
//! │  ┌──────────┐  ┌──────────┐  ┌──────────────────────────────────────┐  │
//! │  │  config  │  │  engine  │  │               events                 │  │
//! │  │  TOML +  │──►Boxoffice │──►  EventTickets<P>: ensure_event,      │  │
//! │  │  env     │  │  root    │  │  reserve, pay, guest_list, flags,    │  │
//! │  └──────────┘  └──────────┘  │  content, waiting list, check-in     │  │
//! │  ┌──────────┐  ┌──────────┐  └──────────────────────────────────────┘  │
//! │  │   page   │  │   site   │                                            │
//! │  │ contract │  │ defaults │                                            │
//! │  └──────────┘  └──────────┘                                            │
//! └─────────────────────────────┬───────────────────────────────────────────┘
//! │                             │
//! ┌─────────────────────────────▼───────────────────────────────────────────┐
//! │         boxoffice-core (rules)  +  boxoffice-db (storage)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//! ```rust,no_run
//! use boxoffice_core::CoreResult;
//! use boxoffice_service::{Boxoffice, BoxofficeConfig, EventPage};
//!
//! struct ConcertPage;
//!
//! impl EventPage for ConcertPage {
//!     fn event_id(&self) -> String {
//!         "spring-concert".to_string()
//!     }
//!
//!     fn page_type(&self) -> &'static str {
//!         "ConcertPage"
//!     }
//!
//!     fn event_title(&self) -> CoreResult<String> {
//!         Ok("Spring Concert".to_string())
//!     }
//!
//!     fn event_start_date(&self) -> CoreResult<Option<chrono::DateTime<chrono::Utc>>> {
//!         Ok(None)
//!     }
//!
//!     fn event_address(&self) -> CoreResult<String> {
//!         Ok("Main Hall".to_string())
//!     }
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Boxoffice::open(BoxofficeConfig::load(None)?).await?;
//! let tickets = engine.event_tickets(ConcertPage)?;
//! tickets.ensure_event().await?;
//! println!("guest list: {}", tickets.guest_list_status().await?);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod page;
pub mod site;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{BoxofficeConfig, ContentSettings, DatabaseSettings, EventDefaults, FieldSpec, SaleWindowSettings};
pub use engine::Boxoffice;
pub use error::{ServiceError, ServiceResult};
pub use events::{AttendeeDetails, EventTickets, TicketOrder};
pub use page::{verify_page_contract, EventPage};
pub use site::{SiteDefaults, StaticSiteDefaults};

// Hosts mostly need the domain types right next to the facade
pub use boxoffice_core::{
    Attendee, CapacityReport, CheckedInCount, Event, Money, Reservation, ReservationStatus,
    Ticket, UserField, UserFieldType, WaitingListRegistration,
};
