//! # Repository Layer
//!
//! Data access repositories implementing the storage contract for each
//! entity. All SQL lives here; the facade and host code never see a query.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Repository Pattern                               │
//! │                                                                         │
//! │  Facade / Host Code                                                    │
//! │       │                                                                 │
//! │       │ calls                                                           │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────────────────────┐              │
//! │  │              Repositories                             │              │
//! │  │  EventRepository       ← events, capacity counts      │              │
//! │  │  TicketRepository      ← ticket types, sale windows   │              │
//! │  │  AttendeeRepository    ← guest list, check-in         │              │
//! │  │  ReservationRepository ← state machine, oversell guard│              │
//! │  │  WaitingListRepository ← sold-out interest capture    │              │
//! │  │  UserFieldRepository   ← attendee form schema         │              │
//! │  └──────────────────────────────────────────────────────┘              │
//! │       │                                                                 │
//! │       │ SQL via sqlx                                                    │
//! │       ▼                                                                 │
//! │  ┌──────────────┐                                                      │
//! │  │   SQLite     │                                                      │
//! │  └──────────────┘                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conventions
//! - Counts are computed at read time, never cached in a column
//! - Status-guarded UPDATEs report stale rows as `NotFound` with the
//!   expected state in the entity name, e.g. `Reservation (pending)`
//! - Timestamps are RFC 3339 UTC throughout

pub mod attendee;
pub mod event;
pub mod reservation;
pub mod ticket;
pub mod user_field;
pub mod waiting_list;
