//! # Domain Types
//!
//! Core domain types used throughout Boxoffice.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────┐ 1:N ┌──────────────────┐ 1:N ┌────────────────┐  │
//! │  │      Event       │────►│      Ticket      │     │   Attendee     │  │
//! │  │  ──────────────  │     │  ──────────────  │     │  ────────────  │  │
//! │  │  id (UUID)       │     │  id (UUID)       │     │  id (UUID)     │  │
//! │  │  capacity        │     │  price_cents     │     │  reservation?  │  │
//! │  │  content texts   │     │  available_from? │     │  checked_in    │  │
//! │  └──────┬───────────┘     │  available_till? │     └───────▲────────┘  │
//! │         │ 1:N             └──────────────────┘             │ N:1?      │
//! │         ├────────────────────────────────────┐             │           │
//! │         ▼                                    ▼             │           │
//! │  ┌──────────────────┐              ┌──────────────────┐    │           │
//! │  │ WaitingList      │              │   Reservation    │────┘           │
//! │  │ Registration     │              │  ──────────────  │                │
//! │  └──────────────────┘              │  status machine  │                │
//! │                                    │  Pending → Paid  │                │
//! │  ┌──────────────────┐              │          → Cancelled              │
//! │  │    UserField     │              │          → Expired│               │
//! │  │  (form schema)   │              └──────────────────┘                │
//! │  └──────────────────┘                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guest List Membership
//! An attendee holds a confirmed seat when it has NO reservation (manually
//! added guest) or its reservation is `Paid`. Every capacity number in the
//! system derives from that rule; see [`Attendee::holds_seat`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::money::Money;
use crate::{DEFAULT_EVENT_CAPACITY, DEFAULT_ORDER_MAX, DEFAULT_ORDER_MIN};

// =============================================================================
// Event
// =============================================================================

/// The ticketing record attached to a host event page.
///
/// The host page owns presentation data (title, start date, address) and
/// exposes it through the `EventPage` contract in the service crate; this
/// record owns everything ticketing adds: capacity, order bounds, and the
/// confirmation texts with site-default fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Event {
    /// Unique identifier. The facade keys this to the host page's event
    /// identity; standalone callers get a generated UUID v4.
    pub id: String,

    /// Maximum number of confirmed guests. Availability may go negative
    /// when capacity is lowered after sales; it is never clamped.
    pub capacity: i32,

    /// Smallest ticket order the selling flow accepts.
    pub order_min: i32,

    /// Largest ticket order the selling flow accepts.
    pub order_max: i32,

    /// Confirmation text shown after a successful order.
    pub success_message: Option<String>,

    /// Confirmation text used in the order mail.
    pub success_message_mail: Option<String>,

    /// Extra content printed on the ticket itself.
    pub printed_ticket_content: Option<String>,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Creates an event record with the configured defaults
    /// (capacity 50, orders of 1 to 5 tickets).
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            capacity: DEFAULT_EVENT_CAPACITY,
            order_min: DEFAULT_ORDER_MIN,
            order_max: DEFAULT_ORDER_MAX,
            success_message: None,
            success_message_mail: None,
            printed_ticket_content: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates an event record keyed to an existing identity, usually the
    /// host page's event ID.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::new()
        }
    }

    /// Returns the event's own text for a content slot, treating empty and
    /// whitespace-only values as absent so the site-wide default applies.
    pub fn own_content(&self, field: ContentField) -> Option<&str> {
        let raw = match field {
            ContentField::Success => self.success_message.as_deref(),
            ContentField::SuccessMail => self.success_message_mail.as_deref(),
            ContentField::PrintedTicket => self.printed_ticket_content.as_deref(),
        };
        raw.map(str::trim).filter(|text| !text.is_empty())
    }
}

impl Default for Event {
    fn default() -> Self {
        Event::new()
    }
}

// =============================================================================
// Content Field
// =============================================================================

/// The three content slots an event can override and a site can default.
///
/// One fallback chain serves all three; the enum selects the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentField {
    /// Text on the order-success page.
    Success,
    /// Text in the order confirmation mail.
    SuccessMail,
    /// Text printed on the ticket.
    PrintedTicket,
}

// =============================================================================
// Ticket
// =============================================================================

/// A purchasable ticket type belonging to one event.
///
/// The explicit `available_from`/`available_till` instants are optional;
/// when absent the sale window falls back to offsets from the event start
/// date (see `sale_window::resolve_sale_window`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Ticket {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Event this ticket belongs to.
    pub event_id: String,

    /// Display name shown to buyers ("Early bird", "Regular").
    pub title: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Explicit sale-window start; `None` falls back to the event start
    /// minus the configured offset.
    pub available_from: Option<DateTime<Utc>>,

    /// Explicit sale-window end; `None` falls back to the event start
    /// minus the configured offset.
    pub available_till: Option<DateTime<Utc>>,

    /// Smallest order quantity for this ticket type.
    pub order_min: i32,

    /// Largest order quantity for this ticket type.
    pub order_max: i32,

    /// Ordering key; lists sort by `sort ASC, available_from DESC`.
    pub sort: i32,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Creates a ticket with the default order bounds (1 to 5).
    pub fn new(event_id: impl Into<String>, title: impl Into<String>, price: Money) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            event_id: event_id.into(),
            title: title.into(),
            price_cents: price.cents(),
            available_from: None,
            available_till: None,
            order_min: DEFAULT_ORDER_MIN,
            order_max: DEFAULT_ORDER_MAX,
            sort: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Reservation Status
// =============================================================================

/// The lifecycle state of a reservation.
///
/// ## Rules
/// ```text
///              ┌──► Paid       (seat confirmed, counts toward guest list)
///   Pending ───┼──► Cancelled  (buyer abandoned)
///              └──► Expired    (hold timed out)
/// ```
/// The three target states are terminal; nothing leaves them. Only `Paid`
/// contributes attendees to the guest list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Seats are held while the buyer completes payment.
    Pending,
    /// Payment completed; attendees count toward the guest list.
    Paid,
    /// Buyer abandoned the reservation.
    Cancelled,
    /// The pending hold timed out before payment.
    Expired,
}

impl ReservationStatus {
    /// Returns the canonical lowercase name, as stored in the database.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Paid => "paid",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Expired => "expired",
        }
    }

    /// Terminal states admit no further transitions.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, ReservationStatus::Pending)
    }

    /// Checks whether this status may move to `target`.
    ///
    /// Only `Pending` moves anywhere, and never back to itself.
    pub fn can_transition_to(&self, target: ReservationStatus) -> bool {
        matches!(self, ReservationStatus::Pending) && target != ReservationStatus::Pending
    }
}

impl Default for ReservationStatus {
    fn default() -> Self {
        ReservationStatus::Pending
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReservationStatus::Pending),
            "paid" => Ok(ReservationStatus::Paid),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            "expired" => Ok(ReservationStatus::Expired),
            other => Err(format!("unknown reservation status: {other}")),
        }
    }
}

// =============================================================================
// Reservation
// =============================================================================

/// A buyer's hold on one or more seats for an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Reservation {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Event this reservation belongs to.
    pub event_id: String,

    /// Lifecycle state; see [`ReservationStatus`].
    pub status: ReservationStatus,

    /// Sum of the attendees' ticket prices in cents.
    pub total_cents: i64,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Creates a pending reservation with a zero total.
    pub fn new(event_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            event_id: event_id.into(),
            status: ReservationStatus::Pending,
            total_cents: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the total as a Money type.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Attendee
// =============================================================================

/// A person on an event's list, with or without a reservation.
///
/// Two creation paths exist: the selling flow creates attendees attached to
/// a reservation, and admins add guests directly with no reservation at
/// all. Attendees are never deleted automatically; cancelling a
/// reservation removes its seats from the guest list by status, not by
/// deleting rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Attendee {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Event this attendee belongs to.
    pub event_id: String,

    /// Ticket type this attendee was booked on, if any.
    pub ticket_id: Option<String>,

    /// Owning reservation; `None` marks a manually added guest who
    /// bypasses the reservation state machine entirely.
    pub reservation_id: Option<String>,

    /// Given name.
    pub first_name: String,

    /// Family name.
    pub surname: String,

    /// Contact address; also used for ticket delivery.
    pub email: String,

    /// Answers to the event's extra user fields, keyed by field name.
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub extra: BTreeMap<String, String>,

    /// Whether the attendee was scanned in at the door.
    pub checked_in: bool,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Attendee {
    /// Creates an attendee with no reservation (a manually added guest).
    pub fn new(
        event_id: impl Into<String>,
        first_name: impl Into<String>,
        surname: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            event_id: event_id.into(),
            ticket_id: None,
            reservation_id: None,
            first_name: first_name.into(),
            surname: surname.into(),
            email: email.into(),
            extra: BTreeMap::new(),
            checked_in: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attaches the attendee to a reservation and ticket type, as the
    /// selling flow does.
    pub fn with_reservation(
        mut self,
        reservation_id: impl Into<String>,
        ticket_id: impl Into<String>,
    ) -> Self {
        self.reservation_id = Some(reservation_id.into());
        self.ticket_id = Some(ticket_id.into());
        self
    }

    /// Full display name, "First Surname".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.surname)
    }

    /// The guest-list membership rule: a seat is held when the attendee
    /// has no reservation, or its reservation is paid.
    ///
    /// `reservation_status` is the status of the owning reservation
    /// (`None` when `reservation_id` is `None`). The storage layer applies
    /// the same rule as a left-join filter; this method exists so the rule
    /// is stated once in domain terms and testable without a database.
    pub fn holds_seat(&self, reservation_status: Option<ReservationStatus>) -> bool {
        self.reservation_id.is_none() || reservation_status == Some(ReservationStatus::Paid)
    }
}

// =============================================================================
// Waiting List
// =============================================================================

/// Interest registered after an event sold out.
///
/// Deliberately outside capacity accounting: registrations never hold a
/// seat and never appear on the guest list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct WaitingListRegistration {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Event this registration belongs to.
    pub event_id: String,

    /// Given name.
    pub first_name: String,

    /// Family name.
    pub surname: String,

    /// Contact address for the "seats freed up" notification.
    pub email: String,

    /// Optional phone number.
    pub telephone: Option<String>,

    /// When the registration was made.
    pub created_at: DateTime<Utc>,
}

impl WaitingListRegistration {
    pub fn new(
        event_id: impl Into<String>,
        first_name: impl Into<String>,
        surname: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id: event_id.into(),
            first_name: first_name.into(),
            surname: surname.into(),
            email: email.into(),
            telephone: None,
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// User Fields
// =============================================================================

/// The input widget a user field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum UserFieldType {
    Text,
    Email,
    Checkbox,
}

impl UserFieldType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            UserFieldType::Text => "text",
            UserFieldType::Email => "email",
            UserFieldType::Checkbox => "checkbox",
        }
    }
}

impl fmt::Display for UserFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserFieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(UserFieldType::Text),
            "email" => Ok(UserFieldType::Email),
            "checkbox" => Ok(UserFieldType::Checkbox),
            other => Err(format!("unknown user field type: {other}")),
        }
    }
}

/// One extra question the event asks each attendee.
///
/// The default set (first name, surname, email) is seeded by the
/// idempotent creation hook; admins add more per event. `name` is the
/// machine key attendee answers are stored under, unique per event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UserField {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Event this field belongs to.
    pub event_id: String,

    /// Machine key, unique per event ("FirstName", "DietaryWishes").
    pub name: String,

    /// Human label shown on the order form.
    pub title: String,

    /// Input widget type.
    pub field_type: UserFieldType,

    /// Whether the selling flow refuses orders without an answer.
    pub required: bool,

    /// Position in the order form.
    pub sort: i32,

    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl UserField {
    pub fn new(
        event_id: impl Into<String>,
        name: impl Into<String>,
        title: impl Into<String>,
        field_type: UserFieldType,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id: event_id.into(),
            name: name.into(),
            title: title.into(),
            field_type,
            required: false,
            sort: 0,
            created_at: Utc::now(),
        }
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Places the field at `sort` in the form.
    pub fn at(mut self, sort: i32) -> Self {
        self.sort = sort;
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
