//! # Event Ticketing Facade
//!
//! [`EventTickets`] is the one surface the host CMS talks to. It binds a
//! host page (via the [`EventPage`] contract) to the engine's storage and
//! clock, and exposes every ticketing operation scoped to that page's
//! event.
//!
//! ## Operation Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       EventTickets<P: EventPage>                        │
//! │                                                                         │
//! │  Setup             ensure_event, event, save_event                     │
//! │  Ticket types      add_ticket, save_ticket, remove_ticket, tickets     │
//! │  Sale state        ticket_sale_start, sale_pending, event_expired,     │
//! │                    tickets_available                                   │
//! │  Capacity          availability, is_sold_out, guest_list_status        │
//! │  Guest list        guest_list, add_guest, check_in, check_out,         │
//! │                    checked_in_count                                    │
//! │  Selling           reserve ──► pay │ cancel │ expire, reservations     │
//! │  Content           success_content, mail_content, ticket_content      │
//! │  Waiting list      join_waiting_list, waiting_list                     │
//! │  Form fields       user_fields                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Scoping Rule
//! Every lookup is filtered to the facade's own event. A ticket,
//! reservation or attendee belonging to a different event is reported as
//! not found (or foreign), never touched. Hosts cannot reach across
//! events through a facade, no matter what IDs they pass in.
//!
//! ## Degrade Rule
//! Boolean sale-state reads (`sale_pending`, `event_expired`,
//! `tickets_available`) degrade to `false` on a page with no event record
//! yet. Numeric reads (`availability`) and writes require the record and
//! report [`ServiceError::EventNotFound`] instead, because a capacity
//! report for an unregistered page has no meaning.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use boxoffice_core::capacity::reservation_total;
use boxoffice_core::sale_window as sale;
use boxoffice_core::validation::{validate_email, validate_order_quantity, validate_person_name};
use boxoffice_core::{
    Attendee, CapacityReport, CheckedInCount, Clock, ContentField, CoreError, Event, Reservation,
    ReservationStatus, Ticket, UserField, ValidationError, WaitingListRegistration,
};
use boxoffice_db::Database;

use crate::config::BoxofficeConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::page::EventPage;
use crate::site::SiteDefaults;

// =============================================================================
// Order Input
// =============================================================================

/// One buyer's order line: a ticket type plus the people it seats.
///
/// The number of attendees IS the quantity; there is no separate count
/// field to drift out of sync with the attendee details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketOrder {
    /// The ticket type being bought.
    pub ticket_id: String,

    /// One entry per seat.
    pub attendees: Vec<AttendeeDetails>,
}

/// Details for one attendee on an order form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendeeDetails {
    pub first_name: String,
    pub surname: String,
    pub email: String,

    /// Answers to the event's extra form fields, keyed by field name.
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

/// Field names answered by the structural fields on [`AttendeeDetails`]
/// rather than the `extra` map.
const BUILT_IN_FIELDS: [&str; 3] = ["FirstName", "Surname", "Email"];

// =============================================================================
// Facade
// =============================================================================

/// The ticketing facade for one host page.
///
/// Built by [`Boxoffice::event_tickets`](crate::Boxoffice::event_tickets),
/// which verifies the page contract first. Cheap to construct per page
/// view; all facades share the engine's connection pool.
pub struct EventTickets<P: EventPage> {
    db: Database,
    page: P,
    config: BoxofficeConfig,
    clock: Arc<dyn Clock>,
}

// Manual impl: `Arc<dyn Clock>` is not `Debug`, so the derive cannot apply.
impl<P: EventPage> fmt::Debug for EventTickets<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTickets")
            .field("page_type", &self.page.page_type())
            .field("event_id", &self.page.event_id())
            .finish_non_exhaustive()
    }
}

impl<P: EventPage> EventTickets<P> {
    pub(crate) fn new(db: Database, page: P, config: BoxofficeConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            page,
            config,
            clock,
        }
    }

    /// The host page this facade is bound to.
    pub fn page(&self) -> &P {
        &self.page
    }

    /// The event title, read from the host page.
    pub fn event_title(&self) -> ServiceResult<String> {
        Ok(self.page.event_title()?)
    }

    /// The event start instant, read from the host page. `None` when the
    /// host genuinely has no date (sale windows then need explicit ticket
    /// dates to resolve).
    pub fn event_start_date(&self) -> ServiceResult<Option<DateTime<Utc>>> {
        Ok(self.page.event_start_date()?)
    }

    /// The event address, read from the host page.
    pub fn event_address(&self) -> ServiceResult<String> {
        Ok(self.page.event_address()?)
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Registers the event record for this page if it does not exist yet,
    /// and seeds the configured attendee-form fields onto it.
    ///
    /// Idempotent: hosts call this from their page-publish hook on every
    /// publish. Field seeding only happens while the event has no fields
    /// at all, so an organizer's later edits and deletions stick.
    pub async fn ensure_event(&self) -> ServiceResult<Event> {
        let event_id = self.page.event_id();

        let event = match self.db.events().get_by_id(&event_id).await? {
            Some(existing) => existing,
            None => {
                let mut event = Event::with_id(&event_id);
                event.capacity = self.config.defaults.event_capacity;
                event.order_min = self.config.defaults.order_min;
                event.order_max = self.config.defaults.order_max;
                self.db.events().create(&event).await?;

                info!(
                    event_id = %event.id,
                    page_type = self.page.page_type(),
                    "Event registered"
                );
                event
            }
        };

        let defaults = self.config.default_fields_for(&event.id);
        self.db
            .user_fields()
            .ensure_defaults(&event.id, &defaults)
            .await?;

        Ok(event)
    }

    /// The event record for this page.
    pub async fn event(&self) -> ServiceResult<Event> {
        let event_id = self.page.event_id();
        self.db
            .events()
            .get_by_id(&event_id)
            .await?
            .ok_or(ServiceError::EventNotFound(event_id))
    }

    /// Persists organizer edits (capacity, order bounds, content texts).
    ///
    /// Refuses records keyed to another event.
    pub async fn save_event(&self, event: &Event) -> ServiceResult<()> {
        if event.id != self.page.event_id() {
            return Err(ServiceError::EventNotFound(event.id.clone()));
        }
        Ok(self.db.events().update(event).await?)
    }

    // =========================================================================
    // Ticket Types
    // =========================================================================

    /// Adds a ticket type to this event.
    pub async fn add_ticket(&self, ticket: &Ticket) -> ServiceResult<()> {
        self.guard_ticket(ticket)?;
        Ok(self.db.tickets().create(ticket).await?)
    }

    /// Persists edits to a ticket type.
    pub async fn save_ticket(&self, ticket: &Ticket) -> ServiceResult<()> {
        self.guard_ticket(ticket)?;
        Ok(self.db.tickets().update(ticket).await?)
    }

    /// Removes a ticket type. Attendees already booked on it keep their
    /// seats; their ticket reference is cleared.
    pub async fn remove_ticket(&self, ticket_id: &str) -> ServiceResult<()> {
        let ticket = self.owned_ticket(ticket_id).await?;
        Ok(self.db.tickets().delete(&ticket.id).await?)
    }

    /// This event's ticket types in display order.
    pub async fn tickets(&self) -> ServiceResult<Vec<Ticket>> {
        Ok(self.db.tickets().list_for_event(&self.page.event_id()).await?)
    }

    fn guard_ticket(&self, ticket: &Ticket) -> ServiceResult<()> {
        if ticket.event_id != self.page.event_id() {
            return Err(ServiceError::ForeignTicket {
                ticket_id: ticket.id.clone(),
                event_id: self.page.event_id(),
            });
        }
        Ok(())
    }

    async fn owned_ticket(&self, ticket_id: &str) -> ServiceResult<Ticket> {
        let event_id = self.page.event_id();
        self.db
            .tickets()
            .get_by_id(ticket_id)
            .await?
            .filter(|ticket| ticket.event_id == event_id)
            .ok_or_else(|| ServiceError::ForeignTicket {
                ticket_id: ticket_id.to_string(),
                event_id,
            })
    }

    // =========================================================================
    // Sale State
    // =========================================================================

    /// Earliest resolved sale start across this event's tickets, or `None`
    /// when no ticket has a known start.
    pub async fn ticket_sale_start(&self) -> ServiceResult<Option<DateTime<Utc>>> {
        let tickets = self.tickets().await?;
        Ok(sale::earliest_sale_start(
            &tickets,
            self.page.event_start_date()?,
            &self.config.thresholds(),
        ))
    }

    /// True while ticket sales have not started yet.
    pub async fn sale_pending(&self) -> ServiceResult<bool> {
        let tickets = self.tickets().await?;
        Ok(sale::sale_is_pending(
            self.clock.now(),
            &tickets,
            self.page.event_start_date()?,
            &self.config.thresholds(),
        ))
    }

    /// True when the event has tickets and every one is outside its sale
    /// window.
    ///
    /// Tickets whose sale has not opened yet also fail their window check,
    /// so consult [`sale_pending`](Self::sale_pending) first, the way the
    /// admin screens do.
    pub async fn event_expired(&self) -> ServiceResult<bool> {
        let tickets = self.tickets().await?;
        Ok(sale::event_expired(
            self.clock.now(),
            &tickets,
            self.page.event_start_date()?,
            &self.config.thresholds(),
        ))
    }

    /// True when at least one ticket can be bought right now: its window
    /// is open and seats remain.
    pub async fn tickets_available(&self) -> ServiceResult<bool> {
        let event = match self.db.events().get_by_id(&self.page.event_id()).await? {
            Some(event) => event,
            None => return Ok(false),
        };

        let guests = self.db.attendees().guest_count(&event.id).await?;
        let availability = CapacityReport::new(event.capacity, guests).availability();

        let tickets = self.db.tickets().list_for_event(&event.id).await?;
        let now = self.clock.now();
        let event_start = self.page.event_start_date()?;
        let thresholds = self.config.thresholds();

        Ok(tickets.iter().any(|ticket| {
            sale::resolve_sale_window(ticket, event_start, &thresholds)
                .is_available(now, availability)
        }))
    }

    // =========================================================================
    // Capacity
    // =========================================================================

    /// The event's seat accounting, recomputed from the guest list.
    ///
    /// Availability goes negative when an organizer lowered capacity below
    /// seats already sold; it is never clamped.
    pub async fn availability(&self) -> ServiceResult<CapacityReport> {
        let event = self.event().await?;
        let guests = self.db.attendees().guest_count(&event.id).await?;
        Ok(CapacityReport::new(event.capacity, guests))
    }

    /// True when no seats are left.
    pub async fn is_sold_out(&self) -> ServiceResult<bool> {
        Ok(self.availability().await?.is_sold_out())
    }

    /// The admin status line, `"guests/capacity"`.
    pub async fn guest_list_status(&self) -> ServiceResult<String> {
        Ok(self.availability().await?.to_string())
    }

    // =========================================================================
    // Guest List
    // =========================================================================

    /// Everyone holding a seat, in arrival order: manually added attendees
    /// plus attendees on paid reservations. Pending, cancelled and expired
    /// reservations contribute nobody.
    pub async fn guest_list(&self) -> ServiceResult<Vec<Attendee>> {
        Ok(self.db.attendees().guest_list(&self.page.event_id()).await?)
    }

    /// Adds a guest directly, outside any reservation.
    ///
    /// This is the organizer's door: it ignores sale windows AND capacity,
    /// so the press pass still works when the event is sold out. The seat
    /// still counts against availability.
    pub async fn add_guest(&self, details: AttendeeDetails) -> ServiceResult<Attendee> {
        let event = self.event().await?;

        validate_person_name("first name", &details.first_name)?;
        validate_person_name("surname", &details.surname)?;
        validate_email(&details.email)?;

        let mut attendee = Attendee::new(
            &event.id,
            &details.first_name,
            &details.surname,
            &details.email,
        );
        attendee.extra = details.extra;

        self.db.attendees().create(&attendee).await?;

        info!(
            event_id = %event.id,
            attendee_id = %attendee.id,
            "Guest added manually"
        );
        Ok(attendee)
    }

    /// Marks an attendee as through the door. Idempotent.
    pub async fn check_in(&self, attendee_id: &str) -> ServiceResult<()> {
        self.owned_attendee(attendee_id).await?;
        Ok(self.db.attendees().check_in(attendee_id).await?)
    }

    /// Reverts a door scan. Idempotent.
    pub async fn check_out(&self, attendee_id: &str) -> ServiceResult<()> {
        self.owned_attendee(attendee_id).await?;
        Ok(self.db.attendees().check_out(attendee_id).await?)
    }

    /// Door-scan progress over the guest list.
    pub async fn checked_in_count(&self) -> ServiceResult<CheckedInCount> {
        Ok(self
            .db
            .attendees()
            .checked_in_count(&self.page.event_id())
            .await?)
    }

    async fn owned_attendee(&self, attendee_id: &str) -> ServiceResult<Attendee> {
        let event_id = self.page.event_id();
        self.db
            .attendees()
            .get_by_id(attendee_id)
            .await?
            .filter(|attendee| attendee.event_id == event_id)
            .ok_or_else(|| ServiceError::AttendeeNotFound(attendee_id.to_string()))
    }

    // =========================================================================
    // Selling
    // =========================================================================

    /// Places an order: validates it, checks seats, and creates a pending
    /// reservation with one attendee per seat.
    ///
    /// ## Validation (all of it before anything is written)
    /// 1. Every ticket belongs to this event and its sale window is open
    /// 2. Per-ticket quantity respects the ticket's order bounds
    /// 3. Every attendee has a plausible name and email
    /// 4. Every required extra form field is answered
    /// 5. Enough seats are left for the whole order
    ///
    /// The seat check here is a courtesy pre-check against the live guest
    /// list; the binding check runs inside the payment transaction, where
    /// two racing buyers get serialized. A pending reservation holds no
    /// seats, so an abandoned order costs nobody anything.
    pub async fn reserve(&self, orders: &[TicketOrder]) -> ServiceResult<Reservation> {
        let event = self.event().await?;

        let seats_requested: usize = orders.iter().map(|order| order.attendees.len()).sum();
        if seats_requested == 0 {
            return Err(ValidationError::Required {
                field: "order".to_string(),
            }
            .into());
        }

        let now = self.clock.now();
        let event_start = self.page.event_start_date()?;
        let thresholds = self.config.thresholds();

        let required_extras: Vec<UserField> = self
            .db
            .user_fields()
            .list_for_event(&event.id)
            .await?
            .into_iter()
            .filter(|field| field.required && !BUILT_IN_FIELDS.contains(&field.name.as_str()))
            .collect();

        let mut validated: Vec<(Ticket, &[AttendeeDetails])> = Vec::with_capacity(orders.len());
        let mut prices = Vec::with_capacity(seats_requested);

        for order in orders {
            let ticket = self
                .db
                .tickets()
                .get_by_id(&order.ticket_id)
                .await?
                .filter(|ticket| ticket.event_id == event.id)
                .ok_or_else(|| ServiceError::ForeignTicket {
                    ticket_id: order.ticket_id.clone(),
                    event_id: event.id.clone(),
                })?;

            let window = sale::resolve_sale_window(&ticket, event_start, &thresholds);
            if !window.is_open(now) {
                return Err(ServiceError::TicketNotOnSale {
                    title: ticket.title.clone(),
                });
            }

            validate_order_quantity(
                order.attendees.len() as i32,
                ticket.order_min,
                ticket.order_max,
            )?;

            for details in &order.attendees {
                validate_person_name("first name", &details.first_name)?;
                validate_person_name("surname", &details.surname)?;
                validate_email(&details.email)?;

                for field in &required_extras {
                    let answered = details
                        .extra
                        .get(&field.name)
                        .map(|answer| !answer.trim().is_empty())
                        .unwrap_or(false);
                    if !answered {
                        return Err(ValidationError::Required {
                            field: field.title.clone(),
                        }
                        .into());
                    }
                }

                prices.push(ticket.price());
            }

            validated.push((ticket, order.attendees.as_slice()));
        }

        let guests = self.db.attendees().guest_count(&event.id).await?;
        let report = CapacityReport::new(event.capacity, guests);
        if seats_requested as i64 > report.availability() {
            debug!(
                event_id = %event.id,
                available = report.availability(),
                requested = seats_requested,
                "Order refused at seat pre-check"
            );
            return Err(ServiceError::SoldOut {
                available: report.availability(),
                requested: seats_requested as i64,
            });
        }

        let mut reservation = Reservation::new(&event.id);
        self.db.reservations().create(&reservation).await?;

        for (ticket, attendees) in &validated {
            for details in *attendees {
                let mut attendee = Attendee::new(
                    &event.id,
                    &details.first_name,
                    &details.surname,
                    &details.email,
                )
                .with_reservation(&reservation.id, &ticket.id);
                attendee.extra = details.extra.clone();

                self.db.attendees().create(&attendee).await?;
            }
        }

        let total = reservation_total(prices);
        self.db
            .reservations()
            .update_total(&reservation.id, total.cents())
            .await?;
        reservation.total_cents = total.cents();

        info!(
            event_id = %event.id,
            reservation_id = %reservation.id,
            seats = seats_requested,
            total = %total,
            "Reservation created"
        );

        Ok(reservation)
    }

    /// Completes payment. The attendees land on the guest list iff the
    /// event still has their seats; a lost race surfaces as a sold-out
    /// error and the reservation stays pending.
    pub async fn pay(&self, reservation_id: &str) -> ServiceResult<Reservation> {
        self.resolve_reservation(reservation_id, ReservationStatus::Paid)
            .await
    }

    /// Cancels a pending reservation (buyer walked away at the gateway).
    pub async fn cancel(&self, reservation_id: &str) -> ServiceResult<Reservation> {
        self.resolve_reservation(reservation_id, ReservationStatus::Cancelled)
            .await
    }

    /// Expires a pending reservation (the host's cleanup decided it is
    /// stale).
    pub async fn expire(&self, reservation_id: &str) -> ServiceResult<Reservation> {
        self.resolve_reservation(reservation_id, ReservationStatus::Expired)
            .await
    }

    /// One reservation, scoped to this event.
    pub async fn reservation(&self, reservation_id: &str) -> ServiceResult<Reservation> {
        self.owned_reservation(reservation_id).await
    }

    /// All reservations for this event, newest first.
    pub async fn reservations(&self) -> ServiceResult<Vec<Reservation>> {
        Ok(self
            .db
            .reservations()
            .list_for_event(&self.page.event_id())
            .await?)
    }

    async fn resolve_reservation(
        &self,
        reservation_id: &str,
        target: ReservationStatus,
    ) -> ServiceResult<Reservation> {
        let reservation = self.owned_reservation(reservation_id).await?;

        if !reservation.status.can_transition_to(target) {
            return Err(CoreError::InvalidTransition {
                current: reservation.status.to_string(),
                requested: target.to_string(),
            }
            .into());
        }

        match target {
            ReservationStatus::Paid => self.db.reservations().mark_paid(reservation_id).await?,
            ReservationStatus::Cancelled => {
                self.db.reservations().mark_cancelled(reservation_id).await?
            }
            ReservationStatus::Expired => {
                self.db.reservations().mark_expired(reservation_id).await?
            }
            // Unreachable: pending is never a transition target, the
            // guard above already rejected it
            ReservationStatus::Pending => {
                return Err(CoreError::InvalidTransition {
                    current: reservation.status.to_string(),
                    requested: target.to_string(),
                }
                .into())
            }
        }

        self.owned_reservation(reservation_id).await
    }

    async fn owned_reservation(&self, reservation_id: &str) -> ServiceResult<Reservation> {
        let event_id = self.page.event_id();
        self.db
            .reservations()
            .get_by_id(reservation_id)
            .await?
            .filter(|reservation| reservation.event_id == event_id)
            .ok_or_else(|| ServiceError::ReservationNotFound(reservation_id.to_string()))
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Text for the order-success page, after the fallback chain.
    pub async fn success_content(&self) -> ServiceResult<Option<String>> {
        self.content(ContentField::Success).await
    }

    /// Text for the confirmation mail, after the fallback chain.
    pub async fn mail_content(&self) -> ServiceResult<Option<String>> {
        self.content(ContentField::SuccessMail).await
    }

    /// Text for the printed ticket, after the fallback chain.
    pub async fn ticket_content(&self) -> ServiceResult<Option<String>> {
        self.content(ContentField::PrintedTicket).await
    }

    /// The fallback chain: the event's own text (blank counts as absent),
    /// else the site-wide default, else `None`.
    async fn content(&self, field: ContentField) -> ServiceResult<Option<String>> {
        let own = self
            .db
            .events()
            .get_by_id(&self.page.event_id())
            .await?
            .and_then(|event| event.own_content(field).map(str::to_string));

        Ok(own.or_else(|| self.config.content.default_content(field)))
    }

    // =========================================================================
    // Waiting List
    // =========================================================================

    /// Registers interest after the event sold out.
    ///
    /// Registrations never hold a seat and never appear on the guest
    /// list; they exist so the organizer can reach people when seats free
    /// up.
    pub async fn join_waiting_list(
        &self,
        first_name: &str,
        surname: &str,
        email: &str,
        telephone: Option<String>,
    ) -> ServiceResult<WaitingListRegistration> {
        let event = self.event().await?;

        validate_person_name("first name", first_name)?;
        validate_person_name("surname", surname)?;
        validate_email(email)?;

        let mut registration = WaitingListRegistration::new(&event.id, first_name, surname, email);
        registration.telephone = telephone;

        self.db.waiting_list().create(&registration).await?;

        info!(
            event_id = %event.id,
            registration_id = %registration.id,
            "Waiting list registration"
        );
        Ok(registration)
    }

    /// All waiting-list registrations, in signup order.
    pub async fn waiting_list(&self) -> ServiceResult<Vec<WaitingListRegistration>> {
        Ok(self
            .db
            .waiting_list()
            .list_for_event(&self.page.event_id())
            .await?)
    }

    // =========================================================================
    // Form Fields
    // =========================================================================

    /// The event's attendee-form fields in form order, for rendering the
    /// order form.
    pub async fn user_fields(&self) -> ServiceResult<Vec<UserField>> {
        Ok(self
            .db
            .user_fields()
            .list_for_event(&self.page.event_id())
            .await?)
    }

    /// Seeds the configured form fields onto this event if it has none.
    ///
    /// [`ensure_event`](Self::ensure_event) already runs this; it is
    /// exposed separately for hosts whose event records predate field
    /// seeding. Returns `true` when fields were created.
    pub async fn ensure_default_fields(&self) -> ServiceResult<bool> {
        let event = self.event().await?;
        let defaults = self.config.default_fields_for(&event.id);
        Ok(self
            .db
            .user_fields()
            .ensure_defaults(&event.id, &defaults)
            .await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldSpec;
    use crate::engine::Boxoffice;
    use boxoffice_core::{CoreResult, FixedClock, Money, UserFieldType};
    use chrono::TimeZone;

    // A well-behaved host page: implements the full contract.
    #[derive(Clone)]
    struct FestivalPage {
        start: Option<DateTime<Utc>>,
    }

    impl EventPage for FestivalPage {
        fn event_id(&self) -> String {
            "festival-1".to_string()
        }

        fn page_type(&self) -> &'static str {
            "FestivalPage"
        }

        fn event_title(&self) -> CoreResult<String> {
            Ok("Winter Festival".to_string())
        }

        fn event_start_date(&self) -> CoreResult<Option<DateTime<Utc>>> {
            Ok(self.start)
        }

        fn event_address(&self) -> CoreResult<String> {
            Ok("Castle grounds".to_string())
        }
    }

    fn dt(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    /// The canonical timeline: event on 1 Dec 2023, viewed on 25 Nov,
    /// which sits inside the derived window [24 Nov, 30 Nov 12:00).
    fn event_start() -> DateTime<Utc> {
        dt(2023, 12, 1, 0)
    }

    fn during_sale() -> DateTime<Utc> {
        dt(2023, 11, 25, 0)
    }

    async fn engine_at(now: DateTime<Utc>) -> Boxoffice {
        Boxoffice::in_memory()
            .await
            .unwrap()
            .with_clock(Arc::new(FixedClock::new(now)))
    }

    /// Engine + registered event + one dateless "Regular" ticket at 15.00.
    async fn festival(now: DateTime<Utc>) -> (Boxoffice, EventTickets<FestivalPage>, Ticket) {
        let engine = engine_at(now).await;
        let facade = engine
            .event_tickets(FestivalPage {
                start: Some(event_start()),
            })
            .unwrap();
        facade.ensure_event().await.unwrap();

        let ticket = Ticket::new("festival-1", "Regular", Money::from_cents(1500));
        facade.add_ticket(&ticket).await.unwrap();

        (engine, facade, ticket)
    }

    fn guest(first: &str, email: &str) -> AttendeeDetails {
        AttendeeDetails {
            first_name: first.to_string(),
            surname: "Lovelace".to_string(),
            email: email.to_string(),
            extra: BTreeMap::new(),
        }
    }

    fn order_for(ticket: &Ticket, attendees: Vec<AttendeeDetails>) -> TicketOrder {
        TicketOrder {
            ticket_id: ticket.id.clone(),
            attendees,
        }
    }

    #[tokio::test]
    async fn test_ensure_event_registers_once_with_defaults() {
        let engine = engine_at(during_sale()).await;
        let facade = engine
            .event_tickets(FestivalPage {
                start: Some(event_start()),
            })
            .unwrap();

        let event = facade.ensure_event().await.unwrap();
        assert_eq!(event.id, "festival-1");
        assert_eq!(event.capacity, 50);
        assert_eq!(event.order_min, 1);
        assert_eq!(event.order_max, 5);

        // The standard form fields came along
        let fields = facade.user_fields().await.unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["FirstName", "Surname", "Email"]);

        // Publishing again neither duplicates the event nor the fields
        let again = facade.ensure_event().await.unwrap();
        assert_eq!(again.id, event.id);
        assert_eq!(facade.user_fields().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_sale_start_prefers_the_earliest_resolved_open() {
        let (engine, facade, _regular) = festival(during_sale()).await;

        // Regular has no dates: its start derives to one week before the
        // event, 24 Nov
        assert_eq!(
            facade.ticket_sale_start().await.unwrap(),
            Some(dt(2023, 11, 24, 0))
        );

        // An early-bird ticket with an explicit start moves the earliest
        let mut early = Ticket::new("festival-1", "Early bird", Money::from_cents(1000));
        early.available_from = Some(dt(2023, 11, 1, 0));
        facade.add_ticket(&early).await.unwrap();

        assert_eq!(
            facade.ticket_sale_start().await.unwrap(),
            Some(dt(2023, 11, 1, 0))
        );

        // Viewed in mid-October the sale is still pending; viewed on
        // 25 Nov it is not
        assert!(!facade.sale_pending().await.unwrap());
        let earlier_facade = engine
            .clone()
            .with_clock(Arc::new(FixedClock::new(dt(2023, 10, 15, 0))))
            .event_tickets(FestivalPage {
                start: Some(event_start()),
            })
            .unwrap();
        assert!(earlier_facade.sale_pending().await.unwrap());
    }

    #[tokio::test]
    async fn test_capacity_counts_paid_and_manual_guests() {
        let (_engine, facade, ticket) = festival(during_sale()).await;

        let mut event = facade.event().await.unwrap();
        event.capacity = 2;
        facade.save_event(&event).await.unwrap();

        // One seat sold and paid
        let reservation = facade
            .reserve(&[order_for(&ticket, vec![guest("Ada", "ada@example.com")])])
            .await
            .unwrap();
        facade.pay(&reservation.id).await.unwrap();

        // Two guests walked in past the capacity check
        facade
            .add_guest(guest("Grace", "grace@example.com"))
            .await
            .unwrap();
        facade
            .add_guest(guest("Margaret", "margaret@example.com"))
            .await
            .unwrap();

        let report = facade.availability().await.unwrap();
        assert_eq!(report.guests, 3);
        assert_eq!(report.availability(), -1);
        assert!(facade.is_sold_out().await.unwrap());
        assert_eq!(facade.guest_list_status().await.unwrap(), "3/2");
        assert_eq!(facade.guest_list().await.unwrap().len(), 3);

        // Windows are open but no seats remain
        assert!(!facade.tickets_available().await.unwrap());
        assert!(!facade.event_expired().await.unwrap());
    }

    #[tokio::test]
    async fn test_reserve_rejects_bad_orders() {
        let (engine, facade, ticket) = festival(during_sale()).await;

        // Nothing ordered
        let err = facade.reserve(&[]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        // Unknown ticket
        let err = facade
            .reserve(&[TicketOrder {
                ticket_id: "no-such-ticket".to_string(),
                attendees: vec![guest("Ada", "ada@example.com")],
            }])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ForeignTicket { .. }));

        // A ticket that belongs to a different event
        let other_event = Event::with_id("other-event");
        engine.db().events().create(&other_event).await.unwrap();
        let foreign = Ticket::new("other-event", "Foreign", Money::from_cents(500));
        engine.db().tickets().create(&foreign).await.unwrap();

        let err = facade
            .reserve(&[order_for(&foreign, vec![guest("Ada", "ada@example.com")])])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ForeignTicket { .. }));

        // A ticket whose sale already closed
        let mut closed = Ticket::new("festival-1", "Door sale", Money::from_cents(2000));
        closed.available_from = Some(dt(2023, 11, 1, 0));
        closed.available_till = Some(dt(2023, 11, 10, 0));
        facade.add_ticket(&closed).await.unwrap();

        let err = facade
            .reserve(&[order_for(&closed, vec![guest("Ada", "ada@example.com")])])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::TicketNotOnSale { .. }));

        // More seats than the ticket's order bounds allow
        let six: Vec<AttendeeDetails> = (0..6)
            .map(|n| guest("Ada", &format!("ada{n}@example.com")))
            .collect();
        let err = facade.reserve(&[order_for(&ticket, six)]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        // A nonsense email
        let err = facade
            .reserve(&[order_for(&ticket, vec![guest("Ada", "not-an-email")])])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        // None of the failures left anything behind
        assert!(facade.reservations().await.unwrap().is_empty());
        assert_eq!(facade.availability().await.unwrap().guests, 0);
    }

    #[tokio::test]
    async fn test_reserve_requires_answers_for_required_extra_fields() {
        let (engine, facade, ticket) = festival(during_sale()).await;

        let diet = UserField::new(
            "festival-1",
            "DietaryWishes",
            "Dietary wishes",
            UserFieldType::Text,
        )
        .required()
        .at(3);
        engine.db().user_fields().create(&diet).await.unwrap();

        // The built-in trio is answered structurally, but the extra field
        // is not
        let err = facade
            .reserve(&[order_for(&ticket, vec![guest("Ada", "ada@example.com")])])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Dietary wishes is required");

        // Answered, the order goes through and the answer sticks
        let mut details = guest("Ada", "ada@example.com");
        details
            .extra
            .insert("DietaryWishes".to_string(), "vegan".to_string());

        let reservation = facade
            .reserve(&[order_for(&ticket, vec![details])])
            .await
            .unwrap();
        facade.pay(&reservation.id).await.unwrap();

        let guests = facade.guest_list().await.unwrap();
        assert_eq!(guests.len(), 1);
        assert_eq!(guests[0].extra.get("DietaryWishes").unwrap(), "vegan");
    }

    #[tokio::test]
    async fn test_reservation_lifecycle() {
        let (_engine, facade, ticket) = festival(during_sale()).await;

        let reservation = facade
            .reserve(&[order_for(
                &ticket,
                vec![
                    guest("Ada", "ada@example.com"),
                    guest("Grace", "grace@example.com"),
                ],
            )])
            .await
            .unwrap();

        assert_eq!(reservation.status, ReservationStatus::Pending);
        assert_eq!(reservation.total(), Money::from_cents(3000));

        // Pending holds no seats
        assert!(facade.guest_list().await.unwrap().is_empty());
        assert_eq!(facade.availability().await.unwrap().guests, 0);

        // Payment puts both attendees on the guest list
        let paid = facade.pay(&reservation.id).await.unwrap();
        assert_eq!(paid.status, ReservationStatus::Paid);
        assert_eq!(facade.guest_list().await.unwrap().len(), 2);

        // Terminal states stay terminal
        assert!(facade.pay(&reservation.id).await.is_err());
        assert!(facade.cancel(&reservation.id).await.is_err());

        // A separate reservation can still be cancelled or expired
        let walked = facade
            .reserve(&[order_for(&ticket, vec![guest("Edith", "edith@example.com")])])
            .await
            .unwrap();
        let cancelled = facade.cancel(&walked.id).await.unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);

        let stale = facade
            .reserve(&[order_for(&ticket, vec![guest("Jean", "jean@example.com")])])
            .await
            .unwrap();
        let expired = facade.expire(&stale.id).await.unwrap();
        assert_eq!(expired.status, ReservationStatus::Expired);

        // Only the paid pair made the guest list
        assert_eq!(facade.guest_list().await.unwrap().len(), 2);
        assert_eq!(facade.reservations().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_sold_out_pre_check_then_waiting_list() {
        let (_engine, facade, ticket) = festival(during_sale()).await;

        let mut event = facade.event().await.unwrap();
        event.capacity = 3;
        facade.save_event(&event).await.unwrap();

        let first = facade
            .reserve(&[order_for(
                &ticket,
                vec![
                    guest("Ada", "ada@example.com"),
                    guest("Grace", "grace@example.com"),
                ],
            )])
            .await
            .unwrap();
        facade.pay(&first.id).await.unwrap();

        // One seat left, two requested
        let err = facade
            .reserve(&[order_for(
                &ticket,
                vec![
                    guest("Edith", "edith@example.com"),
                    guest("Jean", "jean@example.com"),
                ],
            )])
            .await
            .unwrap_err();
        assert!(err.is_sold_out());
        assert!(matches!(
            err,
            ServiceError::SoldOut {
                available: 1,
                requested: 2
            }
        ));

        // The turned-away buyer signs up for freed seats instead
        let registration = facade
            .join_waiting_list("Edith", "Clarke", "edith@example.com", None)
            .await
            .unwrap();
        assert_eq!(registration.event_id, "festival-1");
        assert_eq!(facade.waiting_list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_payment_race_is_caught_by_the_transaction() {
        let (_engine, facade, ticket) = festival(during_sale()).await;

        let mut event = facade.event().await.unwrap();
        event.capacity = 3;
        facade.save_event(&event).await.unwrap();

        // Both orders pass the pre-check while seats are still free
        let winner = facade
            .reserve(&[order_for(
                &ticket,
                vec![
                    guest("Ada", "ada@example.com"),
                    guest("Grace", "grace@example.com"),
                ],
            )])
            .await
            .unwrap();
        let loser = facade
            .reserve(&[order_for(
                &ticket,
                vec![
                    guest("Edith", "edith@example.com"),
                    guest("Jean", "jean@example.com"),
                ],
            )])
            .await
            .unwrap();

        facade.pay(&winner.id).await.unwrap();

        // The second payment finds one seat for two people
        let err = facade.pay(&loser.id).await.unwrap_err();
        assert!(err.is_sold_out());

        // The loser is still pending and can be cancelled cleanly
        let cancelled = facade.cancel(&loser.id).await.unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);
        assert_eq!(facade.guest_list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_content_falls_back_to_site_defaults() {
        let mut config = crate::config::BoxofficeConfig::default();
        config.content.success = Some("Thanks from the site".to_string());

        let engine = Boxoffice::in_memory_with(config)
            .await
            .unwrap()
            .with_clock(Arc::new(FixedClock::new(during_sale())));
        let facade = engine
            .event_tickets(FestivalPage {
                start: Some(event_start()),
            })
            .unwrap();
        facade.ensure_event().await.unwrap();

        // No event text: the site default applies
        assert_eq!(
            facade.success_content().await.unwrap().as_deref(),
            Some("Thanks from the site")
        );

        // The event's own text wins
        let mut event = facade.event().await.unwrap();
        event.success_message = Some("Thanks from the event".to_string());
        facade.save_event(&event).await.unwrap();
        assert_eq!(
            facade.success_content().await.unwrap().as_deref(),
            Some("Thanks from the event")
        );

        // Whitespace counts as absent, back to the site default
        event.success_message = Some("   ".to_string());
        facade.save_event(&event).await.unwrap();
        assert_eq!(
            facade.success_content().await.unwrap().as_deref(),
            Some("Thanks from the site")
        );

        // A slot with no text anywhere stays empty
        assert_eq!(facade.mail_content().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_flags_on_unconfigured_events() {
        // A page with no start date and an event with no tickets
        let engine = engine_at(during_sale()).await;
        let facade = engine.event_tickets(FestivalPage { start: None }).unwrap();
        facade.ensure_event().await.unwrap();

        assert_eq!(facade.ticket_sale_start().await.unwrap(), None);
        assert!(!facade.sale_pending().await.unwrap());
        assert!(!facade.event_expired().await.unwrap());
        assert!(!facade.tickets_available().await.unwrap());

        // A dateless ticket on a dateless page can never open, which
        // makes the event expired despite the sale never starting
        let ticket = Ticket::new("festival-1", "Regular", Money::from_cents(1500));
        facade.add_ticket(&ticket).await.unwrap();

        assert_eq!(facade.ticket_sale_start().await.unwrap(), None);
        assert!(!facade.sale_pending().await.unwrap());
        assert!(facade.event_expired().await.unwrap());
        assert!(!facade.tickets_available().await.unwrap());
    }

    #[tokio::test]
    async fn test_check_in_is_scoped_to_the_event() {
        let (engine, facade, _ticket) = festival(during_sale()).await;

        let attendee = facade
            .add_guest(guest("Ada", "ada@example.com"))
            .await
            .unwrap();

        facade.check_in(&attendee.id).await.unwrap();
        assert_eq!(facade.checked_in_count().await.unwrap().to_string(), "(1/1)");

        // The door scan moves the check-in count, never the seat count
        assert_eq!(facade.guest_list_status().await.unwrap(), "1/50");

        // Scanning the same badge twice is fine
        facade.check_in(&attendee.id).await.unwrap();
        assert_eq!(facade.checked_in_count().await.unwrap().to_string(), "(1/1)");

        facade.check_out(&attendee.id).await.unwrap();
        assert_eq!(facade.checked_in_count().await.unwrap().to_string(), "(0/1)");

        // Unknown badge
        let err = facade.check_in("no-such-attendee").await.unwrap_err();
        assert!(matches!(err, ServiceError::AttendeeNotFound(_)));

        // A guest of another event is invisible through this facade
        let other_event = Event::with_id("other-event");
        engine.db().events().create(&other_event).await.unwrap();
        let outsider = Attendee::new("other-event", "Edith", "Clarke", "edith@example.com");
        engine.db().attendees().create(&outsider).await.unwrap();

        let err = facade.check_in(&outsider.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::AttendeeNotFound(_)));
    }

    #[tokio::test]
    async fn test_waiting_list_validates_contact_details() {
        let (_engine, facade, _ticket) = festival(during_sale()).await;

        let err = facade
            .join_waiting_list("Ada", "Lovelace", "not-an-email", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let with_phone = facade
            .join_waiting_list(
                "Ada",
                "Lovelace",
                "ada@example.com",
                Some("+31 6 1234 5678".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(with_phone.telephone.as_deref(), Some("+31 6 1234 5678"));
    }

    #[tokio::test]
    async fn test_removing_a_ticket_keeps_booked_guests() {
        let (_engine, facade, ticket) = festival(during_sale()).await;

        let reservation = facade
            .reserve(&[order_for(&ticket, vec![guest("Ada", "ada@example.com")])])
            .await
            .unwrap();
        facade.pay(&reservation.id).await.unwrap();

        facade.remove_ticket(&ticket.id).await.unwrap();
        assert!(facade.tickets().await.unwrap().is_empty());

        // The seat survives the ticket type
        let guests = facade.guest_list().await.unwrap();
        assert_eq!(guests.len(), 1);
        assert_eq!(guests[0].ticket_id, None);
    }

    #[tokio::test]
    async fn test_configured_field_specs_flow_into_new_events() {
        let mut config = crate::config::BoxofficeConfig::default();
        config.fields.push(FieldSpec {
            name: "Telephone".to_string(),
            title: "Phone number".to_string(),
            field_type: UserFieldType::Text,
            required: false,
        });

        let engine = Boxoffice::in_memory_with(config)
            .await
            .unwrap()
            .with_clock(Arc::new(FixedClock::new(during_sale())));
        let facade = engine
            .event_tickets(FestivalPage {
                start: Some(event_start()),
            })
            .unwrap();
        facade.ensure_event().await.unwrap();

        let fields = facade.user_fields().await.unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["FirstName", "Surname", "Email", "Telephone"]);
        assert!(!fields[3].required);
    }
}
