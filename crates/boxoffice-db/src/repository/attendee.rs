//! # Attendee Repository
//!
//! Database operations for attendees: the guest list, the counts derived
//! from it, and door check-in.
//!
//! ## The Guest List Query
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Who Holds a Seat?                                   │
//! │                                                                         │
//! │  attendees a LEFT JOIN reservations r ON a.reservation_id = r.id       │
//! │                                                                         │
//! │  a.reservation_id IS NULL ──────────► manually added guest   ✓ seat    │
//! │  r.status = 'paid'        ──────────► completed purchase     ✓ seat    │
//! │  r.status = 'pending'     ──────────► buyer still paying     ✗         │
//! │  r.status = 'cancelled'   ──────────► buyer walked away      ✗         │
//! │  r.status = 'expired'     ──────────► hold timed out         ✗         │
//! │                                                                         │
//! │  Every count in the system (availability, sold out, check-in           │
//! │  totals) reruns this filter. Nothing is cached in a column.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The same rule exists in domain terms as `Attendee::holds_seat`; the
//! tests below pin the two to each other.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use boxoffice_core::{Attendee, CheckedInCount};

/// Filter picking out attendees who hold a confirmed seat. Kept in one
/// place so the list and every count agree with each other.
const HOLDS_SEAT: &str = "(a.reservation_id IS NULL OR r.status = 'paid')";

/// Repository for attendee database operations.
#[derive(Debug, Clone)]
pub struct AttendeeRepository {
    pool: SqlitePool,
}

impl AttendeeRepository {
    /// Creates a new AttendeeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AttendeeRepository { pool }
    }

    /// Inserts an attendee.
    ///
    /// Both creation paths come through here: the selling flow inserts
    /// attendees attached to a pending reservation, and admins insert
    /// reservation-less guests who land on the guest list immediately.
    pub async fn create(&self, attendee: &Attendee) -> DbResult<()> {
        debug!(
            id = %attendee.id,
            event_id = %attendee.event_id,
            manual = attendee.reservation_id.is_none(),
            "Creating attendee"
        );

        sqlx::query(
            r#"
            INSERT INTO attendees (
                id, event_id, ticket_id, reservation_id,
                first_name, surname, email, extra,
                checked_in, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&attendee.id)
        .bind(&attendee.event_id)
        .bind(&attendee.ticket_id)
        .bind(&attendee.reservation_id)
        .bind(&attendee.first_name)
        .bind(&attendee.surname)
        .bind(&attendee.email)
        .bind(sqlx::types::Json(&attendee.extra))
        .bind(attendee.checked_in)
        .bind(attendee.created_at)
        .bind(attendee.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an attendee by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Attendee>> {
        let attendee = sqlx::query_as::<_, Attendee>(
            r#"
            SELECT
                id, event_id, ticket_id, reservation_id,
                first_name, surname, email, extra,
                checked_in, created_at, updated_at
            FROM attendees
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attendee)
    }

    /// Updates an attendee's name, contact details, and extra answers.
    pub async fn update(&self, attendee: &Attendee) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE attendees SET
                first_name = ?2,
                surname = ?3,
                email = ?4,
                extra = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&attendee.id)
        .bind(&attendee.first_name)
        .bind(&attendee.surname)
        .bind(&attendee.email)
        .bind(sqlx::types::Json(&attendee.extra))
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Attendee", &attendee.id));
        }

        Ok(())
    }

    /// Deletes an attendee (admin removing a manual guest).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting attendee");

        let result = sqlx::query("DELETE FROM attendees WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Attendee", id));
        }

        Ok(())
    }

    /// The guest list: every attendee holding a confirmed seat, in
    /// arrival order.
    pub async fn guest_list(&self, event_id: &str) -> DbResult<Vec<Attendee>> {
        let sql = format!(
            r#"
            SELECT
                a.id, a.event_id, a.ticket_id, a.reservation_id,
                a.first_name, a.surname, a.email, a.extra,
                a.checked_in, a.created_at, a.updated_at
            FROM attendees a
            LEFT JOIN reservations r ON a.reservation_id = r.id
            WHERE a.event_id = ?1 AND {HOLDS_SEAT}
            ORDER BY a.created_at ASC, a.id ASC
            "#
        );

        let guests = sqlx::query_as::<_, Attendee>(&sql)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(guests)
    }

    /// Counts confirmed seats. This is the number availability is
    /// computed against; it is recomputed on every call.
    pub async fn guest_count(&self, event_id: &str) -> DbResult<i64> {
        let sql = format!(
            r#"
            SELECT COUNT(*)
            FROM attendees a
            LEFT JOIN reservations r ON a.reservation_id = r.id
            WHERE a.event_id = ?1 AND {HOLDS_SEAT}
            "#
        );

        let count: i64 = sqlx::query_scalar(&sql)
            .bind(event_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Door progress over the guest list: how many confirmed guests have
    /// been scanned in, out of how many.
    pub async fn checked_in_count(&self, event_id: &str) -> DbResult<CheckedInCount> {
        let sql = format!(
            r#"
            SELECT COALESCE(SUM(a.checked_in), 0), COUNT(*)
            FROM attendees a
            LEFT JOIN reservations r ON a.reservation_id = r.id
            WHERE a.event_id = ?1 AND {HOLDS_SEAT}
            "#
        );

        let (checked_in, total): (i64, i64) = sqlx::query_as(&sql)
            .bind(event_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(CheckedInCount::new(checked_in, total))
    }

    /// Lists the attendees belonging to one reservation, in creation order.
    pub async fn list_for_reservation(&self, reservation_id: &str) -> DbResult<Vec<Attendee>> {
        let attendees = sqlx::query_as::<_, Attendee>(
            r#"
            SELECT
                id, event_id, ticket_id, reservation_id,
                first_name, surname, email, extra,
                checked_in, created_at, updated_at
            FROM attendees
            WHERE reservation_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attendees)
    }

    /// Marks an attendee as scanned in at the door.
    ///
    /// Idempotent: scanning the same ticket twice is a no-op, not an
    /// error. The door UI decides whether to warn on a repeat scan.
    pub async fn check_in(&self, id: &str) -> DbResult<()> {
        self.set_checked_in(id, true).await
    }

    /// Reverts a check-in (wrong person scanned, or a guest leaving).
    pub async fn check_out(&self, id: &str) -> DbResult<()> {
        self.set_checked_in(id, false).await
    }

    async fn set_checked_in(&self, id: &str, checked_in: bool) -> DbResult<()> {
        debug!(id = %id, checked_in, "Setting attendee check-in state");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE attendees SET checked_in = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(checked_in)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Attendee", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use boxoffice_core::{Attendee, Event, Money, Reservation, Ticket};
    use chrono::{Duration, Utc};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seeded_event(db: &Database) -> Event {
        let event = Event::new();
        db.events().create(&event).await.unwrap();
        event
    }

    /// Creates a reservation in the given status with one attendee on it,
    /// returning the attendee ID.
    async fn booked_attendee(
        db: &Database,
        event: &Event,
        ticket: &Ticket,
        name: &str,
        status: &str,
    ) -> String {
        let reservation = Reservation::new(&event.id);
        db.reservations().create(&reservation).await.unwrap();

        let attendee = Attendee::new(&event.id, name, "Tester", "tester@example.com")
            .with_reservation(&reservation.id, &ticket.id);
        db.attendees().create(&attendee).await.unwrap();

        match status {
            "pending" => {}
            "paid" => db.reservations().mark_paid(&reservation.id).await.unwrap(),
            "cancelled" => db
                .reservations()
                .mark_cancelled(&reservation.id)
                .await
                .unwrap(),
            "expired" => db
                .reservations()
                .mark_expired(&reservation.id)
                .await
                .unwrap(),
            other => panic!("unknown status {other}"),
        }

        attendee.id
    }

    #[tokio::test]
    async fn test_guest_list_is_manual_plus_paid() {
        let db = test_db().await;
        let event = seeded_event(&db).await;
        let ticket = Ticket::new(&event.id, "Regular", Money::from_cents(2500));
        db.tickets().create(&ticket).await.unwrap();

        let manual = Attendee::new(&event.id, "Ada", "Lovelace", "ada@example.com");
        db.attendees().create(&manual).await.unwrap();

        let paid_id = booked_attendee(&db, &event, &ticket, "Grace", "paid").await;
        booked_attendee(&db, &event, &ticket, "Edsger", "pending").await;
        booked_attendee(&db, &event, &ticket, "Alan", "cancelled").await;
        booked_attendee(&db, &event, &ticket, "Barbara", "expired").await;

        let guests = db.attendees().guest_list(&event.id).await.unwrap();
        let ids: Vec<&str> = guests.iter().map(|a| a.id.as_str()).collect();

        assert_eq!(guests.len(), 2);
        assert!(ids.contains(&manual.id.as_str()));
        assert!(ids.contains(&paid_id.as_str()));

        // Counts always agree with the list
        assert_eq!(db.attendees().guest_count(&event.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_guest_list_arrival_order() {
        let db = test_db().await;
        let event = seeded_event(&db).await;

        let base = Utc::now();
        for (i, name) in ["First", "Second", "Third"].iter().enumerate() {
            let mut attendee = Attendee::new(&event.id, *name, "Guest", "guest@example.com");
            attendee.created_at = base + Duration::seconds(i as i64);
            db.attendees().create(&attendee).await.unwrap();
        }

        let guests = db.attendees().guest_list(&event.id).await.unwrap();
        let names: Vec<&str> = guests.iter().map(|a| a.first_name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_extra_answers_round_trip() {
        let db = test_db().await;
        let event = seeded_event(&db).await;

        let mut attendee = Attendee::new(&event.id, "Ada", "Lovelace", "ada@example.com");
        attendee
            .extra
            .insert("DietaryWishes".to_string(), "vegan".to_string());
        attendee
            .extra
            .insert("Newsletter".to_string(), "1".to_string());
        db.attendees().create(&attendee).await.unwrap();

        let found = db.attendees().get_by_id(&attendee.id).await.unwrap().unwrap();
        assert_eq!(found.extra, attendee.extra);

        let mut updated = found.clone();
        updated
            .extra
            .insert("DietaryWishes".to_string(), "none".to_string());
        db.attendees().update(&updated).await.unwrap();

        let found = db.attendees().get_by_id(&attendee.id).await.unwrap().unwrap();
        assert_eq!(found.extra.get("DietaryWishes").map(String::as_str), Some("none"));
    }

    #[tokio::test]
    async fn test_check_in_and_out() {
        let db = test_db().await;
        let event = seeded_event(&db).await;

        let ada = Attendee::new(&event.id, "Ada", "Lovelace", "ada@example.com");
        let grace = Attendee::new(&event.id, "Grace", "Hopper", "grace@example.com");
        db.attendees().create(&ada).await.unwrap();
        db.attendees().create(&grace).await.unwrap();

        let count = db.attendees().checked_in_count(&event.id).await.unwrap();
        assert_eq!(count.to_string(), "(0/2)");

        db.attendees().check_in(&ada.id).await.unwrap();
        // Scanning the same ticket again changes nothing
        db.attendees().check_in(&ada.id).await.unwrap();

        let count = db.attendees().checked_in_count(&event.id).await.unwrap();
        assert_eq!(count.to_string(), "(1/2)");

        db.attendees().check_out(&ada.id).await.unwrap();
        let count = db.attendees().checked_in_count(&event.id).await.unwrap();
        assert_eq!(count.to_string(), "(0/2)");
    }

    #[tokio::test]
    async fn test_checked_in_count_ignores_unconfirmed_seats() {
        let db = test_db().await;
        let event = seeded_event(&db).await;
        let ticket = Ticket::new(&event.id, "Regular", Money::from_cents(2500));
        db.tickets().create(&ticket).await.unwrap();

        let pending_id = booked_attendee(&db, &event, &ticket, "Edsger", "pending").await;
        db.attendees().check_in(&pending_id).await.unwrap();

        // The scan stuck to the row, but an unpaid seat is not part of
        // the door totals
        let count = db.attendees().checked_in_count(&event.id).await.unwrap();
        assert_eq!(count.to_string(), "(0/0)");
    }

    #[tokio::test]
    async fn test_list_for_reservation() {
        let db = test_db().await;
        let event = seeded_event(&db).await;
        let ticket = Ticket::new(&event.id, "Regular", Money::from_cents(2500));
        db.tickets().create(&ticket).await.unwrap();

        let reservation = Reservation::new(&event.id);
        db.reservations().create(&reservation).await.unwrap();

        for name in ["Ada", "Grace"] {
            let attendee = Attendee::new(&event.id, name, "Guest", "guest@example.com")
                .with_reservation(&reservation.id, &ticket.id);
            db.attendees().create(&attendee).await.unwrap();
        }

        let seats = db
            .attendees()
            .list_for_reservation(&reservation.id)
            .await
            .unwrap();
        assert_eq!(seats.len(), 2);
        assert!(seats.iter().all(|a| a.ticket_id.as_deref() == Some(ticket.id.as_str())));
    }

    #[tokio::test]
    async fn test_check_in_missing_attendee_fails() {
        let db = test_db().await;
        let result = db.attendees().check_in("no-such-id").await;
        assert!(result.is_err());
    }
}
