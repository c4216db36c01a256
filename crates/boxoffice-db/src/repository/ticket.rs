//! # Ticket Repository
//!
//! Database operations for ticket types.
//!
//! ## Sale Window Columns
//! `available_from` / `available_till` store the explicit window bounds and
//! stay NULL when the organizer left them open. The fallback to event-start
//! offsets happens in `boxoffice_core::sale_window`, not here; storage only
//! ever sees what was actually entered.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use boxoffice_core::Ticket;

/// Repository for ticket-type database operations.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: SqlitePool,
}

impl TicketRepository {
    /// Creates a new TicketRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TicketRepository { pool }
    }

    /// Inserts a ticket type.
    pub async fn create(&self, ticket: &Ticket) -> DbResult<()> {
        debug!(id = %ticket.id, event_id = %ticket.event_id, title = %ticket.title, "Creating ticket");

        sqlx::query(
            r#"
            INSERT INTO tickets (
                id, event_id, title, price_cents,
                available_from, available_till,
                order_min, order_max, sort,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&ticket.id)
        .bind(&ticket.event_id)
        .bind(&ticket.title)
        .bind(ticket.price_cents)
        .bind(ticket.available_from)
        .bind(ticket.available_till)
        .bind(ticket.order_min)
        .bind(ticket.order_max)
        .bind(ticket.sort)
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a ticket by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Ticket>> {
        let ticket = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT
                id, event_id, title, price_cents,
                available_from, available_till,
                order_min, order_max, sort,
                created_at, updated_at
            FROM tickets
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ticket)
    }

    /// Updates a ticket's details, window bounds, order bounds, and sort.
    pub async fn update(&self, ticket: &Ticket) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE tickets SET
                title = ?2,
                price_cents = ?3,
                available_from = ?4,
                available_till = ?5,
                order_min = ?6,
                order_max = ?7,
                sort = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&ticket.id)
        .bind(&ticket.title)
        .bind(ticket.price_cents)
        .bind(ticket.available_from)
        .bind(ticket.available_till)
        .bind(ticket.order_min)
        .bind(ticket.order_max)
        .bind(ticket.sort)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ticket", &ticket.id));
        }

        Ok(())
    }

    /// Deletes a ticket type. Attendees booked on it are kept; their
    /// `ticket_id` is cleared by the schema's SET NULL rule.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting ticket");

        let result = sqlx::query("DELETE FROM tickets WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ticket", id));
        }

        Ok(())
    }

    /// Lists an event's ticket types in display order.
    ///
    /// ## Ordering
    /// `sort ASC, available_from DESC`: the organizer's manual order wins,
    /// and within one sort rank the latest-opening ticket comes first
    /// (tickets with no explicit start sink to the end of their rank).
    pub async fn list_for_event(&self, event_id: &str) -> DbResult<Vec<Ticket>> {
        let tickets = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT
                id, event_id, title, price_cents,
                available_from, available_till,
                order_min, order_max, sort,
                created_at, updated_at
            FROM tickets
            WHERE event_id = ?1
            ORDER BY sort ASC, available_from DESC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }

    /// Counts an event's ticket types.
    pub async fn count_for_event(&self, event_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE event_id = ?1")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use boxoffice_core::{Event, Money, Ticket};
    use chrono::{TimeZone, Utc};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seeded_event(db: &Database) -> Event {
        let event = Event::new();
        db.events().create(&event).await.unwrap();
        event
    }

    #[tokio::test]
    async fn test_create_and_get_ticket() {
        let db = test_db().await;
        let event = seeded_event(&db).await;

        let mut ticket = Ticket::new(&event.id, "Early bird", Money::from_cents(1500));
        ticket.available_till = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        db.tickets().create(&ticket).await.unwrap();

        let found = db.tickets().get_by_id(&ticket.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Early bird");
        assert_eq!(found.price(), Money::from_cents(1500));
        assert!(found.available_from.is_none());
        assert_eq!(found.available_till, ticket.available_till);
    }

    #[tokio::test]
    async fn test_update_ticket_window() {
        let db = test_db().await;
        let event = seeded_event(&db).await;

        let mut ticket = Ticket::new(&event.id, "Regular", Money::from_cents(2500));
        db.tickets().create(&ticket).await.unwrap();

        ticket.available_from = Some(Utc.with_ymd_and_hms(2023, 11, 1, 12, 0, 0).unwrap());
        ticket.price_cents = 2750;
        db.tickets().update(&ticket).await.unwrap();

        let found = db.tickets().get_by_id(&ticket.id).await.unwrap().unwrap();
        assert_eq!(found.available_from, ticket.available_from);
        assert_eq!(found.price_cents, 2750);
    }

    #[tokio::test]
    async fn test_list_orders_by_sort_then_latest_start() {
        let db = test_db().await;
        let event = seeded_event(&db).await;

        let opens = |day: u32| Utc.with_ymd_and_hms(2023, 11, day, 0, 0, 0).unwrap();

        let mut regular = Ticket::new(&event.id, "Regular", Money::from_cents(2500));
        regular.sort = 1;
        regular.available_from = Some(opens(1));

        let mut late = Ticket::new(&event.id, "Late release", Money::from_cents(3000));
        late.sort = 1;
        late.available_from = Some(opens(20));

        let mut vip = Ticket::new(&event.id, "VIP", Money::from_cents(9000));
        vip.sort = 0;

        for ticket in [&regular, &late, &vip] {
            db.tickets().create(ticket).await.unwrap();
        }

        let listed = db.tickets().list_for_event(&event.id).await.unwrap();
        let titles: Vec<&str> = listed.iter().map(|t| t.title.as_str()).collect();
        // sort 0 first; within sort 1 the later-opening ticket leads
        assert_eq!(titles, vec!["VIP", "Late release", "Regular"]);
    }

    #[tokio::test]
    async fn test_delete_keeps_booked_attendees() {
        let db = test_db().await;
        let event = seeded_event(&db).await;

        let ticket = Ticket::new(&event.id, "Regular", Money::from_cents(2500));
        db.tickets().create(&ticket).await.unwrap();

        let reservation = boxoffice_core::Reservation::new(&event.id);
        db.reservations().create(&reservation).await.unwrap();

        let attendee = boxoffice_core::Attendee::new(&event.id, "Ada", "Lovelace", "ada@example.com")
            .with_reservation(&reservation.id, &ticket.id);
        db.attendees().create(&attendee).await.unwrap();

        db.tickets().delete(&ticket.id).await.unwrap();

        let kept = db.attendees().get_by_id(&attendee.id).await.unwrap().unwrap();
        assert!(kept.ticket_id.is_none());
        assert_eq!(kept.reservation_id.as_deref(), Some(reservation.id.as_str()));
    }
}
