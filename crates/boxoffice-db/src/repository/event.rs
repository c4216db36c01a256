//! # Event Repository
//!
//! Database operations for event ticketing records.
//!
//! The row here is deliberately thin: presentation data (title, start date,
//! address) stays in the host CMS page. This table owns what ticketing
//! adds to a page, and everything else in the schema hangs off it.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use boxoffice_core::Event;

/// Repository for event database operations.
#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: SqlitePool,
}

impl EventRepository {
    /// Creates a new EventRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EventRepository { pool }
    }

    /// Inserts an event record.
    pub async fn create(&self, event: &Event) -> DbResult<()> {
        debug!(id = %event.id, capacity = event.capacity, "Creating event");

        sqlx::query(
            r#"
            INSERT INTO events (
                id, capacity, order_min, order_max,
                success_message, success_message_mail, printed_ticket_content,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&event.id)
        .bind(event.capacity)
        .bind(event.order_min)
        .bind(event.order_max)
        .bind(&event.success_message)
        .bind(&event.success_message_mail)
        .bind(&event.printed_ticket_content)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an event by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            SELECT
                id, capacity, order_min, order_max,
                success_message, success_message_mail, printed_ticket_content,
                created_at, updated_at
            FROM events
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Updates an event's capacity, order bounds, and content overrides.
    ///
    /// ## Note
    /// Lowering capacity below the current guest count is allowed; the
    /// availability numbers simply go negative until seats free up.
    pub async fn update(&self, event: &Event) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE events SET
                capacity = ?2,
                order_min = ?3,
                order_max = ?4,
                success_message = ?5,
                success_message_mail = ?6,
                printed_ticket_content = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&event.id)
        .bind(event.capacity)
        .bind(event.order_min)
        .bind(event.order_max)
        .bind(&event.success_message)
        .bind(&event.success_message_mail)
        .bind(&event.printed_ticket_content)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Event", &event.id));
        }

        Ok(())
    }

    /// Deletes an event and, through the schema's cascade rules, its
    /// tickets, reservations, attendees, waiting list, and user fields.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting event");

        let result = sqlx::query("DELETE FROM events WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Event", id));
        }

        Ok(())
    }

    /// Lists all events, oldest first.
    pub async fn list_all(&self) -> DbResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT
                id, capacity, order_min, order_max,
                success_message, success_message_mail, printed_ticket_content,
                created_at, updated_at
            FROM events
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Counts all events.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
