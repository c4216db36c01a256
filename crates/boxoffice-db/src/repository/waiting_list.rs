//! # Waiting List Repository
//!
//! Database operations for sold-out interest registrations.
//!
//! Registrations live entirely outside capacity accounting: they hold no
//! seat, join no guest list, and expire with the event. The organizer
//! reads the list and contacts people when seats free up; nothing here
//! promotes a registration into an attendee automatically.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use boxoffice_core::WaitingListRegistration;

/// Repository for waiting-list database operations.
#[derive(Debug, Clone)]
pub struct WaitingListRepository {
    pool: SqlitePool,
}

impl WaitingListRepository {
    /// Creates a new WaitingListRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WaitingListRepository { pool }
    }

    /// Inserts a registration.
    pub async fn create(&self, registration: &WaitingListRegistration) -> DbResult<()> {
        debug!(
            id = %registration.id,
            event_id = %registration.event_id,
            "Creating waiting-list registration"
        );

        sqlx::query(
            r#"
            INSERT INTO waiting_list_registrations (
                id, event_id, first_name, surname, email, telephone, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&registration.id)
        .bind(&registration.event_id)
        .bind(&registration.first_name)
        .bind(&registration.surname)
        .bind(&registration.email)
        .bind(&registration.telephone)
        .bind(registration.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists an event's registrations in the order people signed up.
    pub async fn list_for_event(&self, event_id: &str) -> DbResult<Vec<WaitingListRegistration>> {
        let registrations = sqlx::query_as::<_, WaitingListRegistration>(
            r#"
            SELECT id, event_id, first_name, surname, email, telephone, created_at
            FROM waiting_list_registrations
            WHERE event_id = ?1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// Counts an event's registrations.
    pub async fn count_for_event(&self, event_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM waiting_list_registrations WHERE event_id = ?1",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Deletes a registration (organizer contacted the person, or they
    /// asked to be removed).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting waiting-list registration");

        let result = sqlx::query("DELETE FROM waiting_list_registrations WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("WaitingListRegistration", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
