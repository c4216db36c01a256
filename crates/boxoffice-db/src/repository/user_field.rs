//! # User Field Repository
//!
//! Database operations for the per-event attendee form schema.
//!
//! ## Default Seeding
//! Every event starts with the same base questions (first name, surname,
//! email). `ensure_defaults` seeds them exactly once per event, so the
//! creation hook can fire on every save without duplicating fields, and
//! an organizer who deliberately deleted a default doesn't get it back.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use boxoffice_core::UserField;

/// Repository for user-field database operations.
#[derive(Debug, Clone)]
pub struct UserFieldRepository {
    pool: SqlitePool,
}

impl UserFieldRepository {
    /// Creates a new UserFieldRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserFieldRepository { pool }
    }

    /// Inserts a field. Field names are unique per event; a duplicate
    /// name surfaces as `UniqueViolation`.
    pub async fn create(&self, field: &UserField) -> DbResult<()> {
        debug!(
            id = %field.id,
            event_id = %field.event_id,
            name = %field.name,
            "Creating user field"
        );

        sqlx::query(
            r#"
            INSERT INTO user_fields (
                id, event_id, name, title, field_type, required, sort, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&field.id)
        .bind(&field.event_id)
        .bind(&field.name)
        .bind(&field.title)
        .bind(field.field_type)
        .bind(field.required)
        .bind(field.sort)
        .bind(field.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a field by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<UserField>> {
        let field = sqlx::query_as::<_, UserField>(
            r#"
            SELECT id, event_id, name, title, field_type, required, sort, created_at
            FROM user_fields
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(field)
    }

    /// Lists an event's fields in form order.
    pub async fn list_for_event(&self, event_id: &str) -> DbResult<Vec<UserField>> {
        let fields = sqlx::query_as::<_, UserField>(
            r#"
            SELECT id, event_id, name, title, field_type, required, sort, created_at
            FROM user_fields
            WHERE event_id = ?1
            ORDER BY sort ASC, created_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(fields)
    }

    /// Updates a field's label, type, required flag, and position. The
    /// machine name is fixed for life; attendee answers are keyed by it.
    pub async fn update(&self, field: &UserField) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE user_fields SET
                title = ?2,
                field_type = ?3,
                required = ?4,
                sort = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&field.id)
        .bind(&field.title)
        .bind(field.field_type)
        .bind(field.required)
        .bind(field.sort)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("UserField", &field.id));
        }

        Ok(())
    }

    /// Deletes a field. Existing attendee answers keep their keyed entry
    /// in `extra`; only the form stops asking.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting user field");

        let result = sqlx::query("DELETE FROM user_fields WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("UserField", id));
        }

        Ok(())
    }

    /// Seeds the default field set for an event that has none yet.
    ///
    /// ## Rules
    /// - An event with any fields at all is left alone, even if the
    ///   existing fields don't resemble the defaults
    /// - Runs in one transaction, so a double-fired creation hook can't
    ///   seed twice
    ///
    /// Returns `true` when the defaults were written by this call.
    pub async fn ensure_defaults(&self, event_id: &str, defaults: &[UserField]) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM user_fields WHERE event_id = ?1")
                .bind(event_id)
                .fetch_one(&mut *tx)
                .await?;

        if existing > 0 {
            return Ok(false);
        }

        for field in defaults {
            sqlx::query(
                r#"
                INSERT INTO user_fields (
                    id, event_id, name, title, field_type, required, sort, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&field.id)
            .bind(event_id)
            .bind(&field.name)
            .bind(&field.title)
            .bind(field.field_type)
            .bind(field.required)
            .bind(field.sort)
            .bind(field.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(event_id = %event_id, count = defaults.len(), "Seeded default user fields");
        Ok(true)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
