//! # Reservation Repository
//!
//! Database operations for the reservation state machine.
//!
//! ## Reservation Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Reservation Lifecycle                                │
//! │                                                                         │
//! │  1. RESERVE                                                            │
//! │     └── create() → Reservation { status: Pending }                     │
//! │     └── attendees inserted against it (seats held, not confirmed)      │
//! │     └── update_total() once the seats are priced                       │
//! │                                                                         │
//! │  2. RESOLVE (exactly one of)                                           │
//! │     ├── mark_paid()      → Paid      (capacity-checked, see below)     │
//! │     ├── mark_cancelled() → Cancelled                                   │
//! │     └── mark_expired()   → Expired                                     │
//! │                                                                         │
//! │  3. DONE — the three target states are terminal                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why mark_paid Is a Transaction
//! Payment is the moment seats become real. Two buyers can both hold
//! pending reservations for the last seats; whoever pays first wins, and
//! the loser must get a refusal, never an oversold event. The guest
//! count, the capacity comparison, and the status flip therefore happen
//! inside one transaction. SQLite serializes writers, so concurrent
//! payments cannot interleave between the count and the flip.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use boxoffice_core::{Reservation, ReservationStatus};

/// Repository for reservation database operations.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: SqlitePool,
}

impl ReservationRepository {
    /// Creates a new ReservationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReservationRepository { pool }
    }

    /// Inserts a reservation.
    pub async fn create(&self, reservation: &Reservation) -> DbResult<()> {
        debug!(
            id = %reservation.id,
            event_id = %reservation.event_id,
            "Creating reservation"
        );

        sqlx::query(
            r#"
            INSERT INTO reservations (
                id, event_id, status, total_cents, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&reservation.id)
        .bind(&reservation.event_id)
        .bind(reservation.status)
        .bind(reservation.total_cents)
        .bind(reservation.created_at)
        .bind(reservation.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a reservation by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Reservation>> {
        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT id, event_id, status, total_cents, created_at, updated_at
            FROM reservations
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reservation)
    }

    /// Sets the reservation total after its seats are priced.
    ///
    /// Only pending reservations may be repriced; the total on a resolved
    /// reservation is order history.
    pub async fn update_total(&self, id: &str, total_cents: i64) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE reservations SET total_cents = ?2, updated_at = ?3
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(total_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Reservation (pending)", id));
        }

        Ok(())
    }

    /// Confirms a pending reservation as paid, refusing the flip when the
    /// event lacks room for its seats.
    ///
    /// ## What This Does (in one transaction)
    /// 1. Reads the reservation; must exist and be pending
    /// 2. Counts confirmed seats against the event's capacity
    /// 3. Refuses with `CapacityExceeded` if this reservation's seats
    ///    don't fit — the reservation stays pending
    /// 4. Flips status to `paid`, which puts the seats on the guest list
    ///
    /// ## Losing a Race
    /// A refusal does not touch the reservation; the caller chooses
    /// between cancelling it and pointing the buyer at the waiting list.
    pub async fn mark_paid(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        // Early returns below drop the transaction, rolling it back.
        let row: Option<(String, ReservationStatus)> =
            sqlx::query_as("SELECT event_id, status FROM reservations WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let (event_id, status) = match row {
            Some(row) => row,
            None => return Err(DbError::not_found("Reservation", id)),
        };
        if status != ReservationStatus::Pending {
            return Err(DbError::not_found("Reservation (pending)", id));
        }

        let capacity: Option<i32> = sqlx::query_scalar("SELECT capacity FROM events WHERE id = ?1")
            .bind(&event_id)
            .fetch_optional(&mut *tx)
            .await?;
        let capacity = match capacity {
            Some(capacity) => capacity,
            None => return Err(DbError::not_found("Event", &event_id)),
        };

        let guests: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM attendees a
            LEFT JOIN reservations r ON a.reservation_id = r.id
            WHERE a.event_id = ?1 AND (a.reservation_id IS NULL OR r.status = 'paid')
            "#,
        )
        .bind(&event_id)
        .fetch_one(&mut *tx)
        .await?;

        let seats: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM attendees WHERE reservation_id = ?1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        if guests + seats > i64::from(capacity) {
            debug!(
                reservation_id = %id,
                event_id = %event_id,
                guests,
                seats,
                capacity,
                "Refusing payment, event is at capacity"
            );
            return Err(DbError::capacity_exceeded(
                &event_id,
                i64::from(capacity) - guests,
                seats,
            ));
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE reservations SET status = 'paid', updated_at = ?2
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Reservation (pending)", id));
        }

        tx.commit().await?;

        info!(reservation_id = %id, event_id = %event_id, seats, "Reservation paid");
        Ok(())
    }

    /// Cancels a pending reservation (buyer walked away).
    pub async fn mark_cancelled(&self, id: &str) -> DbResult<()> {
        self.resolve_pending(id, "cancelled").await
    }

    /// Expires a pending reservation (hold timed out).
    pub async fn mark_expired(&self, id: &str) -> DbResult<()> {
        self.resolve_pending(id, "expired").await
    }

    /// Flips a pending reservation into a terminal non-paid state. No
    /// capacity check: leaving the guest list never needs one.
    async fn resolve_pending(&self, id: &str, target: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE reservations SET status = ?2, updated_at = ?3
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(target)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Reservation (pending)", id));
        }

        info!(reservation_id = %id, status = target, "Reservation resolved");
        Ok(())
    }

    /// Lists an event's reservations, oldest first.
    pub async fn list_for_event(&self, event_id: &str) -> DbResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT id, event_id, status, total_cents, created_at, updated_at
            FROM reservations
            WHERE event_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
