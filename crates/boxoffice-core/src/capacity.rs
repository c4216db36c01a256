//! # Capacity Accounting
//!
//! Seat math over the guest list.
//!
//! ## Recompute-on-Read
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  There is NO cached "seats sold" counter anywhere in the system.        │
//! │                                                                         │
//! │  Every read:   capacity (event record)                                  │
//! │                − |guest list| (live query, paid + manual attendees)     │
//! │                = availability                                           │
//! │                                                                         │
//! │  Counters drift; the guest-list query cannot. The price is one COUNT    │
//! │  per read, which SQLite serves off an indexed column.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Availability may legitimately go NEGATIVE: an organizer lowering
//! capacity below seats already sold must see the oversold state, so the
//! subtraction is never clamped.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Capacity Report
// =============================================================================

/// One event's seat accounting at a point in time.
///
/// `guests` is the guest-list size reported by storage (attendees with no
/// reservation plus attendees on paid reservations), never the raw
/// attendee count.
///
/// ## Example
/// ```rust
/// use boxoffice_core::capacity::CapacityReport;
///
/// let report = CapacityReport::new(50, 12);
/// assert_eq!(report.availability(), 38);
/// assert!(report.has_availability());
/// assert!(!report.is_sold_out());
/// assert_eq!(report.to_string(), "12/50"); // the admin guest-list status line
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityReport {
    /// Declared capacity from the event record.
    pub capacity: i32,
    /// Current guest-list size.
    pub guests: i64,
}

impl CapacityReport {
    pub fn new(capacity: i32, guests: i64) -> Self {
        Self { capacity, guests }
    }

    /// Seats remaining: `capacity − guests`. Negative when oversold.
    #[inline]
    pub fn availability(&self) -> i64 {
        self.capacity as i64 - self.guests
    }

    /// No seats left (availability at or below zero).
    #[inline]
    pub fn is_sold_out(&self) -> bool {
        self.availability() <= 0
    }

    /// At least one seat left.
    #[inline]
    pub fn has_availability(&self) -> bool {
        self.availability() > 0
    }
}

/// Renders the guest-list status line: `"guests/capacity"`.
///
/// Not to be confused with [`CheckedInCount`]'s `"(checked_in/total)"`;
/// this one counts seats taken, the other counts people through the door.
impl fmt::Display for CapacityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.guests, self.capacity)
    }
}

// =============================================================================
// Checked-In Count
// =============================================================================

/// Door-scan progress for an event.
///
/// `total` is the guest-list size; `checked_in` the subset already
/// scanned in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckedInCount {
    pub checked_in: i64,
    pub total: i64,
}

impl CheckedInCount {
    pub fn new(checked_in: i64, total: i64) -> Self {
        Self { checked_in, total }
    }
}

/// Renders the check-in summary: `"(checked_in/total)"`.
impl fmt::Display for CheckedInCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}/{})", self.checked_in, self.total)
    }
}

// =============================================================================
// Reservation Total
// =============================================================================

/// Sums attendee ticket prices into a reservation total.
///
/// ## Example
/// ```rust
/// use boxoffice_core::capacity::reservation_total;
/// use boxoffice_core::money::Money;
///
/// let total = reservation_total([Money::from_cents(1500), Money::from_cents(750)]);
/// assert_eq!(total, Money::from_cents(2250));
/// ```
pub fn reservation_total(ticket_prices: impl IntoIterator<Item = Money>) -> Money {
    let mut total = Money::zero();
    for price in ticket_prices {
        total += price;
    }
    total
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_is_capacity_minus_guests() {
        let report = CapacityReport::new(50, 12);
        assert_eq!(report.availability(), 38);
        assert!(!report.is_sold_out());
        assert!(report.has_availability());
    }

    #[test]
    fn test_full_event_is_sold_out() {
        let report = CapacityReport::new(50, 50);
        assert_eq!(report.availability(), 0);
        assert!(report.is_sold_out());
        assert!(!report.has_availability());
    }

    #[test]
    fn test_oversold_event_reports_negative_availability() {
        // Capacity 2, two manual guests plus one paid attendee
        let report = CapacityReport::new(2, 3);
        assert_eq!(report.availability(), -1);
        assert!(report.is_sold_out());
    }

    #[test]
    fn test_status_line_formats() {
        assert_eq!(CapacityReport::new(50, 12).to_string(), "12/50");
        assert_eq!(CapacityReport::new(2, 3).to_string(), "3/2");

        assert_eq!(CheckedInCount::new(1, 3).to_string(), "(1/3)");
        assert_eq!(CheckedInCount::new(0, 0).to_string(), "(0/0)");
    }

    #[test]
    fn test_reservation_total_of_nothing_is_zero() {
        assert_eq!(reservation_total([]), Money::zero());
    }

    #[test]
    fn test_reservation_total_folds_prices() {
        let total = reservation_total([
            Money::from_cents(1500),
            Money::from_cents(1500),
            Money::from_cents(0),
        ]);
        assert_eq!(total, Money::from_cents(3000));
    }
}
