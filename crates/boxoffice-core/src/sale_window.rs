//! # Sale Window Resolution
//!
//! Decides when a ticket can be sold.
//!
//! ## Resolution Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Sale Window Resolution                              │
//! │                                                                         │
//! │  from:  explicit available_from set? ──────────► use it                 │
//! │         else event start known? ───────────────► start − opens_before   │
//! │         else ───────────────────────────────────► None                  │
//! │                                                                         │
//! │  till:  explicit available_till set? ──────────► use it                 │
//! │         else event start known? ───────────────► start − closes_before  │
//! │         else ───────────────────────────────────► None                  │
//! │                                                                         │
//! │  Each side resolves INDEPENDENTLY: an explicit from never suppresses    │
//! │  the fallback till, and vice versa.                                     │
//! │                                                                         │
//! │  open(now)      = from ≤ now < till      (both sides required)          │
//! │  available(now) = open(now) AND seats remaining > 0                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use boxoffice_core::money::Money;
//! use boxoffice_core::sale_window::{resolve_sale_window, SaleThresholds};
//! use boxoffice_core::types::Ticket;
//! use chrono::{TimeZone, Utc};
//!
//! let start = Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap();
//! let ticket = Ticket::new("event", "Regular", Money::from_cents(1500));
//!
//! let window = resolve_sale_window(&ticket, Some(start), &SaleThresholds::default());
//! // Sale opens a week before the event, closes twelve hours before it
//! assert_eq!(window.from, Some(start - chrono::Duration::weeks(1)));
//! assert_eq!(window.till, Some(start - chrono::Duration::hours(12)));
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Ticket;

// =============================================================================
// Thresholds
// =============================================================================

/// Default offsets applied when a ticket has no explicit dates.
///
/// Both are leads measured BACK from the event start: with the defaults a
/// ticket goes on sale one week before the event and sales close twelve
/// hours before doors open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleThresholds {
    /// How long before the event start the sale opens.
    pub opens_before: Duration,
    /// How long before the event start the sale closes.
    pub closes_before: Duration,
}

impl SaleThresholds {
    pub fn new(opens_before: Duration, closes_before: Duration) -> Self {
        Self {
            opens_before,
            closes_before,
        }
    }
}

impl Default for SaleThresholds {
    fn default() -> Self {
        Self {
            opens_before: Duration::weeks(1),
            closes_before: Duration::hours(12),
        }
    }
}

// =============================================================================
// Sale Window
// =============================================================================

/// A ticket's effective sale period, `[from, till)`.
///
/// Either side may be `None` when neither an explicit date nor an event
/// start to derive from exists. A half-configured window never opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleWindow {
    pub from: Option<DateTime<Utc>>,
    pub till: Option<DateTime<Utc>>,
}

impl SaleWindow {
    /// True when at least one side resolved.
    ///
    /// Distinguishes "nothing configured, nothing derivable" (the ticket
    /// can never be bought) from "configured but currently closed".
    #[inline]
    pub const fn is_configured(&self) -> bool {
        self.from.is_some() || self.till.is_some()
    }

    /// True while the window is open: `from <= now < till`.
    ///
    /// The end instant is exclusive, so a sale closing at noon refuses
    /// the first purchase attempted exactly at noon.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        match (self.from, self.till) {
            (Some(from), Some(till)) => from <= now && now < till,
            _ => false,
        }
    }

    /// True when the ticket can actually be bought: the window is open
    /// AND seats remain. `availability` comes from the capacity
    /// accountant (capacity minus guest-list size).
    pub fn is_available(&self, now: DateTime<Utc>, availability: i64) -> bool {
        self.is_open(now) && availability > 0
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolves a ticket's effective sale window.
///
/// Explicit dates win; otherwise each side falls back to an offset from
/// the event start; a side with neither stays `None`. The two sides never
/// influence each other.
pub fn resolve_sale_window(
    ticket: &Ticket,
    event_start: Option<DateTime<Utc>>,
    thresholds: &SaleThresholds,
) -> SaleWindow {
    let from = ticket
        .available_from
        .or_else(|| event_start.map(|start| start - thresholds.opens_before));
    let till = ticket
        .available_till
        .or_else(|| event_start.map(|start| start - thresholds.closes_before));

    SaleWindow { from, till }
}

/// Earliest resolved sale start across an event's tickets.
///
/// Tickets whose `from` cannot be resolved are skipped; `None` means no
/// ticket has a known sale start.
pub fn earliest_sale_start(
    tickets: &[Ticket],
    event_start: Option<DateTime<Utc>>,
    thresholds: &SaleThresholds,
) -> Option<DateTime<Utc>> {
    tickets
        .iter()
        .filter_map(|ticket| resolve_sale_window(ticket, event_start, thresholds).from)
        .min()
}

/// True while ticket sales have not started yet.
///
/// When no ticket has a resolvable sale start this reports `false`: with
/// no known start instant there is nothing to wait for.
pub fn sale_is_pending(
    now: DateTime<Utc>,
    tickets: &[Ticket],
    event_start: Option<DateTime<Utc>>,
    thresholds: &SaleThresholds,
) -> bool {
    match earliest_sale_start(tickets, event_start, thresholds) {
        Some(start) => now < start,
        None => false,
    }
}

/// True when the event is over from a ticketing point of view: it has
/// tickets, and every one of them is outside its sale window.
///
/// An event with NO tickets reports `false` — an unconfigured event is
/// "not started", not "expired". Note the deliberate asymmetry with
/// [`sale_is_pending`]: tickets whose sale has not opened yet also fail
/// their window check, so callers are expected to consult
/// `sale_is_pending` before reading this flag, exactly like the admin
/// screens this engine was built for.
pub fn event_expired(
    now: DateTime<Utc>,
    tickets: &[Ticket],
    event_start: Option<DateTime<Utc>>,
    thresholds: &SaleThresholds,
) -> bool {
    if tickets.is_empty() {
        return false;
    }
    tickets
        .iter()
        .all(|ticket| !resolve_sale_window(ticket, event_start, thresholds).is_open(now))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use chrono::TimeZone;

    fn ticket() -> Ticket {
        Ticket::new("event", "Regular", Money::from_cents(1500))
    }

    fn instant(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_no_dates_and_no_event_start_resolves_to_nothing() {
        let window = resolve_sale_window(&ticket(), None, &SaleThresholds::default());

        assert_eq!(window.from, None);
        assert_eq!(window.till, None);
        assert!(!window.is_configured());
        assert!(!window.is_open(instant(2023, 11, 30, 12)));
        assert!(!window.is_available(instant(2023, 11, 30, 12), 100));
    }

    #[test]
    fn test_fallback_window_derived_from_event_start() {
        // Event on 2023-12-01 00:00: sale runs from the 24th (one week
        // before) until 12:00 on the 30th (twelve hours before)
        let start = instant(2023, 12, 1, 0);
        let window = resolve_sale_window(&ticket(), Some(start), &SaleThresholds::default());

        assert_eq!(window.from, Some(instant(2023, 11, 24, 0)));
        assert_eq!(window.till, Some(instant(2023, 11, 30, 12)));
    }

    #[test]
    fn test_explicit_till_with_derived_from() {
        // Explicit dates and fallbacks mix per side
        let mut t = ticket();
        t.available_till = Some(instant(2024, 1, 1, 0));

        let start = instant(2023, 12, 1, 0);
        let window = resolve_sale_window(&t, Some(start), &SaleThresholds::default());

        assert_eq!(window.from, Some(instant(2023, 11, 24, 0)));
        assert_eq!(window.till, Some(instant(2024, 1, 1, 0)));
    }

    #[test]
    fn test_explicit_from_with_derived_till() {
        let mut t = ticket();
        t.available_from = Some(instant(2023, 11, 1, 0));

        let start = instant(2023, 12, 1, 0);
        let window = resolve_sale_window(&t, Some(start), &SaleThresholds::default());

        assert_eq!(window.from, Some(instant(2023, 11, 1, 0)));
        assert_eq!(window.till, Some(instant(2023, 11, 30, 12)));
    }

    #[test]
    fn test_explicit_dates_without_event_start() {
        let mut t = ticket();
        t.available_from = Some(instant(2023, 11, 1, 0));
        t.available_till = Some(instant(2023, 11, 15, 0));

        let window = resolve_sale_window(&t, None, &SaleThresholds::default());

        assert_eq!(window.from, Some(instant(2023, 11, 1, 0)));
        assert_eq!(window.till, Some(instant(2023, 11, 15, 0)));
    }

    #[test]
    fn test_half_configured_window_never_opens() {
        // Only from resolvable: no event start to derive till from
        let mut t = ticket();
        t.available_from = Some(instant(2023, 11, 1, 0));

        let window = resolve_sale_window(&t, None, &SaleThresholds::default());
        assert!(window.is_configured());
        assert!(!window.is_open(instant(2023, 11, 2, 0)));
    }

    #[test]
    fn test_window_boundaries() {
        let window = SaleWindow {
            from: Some(instant(2023, 11, 24, 0)),
            till: Some(instant(2023, 11, 30, 12)),
        };

        // Start is inclusive
        assert!(window.is_open(instant(2023, 11, 24, 0)));
        // End is exclusive
        assert!(!window.is_open(instant(2023, 11, 30, 12)));
        // Just inside either edge
        assert!(window.is_open(instant(2023, 11, 30, 11)));
        assert!(!window.is_open(instant(2023, 11, 23, 23)));
    }

    #[test]
    fn test_open_window_still_needs_seats() {
        let window = SaleWindow {
            from: Some(instant(2023, 11, 24, 0)),
            till: Some(instant(2023, 11, 30, 12)),
        };
        let now = instant(2023, 11, 25, 0);

        assert!(window.is_available(now, 1));
        assert!(!window.is_available(now, 0));
        assert!(!window.is_available(now, -3));
    }

    #[test]
    fn test_earliest_sale_start_skips_unresolvable() {
        let mut early = ticket();
        early.available_from = Some(instant(2023, 11, 1, 0));
        let mut late = ticket();
        late.available_from = Some(instant(2023, 11, 10, 0));
        let unresolvable = ticket();

        let tickets = vec![late, unresolvable, early];
        let start = earliest_sale_start(&tickets, None, &SaleThresholds::default());
        assert_eq!(start, Some(instant(2023, 11, 1, 0)));

        // Nothing resolvable at all
        let none = earliest_sale_start(&[ticket()], None, &SaleThresholds::default());
        assert_eq!(none, None);
    }

    #[test]
    fn test_sale_is_pending() {
        let start = instant(2023, 12, 1, 0);
        let tickets = vec![ticket()];
        let thresholds = SaleThresholds::default();

        // Sale opens 2023-11-24 00:00
        assert!(sale_is_pending(
            instant(2023, 11, 20, 0),
            &tickets,
            Some(start),
            &thresholds
        ));
        assert!(!sale_is_pending(
            instant(2023, 11, 24, 0),
            &tickets,
            Some(start),
            &thresholds
        ));

        // No resolvable sale start reads as "not pending"
        assert!(!sale_is_pending(
            instant(2023, 11, 20, 0),
            &tickets,
            None,
            &thresholds
        ));
    }

    #[test]
    fn test_event_expired() {
        let start = instant(2023, 12, 1, 0);
        let thresholds = SaleThresholds::default();

        // No tickets: not expired
        assert!(!event_expired(instant(2024, 6, 1, 0), &[], Some(start), &thresholds));

        // All windows passed
        let tickets = vec![ticket()];
        assert!(event_expired(
            instant(2024, 6, 1, 0),
            &tickets,
            Some(start),
            &thresholds
        ));

        // One ticket still open keeps the event alive
        let mut open_till_january = ticket();
        open_till_january.available_till = Some(instant(2024, 1, 1, 0));
        let tickets = vec![ticket(), open_till_january];
        assert!(!event_expired(
            instant(2023, 12, 15, 0),
            &tickets,
            Some(start),
            &thresholds
        ));
    }

    #[test]
    fn test_event_with_unopened_sales_counts_as_expired() {
        // Documented quirk: windows that have not opened yet also fail,
        // so callers check sale_is_pending first
        let start = instant(2023, 12, 1, 0);
        let tickets = vec![ticket()];
        let thresholds = SaleThresholds::default();
        let before_sales = instant(2023, 11, 1, 0);

        assert!(event_expired(before_sales, &tickets, Some(start), &thresholds));
        assert!(sale_is_pending(before_sales, &tickets, Some(start), &thresholds));
    }
}
