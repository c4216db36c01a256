//! # Clock
//!
//! Time source abstraction for sale-window and expiry logic.
//!
//! ## Why Not `Utc::now()` Inline
//! Every availability answer depends on "now": whether a sale window is
//! open, whether an event expired, whether sales are still pending. Wiring
//! the time source through a trait lets tests freeze the clock at an exact
//! instant and assert window boundaries deterministically.
//!
//! ## Usage
//! ```rust
//! use boxoffice_core::clock::{Clock, FixedClock, SystemClock};
//! use chrono::{TimeZone, Utc};
//!
//! // Production: real wall clock
//! let clock = SystemClock;
//! let _ = clock.now();
//!
//! // Tests: frozen instant
//! let frozen = FixedClock::new(Utc.with_ymd_and_hms(2023, 11, 30, 12, 0, 0).unwrap());
//! assert_eq!(frozen.now().to_rfc3339(), "2023-11-30T12:00:00+00:00");
//! ```

use chrono::{DateTime, Utc};

/// A source of the current instant.
///
/// `Send + Sync` so a shared clock can be held by the facade and used from
/// async contexts.
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock pinned to a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    /// Creates a clock that always reports `instant`.
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_reports_pinned_instant() {
        let instant = Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(instant);

        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
