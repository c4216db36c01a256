//! # The Event Page Contract
//!
//! How a host CMS page becomes an event.
//!
//! ## Contract Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       EventPage Contract                                │
//! │                                                                         │
//! │  Host CMS                              Boxoffice                       │
//! │  ┌──────────────────────┐                                              │
//! │  │ ConcertPage          │   required   event_id()     ───┐             │
//! │  │  - slug, body, ...   │   ─────────► page_type()       │             │
//! │  │  - starts_at         │                                │ facade      │
//! │  │  - venue             │   must       event_title()     │ reads       │
//! │  │                      │   override   event_start_date()│ these       │
//! │  │ impl EventPage { .. }│   ─────────► event_address() ──┘             │
//! │  └──────────────────────┘                                              │
//! │                                                                         │
//! │  The three accessors ship failing default bodies. A page type that     │
//! │  never overrides them is detectably misconfigured, and the facade      │
//! │  refuses to construct for it (see verify_page_contract).               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Failing Defaults Instead of Required Methods
//! Making the accessors required would be the obvious Rust shape, but the
//! contract is deliberately advisory: host page types integrate ticketing
//! incrementally, and a half-integrated page should produce a clear
//! "implement event_start_date() on NewsPage" error instead of a compile
//! error inside generated CMS glue the host author never sees.

use chrono::{DateTime, Utc};

use boxoffice_core::{CoreError, CoreResult};

/// The contract a host page fulfills to carry ticketing.
///
/// `event_id` and `page_type` always exist on a CMS page; the three event
/// accessors must be overridden before the page can be sold on.
pub trait EventPage: Send + Sync {
    /// Stable identity of this page's event. Everything ticketing stores
    /// is keyed by it. Owned, because hosts routinely derive it
    /// (`format!("page-{}", id)`) rather than store it.
    fn event_id(&self) -> String;

    /// The host-side type name ("ConcertPage"), used in error messages.
    fn page_type(&self) -> &'static str;

    /// The event's display title.
    fn event_title(&self) -> CoreResult<String> {
        Err(CoreError::missing_override("event_title", self.page_type()))
    }

    /// When the event starts. `Ok(None)` means the page genuinely has no
    /// date yet; sale windows then only exist where tickets carry
    /// explicit dates.
    fn event_start_date(&self) -> CoreResult<Option<DateTime<Utc>>> {
        Err(CoreError::missing_override(
            "event_start_date",
            self.page_type(),
        ))
    }

    /// Where the event takes place, for tickets and confirmation mail.
    fn event_address(&self) -> CoreResult<String> {
        Err(CoreError::missing_override(
            "event_address",
            self.page_type(),
        ))
    }
}

/// Probes all three accessors, surfacing the first missing override.
///
/// Called once at facade construction so a misconfigured page type fails
/// on the first smoke test instead of on the first availability read.
pub fn verify_page_contract(page: &impl EventPage) -> CoreResult<()> {
    page.event_title()?;
    page.event_start_date()?;
    page.event_address()?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// A page type that attached ticketing but implemented nothing.
    struct BarePage;

    impl EventPage for BarePage {
        fn event_id(&self) -> String {
            "bare-1".to_string()
        }
        fn page_type(&self) -> &'static str {
            "NewsPage"
        }
    }

    /// A fully integrated page type.
    struct ConcertPage;

    impl EventPage for ConcertPage {
        fn event_id(&self) -> String {
            "concert-1".to_string()
        }
        fn page_type(&self) -> &'static str {
            "ConcertPage"
        }
        fn event_title(&self) -> CoreResult<String> {
            Ok("Winter Concert".to_string())
        }
        fn event_start_date(&self) -> CoreResult<Option<DateTime<Utc>>> {
            Ok(Some(Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap()))
        }
        fn event_address(&self) -> CoreResult<String> {
            Ok("Main Hall, Amsterdam".to_string())
        }
    }

    #[test]
    fn test_bare_page_fails_the_probe_with_the_method_name() {
        let err = verify_page_contract(&BarePage).unwrap_err();
        assert_eq!(
            err.to_string(),
            "NewsPage must implement event_title() to be used as an event page"
        );
    }

    #[test]
    fn test_full_page_passes_the_probe() {
        assert!(verify_page_contract(&ConcertPage).is_ok());
        assert_eq!(ConcertPage.event_title().unwrap(), "Winter Concert");
    }

    #[test]
    fn test_dateless_page_is_valid() {
        /// Overrides everything but honestly has no date yet.
        struct DraftPage;

        impl EventPage for DraftPage {
            fn event_id(&self) -> String {
                "draft-1".to_string()
            }
            fn page_type(&self) -> &'static str {
                "DraftPage"
            }
            fn event_title(&self) -> CoreResult<String> {
                Ok("TBA".to_string())
            }
            fn event_start_date(&self) -> CoreResult<Option<DateTime<Utc>>> {
                Ok(None)
            }
            fn event_address(&self) -> CoreResult<String> {
                Ok("TBA".to_string())
            }
        }

        assert!(verify_page_contract(&DraftPage).is_ok());
        assert_eq!(DraftPage.event_start_date().unwrap(), None);
    }
}
