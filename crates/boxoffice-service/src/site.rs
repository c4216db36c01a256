//! # Site-Wide Content Defaults
//!
//! The fallback side of the content chain: an event that sets no success
//! message of its own inherits the site's.
//!
//! ## Fallback Chain
//! ```text
//! event.own_content(field)  ──missing──►  site.default_content(field)  ──missing──►  None
//! ```
//! Blank and whitespace-only event text counts as missing, so clearing a
//! field in the admin UI reliably restores the site default.

use boxoffice_core::ContentField;

/// Source of site-wide default texts for the three content slots.
///
/// The config file provides one implementation; hosts with their own
/// site-settings storage implement this directly.
pub trait SiteDefaults: Send + Sync {
    /// The site's default text for a content slot, if the site set one.
    fn default_content(&self, field: ContentField) -> Option<String>;
}

/// Fixed in-memory defaults, for hosts and tests without a settings store.
#[derive(Debug, Clone, Default)]
pub struct StaticSiteDefaults {
    pub success: Option<String>,
    pub success_mail: Option<String>,
    pub printed_ticket: Option<String>,
}

impl SiteDefaults for StaticSiteDefaults {
    fn default_content(&self, field: ContentField) -> Option<String> {
        match field {
            ContentField::Success => self.success.clone(),
            ContentField::SuccessMail => self.success_mail.clone(),
            ContentField::PrintedTicket => self.printed_ticket.clone(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
