//! # Engine Root
//!
//! The [`Boxoffice`] struct owns the shared pieces every facade needs: the
//! database handle, the loaded configuration and the clock. The host CMS
//! builds one at startup and hands out [`EventTickets`] facades per page
//! view.
//!
//! ## Startup Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BoxofficeConfig::load(..)                                              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  Boxoffice::open(config).await     ── opens the pool, runs migrations  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  engine.event_tickets(page)?       ── verifies the page contract       │
//! │        │                              (fails fast on a bad page type)  │
//! │        ▼                                                                │
//! │  facade.ensure_event().await?      ── registers the event on first use │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::info;

use boxoffice_core::{Clock, SystemClock};
use boxoffice_db::{Database, DbConfig};

use crate::config::BoxofficeConfig;
use crate::error::ServiceResult;
use crate::events::EventTickets;
use crate::page::{verify_page_contract, EventPage};

// =============================================================================
// Boxoffice Engine
// =============================================================================

/// The engine root: database, configuration and clock in one handle.
///
/// Cloneable and cheap to pass around; all clones share the same
/// connection pool.
///
/// ## Example
/// ```rust,no_run
/// use boxoffice_service::{Boxoffice, BoxofficeConfig};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BoxofficeConfig::load(None)?;
/// let engine = Boxoffice::open(config).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Boxoffice {
    db: Database,
    config: BoxofficeConfig,
    clock: Arc<dyn Clock>,
}

impl Boxoffice {
    /// Opens the engine: validates the config, opens the database pool and
    /// runs pending migrations.
    pub async fn open(config: BoxofficeConfig) -> ServiceResult<Self> {
        config.validate()?;

        let db = Database::new(config.db_config()).await?;

        info!(
            db_path = %config.database.path.display(),
            "Boxoffice engine ready"
        );

        Ok(Boxoffice {
            db,
            config,
            clock: Arc::new(SystemClock),
        })
    }

    /// Opens an engine against an in-memory database.
    ///
    /// Data lives as long as the engine. Intended for tests and demos.
    pub async fn in_memory() -> ServiceResult<Self> {
        Self::in_memory_with(BoxofficeConfig::default()).await
    }

    /// Opens an in-memory engine with a specific configuration.
    ///
    /// The database settings in `config` are ignored; everything else
    /// (sale-window offsets, event defaults, content, field specs) applies.
    pub async fn in_memory_with(config: BoxofficeConfig) -> ServiceResult<Self> {
        config.validate()?;
        let db = Database::new(DbConfig::in_memory()).await?;

        Ok(Boxoffice {
            db,
            config,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replaces the engine's clock.
    ///
    /// Every facade handed out afterwards reads time from this clock, so a
    /// test can freeze "now" and step through a sale window.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The underlying database handle.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// The loaded configuration.
    pub fn config(&self) -> &BoxofficeConfig {
        &self.config
    }

    /// Builds the ticketing facade for one host page.
    ///
    /// Verifies the page contract up front: a page type missing one of the
    /// event accessors is rejected here, before any read or write happens,
    /// so the wiring mistake shows up the first time the host touches
    /// ticketing for that page type.
    pub fn event_tickets<P: EventPage>(&self, page: P) -> ServiceResult<EventTickets<P>> {
        verify_page_contract(&page)?;

        Ok(EventTickets::new(
            self.db.clone(),
            page,
            self.config.clone(),
            Arc::clone(&self.clock),
        ))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
