//! # Service Configuration
//!
//! Configuration management for the ticketing engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BOXOFFICE_DB_PATH=/var/lib/boxoffice.db                            │
//! │     BOXOFFICE_OPENS_BEFORE_HOURS=336                                   │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/boxoffice/boxoffice.toml (Linux)                         │
//! │     ~/Library/Application Support/com.boxoffice.engine/... (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     One-week sale lead, capacity 50, the standard field set            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # boxoffice.toml
//! [database]
//! path = "./boxoffice.db"
//! max_connections = 5
//!
//! [sale_window]
//! opens_before_hours = 168   # sale opens one week before the event
//! closes_before_hours = 12   # and closes twelve hours before it
//!
//! [defaults]
//! event_capacity = 50
//! order_min = 1
//! order_max = 5
//!
//! [content]
//! success = "Thanks! See you at the show."
//!
//! [[fields]]
//! name = "FirstName"
//! title = "First name"
//! field_type = "text"
//! required = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use boxoffice_core::validation::validate_field_name;
use boxoffice_core::{
    ContentField, SaleThresholds, UserField, UserFieldType, DEFAULT_EVENT_CAPACITY,
    DEFAULT_ORDER_MAX, DEFAULT_ORDER_MIN,
};
use boxoffice_db::DbConfig;

use crate::error::{ServiceError, ServiceResult};
use crate::site::SiteDefaults;

// =============================================================================
// Database Settings
// =============================================================================

/// Where the engine keeps its SQLite database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Path to the database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// Connection pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./boxoffice.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseSettings {
    /// Builds the pool configuration for these settings.
    pub fn to_db_config(&self) -> DbConfig {
        DbConfig::new(&self.path).max_connections(self.max_connections)
    }
}

// =============================================================================
// Sale Window Settings
// =============================================================================

/// Offsets used when tickets carry no explicit sale dates.
///
/// Both are leads measured back from the host page's event start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleWindowSettings {
    /// Hours before the event start at which sales open.
    #[serde(default = "default_opens_before_hours")]
    pub opens_before_hours: i64,

    /// Hours before the event start at which sales close.
    #[serde(default = "default_closes_before_hours")]
    pub closes_before_hours: i64,
}

fn default_opens_before_hours() -> i64 {
    168 // one week
}

fn default_closes_before_hours() -> i64 {
    12
}

impl Default for SaleWindowSettings {
    fn default() -> Self {
        SaleWindowSettings {
            opens_before_hours: default_opens_before_hours(),
            closes_before_hours: default_closes_before_hours(),
        }
    }
}

impl SaleWindowSettings {
    /// Builds the domain thresholds for these settings.
    pub fn thresholds(&self) -> SaleThresholds {
        SaleThresholds::new(
            chrono::Duration::hours(self.opens_before_hours),
            chrono::Duration::hours(self.closes_before_hours),
        )
    }
}

// =============================================================================
// Event Defaults
// =============================================================================

/// Values stamped onto newly registered events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDefaults {
    /// Capacity a new event starts with.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: i32,

    /// Smallest order the selling flow accepts.
    #[serde(default = "default_order_min")]
    pub order_min: i32,

    /// Largest order the selling flow accepts.
    #[serde(default = "default_order_max")]
    pub order_max: i32,
}

fn default_event_capacity() -> i32 {
    DEFAULT_EVENT_CAPACITY
}

fn default_order_min() -> i32 {
    DEFAULT_ORDER_MIN
}

fn default_order_max() -> i32 {
    DEFAULT_ORDER_MAX
}

impl Default for EventDefaults {
    fn default() -> Self {
        EventDefaults {
            event_capacity: default_event_capacity(),
            order_min: default_order_min(),
            order_max: default_order_max(),
        }
    }
}

// =============================================================================
// Content Defaults
// =============================================================================

/// Site-wide default texts for the three content slots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentSettings {
    /// Default order-success text.
    #[serde(default)]
    pub success: Option<String>,

    /// Default confirmation-mail text.
    #[serde(default)]
    pub success_mail: Option<String>,

    /// Default printed-ticket text.
    #[serde(default)]
    pub printed_ticket: Option<String>,
}

impl SiteDefaults for ContentSettings {
    fn default_content(&self, field: ContentField) -> Option<String> {
        match field {
            ContentField::Success => self.success.clone(),
            ContentField::SuccessMail => self.success_mail.clone(),
            ContentField::PrintedTicket => self.printed_ticket.clone(),
        }
    }
}

// =============================================================================
// Field Specs
// =============================================================================

/// One attendee-form question seeded onto every new event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Machine key attendee answers are stored under.
    pub name: String,

    /// Human label on the order form.
    pub title: String,

    /// Input widget type.
    #[serde(default = "default_field_type")]
    pub field_type: UserFieldType,

    /// Whether the selling flow refuses orders without an answer.
    #[serde(default)]
    pub required: bool,
}

fn default_field_type() -> UserFieldType {
    UserFieldType::Text
}

impl FieldSpec {
    /// Builds the event-scoped field at the given form position.
    pub fn to_user_field(&self, event_id: &str, sort: i32) -> UserField {
        let field = UserField::new(event_id, &self.name, &self.title, self.field_type).at(sort);
        if self.required {
            field.required()
        } else {
            field
        }
    }
}

/// The standard question set: first name, surname, email.
fn default_field_specs() -> Vec<FieldSpec> {
    vec![
        FieldSpec {
            name: "FirstName".to_string(),
            title: "First name".to_string(),
            field_type: UserFieldType::Text,
            required: true,
        },
        FieldSpec {
            name: "Surname".to_string(),
            title: "Surname".to_string(),
            field_type: UserFieldType::Text,
            required: true,
        },
        FieldSpec {
            name: "Email".to_string(),
            title: "Email address".to_string(),
            field_type: UserFieldType::Email,
            required: true,
        },
    ]
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete engine configuration.
///
/// ## Example Config File
/// ```toml
/// [database]
/// path = "/var/lib/boxoffice/boxoffice.db"
///
/// [sale_window]
/// opens_before_hours = 336   # two weeks
/// closes_before_hours = 12
///
/// [defaults]
/// event_capacity = 120
///
/// [content]
/// success = "Thanks! See you at the show."
/// success_mail = "Your tickets are attached."
///
/// [[fields]]
/// name = "FirstName"
/// title = "First name"
/// required = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxofficeConfig {
    /// Database location and pool size.
    #[serde(default)]
    pub database: DatabaseSettings,

    /// Fallback sale-window offsets.
    #[serde(default)]
    pub sale_window: SaleWindowSettings,

    /// Defaults stamped onto new events.
    #[serde(default)]
    pub defaults: EventDefaults,

    /// Site-wide content defaults.
    #[serde(default)]
    pub content: ContentSettings,

    /// Attendee-form questions seeded onto new events, in form order.
    #[serde(default = "default_field_specs")]
    pub fields: Vec<FieldSpec>,
}

impl Default for BoxofficeConfig {
    fn default() -> Self {
        BoxofficeConfig {
            database: DatabaseSettings::default(),
            sale_window: SaleWindowSettings::default(),
            defaults: EventDefaults::default(),
            content: ContentSettings::default(),
            fields: default_field_specs(),
        }
    }
}

impl BoxofficeConfig {
    /// Creates a config with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (boxoffice.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ServiceResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ServiceResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ServiceError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ServiceResult<()> {
        // A derived window must open before it closes
        if self.sale_window.opens_before_hours <= self.sale_window.closes_before_hours {
            return Err(ServiceError::InvalidConfig(format!(
                "opens_before_hours ({}) must be greater than closes_before_hours ({})",
                self.sale_window.opens_before_hours, self.sale_window.closes_before_hours
            )));
        }
        if self.sale_window.closes_before_hours < 0 {
            return Err(ServiceError::InvalidConfig(
                "closes_before_hours must not be negative".into(),
            ));
        }

        if self.defaults.event_capacity < 0 {
            return Err(ServiceError::InvalidConfig(
                "event_capacity must not be negative".into(),
            ));
        }
        if self.defaults.order_min < 1 {
            return Err(ServiceError::InvalidConfig(
                "order_min must be at least 1".into(),
            ));
        }
        if self.defaults.order_max < self.defaults.order_min {
            return Err(ServiceError::InvalidConfig(format!(
                "order_max ({}) must not be below order_min ({})",
                self.defaults.order_max, self.defaults.order_min
            )));
        }

        let mut seen = std::collections::BTreeSet::new();
        for spec in &self.fields {
            validate_field_name(&spec.name).map_err(|e| {
                ServiceError::InvalidConfig(format!("field \"{}\": {}", spec.name, e))
            })?;
            if !seen.insert(spec.name.as_str()) {
                return Err(ServiceError::InvalidConfig(format!(
                    "duplicate field name \"{}\"",
                    spec.name
                )));
            }
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("BOXOFFICE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(hours) = std::env::var("BOXOFFICE_OPENS_BEFORE_HOURS") {
            if let Ok(h) = hours.parse::<i64>() {
                debug!(hours = h, "Overriding sale-open lead from environment");
                self.sale_window.opens_before_hours = h;
            }
        }

        if let Ok(hours) = std::env::var("BOXOFFICE_CLOSES_BEFORE_HOURS") {
            if let Ok(h) = hours.parse::<i64>() {
                debug!(hours = h, "Overriding sale-close lead from environment");
                self.sale_window.closes_before_hours = h;
            }
        }

        if let Ok(capacity) = std::env::var("BOXOFFICE_EVENT_CAPACITY") {
            if let Ok(c) = capacity.parse::<i32>() {
                self.defaults.event_capacity = c;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "boxoffice", "engine")
            .map(|dirs| dirs.config_dir().join("boxoffice.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The pool configuration for this config's database settings.
    pub fn db_config(&self) -> DbConfig {
        self.database.to_db_config()
    }

    /// The domain sale-window thresholds.
    pub fn thresholds(&self) -> SaleThresholds {
        self.sale_window.thresholds()
    }

    /// Materializes the configured field specs for one event.
    pub fn default_fields_for(&self, event_id: &str) -> Vec<UserField> {
        self.fields
            .iter()
            .enumerate()
            .map(|(sort, spec)| spec.to_user_field(event_id, sort as i32))
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
