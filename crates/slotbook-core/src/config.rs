use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP surface binds to
    pub listen_addr: String,

    /// IANA zone all wall-clock times resolve through
    pub timezone: String,

    /// External calendar settings
    pub calendar: CalendarConfig,

    /// Template store settings
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Calendar identity whose busy time gates bookings
    pub identity: String,

    /// Bearer token for the calendar API (optional, can be set via environment)
    pub access_token: Option<String>,

    /// Deadline for each calendar round trip, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite template database
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_path() -> String {
    "slotbook.db".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            timezone: "UTC".to_string(),
            calendar: CalendarConfig {
                identity: String::new(),
                access_token: std::env::var("SLOTBOOK_CALENDAR_TOKEN").ok(),
                timeout_secs: default_timeout_secs(),
            },
            store: StoreConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file, falling back to defaults when the
    /// file is absent, then apply environment overrides.
    ///
    /// The listen address can be overridden with `SLOTBOOK_ADDR`; the
    /// calendar token with `SLOTBOOK_CALENDAR_TOKEN` (secrets never live in
    /// the file on disk in deployment).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&contents).context("Failed to parse config file")?
        } else {
            Self::default()
        };

        if let Ok(addr) = std::env::var("SLOTBOOK_ADDR") {
            config.listen_addr = addr;
        }
        if let Ok(token) = std::env::var("SLOTBOOK_CALENDAR_TOKEN") {
            config.calendar.access_token = Some(token);
        }

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<(Self, ValidationResult)> {
        let config = Self::load(path)?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.listen_addr.parse::<SocketAddr>().is_err() {
            result.add_error(
                "listen_addr",
                format!("Not a valid socket address: {}", self.listen_addr),
            );
        }

        if self.timezone.parse::<Tz>().is_err() {
            result.add_error(
                "timezone",
                format!("Not a valid IANA timezone: {}", self.timezone),
            );
        }

        if self.calendar.identity.is_empty() {
            result.add_error("calendar.identity", "Calendar identity must be set");
        }

        if self.calendar.access_token.is_none() {
            result.add_warning(
                "calendar.access_token",
                "No access token configured - set SLOTBOOK_CALENDAR_TOKEN before serving",
            );
        }

        if self.calendar.timeout_secs == 0 {
            result.add_error(
                "calendar.timeout_secs",
                "Calendar deadline must be greater than 0",
            );
        } else if self.calendar.timeout_secs > 60 {
            result.add_warning(
                "calendar.timeout_secs",
                "Calendar deadline is unusually long (>60s)",
            );
        }

        if self.store.path.is_empty() {
            result.add_error("store.path", "Store path must not be empty");
        }

        result
    }

    /// The configured zone, parsed.
    pub fn zone(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| anyhow::anyhow!("Not a valid IANA timezone: {}", self.timezone))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn configured() -> Config {
        Config {
            calendar: CalendarConfig {
                identity: "bookings@example.com".to_string(),
                access_token: Some("token".to_string()),
                timeout_secs: 10,
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_valid_config() {
        let result = configured().validate();
        assert!(result.is_valid(), "{:?}", result.errors);
    }

    #[test]
    fn test_missing_identity_is_an_error() {
        let mut config = configured();
        config.calendar.identity = String::new();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "calendar.identity"));
    }

    #[test]
    fn test_invalid_timezone() {
        let mut config = configured();
        config.timezone = "Mars/Olympus_Mons".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "timezone"));
    }

    #[test]
    fn test_invalid_listen_addr() {
        let mut config = configured();
        config.listen_addr = "not-an-addr".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_missing_token_is_a_warning() {
        let mut config = configured();
        config.calendar.access_token = None;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "calendar.access_token"));
    }

    #[test]
    fn test_zero_timeout_is_an_error() {
        let mut config = configured();
        config.calendar.timeout_secs = 0;
        let result = config.validate();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slotbook.toml");
        std::fs::write(
            &path,
            r#"
listen_addr = "0.0.0.0:9000"
timezone = "Europe/Berlin"

[calendar]
identity = "bookings@example.com"
timeout_secs = 5

[store]
path = "/var/lib/slotbook/templates.db"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.timezone, "Europe/Berlin");
        assert_eq!(config.calendar.timeout_secs, 5);
        assert_eq!(config.store.path, "/var/lib/slotbook/templates.db");
        assert_eq!(config.zone().unwrap(), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load("definitely-missing.toml").unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:8080");
        assert_eq!(config.timezone, "UTC");
    }
}
