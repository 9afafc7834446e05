//! Configuration management for PiiCatcher.
//!
//! # Overview
//!
//! PiiCatcher reads an optional TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `PIICATCHER_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use piicatcher::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("piicatcher.toml")?;
//! println!("Catalog backend: {:?}", config.catalog.backend);
//! println!("Sample size: {}", config.scan.sample_size);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level
//! - [`CatalogConfig`] - catalog backend and its PostgreSQL settings
//! - [`ScanConfig`] - scan defaults (type, incremental, sampling, output)
//! - [`DetectorsConfig`] - configured regex detectors
//! - [`LoggingConfig`] - file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [catalog]
//! backend = "postgresql"
//!
//! [catalog.postgresql]
//! connection_string = "${PIICATCHER_CATALOG_DSN}"
//!
//! [scan]
//! scan_type = "data"
//! sample_size = 10
//!
//! [[detectors.custom]]
//! name = "EmployeeIdDetector"
//! kind = "datum"
//! pii_type = "UserName"
//! patterns = ['^E\d{6}$']
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_or_default, parse_config, DEFAULT_CONFIG_FILE};
pub use schema::{
    ApplicationConfig, CatalogBackend, CatalogConfig, CustomDetectorConfig, DetectorsConfig,
    LoggingConfig, PiiCatcherConfig, PostgreSQLConfig, ScanConfig,
};
pub use secret::{
    redact_connection_string, secret_string, secret_string_opt, SecretString, SecretValue,
};
