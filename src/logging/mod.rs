//! Logging and observability
//!
//! Structured logging via `tracing`, with:
//! - Console output on stderr
//! - Configurable log levels (`--log-level`, `RUST_LOG`)
//! - Optional JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use piicatcher::logging::init_logging;
//! use piicatcher::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(source = "warehouse", "Scan started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a scan
///
/// # Example
///
/// ```no_run
/// use piicatcher::log_scan_start;
///
/// log_scan_start!("warehouse", "metadata");
/// ```
#[macro_export]
macro_rules! log_scan_start {
    ($source:expr, $scan_type:expr) => {
        tracing::info!(
            source = %$source,
            scan_type = %$scan_type,
            "Starting scan"
        );
    };
}

/// Log the completion of a scan
///
/// # Example
///
/// ```no_run
/// use piicatcher::log_scan_complete;
/// use std::time::Duration;
///
/// log_scan_complete!(120, 7, Duration::from_secs(3));
/// ```
#[macro_export]
macro_rules! log_scan_complete {
    ($visited:expr, $labeled:expr, $duration:expr) => {
        tracing::info!(
            visited = $visited,
            labeled = $labeled,
            duration_ms = $duration.as_millis() as u64,
            "Scan completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use piicatcher::log_error_with_context;
/// use piicatcher::domain::PiiCatcherError;
///
/// let error = PiiCatcherError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log scan progress against the precomputed amount of work
///
/// # Example
///
/// ```no_run
/// use piicatcher::log_scan_progress;
///
/// log_scan_progress!(10, 40);
/// ```
#[macro_export]
macro_rules! log_scan_progress {
    ($current:expr, $total:expr) => {
        tracing::debug!(
            current = $current,
            total = $total,
            progress_pct = if $total == 0 {
                100.0
            } else {
                $current as f64 / $total as f64 * 100.0
            },
            "Scanning"
        );
    };
}
