//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{CatalogBackend, PiiCatcherConfig, PostgreSQLConfig};
use super::secret::secret_string;
use crate::domain::errors::PiiCatcherError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Default configuration file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "piicatcher.toml";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into PiiCatcherConfig
/// 4. Applies environment variable overrides (PIICATCHER_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns `PiiCatcherError::Configuration` if the file is missing or
/// unreadable, a referenced variable is unset, parsing fails, or validation
/// fails.
pub fn load_config(path: impl AsRef<Path>) -> Result<PiiCatcherConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PiiCatcherError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PiiCatcherError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Load `path` if given, else `piicatcher.toml` if present, else defaults
///
/// An explicitly named file must exist; the implicit default file may not.
pub fn load_config_or_default(path: Option<&Path>) -> Result<PiiCatcherConfig> {
    match path {
        Some(path) => load_config(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => load_config(DEFAULT_CONFIG_FILE),
        None => {
            let mut config = PiiCatcherConfig::default();
            apply_env_overrides(&mut config)?;
            config.validate().map_err(|e| {
                PiiCatcherError::Configuration(format!("Configuration validation failed: {e}"))
            })?;
            Ok(config)
        }
    }
}

/// Parse configuration text, applying substitution, overrides and validation
pub fn parse_config(contents: &str) -> Result<PiiCatcherConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: PiiCatcherConfig = toml::from_str(&contents)
        .map_err(|e| PiiCatcherError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        PiiCatcherError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| PiiCatcherError::pattern("env placeholder", e))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(PiiCatcherError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies environment variable overrides using PIICATCHER_* prefix
///
/// Environment variables follow the pattern: PIICATCHER_<SECTION>_<KEY>
/// For example: PIICATCHER_SCAN_SAMPLE_SIZE, PIICATCHER_CATALOG_BACKEND
fn apply_env_overrides(config: &mut PiiCatcherConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("PIICATCHER_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Catalog overrides
    if let Ok(val) = std::env::var("PIICATCHER_CATALOG_BACKEND") {
        config.catalog.backend = match val.to_lowercase().as_str() {
            "memory" => CatalogBackend::Memory,
            "postgresql" | "postgres" => CatalogBackend::PostgreSQL,
            other => {
                return Err(PiiCatcherError::Configuration(format!(
                    "Invalid PIICATCHER_CATALOG_BACKEND '{other}'"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("PIICATCHER_CATALOG_POSTGRESQL_CONNECTION_STRING") {
        match config.catalog.postgresql.as_mut() {
            Some(pg) => pg.connection_string = secret_string(val),
            None => config.catalog.postgresql = Some(PostgreSQLConfig::new(secret_string(val))),
        }
    }
    if let Some(ref mut pg) = config.catalog.postgresql {
        if let Ok(val) = std::env::var("PIICATCHER_CATALOG_POSTGRESQL_MAX_CONNECTIONS") {
            if let Ok(n) = val.parse() {
                pg.max_connections = n;
            }
        }
        if let Ok(val) = std::env::var("PIICATCHER_CATALOG_POSTGRESQL_STATEMENT_TIMEOUT_SECONDS") {
            if let Ok(n) = val.parse() {
                pg.statement_timeout_seconds = n;
            }
        }
    }

    // Scan overrides
    if let Ok(val) = std::env::var("PIICATCHER_SCAN_SCAN_TYPE") {
        config.scan.scan_type = val.parse()?;
    }
    if let Ok(val) = std::env::var("PIICATCHER_SCAN_INCREMENTAL") {
        config.scan.incremental = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("PIICATCHER_SCAN_LIST_ALL") {
        config.scan.list_all = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("PIICATCHER_SCAN_SAMPLE_SIZE") {
        if let Ok(size) = val.parse() {
            config.scan.sample_size = size;
        }
    }
    if let Ok(val) = std::env::var("PIICATCHER_SCAN_SMALL_TABLE_THRESHOLD") {
        if let Ok(threshold) = val.parse() {
            config.scan.small_table_threshold = threshold;
        }
    }
    if let Ok(val) = std::env::var("PIICATCHER_SCAN_OUTPUT_FORMAT") {
        config.scan.output_format = val.parse()?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("PIICATCHER_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("PIICATCHER_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("PIICATCHER_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("PIICATCHER_TEST_SUBST", "test_value");
        let input = "password = \"${PIICATCHER_TEST_SUBST}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"");
        std::env::remove_var("PIICATCHER_TEST_SUBST");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("PIICATCHER_TEST_MISSING");
        let input = "password = \"${PIICATCHER_TEST_MISSING}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("PIICATCHER_TEST_MISSING"));
    }

    #[test]
    fn test_substitution_skips_comments() {
        let input = "# password = \"${PIICATCHER_TEST_NEVER_SET}\"";
        assert_eq!(substitute_env_vars(input).unwrap(), input);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-piicatcher.toml");
        assert!(matches!(result, Err(PiiCatcherError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[scan]
scan_type = "data"
sample_size = 25
output_format = "json"

[logging]
local_enabled = false
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.scan.scan_type, crate::domain::ScanType::Data);
        assert_eq!(config.scan.sample_size, 25);
        assert_eq!(config.scan.output_format, crate::domain::OutputFormat::Json);
    }

    #[test]
    fn test_parse_config_rejects_invalid() {
        let err = parse_config("[application]\nlog_level = \"loud\"\n").unwrap_err();
        assert!(err.to_string().contains("validation failed"));

        let err = parse_config("[scan\n").unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }
}
