//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::ExportWatchConfig;
use crate::domain::errors::AppError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ExportWatchConfig
/// 4. Applies environment variable overrides (EXPORTWATCH_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a referenced
/// environment variable is missing, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use exportwatch::config::loader::load_config;
///
/// let config = load_config("exportwatch.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ExportWatchConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(AppError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        AppError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: ExportWatchConfig = toml::from_str(&contents)
        .map_err(|e| AppError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config
        .validate()
        .map_err(|e| AppError::Configuration(format!("Configuration validation failed: {e}")))?;

    Ok(config)
}

/// Loads the file if it exists, otherwise starts from defaults
///
/// Environment overrides and validation apply in both cases.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<ExportWatchConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(path = %path.display(), "No configuration file, using defaults");
    let mut config = ExportWatchConfig::default();
    apply_env_overrides(&mut config);
    config
        .validate()
        .map_err(|e| AppError::Configuration(format!("Configuration validation failed: {e}")))?;
    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| AppError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(AppError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using EXPORTWATCH_* prefix
///
/// Environment variables follow the pattern: EXPORTWATCH_<SECTION>_<KEY>
/// For example: EXPORTWATCH_BACKEND_BASE_URL, EXPORTWATCH_POLLER_INTERVAL_MS
fn apply_env_overrides(config: &mut ExportWatchConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("EXPORTWATCH_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Backend overrides
    if let Ok(val) = std::env::var("EXPORTWATCH_BACKEND_BASE_URL") {
        config.backend.base_url = val;
    }
    if let Ok(val) = std::env::var("EXPORTWATCH_BACKEND_EXPORTS_PATH") {
        config.backend.exports_path = val;
    }
    if let Ok(val) = std::env::var("EXPORTWATCH_BACKEND_STORAGE_PATH") {
        config.backend.storage_path = val;
    }
    if let Ok(val) = std::env::var("EXPORTWATCH_BACKEND_ACTUATOR_PATH") {
        config.backend.actuator_path = val;
    }
    if let Ok(val) = std::env::var("EXPORTWATCH_BACKEND_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.backend.timeout_seconds = Some(timeout);
        }
    }
    if let Ok(val) = std::env::var("EXPORTWATCH_BACKEND_TLS_VERIFY") {
        config.backend.tls_verify = val.parse().unwrap_or(true);
    }

    // Poller overrides
    if let Ok(val) = std::env::var("EXPORTWATCH_POLLER_INTERVAL_MS") {
        if let Ok(interval) = val.parse() {
            config.poller.interval_ms = interval;
        }
    }

    // Upload overrides
    if let Ok(val) = std::env::var("EXPORTWATCH_UPLOAD_MAX_FILE_SIZE_BYTES") {
        if let Ok(size) = val.parse() {
            config.upload.max_file_size_bytes = size;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("EXPORTWATCH_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("EXPORTWATCH_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("EXPORTWATCH_LOADER_TEST_VAR", "test_value");
        let input = "base_url = \"${EXPORTWATCH_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "base_url = \"test_value\"\n");
        std::env::remove_var("EXPORTWATCH_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("EXPORTWATCH_LOADER_MISSING_VAR");
        let input = "base_url = \"${EXPORTWATCH_LOADER_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        let input = "# base_url = \"${EXPORTWATCH_LOADER_COMMENTED_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${EXPORTWATCH_LOADER_COMMENTED_VAR}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[backend]
base_url = "https://exports.example.com"
timeout_seconds = 15

[poller]
interval_ms = 500
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.backend.base_url, "https://exports.example.com");
        assert_eq!(config.backend.timeout_seconds, Some(15));
        assert_eq!(config.backend.exports_path, "/exports");
        assert_eq!(config.poller.interval_ms, 500);
    }

    #[test]
    fn test_load_config_invalid_interval() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[poller]\ninterval_ms = 10\n")
            .unwrap();
        temp_file.flush().unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("poller.interval_ms"));
    }

    #[test]
    fn test_load_config_or_default_without_file() {
        let config = load_config_or_default("does-not-exist-exportwatch.toml").unwrap();
        assert_eq!(config.poller.interval_ms, 1000);
    }
}
