//! Configuration loader with TOML/JSON parsing and environment variable overrides

use super::schema::HighwaterConfig;
use super::secret::{secret_string, secret_string_opt};
use crate::domain::errors::HighwaterError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Loads configuration from a TOML (or `.json`) file
///
/// This function:
/// 1. Reads the file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the document into HighwaterConfig
/// 4. Applies environment variable overrides (HIGHWATER_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a [`HighwaterError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, parsing fails, an override
/// cannot be parsed, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use highwater::config::loader::load_config;
///
/// let config = load_config("highwater.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<HighwaterConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(HighwaterError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        HighwaterError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let mut config: HighwaterConfig = if is_json {
        serde_json::from_str(&contents)
            .map_err(|e| HighwaterError::Configuration(format!("Failed to parse JSON: {e}")))?
    } else {
        toml::from_str(&contents)
            .map_err(|e| HighwaterError::Configuration(format!("Failed to parse TOML: {e}")))?
    };

    finish(&mut config)?;
    Ok(config)
}

/// Loads configuration from `path` if it exists, otherwise from defaults
///
/// Environment overrides and validation apply in both cases, so a run can be
/// configured entirely through `HIGHWATER_*` variables.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<HighwaterConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(
        path = %path.display(),
        "Configuration file not found, using defaults and environment overrides"
    );
    let mut config = HighwaterConfig::default();
    finish(&mut config)?;
    Ok(config)
}

fn finish(config: &mut HighwaterConfig) -> Result<()> {
    apply_env_overrides(config)?;

    config.validate().map_err(|e| {
        HighwaterError::Configuration(format!("Configuration validation failed: {e}"))
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Lines starting with `#` are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| HighwaterError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
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
        return Err(HighwaterError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse_env<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env(name) {
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            HighwaterError::Configuration(format!("Invalid value '{raw}' for {name}: {e}"))
        }),
        None => Ok(None),
    }
}

/// Applies environment variable overrides using the HIGHWATER_* prefix
///
/// Environment variables follow the pattern: HIGHWATER_<SECTION>_<KEY>,
/// for example HIGHWATER_SOURCE_TABLE or HIGHWATER_STORAGE_FORMAT. A value
/// that does not parse for its field is a configuration error.
fn apply_env_overrides(config: &mut HighwaterConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env("HIGHWATER_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = parse_env("HIGHWATER_APPLICATION_DRY_RUN")? {
        config.application.dry_run = val;
    }

    // Source overrides
    let source = &mut config.source;
    if let Some(val) = env("HIGHWATER_SOURCE_URL") {
        source.url = val;
    }
    if let Some(val) = env("HIGHWATER_SOURCE_USERNAME") {
        source.username = val;
    }
    if let Some(val) = env("HIGHWATER_SOURCE_PASSWORD") {
        source.password = secret_string(val);
    }
    if let Some(val) = env("HIGHWATER_SOURCE_TABLE") {
        source.table = val;
    }
    if let Some(val) = env("HIGHWATER_SOURCE_KEY_COLUMN") {
        source.key_column = val;
    }
    if let Some(val) = parse_env("HIGHWATER_SOURCE_MAX_CONNECTIONS")? {
        source.max_connections = val;
    }
    if let Some(val) = parse_env("HIGHWATER_SOURCE_CONNECTION_TIMEOUT_SECONDS")? {
        source.connection_timeout_seconds = val;
    }
    if let Some(val) = parse_env("HIGHWATER_SOURCE_STATEMENT_TIMEOUT_SECONDS")? {
        source.statement_timeout_seconds = val;
    }
    if let Some(val) = env("HIGHWATER_SOURCE_SSL_MODE") {
        source.ssl_mode = val;
    }

    // Storage overrides
    let storage = &mut config.storage;
    if let Some(val) = parse_env("HIGHWATER_STORAGE_BACKEND")? {
        storage.backend = val;
    }
    if let Some(val) = env("HIGHWATER_STORAGE_BUCKET") {
        storage.bucket = val;
    }
    if let Some(val) = env("HIGHWATER_STORAGE_PREFIX") {
        storage.prefix = val;
    }
    if let Some(val) = parse_env("HIGHWATER_STORAGE_FORMAT")? {
        storage.format = val;
    }
    if let Some(val) = env("HIGHWATER_STORAGE_ENDPOINT") {
        storage.endpoint = val;
    }
    if let Some(val) = env("HIGHWATER_STORAGE_REGION") {
        storage.region = val;
    }
    if let Some(val) = env("HIGHWATER_STORAGE_ACCESS_KEY_ID") {
        storage.access_key_id = Some(val);
    }
    if let Some(val) = env("HIGHWATER_STORAGE_SECRET_ACCESS_KEY") {
        storage.secret_access_key = secret_string_opt(Some(val));
    }
    if let Some(val) = parse_env("HIGHWATER_STORAGE_PATH_STYLE")? {
        storage.path_style = val;
    }
    if let Some(val) = env("HIGHWATER_STORAGE_LOCAL_ROOT") {
        storage.local_root = val;
    }

    // Checkpoint overrides
    if let Some(val) = env("HIGHWATER_CHECKPOINT_LOCATION") {
        config.checkpoint.location = val;
    }

    // Logging overrides
    if let Some(val) = parse_env("HIGHWATER_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env("HIGHWATER_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = env("HIGHWATER_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
