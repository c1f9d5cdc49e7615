//! Server configuration parsed from environment variables.
//!
//! All settings can be overridden via environment variables prefixed with
//! `CUKE_GLUE_LSP_`.

use std::env;
use std::str::FromStr;

use crate::error::ServerError;

/// Log level enumeration matching tracing crate levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Most verbose logging, includes all trace spans.
    Trace,
    /// Debug-level information for development.
    Debug,
    /// Standard informational messages.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for failures.
    Error,
}

impl FromStr for LogLevel {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ServerError::InvalidConfig(format!(
                "unknown log level '{s}', expected one of: trace, debug, info, warn, error"
            ))),
        }
    }
}

impl LogLevel {
    /// Convert to a tracing filter directive string.
    #[must_use]
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Files larger than this are not indexed unless configured otherwise.
const DEFAULT_MAX_FILE_BYTES: u64 = 4 * 1024 * 1024;

const LOG_LEVEL_VAR: &str = "CUKE_GLUE_LSP_LOG_LEVEL";
const REPORT_MATCHES_VAR: &str = "CUKE_GLUE_LSP_REPORT_MATCHES";
const MAX_FILE_BYTES_VAR: &str = "CUKE_GLUE_LSP_MAX_FILE_BYTES";

/// Configuration for the language server.
///
/// # Environment Variables
///
/// - `CUKE_GLUE_LSP_LOG_LEVEL`: log level (trace, debug, info, warn, error)
/// - `CUKE_GLUE_LSP_REPORT_MATCHES`: emit informational markers for glued
///   steps (`true`/`false`, default `true`)
/// - `CUKE_GLUE_LSP_MAX_FILE_BYTES`: skip source files larger than this
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: LogLevel,
    /// Whether matched steps receive an informational marker.
    pub report_matches: bool,
    /// Upper bound on the size of files read during a build.
    pub max_file_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            report_matches: true,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for missing values.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::InvalidConfig` if an environment variable contains
    /// an invalid value.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let defaults = Self::default();

        let log_level = match lookup(LOG_LEVEL_VAR) {
            Some(val) => val.parse()?,
            None => defaults.log_level,
        };

        let report_matches = match lookup(REPORT_MATCHES_VAR) {
            Some(val) => parse_flag(&val).ok_or_else(|| {
                ServerError::InvalidConfig(format!(
                    "invalid report-matches value '{val}', expected true or false"
                ))
            })?,
            None => defaults.report_matches,
        };

        let max_file_bytes = match lookup(MAX_FILE_BYTES_VAR) {
            Some(val) => val.trim().parse().map_err(|_| {
                ServerError::InvalidConfig(format!(
                    "invalid max file size '{val}', expected a byte count"
                ))
            })?,
            None => defaults.max_file_bytes,
        };

        Ok(Self {
            log_level,
            report_matches,
            max_file_bytes,
        })
    }

    /// Apply optional overrides to an existing configuration.
    ///
    /// CLI overrides take precedence over environment-based defaults.
    #[must_use]
    pub fn apply_overrides(mut self, log_level: Option<LogLevel>) -> Self {
        if let Some(level) = log_level {
            self.log_level = level;
        }
        self
    }

    /// Create a new configuration with the specified log level.
    #[must_use]
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Create a new configuration with match reporting switched on or off.
    #[must_use]
    pub fn with_report_matches(mut self, report_matches: bool) -> Self {
        self.report_matches = report_matches;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[rstest]
    #[case("trace", LogLevel::Trace)]
    #[case("debug", LogLevel::Debug)]
    #[case("info", LogLevel::Info)]
    #[case("warn", LogLevel::Warn)]
    #[case("warning", LogLevel::Warn)]
    #[case("ERROR", LogLevel::Error)]
    fn log_level_parses_valid_values(#[case] input: &str, #[case] expected: LogLevel) {
        assert_eq!(input.parse::<LogLevel>().ok(), Some(expected));
    }

    #[test]
    fn log_level_rejects_invalid_values() {
        let Err(err) = "invalid".parse::<LogLevel>() else {
            panic!("expected invalid log level to be rejected");
        };
        assert!(err.to_string().contains("unknown log level"));
    }

    #[test]
    fn server_config_default_values() {
        let config = ServerConfig::default();
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.report_matches);
        assert_eq!(config.max_file_bytes, DEFAULT_MAX_FILE_BYTES);
    }

    #[test]
    fn reads_every_variable() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            (LOG_LEVEL_VAR, "debug"),
            (REPORT_MATCHES_VAR, "off"),
            (MAX_FILE_BYTES_VAR, "1024"),
        ]))
        .unwrap_or_else(|err| panic!("config should load: {err}"));
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(!config.report_matches);
        assert_eq!(config.max_file_bytes, 1024);
    }

    #[rstest]
    #[case(REPORT_MATCHES_VAR, "maybe")]
    #[case(MAX_FILE_BYTES_VAR, "lots")]
    #[case(LOG_LEVEL_VAR, "loud")]
    fn rejects_malformed_values(#[case] key: &str, #[case] value: &str) {
        let result = ServerConfig::from_lookup(lookup_from(&[(key, value)]));
        assert!(matches!(result, Err(ServerError::InvalidConfig(_))));
    }

    #[test]
    fn apply_overrides_only_touches_given_fields() {
        let config = ServerConfig::default().apply_overrides(Some(LogLevel::Error));
        assert_eq!(config.log_level, LogLevel::Error);

        let config = ServerConfig::default().apply_overrides(None);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn builders_set_fields() {
        let config = ServerConfig::default()
            .with_log_level(LogLevel::Debug)
            .with_report_matches(false);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(!config.report_matches);
    }
}
