// Logger configuration
use serde::Deserialize;

use crate::error::{LogError, Result};
use crate::level::Level;

pub const DEVELOPMENT: &str = "development";
pub const STAGING: &str = "staging";
pub const UAT: &str = "uat";
pub const SANDBOX: &str = "sandbox";
pub const PRODUCTION: &str = "production";

pub fn is_development(environment: &str) -> bool {
    environment == DEVELOPMENT
}

pub fn is_staging(environment: &str) -> bool {
    environment == STAGING
}

pub fn is_uat(environment: &str) -> bool {
    environment == UAT
}

pub fn is_sandbox(environment: &str) -> bool {
    environment == SANDBOX
}

pub fn is_production(environment: &str) -> bool {
    environment == PRODUCTION
}

pub fn is_valid_environment(environment: &str) -> bool {
    [DEVELOPMENT, STAGING, UAT, SANDBOX, PRODUCTION].contains(&environment)
}

/// Logger configuration read from `<PREFIX>_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Configuration {
    #[serde(rename = "global_environment")]
    pub environment: String,
    #[serde(default)]
    pub rollbar_token: String,

    #[serde(default, rename = "log_level")]
    pub level: Option<Level>,
    pub log_to_file: bool,
    pub log_file_name: String,
    /// Indent JSON records.
    pub log_prettify: bool,

    /// Mask sensitive fields like "password".
    pub mask_sensitive_fields: bool,
    /// Mask sensitive fields like "password" inside XML documents.
    #[serde(default)]
    pub xml_mask_sensitive_fields: bool,

    /// Colored human-readable output instead of JSON.
    #[serde(default)]
    pub console_writer: bool,
}

impl Configuration {
    /// Load a `.env` file if present, then read the configuration from the
    /// environment. An empty prefix reads unprefixed variables.
    ///
    /// # Errors
    ///
    /// Fails when a required variable is missing or cannot be parsed.
    pub fn from_env(prefix: &str) -> Result<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                tracing::warn!(error = %err, "loading .env file failed");
            }
        }

        Self::from_source(prefix, None)
    }

    /// Like [`Configuration::from_env`] but reading variables from `source`
    /// instead of the process environment when given.
    ///
    /// # Errors
    ///
    /// Fails when a required variable is missing or cannot be parsed.
    pub fn from_source(prefix: &str, source: Option<config::Map<String, String>>) -> Result<Self> {
        let environment = if prefix.is_empty() {
            config::Environment::default()
        } else {
            config::Environment::with_prefix(prefix)
        };

        config::Config::builder()
            .add_source(environment.try_parsing(true).source(source))
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|source| LogError::Config {
                prefix: prefix.to_string(),
                source,
            })
    }

    /// Minimum level, `info` when unset.
    pub fn level(&self) -> Level {
        self.level.unwrap_or_default()
    }

    pub fn is_development(&self) -> bool {
        is_development(&self.environment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(vars: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            vars.iter()
                .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_from_source() {
        let cfg = Configuration::from_source(
            "API",
            source(&[
                ("API_GLOBAL_ENVIRONMENT", "staging"),
                ("API_LOG_LEVEL", "debug"),
                ("API_LOG_TO_FILE", "true"),
                ("API_LOG_FILE_NAME", "/var/log/api/api.log"),
                ("API_LOG_PRETTIFY", "false"),
                ("API_MASK_SENSITIVE_FIELDS", "true"),
                ("OTHER_CONSOLE_WRITER", "true"),
            ]),
        )
        .unwrap();

        assert_eq!(
            cfg,
            Configuration {
                environment: STAGING.to_string(),
                rollbar_token: String::new(),
                level: Some(Level::Debug),
                log_to_file: true,
                log_file_name: "/var/log/api/api.log".to_string(),
                log_prettify: false,
                mask_sensitive_fields: true,
                xml_mask_sensitive_fields: false,
                console_writer: false,
            }
        );
    }

    #[test]
    fn test_missing_required_variable() {
        let err = Configuration::from_source("API", source(&[("API_GLOBAL_ENVIRONMENT", "uat")])).unwrap_err();

        assert!(matches!(err, LogError::Config { ref prefix, .. } if prefix == "API"));
        assert_eq!(err.to_string(), "processing configuration with prefix failed: prefix=API");
    }

    #[test]
    fn test_default_level() {
        let cfg = Configuration::from_source(
            "SVC",
            source(&[
                ("SVC_GLOBAL_ENVIRONMENT", "development"),
                ("SVC_LOG_TO_FILE", "false"),
                ("SVC_LOG_FILE_NAME", ""),
                ("SVC_LOG_PRETTIFY", "false"),
                ("SVC_MASK_SENSITIVE_FIELDS", "false"),
            ]),
        )
        .unwrap();

        assert_eq!(cfg.level(), Level::Info);
        assert!(cfg.is_development());
    }

    #[test]
    fn test_numeric_level() {
        for (raw, expected) in [("1", Level::Info), ("-1", Level::Trace), ("4", Level::Fatal)] {
            let cfg = Configuration::from_source(
                "API",
                source(&[
                    ("API_GLOBAL_ENVIRONMENT", "production"),
                    ("API_LOG_LEVEL", raw),
                    ("API_LOG_TO_FILE", "false"),
                    ("API_LOG_FILE_NAME", ""),
                    ("API_LOG_PRETTIFY", "false"),
                    ("API_MASK_SENSITIVE_FIELDS", "true"),
                ]),
            )
            .unwrap();

            assert_eq!(cfg.level(), expected, "{raw}");
        }

        let err = Configuration::from_source(
            "API",
            source(&[
                ("API_GLOBAL_ENVIRONMENT", "production"),
                ("API_LOG_LEVEL", "7"),
                ("API_LOG_TO_FILE", "false"),
                ("API_LOG_FILE_NAME", ""),
                ("API_LOG_PRETTIFY", "false"),
                ("API_MASK_SENSITIVE_FIELDS", "true"),
            ]),
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_environment_names() {
        assert!(is_production("production"));
        assert!(is_sandbox("sandbox"));
        assert!(!is_uat("UAT"));
        assert!(is_valid_environment("staging"));
        assert!(!is_valid_environment("local"));
    }
}
