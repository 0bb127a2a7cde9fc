//! # Observability Configuration
//!
//! Environment-specific settings for structured logging.

use serde::{Deserialize, Serialize};
use std::env;

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration for different environments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Environment name (development, staging, production)
    pub environment: String,
    /// Log level for the pantry_pilot target
    pub log_level: String,
    /// Explicit log format; derived from the environment when unset
    pub log_format: Option<LogFormat>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
            log_format: None,
        }
    }
}

impl ObservabilityConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format: env::var("LOG_FORMAT")
                .ok()
                .and_then(|v| match v.trim().to_lowercase().as_str() {
                    "pretty" => Some(LogFormat::Pretty),
                    "json" => Some(LogFormat::Json),
                    _ => None,
                }),
        }
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Effective log format: always JSON in production, otherwise the
    /// explicit setting, else pretty in development
    pub fn effective_log_format(&self) -> LogFormat {
        if self.is_production() {
            return LogFormat::Json;
        }

        match self.log_format {
            Some(format) => format,
            None if self.is_development() => LogFormat::Pretty,
            None => LogFormat::Json,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(format!("Invalid log level: {}", self.log_level));
        }

        if self.environment.trim().is_empty() {
            return Err("Environment name cannot be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_development_pretty() {
        let config = ObservabilityConfig::default();
        assert!(config.is_development());
        assert!(!config.is_production());
        assert_eq!(config.effective_log_format(), LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_always_logs_json() {
        let config = ObservabilityConfig {
            environment: "production".to_string(),
            ..Default::default()
        };
        assert!(config.is_production());
        assert_eq!(config.effective_log_format(), LogFormat::Json);

        let forced = ObservabilityConfig {
            environment: "production".to_string(),
            log_format: Some(LogFormat::Pretty),
            ..Default::default()
        };
        assert_eq!(forced.effective_log_format(), LogFormat::Json);
    }

    #[test]
    fn test_explicit_format_outside_production() {
        let staging = ObservabilityConfig {
            environment: "staging".to_string(),
            log_format: Some(LogFormat::Pretty),
            ..Default::default()
        };
        assert_eq!(staging.effective_log_format(), LogFormat::Pretty);

        let dev_json = ObservabilityConfig {
            log_format: Some(LogFormat::Json),
            ..Default::default()
        };
        assert_eq!(dev_json.effective_log_format(), LogFormat::Json);
    }

    #[test]
    fn test_validation() {
        let mut config = ObservabilityConfig {
            log_level: "verbose".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.log_level = "DEBUG".to_string();
        assert!(config.validate().is_ok());

        config.environment = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
