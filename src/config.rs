//! # Application Configuration
//!
//! Settings for the recipe core and its logging, loadable from environment
//! variables or a JSON file, with validation per section.

use crate::errors::{error_logging, AppError, AppResult};
use crate::observability_config::ObservabilityConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

/// What to do when a recipe mentions the same ingredient more than once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the first mention, drop later ones
    #[default]
    FirstWins,
    /// Add later quantities into the first mention when the units normalize
    /// to the same id; otherwise drop them
    MergeEqualUnits,
}

impl FromStr for DuplicatePolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first_wins" | "first-wins" => Ok(DuplicatePolicy::FirstWins),
            "merge_equal_units" | "merge-equal-units" => Ok(DuplicatePolicy::MergeEqualUnits),
            other => Err(AppError::Config(format!(
                "Unknown duplicate policy '{}'. Expected 'first_wins' or 'merge_equal_units'",
                other
            ))),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::FirstWins => f.write_str("first_wins"),
            DuplicatePolicy::MergeEqualUnits => f.write_str("merge_equal_units"),
        }
    }
}

/// Recipe parsing and display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeConfig {
    /// Handling of repeated ingredient mentions
    pub duplicate_policy: DuplicatePolicy,
    /// Servings assumed when a recipe doesn't declare any
    pub default_servings: u32,
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::FirstWins,
            default_servings: 4,
        }
    }
}

impl RecipeConfig {
    /// Load recipe settings from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let duplicate_policy = match env::var("PANTRY_DUPLICATE_POLICY") {
            Ok(raw) => raw.parse().unwrap_or_else(|e: AppError| {
                warn!(error = %e, "Invalid PANTRY_DUPLICATE_POLICY, using default");
                defaults.duplicate_policy
            }),
            Err(_) => defaults.duplicate_policy,
        };

        let default_servings = match env::var("PANTRY_DEFAULT_SERVINGS") {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "Invalid PANTRY_DEFAULT_SERVINGS, using default");
                defaults.default_servings
            }),
            Err(_) => defaults.default_servings,
        };

        Self {
            duplicate_policy,
            default_servings,
        }
    }

    /// Validate recipe configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.default_servings == 0 {
            return Err(AppError::Config(
                "default_servings must be greater than 0".to_string(),
            ));
        }

        if self.default_servings > 1000 {
            return Err(AppError::Config(
                "default_servings cannot be greater than 1000".to_string(),
            ));
        }

        Ok(())
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub recipe: RecipeConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            recipe: RecipeConfig::from_env(),
            observability: ObservabilityConfig::from_env(),
        }
    }

    /// Load configuration from a JSON file; missing sections use defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            error_logging::log_filesystem_error(&e, "read_config", path.to_str());
            AppError::FileSystem(format!("Failed to read config '{}': {}", path.display(), e))
        })?;

        let config: AppConfig = serde_json::from_str(&content).map_err(|e| {
            error_logging::log_config_error(&e, &path.display().to_string(), "parse_config");
            AppError::Config(format!("Failed to parse config '{}': {}", path.display(), e))
        })?;

        info!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> AppResult<()> {
        self.recipe.validate()?;
        self.observability
            .validate()
            .map_err(|e| AppError::Config(format!("Observability config: {}", e)))?;
        Ok(())
    }
}
