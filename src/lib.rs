//! # PantryPilot Recipe Core
//!
//! Parses recipes written in inline markup into a structured model, links
//! their ingredients to a known-ingredient library, scales quantities for
//! display and computes stock deductions across compatible units.
//!
//! Everything here is synchronous and free of I/O apart from the
//! configuration loader. The unit table is immutable and shared.

pub mod config;
pub mod errors;
pub mod markup;
pub mod observability;
pub mod observability_config;
pub mod quantity;
pub mod resolver;
pub mod scaling;
pub mod units;

// Re-export types for easier access
pub use config::{AppConfig, DuplicatePolicy, RecipeConfig};
pub use markup::{parse_recipe, parse_recipe_with_config, ParsedIngredient, ParsedRecipe};
pub use resolver::{IngredientId, KnownIngredient, MatchMode};
pub use scaling::{compute_deduction, scale, DeductionResult};
