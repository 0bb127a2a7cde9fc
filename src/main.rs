use anyhow::{Context, Result};
use clap::Parser;
use pantry_pilot::config::AppConfig;
use pantry_pilot::errors::{error_logging, AppError};
use pantry_pilot::markup::parse_recipe_with_config;
use pantry_pilot::observability;
use pantry_pilot::scaling::{effective_servings, scale_recipe};
use std::path::PathBuf;
use tracing::info;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(
    name = "pantry-pilot",
    about = "Parse a marked-up recipe and print its ingredient list",
    long_about = "Parses a recipe written in the @ingredient{qty%unit} markup, prints the \
                  parsed recipe as JSON and then the ingredient list scaled to the requested \
                  number of servings."
)]
struct CliArgs {
    /// Recipe file to parse
    recipe_path: PathBuf,

    /// Scale the ingredient list to this many servings
    #[arg(long, value_parser = parse_servings)]
    servings: Option<u32>,

    /// JSON configuration file (defaults to environment variables)
    #[arg(long = "config")]
    config_path: Option<PathBuf>,
}

/// Parse a `--servings` value, rejecting zero
fn parse_servings(value: &str) -> Result<u32, AppError> {
    let servings = value.trim().parse::<u32>().map_err(|e| {
        AppError::Validation(format!("'{}' is not a whole number of servings: {}", value, e))
    })?;

    if servings == 0 {
        let err = AppError::Validation("--servings must be greater than 0".to_string());
        error_logging::log_validation_error(&err, "parse_servings", "servings", Some(value));
        return Err(err);
    }

    Ok(servings)
}

/// Load configuration from file when given, otherwise from the environment
fn load_config(config_path: Option<&PathBuf>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::from_json_file(path)?,
        None => AppConfig::from_env(),
    };

    config.validate().map_err(|e| {
        anyhow::anyhow!("Configuration validation failed: {}. Please check your settings.", e)
    })?;
    Ok(config)
}

fn main() -> Result<()> {
    // Load environment variables from .env file first
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let config = load_config(args.config_path.as_ref())?;

    observability::init_tracing(&config.observability)?;

    let source = std::fs::read_to_string(&args.recipe_path)
        .with_context(|| format!("Failed to read recipe '{}'", args.recipe_path.display()))?;

    let recipe = parse_recipe_with_config(&source, &config.recipe);
    let fallback_title = args
        .recipe_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Untitled");
    info!(
        title = %recipe.title_or(fallback_title),
        ingredients = recipe.ingredients.len(),
        steps = recipe.steps.len(),
        "Recipe parsed"
    );

    println!("{}", serde_json::to_string_pretty(&recipe)?);

    let base = effective_servings(&recipe, &config.recipe);
    let target = args.servings.unwrap_or(base);
    println!();
    println!("{} (serves {})", recipe.title_or(fallback_title), target);
    for ingredient in scale_recipe(&recipe, base, target) {
        println!("- {}", ingredient.display_line());
    }

    Ok(())
}
