//! # Serving Scaling and Stock Deduction
//!
//! Display-only scaling of recipe quantities to a different number of
//! servings, and the calculation of how much stock to subtract when a recipe
//! is marked as cooked.
//!
//! Deduction never produces a negative stock change. Units that can't be
//! reconciled are reported through [`DeductionResult::note`] rather than as
//! an error, so the caller can let a person decide.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::RecipeConfig;
use crate::markup::{ParsedIngredient, ParsedRecipe};
use crate::resolver::IngredientId;
use crate::units::{can_convert, convert_unit, format_quantity, normalize_unit};

/// Scale a quantity from `base_servings` to `target_servings`
///
/// A base of zero is treated as one.
///
/// # Examples
///
/// ```rust
/// use pantry_pilot::scaling::scale;
///
/// assert_eq!(scale(2.0, 4, 8), 4.0);
/// assert_eq!(scale(2.0, 0, 8), 16.0);
/// ```
pub fn scale(quantity: f64, base_servings: u32, target_servings: u32) -> f64 {
    let base = base_servings.max(1);
    quantity * (f64::from(target_servings) / f64::from(base))
}

/// Servings a recipe is written for, falling back to the configured default
pub fn effective_servings(recipe: &ParsedRecipe, config: &RecipeConfig) -> u32 {
    recipe
        .servings
        .unwrap_or(config.default_servings)
        .max(1)
}

/// An ingredient with its quantity scaled for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaledIngredient {
    pub original_text: String,
    pub quantity: Option<f64>,
    /// `quantity` rendered with [`format_quantity`]
    pub display_quantity: Option<String>,
    pub unit: Option<String>,
    pub ingredient_id: Option<IngredientId>,
}

impl ScaledIngredient {
    /// "1½ cup flour", "3 eggs" or "salt"
    pub fn display_line(&self) -> String {
        [
            self.display_quantity.as_deref(),
            self.unit.as_deref(),
            Some(self.original_text.as_str()),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// Scale every ingredient of a recipe without touching the recipe itself
pub fn scale_recipe(
    recipe: &ParsedRecipe,
    base_servings: u32,
    target_servings: u32,
) -> Vec<ScaledIngredient> {
    recipe
        .ingredients
        .iter()
        .map(|ingredient| {
            let quantity = ingredient
                .quantity
                .map(|q| scale(q, base_servings, target_servings));
            ScaledIngredient {
                original_text: ingredient.original_text.clone(),
                quantity,
                display_quantity: quantity.map(format_quantity),
                unit: ingredient.unit.clone(),
                ingredient_id: ingredient.ingredient_id.clone(),
            }
        })
        .collect()
}

/// How much stock to subtract for one recipe ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionResult {
    /// Amount in the stock item's unit
    pub deduct_quantity: f64,
    /// Conversion explanation or unit mismatch warning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl DeductionResult {
    fn plain(deduct_quantity: f64) -> Self {
        Self {
            deduct_quantity,
            note: None,
        }
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute the stock change for a recipe quantity against a stock quantity
///
/// # Examples
///
/// ```rust
/// use pantry_pilot::scaling::compute_deduction;
///
/// let result = compute_deduction(3.0, "tsp", 1.0, "tbsp");
/// assert!((result.deduct_quantity - 1.0).abs() < 0.01);
/// assert!(result.note.is_some());
///
/// let mismatch = compute_deduction(1.0, "cup", 200.0, "g");
/// assert_eq!(mismatch.deduct_quantity, 0.0);
/// assert!(mismatch.note.unwrap().contains("Unit mismatch"));
/// ```
pub fn compute_deduction(
    recipe_qty: f64,
    recipe_unit: &str,
    stock_qty: f64,
    stock_unit: &str,
) -> DeductionResult {
    if recipe_unit.trim().is_empty() || stock_unit.trim().is_empty() {
        crate::observability::record_deduction("unitless");
        return DeductionResult::plain(recipe_qty.min(stock_qty).max(0.0));
    }

    if recipe_qty <= 0.0 || stock_qty <= 0.0 {
        crate::observability::record_deduction("invalid_quantity");
        return DeductionResult::plain(0.0);
    }

    if normalize_unit(recipe_unit) == normalize_unit(stock_unit) {
        crate::observability::record_deduction("same_unit");
        return DeductionResult::plain(recipe_qty.min(stock_qty));
    }

    if can_convert(recipe_unit, stock_unit) {
        if let Some(converted) = convert_unit(recipe_qty, recipe_unit, stock_unit) {
            crate::observability::record_deduction("converted");
            trace!(
                recipe_qty,
                recipe_unit = %recipe_unit,
                converted,
                stock_unit = %stock_unit,
                "Converted recipe quantity to stock unit"
            );
            return DeductionResult {
                deduct_quantity: round_to_hundredths(converted.min(stock_qty)),
                note: Some(format!(
                    "Recipe needs {} {} (≈ {} {})",
                    format_quantity(recipe_qty),
                    recipe_unit.trim(),
                    format_quantity(converted),
                    stock_unit.trim()
                )),
            };
        }
    }

    crate::observability::record_deduction("unit_mismatch");
    debug!(
        recipe_unit = %recipe_unit,
        stock_unit = %stock_unit,
        "Units cannot be reconciled"
    );
    DeductionResult {
        deduct_quantity: 0.0,
        note: Some(format!(
            "Unit mismatch: recipe uses {}, pantry has {}",
            recipe_unit.trim(),
            stock_unit.trim()
        )),
    }
}

/// A snapshot of one stocked ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub ingredient_id: IngredientId,
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
}

/// A deduction proposed for one linked ingredient
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedDeduction {
    pub ingredient_id: IngredientId,
    pub original_text: String,
    pub result: DeductionResult,
}

/// Pair linked recipe ingredients with stock and compute each deduction
///
/// Unlinked ingredients and ingredients with no stock entry are skipped. A
/// missing or zero recipe quantity counts as one, a missing unit as unitless.
pub fn plan_deductions(
    ingredients: &[ParsedIngredient],
    stock: &[StockItem],
) -> Vec<PlannedDeduction> {
    ingredients
        .iter()
        .filter_map(|ingredient| {
            let id = ingredient.ingredient_id.as_ref()?;
            let item = stock.iter().find(|s| &s.ingredient_id == id)?;
            let recipe_qty = match ingredient.quantity {
                Some(q) if q != 0.0 => q,
                _ => 1.0,
            };
            let result = compute_deduction(
                recipe_qty,
                ingredient.unit.as_deref().unwrap_or(""),
                item.quantity,
                &item.unit,
            );
            Some(PlannedDeduction {
                ingredient_id: id.clone(),
                original_text: ingredient.original_text.clone(),
                result,
            })
        })
        .collect()
}

/// Remaining stock after a deduction, floored at zero
pub fn apply_deduction(stock_qty: f64, deduct_qty: f64) -> f64 {
    (stock_qty - deduct_qty).max(0.0)
}
