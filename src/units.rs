//! # Units of Measure
//!
//! Process-wide, immutable unit table plus the normalization, conversion and
//! display helpers built on top of it.
//!
//! ## Categories
//!
//! | Category | Base unit | Canonical units |
//! |----------|-----------|-----------------|
//! | volume   | ml        | tsp, tbsp, cup, ml, L |
//! | weight   | g         | g, kg, oz, lb |
//! | count    | piece     | piece, dozen |
//!
//! Conversion only happens inside a category. A value moves through the
//! category's base unit: `to = value * factor(from) / factor(to)`.
//!
//! ## Alias lookup
//!
//! Aliases are matched case-sensitively first, then case-insensitively. The
//! exact pass keeps `t` (teaspoon) and `T` (tablespoon) apart.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

/// Measurement dimension within which conversion is well-defined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    Volume,
    Weight,
    Count,
}

impl UnitCategory {
    /// The unit every other unit of this category is expressed in
    pub fn base_unit(self) -> &'static str {
        match self {
            UnitCategory::Volume => "ml",
            UnitCategory::Weight => "g",
            UnitCategory::Count => "piece",
        }
    }
}

impl fmt::Display for UnitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitCategory::Volume => "volume",
            UnitCategory::Weight => "weight",
            UnitCategory::Count => "count",
        };
        f.write_str(name)
    }
}

/// A canonical unit with its display label and conversion factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectableUnit {
    /// Canonical id (e.g. "tbsp")
    pub value: &'static str,
    /// Human-readable label for pickers
    pub label: &'static str,
    pub category: UnitCategory,
    /// Amount of the category base unit in one of this unit
    #[serde(skip)]
    pub factor: f64,
}

/// All canonical units, grouped by category
pub const SELECTABLE_UNITS: &[SelectableUnit] = &[
    SelectableUnit {
        value: "tsp",
        label: "Teaspoon (tsp)",
        category: UnitCategory::Volume,
        factor: 4.929,
    },
    SelectableUnit {
        value: "tbsp",
        label: "Tablespoon (tbsp)",
        category: UnitCategory::Volume,
        factor: 14.787,
    },
    SelectableUnit {
        value: "cup",
        label: "Cup",
        category: UnitCategory::Volume,
        factor: 236.588,
    },
    SelectableUnit {
        value: "ml",
        label: "Milliliter (ml)",
        category: UnitCategory::Volume,
        factor: 1.0,
    },
    SelectableUnit {
        value: "L",
        label: "Liter (L)",
        category: UnitCategory::Volume,
        factor: 1000.0,
    },
    SelectableUnit {
        value: "g",
        label: "Gram (g)",
        category: UnitCategory::Weight,
        factor: 1.0,
    },
    SelectableUnit {
        value: "kg",
        label: "Kilogram (kg)",
        category: UnitCategory::Weight,
        factor: 1000.0,
    },
    SelectableUnit {
        value: "oz",
        label: "Ounce (oz)",
        category: UnitCategory::Weight,
        factor: 28.3495,
    },
    SelectableUnit {
        value: "lb",
        label: "Pound (lb)",
        category: UnitCategory::Weight,
        factor: 453.592,
    },
    SelectableUnit {
        value: "piece",
        label: "Piece",
        category: UnitCategory::Count,
        factor: 1.0,
    },
    SelectableUnit {
        value: "dozen",
        label: "Dozen",
        category: UnitCategory::Count,
        factor: 12.0,
    },
];

/// Free-form spellings mapped to canonical ids.
/// Order matters for the case-insensitive pass.
pub const UNIT_ALIASES: &[(&str, &str)] = &[
    ("teaspoon", "tsp"),
    ("teaspoons", "tsp"),
    ("t", "tsp"),
    ("tablespoon", "tbsp"),
    ("tablespoons", "tbsp"),
    ("T", "tbsp"),
    ("cups", "cup"),
    ("c", "cup"),
    ("milliliter", "ml"),
    ("milliliters", "ml"),
    ("millilitre", "ml"),
    ("millilitres", "ml"),
    ("mL", "ml"),
    ("liter", "L"),
    ("liters", "L"),
    ("litre", "L"),
    ("litres", "L"),
    ("l", "L"),
    ("gram", "g"),
    ("grams", "g"),
    ("kilogram", "kg"),
    ("kilograms", "kg"),
    ("kilo", "kg"),
    ("kilos", "kg"),
    ("ounce", "oz"),
    ("ounces", "oz"),
    ("pound", "lb"),
    ("pounds", "lb"),
    ("lbs", "lb"),
    ("pieces", "piece"),
    ("pc", "piece"),
    ("pcs", "piece"),
    ("each", "piece"),
    ("dozens", "dozen"),
    ("doz", "dozen"),
];

struct UnitTable {
    units: HashMap<&'static str, SelectableUnit>,
    exact_aliases: HashMap<&'static str, &'static str>,
}

lazy_static! {
    static ref UNIT_TABLE: UnitTable = UnitTable {
        units: SELECTABLE_UNITS.iter().map(|u| (u.value, *u)).collect(),
        exact_aliases: UNIT_ALIASES.iter().copied().collect(),
    };
}

fn lookup(canonical: &str) -> Option<&'static SelectableUnit> {
    UNIT_TABLE.units.get(canonical)
}

/// Normalize a unit spelling to its canonical id
///
/// Unknown units come back trimmed and lower-cased; normalization never fails.
///
/// # Examples
///
/// ```rust
/// use pantry_pilot::units::normalize_unit;
///
/// assert_eq!(normalize_unit("tablespoons"), "tbsp");
/// assert_eq!(normalize_unit("T"), "tbsp");
/// assert_eq!(normalize_unit("t"), "tsp");
/// assert_eq!(normalize_unit("Liters"), "L");
/// assert_eq!(normalize_unit("Pinch"), "pinch");
/// ```
pub fn normalize_unit(raw: &str) -> String {
    let trimmed = raw.trim();

    if lookup(trimmed).is_some() {
        return trimmed.to_string();
    }

    if let Some(canonical) = UNIT_TABLE.exact_aliases.get(trimmed) {
        return (*canonical).to_string();
    }

    let lower = trimmed.to_lowercase();
    if let Some((_, canonical)) = UNIT_ALIASES
        .iter()
        .find(|(alias, _)| alias.to_lowercase() == lower)
    {
        return (*canonical).to_string();
    }

    trace!(unit = %trimmed, "Unrecognized unit, keeping lower-cased form");
    lower
}

/// Category of a unit after normalization, or `None` when unknown
pub fn unit_category(unit: &str) -> Option<UnitCategory> {
    lookup(&normalize_unit(unit)).map(|u| u.category)
}

/// Whether both units are known and share a category
pub fn can_convert(from: &str, to: &str) -> bool {
    match (unit_category(from), unit_category(to)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Convert a magnitude between two units of the same category
///
/// Units that normalize to the same id convert as the identity, even when the
/// table doesn't know them. Cross-category or unknown pairs yield `None`.
///
/// # Examples
///
/// ```rust
/// use pantry_pilot::units::convert_unit;
///
/// assert_eq!(convert_unit(2.0, "kg", "g"), Some(2000.0));
/// assert_eq!(convert_unit(1.0, "cup", "g"), None);
/// ```
pub fn convert_unit(value: f64, from: &str, to: &str) -> Option<f64> {
    let from = normalize_unit(from);
    let to = normalize_unit(to);

    if from == to {
        crate::observability::record_unit_conversion("identity");
        return Some(value);
    }

    match (lookup(&from), lookup(&to)) {
        (Some(f), Some(t)) if f.category == t.category => {
            crate::observability::record_unit_conversion("converted");
            Some(value * f.factor / t.factor)
        }
        _ => {
            crate::observability::record_unit_conversion("incompatible");
            None
        }
    }
}

/// Common culinary fractions, most precise denominators first.
/// Thirds get a tighter tolerance so nearby decimals like 0.34 stay decimals.
const DISPLAY_FRACTIONS: &[(f64, char, f64)] = &[
    (0.125, '⅛', 0.02),
    (0.375, '⅜', 0.02),
    (0.625, '⅝', 0.02),
    (0.875, '⅞', 0.02),
    (0.25, '¼', 0.02),
    (0.75, '¾', 0.02),
    (0.5, '½', 0.02),
    (1.0 / 3.0, '⅓', 0.01),
    (2.0 / 3.0, '⅔', 0.01),
];

/// Render a quantity for display
///
/// The absolute value is used. Whole numbers print without decimals, common
/// fractions print as glyphs, and everything else is rounded to two places.
///
/// # Examples
///
/// ```rust
/// use pantry_pilot::units::format_quantity;
///
/// assert_eq!(format_quantity(2.0), "2");
/// assert_eq!(format_quantity(1.5), "1½");
/// assert_eq!(format_quantity(0.25), "¼");
/// assert_eq!(format_quantity(-0.75), "¾");
/// assert_eq!(format_quantity(1.234), "1.23");
/// ```
pub fn format_quantity(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let abs_value = value.abs();
    let whole = abs_value.floor();
    let fractional = abs_value - whole;

    if fractional < 0.01 {
        return format!("{}", whole);
    }

    for (target, glyph, tolerance) in DISPLAY_FRACTIONS {
        if (fractional - target).abs() < *tolerance {
            return if whole == 0.0 {
                glyph.to_string()
            } else {
                format!("{}{}", whole, glyph)
            };
        }
    }

    let rounded = (abs_value * 100.0).round() / 100.0;
    format!("{}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_consistent() {
        // Every alias target is a canonical unit
        for (alias, canonical) in UNIT_ALIASES {
            assert!(
                lookup(canonical).is_some(),
                "alias '{}' points at unknown unit '{}'",
                alias,
                canonical
            );
        }
        assert_eq!(UNIT_TABLE.units.len(), SELECTABLE_UNITS.len());
    }

    #[test]
    fn test_base_units_have_unit_factor() {
        for unit in SELECTABLE_UNITS {
            if unit.value == unit.category.base_unit() {
                assert_eq!(unit.factor, 1.0);
            }
        }
    }

    #[test]
    fn test_category_display() {
        assert_eq!(UnitCategory::Volume.to_string(), "volume");
        assert_eq!(UnitCategory::Weight.to_string(), "weight");
        assert_eq!(UnitCategory::Count.to_string(), "count");
    }
}
