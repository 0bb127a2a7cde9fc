//! # Quantity Parsing
//!
//! Turns the quantity part of an ingredient specifier into a number.
//!
//! Supported forms, checked in this order:
//! - mixed numbers: `1 1/2`
//! - simple fractions: `3/4`
//! - unicode fraction glyphs, alone or after a whole number: `½`, `1½`, `1 ½`
//! - decimals: `2`, `0.5`, `.25`, `1e3`
//!
//! Anything else yields `None`. No rounding happens here; see
//! [`crate::units::format_quantity`] for display.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

lazy_static! {
    static ref MIXED_NUMBER: Regex =
        Regex::new(r"^(\d+)\s+(\d+)/(\d+)$").expect("Invalid mixed number pattern");
    static ref SIMPLE_FRACTION: Regex =
        Regex::new(r"^(\d+)/(\d+)$").expect("Invalid fraction pattern");
}

/// Unicode vulgar fractions and their values
const FRACTION_GLYPHS: &[(char, f64)] = &[
    ('½', 1.0 / 2.0),
    ('⅓', 1.0 / 3.0),
    ('⅔', 2.0 / 3.0),
    ('¼', 1.0 / 4.0),
    ('¾', 3.0 / 4.0),
    ('⅕', 1.0 / 5.0),
    ('⅖', 2.0 / 5.0),
    ('⅗', 3.0 / 5.0),
    ('⅘', 4.0 / 5.0),
    ('⅙', 1.0 / 6.0),
    ('⅚', 5.0 / 6.0),
    ('⅛', 1.0 / 8.0),
    ('⅜', 3.0 / 8.0),
    ('⅝', 5.0 / 8.0),
    ('⅞', 7.0 / 8.0),
];

/// Parse a quantity specifier into a number
///
/// # Examples
///
/// ```rust
/// use pantry_pilot::quantity::parse_quantity;
///
/// assert_eq!(parse_quantity("1 1/2"), Some(1.5));
/// assert_eq!(parse_quantity("3/4"), Some(0.75));
/// assert_eq!(parse_quantity("400"), Some(400.0));
/// assert_eq!(parse_quantity("1/0"), None);
/// assert_eq!(parse_quantity("a pinch"), None);
/// ```
pub fn parse_quantity(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Mixed numbers must be tried before plain fractions
    if let Some(caps) = MIXED_NUMBER.captures(trimmed) {
        let whole = caps[1].parse::<f64>().ok()?;
        let num = caps[2].parse::<f64>().ok()?;
        let denom = caps[3].parse::<f64>().ok()?;
        if denom == 0.0 {
            trace!(input = %trimmed, "Mixed number with zero denominator");
            return None;
        }
        return Some(whole + num / denom);
    }

    if let Some(caps) = SIMPLE_FRACTION.captures(trimmed) {
        let num = caps[1].parse::<f64>().ok()?;
        let denom = caps[2].parse::<f64>().ok()?;
        if denom == 0.0 {
            trace!(input = %trimmed, "Fraction with zero denominator");
            return None;
        }
        return Some(num / denom);
    }

    if let Some(value) = parse_glyph_fraction(trimmed) {
        return Some(value);
    }

    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse `½`, `1½` or `1 ½`
fn parse_glyph_fraction(text: &str) -> Option<f64> {
    let last = text.chars().last()?;
    let (_, fraction) = FRACTION_GLYPHS.iter().find(|(glyph, _)| *glyph == last)?;
    let whole_part = text[..text.len() - last.len_utf8()].trim_end();

    if whole_part.is_empty() {
        return Some(*fraction);
    }
    if !whole_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    whole_part.parse::<f64>().ok().map(|whole| whole + fraction)
}
