//! # Ingredient Resolution
//!
//! Links parsed ingredient mentions to a user's library of known ingredients.
//!
//! Two modes exist:
//! - [`MatchMode::Strict`]: exact, case-insensitive match on the normalized
//!   name, then on any alias. Used when a mention is linked interactively.
//! - [`MatchMode::Loose`]: a best-effort bulk pass that additionally strips
//!   parenthetical qualifiers and trailing descriptions, tries each
//!   "or"-separated alternative, and finally falls back to substring
//!   containment between mention and known name.
//!
//! Mentions that match nothing are reported back; nothing here ever creates
//! a library entry.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, trace};

use crate::markup::ParsedRecipe;

lazy_static! {
    static ref PARENTHETICAL: Regex =
        Regex::new(r"\([^)]*\)").expect("Invalid parenthetical pattern");
    static ref OR_SEPARATOR: Regex =
        Regex::new(r"(?i)\s+or\s+").expect("Invalid or-separator pattern");
}

/// Opaque reference to an inventory ingredient
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientId(pub String);

impl IngredientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IngredientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A library entry a mention can be linked to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownIngredient {
    pub id: IngredientId,
    /// Display name
    pub name: String,
    /// Trimmed, lower-cased name
    pub normalized_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl KnownIngredient {
    pub fn new(id: IngredientId, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            normalized_name: normalize_name(&name),
            name,
            aliases: Vec::new(),
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for alias in aliases {
            self.add_alias(alias);
        }
        self
    }

    /// Append an alias unless an equal one (ignoring case) exists
    ///
    /// Returns whether the alias was added.
    pub fn add_alias(&mut self, alias: impl Into<String>) -> bool {
        let alias = alias.into();
        let normalized = normalize_name(&alias);
        if normalized.is_empty() || self.has_alias(&normalized) {
            return false;
        }
        self.aliases.push(alias.trim().to_string());
        true
    }

    fn has_alias(&self, normalized: &str) -> bool {
        self.aliases.iter().any(|a| normalize_name(a) == normalized)
    }

    fn matches_exactly(&self, normalized: &str) -> bool {
        normalize_name(&self.normalized_name) == normalized || self.has_alias(normalized)
    }
}

/// Matching strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Strict,
    Loose,
}

impl MatchMode {
    fn label(self) -> &'static str {
        match self {
            MatchMode::Strict => "strict",
            MatchMode::Loose => "loose",
        }
    }
}

/// Outcome of linking a whole recipe
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkReport {
    /// Mentions linked during this pass
    pub linked: usize,
    /// Original text of mentions left without a link
    pub unmatched: Vec<String>,
}

fn normalize_name(text: &str) -> String {
    text.trim().to_lowercase()
}

fn find_exact<'a>(normalized: &str, known: &'a [KnownIngredient]) -> Option<&'a KnownIngredient> {
    if normalized.is_empty() {
        return None;
    }
    known.iter().find(|k| k.matches_exactly(normalized))
}

/// Strict lookup: normalized name first, then aliases
///
/// # Examples
///
/// ```rust
/// use pantry_pilot::resolver::{find_match, IngredientId, KnownIngredient};
///
/// let known = vec![
///     KnownIngredient::new(IngredientId::new("1"), "Scallion").with_aliases(["green onion"]),
/// ];
/// assert_eq!(find_match("  Green Onion ", &known), Some(IngredientId::new("1")));
/// assert_eq!(find_match("green onions", &known), None);
/// ```
pub fn find_match(mention: &str, known: &[KnownIngredient]) -> Option<IngredientId> {
    let normalized = normalize_name(mention);
    // Names outrank aliases across the whole library
    known
        .iter()
        .find(|k| !normalized.is_empty() && normalize_name(&k.normalized_name) == normalized)
        .or_else(|| find_exact(&normalized, known))
        .map(|k| k.id.clone())
}

/// Drop parentheticals and anything after the first comma
fn strip_qualifiers(text: &str) -> String {
    let without_parens = PARENTHETICAL.replace_all(text, " ");
    let head = without_parens.split(',').next().unwrap_or("");
    head.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Best-effort lookup used for bulk linking
///
/// # Examples
///
/// ```rust
/// use pantry_pilot::resolver::{find_match_loose, IngredientId, KnownIngredient};
///
/// let known = vec![KnownIngredient::new(IngredientId::new("7"), "tomatoes")];
/// assert_eq!(find_match_loose("Tomatoes (ripe), diced", &known), Some(IngredientId::new("7")));
/// assert_eq!(find_match_loose("cherry tomatoes", &known), Some(IngredientId::new("7")));
/// ```
pub fn find_match_loose(mention: &str, known: &[KnownIngredient]) -> Option<IngredientId> {
    if let Some(id) = find_match(mention, known) {
        return Some(id);
    }

    let stripped = strip_qualifiers(mention);
    if let Some(id) = find_match(&stripped, known) {
        trace!(mention = %mention, stripped = %stripped, "Matched after stripping qualifiers");
        return Some(id);
    }

    for alternative in OR_SEPARATOR.split(&stripped) {
        if let Some(id) = find_match(alternative, known) {
            trace!(mention = %mention, alternative = %alternative, "Matched alternative");
            return Some(id);
        }
    }

    // Containment either way; prefer the most specific (longest) known name
    let needle = normalize_name(&stripped);
    if needle.is_empty() {
        return None;
    }
    known
        .iter()
        .filter(|k| {
            let name = normalize_name(&k.normalized_name);
            !name.is_empty() && (needle.contains(&name) || name.contains(&needle))
        })
        .max_by_key(|k| k.normalized_name.len())
        .map(|k| {
            debug!(mention = %mention, matched = %k.name, "Matched by containment");
            k.id.clone()
        })
}

/// Case-insensitive substring search over names and aliases
pub fn search<'a>(query: &str, known: &'a [KnownIngredient]) -> Vec<&'a KnownIngredient> {
    let normalized = normalize_name(query);
    if normalized.is_empty() {
        return Vec::new();
    }
    known
        .iter()
        .filter(|k| {
            k.normalized_name.contains(&normalized)
                || k.aliases.iter().any(|a| a.to_lowercase().contains(&normalized))
        })
        .collect()
}

/// Attach library references to every unlinked ingredient in a recipe
///
/// Ingredients that already carry an id are left untouched.
pub fn link_recipe(
    recipe: &mut ParsedRecipe,
    known: &[KnownIngredient],
    mode: MatchMode,
) -> LinkReport {
    let mut report = LinkReport::default();

    for ingredient in recipe
        .ingredients
        .iter_mut()
        .filter(|i| i.ingredient_id.is_none())
    {
        let found = match mode {
            MatchMode::Strict => find_match(&ingredient.original_text, known),
            MatchMode::Loose => find_match_loose(&ingredient.original_text, known),
        };
        match found {
            Some(id) => {
                trace!(ingredient = %ingredient.original_text, id = %id, "Linked ingredient");
                ingredient.ingredient_id = Some(id);
                report.linked += 1;
            }
            None => report.unmatched.push(ingredient.original_text.clone()),
        }
    }

    crate::observability::record_resolution_metrics(
        mode.label(),
        report.linked,
        report.unmatched.len(),
    );
    info!(
        mode = mode.label(),
        linked = report.linked,
        unmatched = report.unmatched.len(),
        "Linked recipe ingredients"
    );
    report
}
