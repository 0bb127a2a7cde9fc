//! # Recipe Markup Parsing
//!
//! Line-oriented parser for recipes written in inline markup, where amounts
//! live inside the prose:
//!
//! ```text
//! ---
//! title: Pasta
//! servings: 2
//! ---
//!
//! -- a comment
//! Boil @pasta{400%g} in a #large pot{} for ~{10%minutes}.
//! Season with @salt and @black pepper{1%tsp}.
//! ```
//!
//! ## Line classification
//!
//! Each trimmed line is, in priority order:
//! 1. a front matter delimiter (`---`, first two occurrences only)
//! 2. blank, skipped
//! 3. a comment (`--`), skipped
//! 4. a metadata directive (`>> key: value`)
//! 5. a heading (`#`), whose text becomes the title if none is set yet
//! 6. a prose step, tokenized into text and annotations
//!
//! ## Annotations
//!
//! | Marker | Braced form | Shorthand |
//! |--------|-------------|-----------|
//! | `@` ingredient | `@olive oil{2%tbsp}` | `@salt` |
//! | `#` cookware   | `#large pot{}`       | `#pan`  |
//! | `~` timer      | `~{10%minutes}`, `~rest{5%min}` | `~rest` |
//!
//! Multi-word names need braces. Shorthand names end at whitespace,
//! punctuation, another marker or a brace. A braced name cannot span
//! sentence punctuation either, so `@salt. Stir {x}` is the shorthand `salt`.
//! A backslash before a marker makes it literal, and a marker glued to a
//! preceding letter or digit (as in an e-mail address) is plain text.
//!
//! Parsing never fails. Malformed annotations fall back to plain text and
//! unparseable quantities become `None`.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, trace, warn};

use crate::config::{DuplicatePolicy, RecipeConfig};
use crate::quantity::parse_quantity;
use crate::resolver::IngredientId;
use crate::units::{format_quantity, normalize_unit};

lazy_static! {
    static ref METADATA_ENTRY: Regex =
        Regex::new(r"^([^:]+?)\s*:\s*(.*?)\s*$").expect("Invalid metadata entry pattern");
    static ref LEADING_INTEGER: Regex =
        Regex::new(r"^(\d+)").expect("Invalid leading integer pattern");
}

const FRONT_MATTER_DELIMITER: &str = "---";
const COMMENT_MARKER: &str = "--";
const DIRECTIVE_MARKER: &str = ">>";
const SHORTHAND_TERMINATORS: &[char] = &['.', ',', ';', ':', '!', '?'];

/// An ingredient mention extracted from a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedIngredient {
    /// The name exactly as written, trimmed
    pub original_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Inventory entry this mention was linked to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredient_id: Option<IngredientId>,
}

impl ParsedIngredient {
    pub fn new(
        original_text: impl Into<String>,
        quantity: Option<f64>,
        unit: Option<String>,
    ) -> Self {
        Self {
            original_text: original_text.into(),
            quantity,
            unit,
            ingredient_id: None,
        }
    }

    /// Case-insensitive, trimmed name used for de-duplication
    pub fn dedup_key(&self) -> String {
        self.original_text.trim().to_lowercase()
    }
}

/// Structured result of parsing one recipe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRecipe {
    /// Empty when the source declares no title
    pub title: String,
    /// Unique by case-insensitive name, in first-mention order
    pub ingredients: Vec<ParsedIngredient>,
    /// Cleaned step text in authored order
    pub steps: Vec<String>,
    /// Distinct cookware names in first-mention order
    #[serde(default)]
    pub cookware: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Every metadata key (lower-cased) with its first value
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl ParsedRecipe {
    /// Title, or the given fallback when the source declared none
    pub fn title_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.title.trim().is_empty() {
            fallback
        } else {
            &self.title
        }
    }
}

/// One piece of a tokenized prose line
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Text(String),
    Ingredient {
        name: String,
        quantity: Option<f64>,
        unit: Option<String>,
    },
    /// `@./other-recipe{}`: points at another recipe, not an ingredient
    StepReference { path: String },
    Cookware { name: String },
    Timer {
        name: Option<String>,
        quantity: Option<f64>,
        unit: Option<String>,
        display: String,
    },
}

impl Token {
    /// Text shown in the cleaned step for this token
    pub fn display_text(&self) -> &str {
        match self {
            Token::Text(text) => text,
            Token::Ingredient { name, .. } => name,
            Token::StepReference { path } => path.strip_prefix("./").unwrap_or(path),
            Token::Cookware { name } => name,
            Token::Timer { display, .. } => display,
        }
    }
}

fn is_marker(c: char) -> bool {
    matches!(c, '@' | '#' | '~')
}

fn is_step_reference(name: &str) -> bool {
    name.starts_with("./") || name.starts_with("../")
}

/// Split a `quantity%unit` specifier
fn parse_specifier(specifier: &str) -> (Option<f64>, Option<String>) {
    let specifier = specifier.trim();
    if specifier.is_empty() {
        return (None, None);
    }

    match specifier.split_once('%') {
        Some((quantity, unit)) => {
            let unit = unit.trim();
            (
                parse_quantity(quantity),
                (!unit.is_empty()).then(|| unit.to_string()),
            )
        }
        None => (parse_quantity(specifier), None),
    }
}

/// Timer display: the specifier with `%` rendered as a space
fn render_timer(specifier: &str) -> String {
    match specifier.split_once('%') {
        Some((quantity, unit)) => format!("{} {}", quantity.trim(), unit.trim())
            .trim()
            .to_string(),
        None => specifier.trim().to_string(),
    }
}

/// Find `name{specifier}` at the start of `rest`
///
/// Returns the raw name, the specifier and the number of bytes consumed.
/// Names other than step references stop at sentence punctuation.
fn scan_braced(rest: &str) -> Option<(&str, &str, usize)> {
    let stop = rest.find(|c: char| c == '{' || c == '}' || is_marker(c))?;
    if !rest[stop..].starts_with('{') {
        return None;
    }

    let name = &rest[..stop];
    if !is_step_reference(name) && name.contains(SHORTHAND_TERMINATORS) {
        return None;
    }

    let Some(close) = rest[stop + 1..].find('}') else {
        warn!(annotation = %rest, "Unterminated specifier, treating as shorthand");
        return None;
    };

    let specifier_start = stop + 1;
    let specifier_end = specifier_start + close;
    Some((name, &rest[specifier_start..specifier_end], specifier_end + 1))
}

/// Byte length of a shorthand name at the start of `rest`
fn shorthand_len(rest: &str) -> usize {
    let reference = is_step_reference(rest);
    let mut end = 0;

    for (idx, c) in rest.char_indices() {
        let allowed = c.is_alphanumeric()
            || c == '_'
            || c == '-'
            || c == '\''
            || (reference && (c == '/' || c == '.'));
        if !allowed || (!reference && SHORTHAND_TERMINATORS.contains(&c)) {
            break;
        }
        end = idx + c.len_utf8();
    }

    if reference {
        // A sentence-ending period is not part of the path
        while end > 2 && rest[..end].ends_with('.') {
            end -= 1;
        }
    }
    end
}

fn build_token(marker: char, raw_name: &str, specifier: Option<&str>) -> Option<Token> {
    let name = raw_name.trim();

    match marker {
        '@' if !name.is_empty() => {
            if is_step_reference(name) {
                return Some(Token::StepReference {
                    path: name.to_string(),
                });
            }
            let (quantity, unit) = specifier.map(parse_specifier).unwrap_or((None, None));
            Some(Token::Ingredient {
                name: name.to_string(),
                quantity,
                unit,
            })
        }
        '#' if !name.is_empty() => Some(Token::Cookware {
            name: name.to_string(),
        }),
        '~' => match specifier {
            Some(specifier) => {
                let (quantity, unit) = parse_specifier(specifier);
                let mut display = render_timer(specifier);
                if display.is_empty() {
                    display = name.to_string();
                }
                Some(Token::Timer {
                    name: (!name.is_empty()).then(|| name.to_string()),
                    quantity,
                    unit,
                    display,
                })
            }
            None if !name.is_empty() => Some(Token::Timer {
                name: Some(name.to_string()),
                quantity: None,
                unit: None,
                display: name.to_string(),
            }),
            None => None,
        },
        _ => None,
    }
}

/// Try to read an annotation right after its marker
fn scan_annotation(marker: char, rest: &str) -> Option<(Token, usize)> {
    let first = rest.chars().next()?;
    if first.is_whitespace() {
        return None;
    }

    if let Some((name, specifier, consumed)) = scan_braced(rest) {
        if let Some(token) = build_token(marker, name, Some(specifier)) {
            return Some((token, consumed));
        }
    }

    let consumed = shorthand_len(rest);
    if consumed == 0 {
        return None;
    }
    build_token(marker, &rest[..consumed], None).map(|token| (token, consumed))
}

/// Split one prose line into text and annotation tokens
///
/// # Examples
///
/// ```rust
/// use pantry_pilot::markup::{tokenize_line, Token};
///
/// let tokens = tokenize_line("Add @salt{1%tsp}.");
/// assert_eq!(tokens[0], Token::Text("Add ".to_string()));
/// assert_eq!(
///     tokens[1],
///     Token::Ingredient {
///         name: "salt".to_string(),
///         quantity: Some(1.0),
///         unit: Some("tsp".to_string()),
///     }
/// );
/// assert_eq!(tokens[2], Token::Text(".".to_string()));
/// ```
pub fn tokenize_line(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut pos = 0;

    while let Some(ch) = line[pos..].chars().next() {
        let ch_len = ch.len_utf8();

        if ch == '\\' {
            if let Some(next) = line[pos + ch_len..].chars().next().filter(|c| is_marker(*c)) {
                text.push(next);
                pos += ch_len + next.len_utf8();
                continue;
            }
        }

        let glued = line[..pos]
            .chars()
            .next_back()
            .is_some_and(|prev| prev.is_alphanumeric());

        if is_marker(ch) && !glued {
            if let Some((token, consumed)) = scan_annotation(ch, &line[pos + ch_len..]) {
                trace!(token = ?token, "Found annotation");
                if !text.is_empty() {
                    tokens.push(Token::Text(std::mem::take(&mut text)));
                }
                tokens.push(token);
                pos += ch_len + consumed;
                continue;
            }
        }

        text.push(ch);
        pos += ch_len;
    }

    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    tokens
}

/// Render a parsed ingredient as a one-line shopping-list style string
///
/// # Examples
///
/// ```rust
/// use pantry_pilot::markup::{ingredient_to_text, ParsedIngredient};
///
/// let flour = ParsedIngredient::new("flour", Some(1.5), Some("cup".to_string()));
/// assert_eq!(ingredient_to_text(&flour), "1½ cup flour");
/// ```
pub fn ingredient_to_text(ingredient: &ParsedIngredient) -> String {
    match (ingredient.quantity, ingredient.unit.as_deref()) {
        (Some(quantity), Some(unit)) => format!(
            "{} {} {}",
            format_quantity(quantity),
            unit,
            ingredient.original_text
        ),
        (Some(quantity), None) => {
            format!("{} {}", format_quantity(quantity), ingredient.original_text)
        }
        (None, Some(unit)) => format!("{} {}", unit, ingredient.original_text),
        (None, None) => ingredient.original_text.clone(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Normal,
    InFrontMatter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TitleSource {
    Unset,
    FrontMatter,
    Body,
}

struct RecipeParser<'a> {
    config: &'a RecipeConfig,
    state: ParserState,
    front_matter_closed: bool,
    title_source: TitleSource,
    recipe: ParsedRecipe,
    ingredient_index: HashMap<String, usize>,
    cookware_seen: HashSet<String>,
}

impl<'a> RecipeParser<'a> {
    fn new(config: &'a RecipeConfig) -> Self {
        Self {
            config,
            state: ParserState::Normal,
            front_matter_closed: false,
            title_source: TitleSource::Unset,
            recipe: ParsedRecipe::default(),
            ingredient_index: HashMap::new(),
            cookware_seen: HashSet::new(),
        }
    }

    fn parse_line(&mut self, line_number: usize, line: &str) {
        let trimmed = line.trim();

        if trimmed == FRONT_MATTER_DELIMITER && !self.front_matter_closed {
            self.state = match self.state {
                ParserState::Normal => ParserState::InFrontMatter,
                ParserState::InFrontMatter => {
                    self.front_matter_closed = true;
                    ParserState::Normal
                }
            };
            trace!(line_number, state = ?self.state, "Front matter delimiter");
            return;
        }

        if self.state == ParserState::InFrontMatter {
            if let Some(caps) = METADATA_ENTRY.captures(trimmed) {
                self.record_metadata(&caps[1], &caps[2], TitleSource::FrontMatter);
            }
            return;
        }

        if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER) {
            return;
        }

        if let Some(directive) = trimmed.strip_prefix(DIRECTIVE_MARKER) {
            match METADATA_ENTRY.captures(directive.trim()) {
                Some(caps) => self.record_metadata(&caps[1], &caps[2], TitleSource::Body),
                None => debug!(line_number, directive = %trimmed, "Skipping malformed directive"),
            }
            return;
        }

        if trimmed.starts_with('#') {
            let heading = trimmed.trim_start_matches('#').trim();
            if !heading.is_empty() {
                self.set_title(heading, TitleSource::Body);
            }
            return;
        }

        self.parse_step(line_number, trimmed);
    }

    fn parse_step(&mut self, line_number: usize, line: &str) {
        let tokens = tokenize_line(line);

        for token in &tokens {
            match token {
                Token::Ingredient {
                    name,
                    quantity,
                    unit,
                } => self.record_ingredient(name, *quantity, unit.clone()),
                Token::Cookware { name } => {
                    if self.cookware_seen.insert(name.to_lowercase()) {
                        self.recipe.cookware.push(name.clone());
                    }
                }
                Token::StepReference { path } => {
                    trace!(line_number, reference = %path, "Skipping step reference");
                }
                Token::Text(_) | Token::Timer { .. } => {}
            }
        }

        let step: String = tokens.iter().map(Token::display_text).collect();
        let step = step.trim();
        if !step.is_empty() {
            self.recipe.steps.push(step.to_string());
        }
    }

    fn record_ingredient(&mut self, name: &str, quantity: Option<f64>, unit: Option<String>) {
        let key = name.trim().to_lowercase();

        let index = match self.ingredient_index.get(&key).copied() {
            Some(index) => index,
            None => {
                self.ingredient_index
                    .insert(key, self.recipe.ingredients.len());
                self.recipe
                    .ingredients
                    .push(ParsedIngredient::new(name.trim(), quantity, unit));
                return;
            }
        };

        if self.config.duplicate_policy == DuplicatePolicy::FirstWins {
            trace!(ingredient = %name, "Dropping duplicate mention");
            return;
        }

        let existing = &mut self.recipe.ingredients[index];
        let same_unit = match (existing.unit.as_deref(), unit.as_deref()) {
            (None, None) => true,
            (Some(a), Some(b)) => normalize_unit(a) == normalize_unit(b),
            _ => false,
        };

        match (existing.quantity, quantity) {
            (Some(total), Some(extra)) if same_unit => {
                existing.quantity = Some(total + extra);
                debug!(ingredient = %name, total = total + extra, "Merged duplicate mention");
            }
            _ => trace!(ingredient = %name, "Dropping duplicate mention with differing unit"),
        }
    }

    fn record_metadata(&mut self, key: &str, value: &str, source: TitleSource) {
        let key = key.trim().to_lowercase();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            return;
        }

        self.recipe
            .metadata
            .entry(key.clone())
            .or_insert_with(|| value.to_string());

        match key.as_str() {
            "title" => self.set_title(value, source),
            "servings" => {
                let servings = LEADING_INTEGER
                    .captures(value)
                    .and_then(|caps| caps[1].parse::<u32>().ok())
                    .filter(|s| *s > 0);
                match servings {
                    Some(s) if self.recipe.servings.is_none() => self.recipe.servings = Some(s),
                    Some(_) => {}
                    None => debug!(value = %value, "Ignoring unparseable servings"),
                }
            }
            "source" if self.recipe.source.is_none() => {
                self.recipe.source = Some(value.to_string())
            }
            "image" if self.recipe.image.is_none() => self.recipe.image = Some(value.to_string()),
            _ => {}
        }
    }

    /// Front matter titles win; otherwise the first title seen sticks
    fn set_title(&mut self, title: &str, source: TitleSource) {
        let replace = match (self.title_source, source) {
            (TitleSource::Unset, _) => true,
            (TitleSource::Body, TitleSource::FrontMatter) => true,
            _ => false,
        };
        if replace {
            self.recipe.title = title.to_string();
            self.title_source = source;
        }
    }
}

/// Parse recipe markup with the default configuration
///
/// # Examples
///
/// ```rust
/// use pantry_pilot::markup::parse_recipe;
///
/// let recipe = parse_recipe("---\ntitle: Pasta\n---\n\nBoil @pasta{400%g} for ~{10%minutes}.");
/// assert_eq!(recipe.title, "Pasta");
/// assert_eq!(recipe.ingredients[0].original_text, "pasta");
/// assert_eq!(recipe.ingredients[0].quantity, Some(400.0));
/// assert_eq!(recipe.steps, vec!["Boil pasta for 10 minutes.".to_string()]);
/// ```
pub fn parse_recipe(text: &str) -> ParsedRecipe {
    parse_recipe_with_config(text, &RecipeConfig::default())
}

/// Parse recipe markup with an explicit configuration
pub fn parse_recipe_with_config(text: &str, config: &RecipeConfig) -> ParsedRecipe {
    let start_time = std::time::Instant::now();
    let span = crate::observability::parse_span(text.lines().next().unwrap_or(""));
    let _guard = span.enter();

    let mut parser = RecipeParser::new(config);
    let mut line_count = 0;
    for (line_number, line) in text.lines().enumerate() {
        parser.parse_line(line_number, line);
        line_count += 1;
    }

    if parser.state == ParserState::InFrontMatter {
        warn!("Front matter was never closed; remaining lines were treated as metadata");
    }

    let recipe = parser.recipe;
    crate::observability::record_parse_metrics(
        start_time.elapsed(),
        line_count,
        recipe.ingredients.len(),
        recipe.steps.len(),
    );
    debug!(
        title = %recipe.title,
        ingredients = recipe.ingredients.len(),
        steps = recipe.steps.len(),
        "Parsed recipe"
    );
    recipe
}
