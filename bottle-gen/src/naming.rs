//! # Naming Engine
//!
//! Turns catalog identifiers (snake_case, usually plural, usually Portuguese) into class and
//! field identifiers.
//!
//! Case conversion is a plain split on `_`. Singularization runs three fixed tables in
//! priority order: uncountable words, irregular plurals, then suffix rules from the most
//! specific to the most generic. The first hit wins: `ões` must be caught before the generic
//! `s` rule ever sees the word.

use std::collections::HashMap;

use heck::ToKebabCase;
use once_cell::sync::Lazy;
use regex::Regex;

// ============================================================================
// Rule Tables
// ============================================================================

/// Words that read the same in singular and plural.
pub const UNCOUNTABLE: &[&str] = &["tórax", "tênis", "ônibus", "lápis", "fênix", "óculos", "vírus", "status", "atlas"];

/// Irregular `(plural, singular)` pairs, matched case-insensitively against the whole word.
pub const IRREGULAR: &[(&str, &str)] = &[
    ("países", "país"),
    ("cães", "cão"),
    ("pães", "pão"),
    ("mãos", "mão"),
    ("alemães", "alemão"),
    ("cidadãos", "cidadão"),
    ("homens", "homem"),
    ("mulheres", "mulher"),
    ("status", "status"),
    ("males", "mal"),
];

/// Singular suffix rules as `(pattern, replacement)`, most specific first.
pub const SINGULAR_RULES: &[(&str, &str)] = &[
    (r"(japon|escoc|ingl|dinamarqu|fregu|portugu)eses$", "${1}ês"),
    (r"ões$", "ão"),
    (r"ãos$", "ão"),
    (r"ães$", "ão"),
    (r"oes$", "ao"),
    (r"ais$", "al"),
    (r"éis$", "el"),
    (r"óis$", "ol"),
    (r"uis$", "ul"),
    (r"([rz])es$", "${1}"),
    (r"ns$", "m"),
    (r"ases$", "ás"),
    (r"is$", "il"),
    (r"([^ê])s$", "${1}"),
];

/// Plural suffix rules as `(pattern, replacement)`, most specific first.
pub const PLURAL_RULES: &[(&str, &str)] = &[
    (r"(japon|escoc|ingl|dinamarqu|fregu|portugu)ês$", "${1}eses"),
    (r"ão$", "ões"),
    (r"ao$", "oes"),
    (r"al$", "ais"),
    (r"el$", "éis"),
    (r"ol$", "óis"),
    (r"ul$", "uis"),
    (r"il$", "is"),
    (r"([rz])$", "${1}es"),
    (r"m$", "ns"),
    (r"ás$", "ases"),
    (r"([^sx])$", "${1}s"),
];

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

fn compile(rules: &[(&str, &'static str)]) -> Vec<Rule> {
    rules
        .iter()
        .filter_map(|(pattern, replacement)| {
            // Invalid patterns are logged and skipped.
            Regex::new(&format!("(?i){pattern}"))
                .map(|pattern| Rule { pattern, replacement: *replacement })
                .map_err(|e| log::error!("invalid inflection rule {pattern}: {e}"))
                .ok()
        })
        .collect()
}

static SINGULAR: Lazy<Vec<Rule>> = Lazy::new(|| compile(SINGULAR_RULES));
static PLURAL: Lazy<Vec<Rule>> = Lazy::new(|| compile(PLURAL_RULES));

static SINGULAR_TO_PLURAL: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| IRREGULAR.iter().map(|(plural, singular)| (*singular, *plural)).collect());

// ============================================================================
// Case Conversion
// ============================================================================

/// Converts `snake_case` into `PascalCase`.
///
/// Each non-empty segment gets an upper-cased first character and a lower-cased remainder.
/// Empty input is returned unchanged.
///
/// ```rust
/// use bottle_gen::naming::to_pascal_case;
///
/// assert_eq!(to_pascal_case("user_account"), "UserAccount");
/// assert_eq!(to_pascal_case("product___category"), "ProductCategory");
/// ```
pub fn to_pascal_case(identifier: &str) -> String {
    identifier.split('_').map(capitalize_segment).collect()
}

/// Converts `snake_case` into `camelCase`.
///
/// The first segment is fully lower-cased, the following ones are Pascal-cased.
///
/// ```rust
/// use bottle_gen::naming::to_camel_case;
///
/// assert_eq!(to_camel_case("papel_empresa_id"), "papelEmpresaId");
/// ```
pub fn to_camel_case(identifier: &str) -> String {
    let mut segments = identifier.split('_');
    let mut result = segments.next().map(str::to_lowercase).unwrap_or_default();
    for segment in segments {
        result.push_str(&capitalize_segment(segment));
    }
    result
}

fn capitalize_segment(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}

/// Lower-cases the first character only: `PapelEmpresa` → `papelEmpresa`.
pub fn decapitalize(identifier: &str) -> String {
    let mut chars = identifier.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Upper-cases the first character only: `papelEmpresaId` → `PapelEmpresaId`.
pub fn capitalize(identifier: &str) -> String {
    let mut chars = identifier.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Removes the first matching identifier suffix (compared case-insensitively).
///
/// A column made only of the suffix (`_id` itself) is returned unchanged.
pub fn strip_id_suffix<'a>(column: &'a str, suffixes: &[String]) -> &'a str {
    for suffix in suffixes {
        if column.len() > suffix.len() && column.is_char_boundary(column.len() - suffix.len()) {
            let (head, tail) = column.split_at(column.len() - suffix.len());
            if tail.eq_ignore_ascii_case(suffix) {
                return head;
            }
        }
    }
    column
}

/// Collection path segment for a class: `PapelEmpresa` → `papel-empresas`.
pub fn resource_segment(class_name: &str) -> String {
    pluralize(class_name).to_kebab_case()
}

// ============================================================================
// Inflection
// ============================================================================

/// Singularizes a (Portuguese) word.
///
/// Priority order, first match wins:
/// 1. uncountable words are returned unchanged;
/// 2. irregular plurals are replaced, adapting the replacement to the input's case;
/// 3. the first matching suffix rule is applied once;
/// 4. otherwise the word is returned unchanged.
///
/// ```rust
/// use bottle_gen::naming::singularize;
///
/// assert_eq!(singularize("lotações"), "lotação");
/// assert_eq!(singularize("HOMENS"), "HOMEM");
/// assert_eq!(singularize("ônibus"), "ônibus");
/// ```
pub fn singularize(word: &str) -> String {
    if word.trim().is_empty() {
        return word.to_string();
    }

    let lower = word.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }

    if let Some((_, singular)) = IRREGULAR.iter().find(|(plural, _)| *plural == lower) {
        return apply_same_case(word, singular);
    }

    apply_first_rule(word, &SINGULAR)
}

/// Pluralizes a (Portuguese) word; the mirror image of [`singularize`].
///
/// Irregular words are looked up in reverse, then the first matching suffix rule applies.
/// The last rule is the regular case (append `s`); words already ending in `s` or `x` fall
/// through every rule and come back unchanged.
pub fn pluralize(word: &str) -> String {
    if word.trim().is_empty() {
        return word.to_string();
    }

    let lower = word.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }

    if let Some(plural) = SINGULAR_TO_PLURAL.get(lower.as_str()) {
        return apply_same_case(word, plural);
    }

    apply_first_rule(word, &PLURAL)
}

fn apply_first_rule(word: &str, rules: &[Rule]) -> String {
    for rule in rules {
        if rule.pattern.is_match(word) {
            let replaced = rule.pattern.replace(word, rule.replacement);
            return apply_same_case(word, &replaced);
        }
    }
    word.to_string()
}

/// Adapts `result` to the case pattern of `original`: all upper-case stays all upper-case,
/// a capitalized word stays capitalized, anything else is left as produced.
fn apply_same_case(original: &str, result: &str) -> String {
    if original == original.to_uppercase() {
        return result.to_uppercase();
    }
    if original.chars().next().is_some_and(char::is_uppercase) {
        return capitalize(result);
    }
    result.to_string()
}
