//! Naming conventions shared by schemas, relationships and the email registry.
//!
//! # Responsibility
//! - Derive the external `email_name` from a declared type name.
//! - Compose the conventional type name back from an `email_name`.
//! - Derive relationship lookup keys from relationship names.
//!
//! # Invariants
//! - Every function here is pure and deterministic.
//! - `email_type_name_for(email_name_for(Some(t))) == t` for any `Notifier::*Email`
//!   type name whose segments camelize back to themselves.

use once_cell::sync::Lazy;
use regex::Regex;

/// Namespace every registered email type is expected to live in.
pub const EMAIL_NAMESPACE: &str = "notifier";
/// Suffix marking a declared type as an email type.
pub const EMAIL_SUFFIX: &str = "_email";
/// Label used when a schema has no declared type name.
pub const GENERIC_EMAIL_LABEL: &str = "Generic";

static ACRONYM_BOUNDARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z\d]+)([A-Z][a-z])").expect("valid acronym boundary regex"));
static WORD_BOUNDARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("valid word boundary regex"));

/// Returns the last `::` segment of a namespaced type name.
pub fn demodulize(type_name: &str) -> &str {
    match type_name.rfind("::") {
        Some(index) => &type_name[index + 2..],
        None => type_name,
    }
}

/// Converts `CamelCase::Path` into `camel_case/path`.
pub fn underscore(type_name: &str) -> String {
    let word = type_name.replace("::", "/");
    let word = ACRONYM_BOUNDARY_RE.replace_all(&word, "${1}_${2}");
    let word = WORD_BOUNDARY_RE.replace_all(&word, "${1}_${2}");
    word.replace('-', "_").to_lowercase()
}

/// Converts `snake_case/path` into `SnakeCase::Path`.
pub fn camelize(term: &str) -> String {
    term.split('/')
        .map(|segment| segment.split('_').map(capitalize).collect::<String>())
        .collect::<Vec<_>>()
        .join("::")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Derives the external email name for a declared type name.
///
/// `Notifier::WelcomeEmail` -> `welcome`; anonymous schemas map to `generic`.
pub fn email_name_for(type_name: Option<&str>) -> String {
    let simple = demodulize(type_name.unwrap_or(GENERIC_EMAIL_LABEL));
    let underscored = underscore(simple);
    match underscored.strip_suffix(EMAIL_SUFFIX) {
        Some(stripped) => stripped.to_string(),
        None => underscored,
    }
}

/// Composes the conventional declared type name for an email name.
///
/// `welcome` -> `Notifier::WelcomeEmail`.
pub fn email_type_name_for(email_name: &str) -> String {
    camelize(&format!("{EMAIL_NAMESPACE}/{email_name}{EMAIL_SUFFIX}"))
}

/// Record type looked up for a relationship, e.g. `account_owner` -> `AccountOwner`.
pub fn relationship_type_name(relationship: &str) -> String {
    camelize(relationship)
}

/// Required id key backing a relationship, e.g. `user` -> `user_id`.
pub fn relationship_id_key(relationship: &str) -> String {
    format!("{relationship}_id")
}
