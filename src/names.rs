//! Tag and attribute name utilities
//!
//! Derivation rules for names that the binding declarations leave implicit,
//! and validation of explicitly declared names as XML Names.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

// Simplified XML Name production (BMP letters, no combining-char ranges)
static XML_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[:A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}][:A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}\-\.0-9\u{B7}]*$",
    )
    .unwrap()
});

/// Check if a string is a valid XML Name
pub fn is_valid_name(name: &str) -> bool {
    XML_NAME.is_match(name)
}

/// Validate an XML Name and return an error if invalid
pub fn validate_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::Name(format!("Invalid XML Name: '{}'", name)))
    }
}

/// Lower-case the first character of `name`, leaving the rest untouched
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Strip the module path from a type name (`a::b::Item` or `a.b.Item` -> `Item`)
pub fn simple_name(type_name: &str) -> &str {
    let tail = type_name.rsplit("::").next().unwrap_or(type_name);
    tail.rsplit('.').next().unwrap_or(tail)
}

/// Tag used by a root element declared without an explicit name
pub fn default_tag_name(type_name: &str) -> String {
    decapitalize(simple_name(type_name))
}

/// Property name behind an accessor: `getFoo` -> `foo`, `isFoo` -> `foo`, `bar` -> `bar`
pub fn property_name(accessor: &str) -> String {
    for prefix in ["get", "is"] {
        if let Some(rest) = accessor.strip_prefix(prefix) {
            if rest.chars().next().is_some_and(|c| c.is_uppercase()) {
                return decapitalize(rest);
            }
        }
    }
    decapitalize(accessor)
}
