//! Attributes

use std::fmt::{Display, Formatter, Result as FmtResult};

/// A named, multi-valued product dimension (e.g. "Color").
///
/// Only attributes with `variation` set and a non-empty option list take part
/// in matrix generation; the rest are descriptive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name
    pub name: String,

    /// Ordered option values
    pub options: Vec<String>,

    /// Whether the attribute generates variations
    pub variation: bool,

    /// Whether the attribute is shown on the product page
    pub visible: bool,
}

impl Attribute {
    /// Create a variation-generating, visible attribute from string slices.
    pub fn variation(name: &str, options: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            options: options.iter().map(ToString::to_string).collect(),
            variation: true,
            visible: true,
        }
    }
}

/// One chosen option of one attribute, e.g. `Color: Red`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePair {
    /// Attribute name
    pub name: String,

    /// Chosen option value
    pub option: String,
}

impl AttributePair {
    /// Create a pair from string slices.
    pub fn new(name: &str, option: &str) -> Self {
        Self {
            name: name.to_string(),
            option: option.to_string(),
        }
    }
}

/// Canonical string identity for one combination of attribute values.
///
/// Built by sorting pairs by attribute name (lexicographic, case-sensitive),
/// rendering each as `name:option` and joining with `|`. Two pair-sets map to
/// the same key iff they contain the same pairs, regardless of input order.
///
/// Pair-sets that repeat an attribute name are malformed input; the builder
/// keeps all occurrences in stable-sorted order rather than validating them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeKey(String);

impl AttributeKey {
    /// Build the canonical key for a set of pairs.
    #[must_use]
    pub fn new(pairs: &[AttributePair]) -> Self {
        let mut sorted: Vec<&AttributePair> = pairs.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));

        let joined = sorted
            .iter()
            .map(|pair| format!("{}:{}", pair.name, pair.option))
            .collect::<Vec<_>>()
            .join("|");

        Self(joined)
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AttributeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

/// Filter an attribute list down to the ones that generate variations.
pub fn variation_attributes(attributes: &[Attribute]) -> Vec<&Attribute> {
    attributes
        .iter()
        .filter(|attribute| attribute.variation && !attribute.options.is_empty())
        .collect()
}
