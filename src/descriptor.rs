//! Tag descriptors
//!
//! One descriptor per addressable tag name: the attributes it accepts, the
//! tags that may be nested under it and the tags that may stand in for it.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::values::ValueSet;

/// Grammar of one tag
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TagDescriptor {
    /// Tag name; `None` for types that cannot appear as an element themselves
    #[serde(skip)]
    tag: Option<String>,
    /// Attribute name -> legal values (`None` = unconstrained), in discovery order
    #[serde(rename = "attrs")]
    attributes: IndexMap<String, Option<ValueSet>>,
    /// Tags allowed directly beneath this one
    children: BTreeSet<String>,
    /// Tags of known subtypes, substitutable wherever this tag is accepted
    #[serde(skip)]
    overrides: BTreeSet<String>,
}

impl TagDescriptor {
    /// Create an empty descriptor
    pub fn new(tag: Option<String>) -> Self {
        Self {
            tag,
            ..Default::default()
        }
    }

    /// Copy of this descriptor's grammar under a different tag name
    pub fn clone_as(&self, tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            attributes: self.attributes.clone(),
            children: self.children.clone(),
            overrides: self.overrides.clone(),
        }
    }

    /// Tag name
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Attributes and their legal values
    pub fn attributes(&self) -> &IndexMap<String, Option<ValueSet>> {
        &self.attributes
    }

    /// Legal values of one attribute; outer `None` if the attribute is unknown
    pub fn attribute(&self, name: &str) -> Option<Option<&ValueSet>> {
        self.attributes.get(name).map(Option::as_ref)
    }

    /// Child tags, sorted
    pub fn children(&self) -> &BTreeSet<String> {
        &self.children
    }

    /// Subtype tags
    pub fn overrides(&self) -> &BTreeSet<String> {
        &self.overrides
    }

    /// Set the legal values of an attribute, replacing any earlier entry
    pub fn set_attribute(&mut self, name: impl Into<String>, values: Option<ValueSet>) {
        self.attributes.insert(name.into(), values);
    }

    /// Record a subtype tag
    pub fn add_override(&mut self, tag: impl Into<String>) {
        self.overrides.insert(tag.into());
    }

    /// Record a single child tag
    pub fn add_child_tag(&mut self, tag: impl Into<String>) {
        self.children.insert(tag.into());
    }

    /// Record `child` as nestable: its own tag (if any) and all of its overrides
    pub fn add_child(&mut self, child: &TagDescriptor) {
        self.children.extend(child.substitutes());
    }

    /// Every tag that may appear where this descriptor's type is expected
    pub fn substitutes(&self) -> Vec<String> {
        self.tag
            .iter()
            .chain(self.overrides.iter())
            .cloned()
            .collect()
    }
}
