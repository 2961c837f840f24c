//! Attribute value suggestions
//!
//! Booleans and enumerations have a closed set of legal values. Anything else
//! is left unconstrained unless a [`ValueFactory`] has an opinion about it.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::bindings::ValueType;

/// Ordered set of suggested attribute values
pub type ValueSet = IndexSet<String>;

/// Values suggested for every boolean attribute
pub const BOOLEAN_VALUES: [&str; 2] = ["true", "false"];

/// Supplies values for attributes that are neither boolean nor enumerated
pub trait ValueFactory: Send + Sync {
    /// Suggested values for `attribute` of type `value_type`, or `None` for no opinion.
    ///
    /// The returned order is kept in the generated hints.
    fn values_for(&self, attribute: &str, value_type: &ValueType) -> Option<ValueSet>;
}

impl<F> ValueFactory for F
where
    F: Fn(&str, &ValueType) -> Option<ValueSet> + Send + Sync,
{
    fn values_for(&self, attribute: &str, value_type: &ValueType) -> Option<ValueSet> {
        self(attribute, value_type)
    }
}

/// A value factory keyed on attribute name alone
#[derive(Debug, Clone, Default)]
pub struct ValueTable {
    values: IndexMap<String, ValueSet>,
}

impl ValueTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Suggest `values` for every attribute called `attribute`
    pub fn insert<I, S>(&mut self, attribute: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values
            .insert(attribute.into(), values.into_iter().map(Into::into).collect());
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with<I, S>(mut self, attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(attribute, values);
        self
    }

    /// Number of attributes with suggestions
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ValueFactory for ValueTable {
    fn values_for(&self, attribute: &str, _value_type: &ValueType) -> Option<ValueSet> {
        self.values.get(attribute).cloned()
    }
}

/// Classification of an attribute's value type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueClass {
    /// `true` / `false`
    Boolean,
    /// Enumeration members in declaration order
    Enumerated(Vec<String>),
    /// Values supplied by the custom factory
    Custom(ValueSet),
    /// No suggestions
    Unconstrained,
}

impl ValueClass {
    /// The suggested values, `None` meaning unconstrained
    pub fn into_values(self) -> Option<ValueSet> {
        match self {
            ValueClass::Boolean => Some(BOOLEAN_VALUES.iter().map(|v| v.to_string()).collect()),
            ValueClass::Enumerated(variants) => Some(variants.into_iter().collect()),
            ValueClass::Custom(values) => Some(values),
            ValueClass::Unconstrained => None,
        }
    }
}

/// Computes the legal value set of attributes
#[derive(Clone, Default)]
pub struct ValueEnumerator {
    factory: Option<Arc<dyn ValueFactory>>,
}

impl ValueEnumerator {
    /// Enumerator without a custom factory
    pub fn new() -> Self {
        Self::default()
    }

    /// Consult `factory` for types that are neither boolean nor enumerated
    pub fn with_factory(mut self, factory: Arc<dyn ValueFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Whether a custom factory is configured
    pub fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// Classify `value_type`: boolean first, then enumeration, then the factory
    pub fn classify(&self, attribute: &str, value_type: &ValueType) -> ValueClass {
        match value_type {
            ValueType::Boolean => ValueClass::Boolean,
            ValueType::Enumeration(e) => ValueClass::Enumerated(e.variants.clone()),
            other => match self.factory {
                Some(ref factory) => factory
                    .values_for(attribute, other)
                    .map(ValueClass::Custom)
                    .unwrap_or(ValueClass::Unconstrained),
                None => ValueClass::Unconstrained,
            },
        }
    }

    /// Legal values of an attribute declared as `declared`.
    ///
    /// One container level is unwrapped first. A container whose element type
    /// is erased yields an empty set rather than "unconstrained".
    pub fn values_for(&self, attribute: &str, declared: &ValueType) -> Option<ValueSet> {
        match declared.item_type() {
            Some(item) => self.classify(attribute, item).into_values(),
            None => Some(ValueSet::new()),
        }
    }
}

impl std::fmt::Debug for ValueEnumerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueEnumerator")
            .field("has_factory", &self.has_factory())
            .finish()
    }
}
