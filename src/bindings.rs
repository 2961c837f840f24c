//! Binding declarations
//!
//! A binding describes how one data-model type maps onto the XML vocabulary:
//! its root tag (if it can stand as an element on its own), the attributes it
//! exposes and the child elements it accepts. Generation reads bindings through
//! the [`MetadataSource`] trait; [`BindingRegistry`] is the explicit,
//! startup-time implementation of that trait.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;

use crate::error::{BindingError, Result};
use crate::names;

/// Identity of a bindable type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(String);

impl TypeRef {
    /// Create a type reference from its (possibly path-qualified) name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Full name of the type
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Name without any module path
    pub fn simple_name(&self) -> &str {
        names::simple_name(&self.0)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// An enumeration and its members in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    /// Enumeration name
    pub name: String,
    /// Member names, in declaration order
    pub variants: Vec<String>,
}

impl EnumType {
    /// Create an enumeration
    pub fn new<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }
}

/// Declared type of an attribute or child accessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    /// `true` / `false`
    Boolean,
    /// A closed set of named members
    Enumeration(EnumType),
    /// Any other primitive (`string`, `int`, `date`, ...)
    Scalar(String),
    /// Another bindable type
    Element(TypeRef),
    /// A container; `None` when the element type is erased or absent
    List(Option<Box<ValueType>>),
}

impl ValueType {
    /// Scalar of the given primitive name
    pub fn scalar(name: impl Into<String>) -> Self {
        ValueType::Scalar(name.into())
    }

    /// Reference to a bindable type
    pub fn element(ty: impl Into<TypeRef>) -> Self {
        ValueType::Element(ty.into())
    }

    /// Container of `item`
    pub fn list(item: ValueType) -> Self {
        ValueType::List(Some(Box::new(item)))
    }

    /// Container whose element type is unknown
    pub fn erased_list() -> Self {
        ValueType::List(None)
    }

    /// The value type with one container level removed.
    ///
    /// Non-container types are returned as-is; an erased container yields `None`.
    pub fn item_type(&self) -> Option<&ValueType> {
        match self {
            ValueType::List(Some(item)) => Some(item),
            ValueType::List(None) => None,
            other => Some(other),
        }
    }

    /// Short description used in diagnostics
    pub fn describe(&self) -> String {
        match self {
            ValueType::Boolean => "boolean".to_string(),
            ValueType::Enumeration(e) => format!("enum {}", e.name),
            ValueType::Scalar(name) => name.clone(),
            ValueType::Element(ty) => ty.to_string(),
            ValueType::List(Some(item)) => format!("list<{}>", item.describe()),
            ValueType::List(None) => "list<?>".to_string(),
        }
    }
}

/// Root element declaration of a type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RootElement {
    /// Explicit tag name; `None` derives it from the type name
    pub name: Option<String>,
}

/// An attribute exposed by a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeBinding {
    /// Accessor the attribute is read through (`getValue`, `isEnabled`, `value`)
    pub accessor: String,
    /// Explicit attribute name
    pub name: Option<String>,
    /// Declared value type
    pub value_type: ValueType,
}

impl AttributeBinding {
    /// Attribute named after its accessor
    pub fn new(accessor: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            accessor: accessor.into(),
            name: None,
            value_type,
        }
    }

    /// Give the attribute an explicit name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name of the attribute in documents
    pub fn xml_name(&self) -> String {
        match self.name {
            Some(ref name) => name.clone(),
            None => names::property_name(&self.accessor),
        }
    }
}

/// How a child accessor names its elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildKind {
    /// Any tagged substitute of the declared type, under its own tag
    Reference,
    /// A fixed element name, independent of the referenced type's tag
    Named(String),
}

/// A child-element accessor of a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildBinding {
    /// Accessor the child is read through
    pub accessor: String,
    /// Reference or explicitly named
    pub kind: ChildKind,
    /// Declared value type, possibly wrapped in one container level
    pub value_type: ValueType,
}

impl ChildBinding {
    /// Polymorphic reference child
    pub fn reference(accessor: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            accessor: accessor.into(),
            kind: ChildKind::Reference,
            value_type,
        }
    }

    /// Explicitly named child
    pub fn named(
        accessor: impl Into<String>,
        name: impl Into<String>,
        value_type: ValueType,
    ) -> Self {
        Self {
            accessor: accessor.into(),
            kind: ChildKind::Named(name.into()),
            value_type,
        }
    }
}

/// Everything declared on one bindable type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeBinding {
    /// The type being bound
    pub name: TypeRef,
    /// Direct supertype
    pub extends: Option<TypeRef>,
    /// Root element declaration
    pub root: Option<RootElement>,
    /// Attributes declared directly on this type
    pub attributes: Vec<AttributeBinding>,
    /// Children declared directly on this type
    pub children: Vec<ChildBinding>,
}

impl TypeBinding {
    /// Create an empty binding for `name`
    pub fn new(name: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            extends: None,
            root: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Declare the supertype
    pub fn extends(mut self, parent: impl Into<TypeRef>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    /// Declare a root element with an explicit tag
    pub fn with_root(mut self, tag: impl Into<String>) -> Self {
        self.root = Some(RootElement {
            name: Some(tag.into()),
        });
        self
    }

    /// Declare a root element whose tag derives from the type name
    pub fn with_default_root(mut self) -> Self {
        self.root = Some(RootElement::default());
        self
    }

    /// Add an attribute
    pub fn with_attribute(mut self, attribute: AttributeBinding) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Add a child accessor
    pub fn with_child(mut self, child: ChildBinding) -> Self {
        self.children.push(child);
        self
    }

    /// Tag this type is represented by, if it is a root element
    pub fn tag_name(&self) -> Option<String> {
        self.root.as_ref().map(|root| match root.name {
            Some(ref name) => name.clone(),
            None => names::default_tag_name(self.name.name()),
        })
    }
}

/// Source of binding metadata for types.
///
/// Unknown types are not an error: they have no tag, attributes or children.
pub trait MetadataSource: Send + Sync {
    /// Root tag of `ty`, if it has one
    fn tag_name(&self, ty: &TypeRef) -> Option<String>;

    /// Attributes visible on `ty`, including inherited ones
    fn attributes(&self, ty: &TypeRef) -> Vec<AttributeBinding>;

    /// Child accessors visible on `ty`, including inherited ones
    fn children(&self, ty: &TypeRef) -> Vec<ChildBinding>;

    /// Direct supertype of `ty`
    fn supertype(&self, ty: &TypeRef) -> Option<TypeRef>;

    /// Every type this source knows about
    fn known_types(&self) -> Vec<TypeRef>;
}

/// Explicitly registered bindings
#[derive(Debug, Clone, Default)]
pub struct BindingRegistry {
    bindings: IndexMap<TypeRef, TypeBinding>,
}

impl BindingRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding; a type may only be registered once.
    ///
    /// Root tags (explicit or derived), attribute names and named children
    /// must be valid XML Names.
    pub fn register(&mut self, binding: TypeBinding) -> Result<()> {
        if self.bindings.contains_key(&binding.name) {
            return Err(BindingError::new("type registered twice")
                .with_type(binding.name.name())
                .into());
        }
        Self::check_names(&binding)?;
        self.bindings.insert(binding.name.clone(), binding);
        Ok(())
    }

    fn check_names(binding: &TypeBinding) -> Result<()> {
        if let Some(tag) = binding.tag_name() {
            names::validate_name(&tag)?;
        }
        for attr in &binding.attributes {
            names::validate_name(&attr.xml_name())?;
        }
        for child in &binding.children {
            if let ChildKind::Named(ref name) = child.kind {
                names::validate_name(name)?;
            }
        }
        Ok(())
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, binding: TypeBinding) -> Result<Self> {
        self.register(binding)?;
        Ok(self)
    }

    /// Look up the binding declared for `ty`
    pub fn get(&self, ty: &TypeRef) -> Option<&TypeBinding> {
        self.bindings.get(ty)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no types are registered
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterate over bindings in registration order
    pub fn iter(&self) -> impl Iterator<Item = &TypeBinding> {
        self.bindings.values()
    }

    /// Check that every supertype and element reference names a registered type
    pub fn validate(&self) -> Result<()> {
        for binding in self.bindings.values() {
            if let Some(ref parent) = binding.extends {
                self.require(parent, binding, None)?;
            }
            for attr in &binding.attributes {
                if let Some(ValueType::Element(ty)) = attr.value_type.item_type() {
                    self.require(ty, binding, Some(attr.accessor.as_str()))?;
                }
            }
            for child in &binding.children {
                if let Some(ValueType::Element(ty)) = child.value_type.item_type() {
                    self.require(ty, binding, Some(child.accessor.as_str()))?;
                }
            }
        }
        Ok(())
    }

    fn require(&self, ty: &TypeRef, owner: &TypeBinding, accessor: Option<&str>) -> Result<()> {
        if self.bindings.contains_key(ty) {
            return Ok(());
        }
        let mut err = BindingError::new(format!("reference to unknown type '{}'", ty))
            .with_type(owner.name.name());
        if let Some(accessor) = accessor {
            err = err.with_accessor(accessor);
        }
        Err(err.into())
    }

    /// `ty` and its supertypes, most general first
    fn lineage(&self, ty: &TypeRef) -> Vec<&TypeBinding> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.bindings.get(ty);
        while let Some(binding) = current {
            if !seen.insert(&binding.name) {
                break;
            }
            chain.push(binding);
            current = binding.extends.as_ref().and_then(|p| self.bindings.get(p));
        }
        chain.reverse();
        chain
    }
}

impl MetadataSource for BindingRegistry {
    fn tag_name(&self, ty: &TypeRef) -> Option<String> {
        self.bindings.get(ty).and_then(TypeBinding::tag_name)
    }

    fn attributes(&self, ty: &TypeRef) -> Vec<AttributeBinding> {
        // Redeclared accessors replace the inherited one in place
        let mut by_accessor: IndexMap<&str, &AttributeBinding> = IndexMap::new();
        for binding in self.lineage(ty) {
            for attr in &binding.attributes {
                by_accessor.insert(attr.accessor.as_str(), attr);
            }
        }
        by_accessor.into_values().cloned().collect()
    }

    fn children(&self, ty: &TypeRef) -> Vec<ChildBinding> {
        let mut by_accessor: IndexMap<&str, &ChildBinding> = IndexMap::new();
        for binding in self.lineage(ty) {
            for child in &binding.children {
                by_accessor.insert(child.accessor.as_str(), child);
            }
        }
        by_accessor.into_values().cloned().collect()
    }

    fn supertype(&self, ty: &TypeRef) -> Option<TypeRef> {
        self.bindings.get(ty).and_then(|b| b.extends.clone())
    }

    fn known_types(&self) -> Vec<TypeRef> {
        self.bindings.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn registry() -> BindingRegistry {
        BindingRegistry::new()
            .with(
                TypeBinding::new("Base")
                    .with_attribute(AttributeBinding::new("getId", ValueType::scalar("string")))
                    .with_attribute(AttributeBinding::new("isActive", ValueType::Boolean)),
            )
            .and_then(|r| {
                r.with(
                    TypeBinding::new("model::Derived")
                        .extends("Base")
                        .with_default_root()
                        .with_attribute(
                            AttributeBinding::new("getId", ValueType::scalar("int")).named("key"),
                        )
                        .with_attribute(AttributeBinding::new(
                            "getLabel",
                            ValueType::scalar("string"),
                        )),
                )
            })
            .unwrap()
    }

    #[test]
    fn test_tag_names() {
        let reg = registry();
        assert_eq!(reg.tag_name(&"Base".into()), None);
        assert_eq!(reg.tag_name(&"model::Derived".into()), Some("derived".to_string()));
        assert_eq!(reg.tag_name(&"Missing".into()), None);

        let explicit = TypeBinding::new("Thing").with_root("thing-el");
        assert_eq!(explicit.tag_name(), Some("thing-el".to_string()));
    }

    #[test]
    fn test_inherited_attributes() {
        let reg = registry();
        let names: Vec<String> = reg
            .attributes(&"model::Derived".into())
            .iter()
            .map(AttributeBinding::xml_name)
            .collect();
        assert_eq!(names, vec!["key", "active", "label"]);
    }

    #[test]
    fn test_unknown_type_has_no_metadata() {
        let reg = registry();
        let ty = TypeRef::new("Object");
        assert!(reg.attributes(&ty).is_empty());
        assert!(reg.children(&ty).is_empty());
        assert_eq!(reg.supertype(&ty), None);
    }

    #[test]
    fn test_duplicate_registration() {
        let mut reg = registry();
        let err = reg.register(TypeBinding::new("Base")).unwrap_err();
        assert!(matches!(err, Error::Binding(_)));
    }

    #[test]
    fn test_validate_unknown_reference() {
        let mut reg = registry();
        assert!(reg.validate().is_ok());
        reg.register(TypeBinding::new("Holder").with_child(ChildBinding::reference(
            "getItems",
            ValueType::list(ValueType::element("Nowhere")),
        )))
        .unwrap();
        let err = reg.validate().unwrap_err();
        assert!(err.to_string().contains("Nowhere"));
        assert!(err.to_string().contains("getItems"));
    }

    #[test]
    fn test_reserved_and_invalid_names_rejected() {
        let mut reg = BindingRegistry::new();
        for binding in [
            TypeBinding::new("!top").with_default_root(),
            TypeBinding::new("Meta").with_root("!attrs"),
            TypeBinding::new("Spaced").with_root("two words"),
            TypeBinding::new("Attr")
                .with_attribute(AttributeBinding::new("getX", ValueType::Boolean).named("!x")),
            TypeBinding::new("Child").with_child(ChildBinding::named(
                "getY",
                "1st",
                ValueType::element("Child"),
            )),
        ] {
            let err = reg.register(binding).unwrap_err();
            assert!(matches!(err, Error::Name(_)), "unexpected error: {}", err);
        }
        assert!(reg.is_empty());
    }

    #[test]
    fn test_cyclic_extends_terminates() {
        let reg = BindingRegistry::new()
            .with(TypeBinding::new("X").extends("Y"))
            .and_then(|r| r.with(TypeBinding::new("Y").extends("X")))
            .unwrap();
        assert!(reg.attributes(&"X".into()).is_empty());
    }

    #[test]
    fn test_item_type() {
        assert_eq!(ValueType::Boolean.item_type(), Some(&ValueType::Boolean));
        assert_eq!(
            ValueType::list(ValueType::element("A")).item_type(),
            Some(&ValueType::element("A"))
        );
        assert_eq!(ValueType::erased_list().item_type(), None);
        assert_eq!(ValueType::erased_list().describe(), "list<?>");
    }
}
