//! Binding schema loading
//!
//! Binding declarations can be kept in a JSON document instead of being
//! registered from code:
//!
//! ```json
//! {
//!   "enums": { "Size": ["SMALL", "LARGE"] },
//!   "types": [
//!     { "name": "Shirt", "root": { "name": "shirt" },
//!       "attributes": [ { "accessor": "getSize", "type": { "kind": "enum", "name": "Size" } } ],
//!       "children": [ { "accessor": "getButtons", "kind": "reference",
//!                       "type": { "kind": "list",
//!                                 "item": { "kind": "element", "type": "Button" } } } ] },
//!     { "name": "Button", "root": {} }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::bindings::{
    AttributeBinding, BindingRegistry, ChildBinding, EnumType, RootElement, TypeBinding, ValueType,
};
use crate::error::{BindingError, Error, Result};
use crate::names;
use crate::values::ValueTable;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDocument {
    #[serde(default)]
    enums: IndexMap<String, Vec<String>>,
    #[serde(default)]
    types: Vec<TypeDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TypeDecl {
    name: String,
    #[serde(default)]
    extends: Option<String>,
    #[serde(default)]
    root: Option<RootDecl>,
    #[serde(default)]
    attributes: Vec<AttributeDecl>,
    #[serde(default)]
    children: Vec<ChildDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RootDecl {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AttributeDecl {
    accessor: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type")]
    value_type: ValueDecl,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ChildKindDecl {
    Reference,
    Named,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChildDecl {
    accessor: String,
    kind: ChildKindDecl,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type")]
    value_type: ValueDecl,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
enum ValueDecl {
    Boolean,
    Enum {
        name: String,
    },
    Scalar {
        name: String,
    },
    Element {
        #[serde(rename = "type")]
        target: String,
    },
    List {
        #[serde(default)]
        item: Option<Box<ValueDecl>>,
    },
}

/// Converts a parsed schema document into bindings
struct SchemaBuilder<'a> {
    enums: &'a IndexMap<String, Vec<String>>,
}

impl SchemaBuilder<'_> {
    fn value_type(&self, decl: &ValueDecl, owner: &str, accessor: &str) -> Result<ValueType> {
        Ok(match decl {
            ValueDecl::Boolean => ValueType::Boolean,
            ValueDecl::Enum { name } => {
                let variants = self.enums.get(name).ok_or_else(|| {
                    BindingError::new(format!("unknown enumeration '{}'", name))
                        .with_type(owner)
                        .with_accessor(accessor)
                })?;
                ValueType::Enumeration(EnumType::new(name.clone(), variants.iter().cloned()))
            }
            ValueDecl::Scalar { name } => ValueType::scalar(name.clone()),
            ValueDecl::Element { target } => ValueType::element(target.as_str()),
            ValueDecl::List { item: Some(item) } => {
                ValueType::list(self.value_type(item, owner, accessor)?)
            }
            ValueDecl::List { item: None } => ValueType::erased_list(),
        })
    }

    fn binding(&self, decl: &TypeDecl) -> Result<TypeBinding> {
        let mut binding = TypeBinding::new(decl.name.as_str());
        binding.extends = decl.extends.as_deref().map(Into::into);

        binding.root = decl.root.as_ref().map(|root| RootElement {
            name: root.name.clone(),
        });

        for attr in &decl.attributes {
            let mut attribute = AttributeBinding::new(
                attr.accessor.as_str(),
                self.value_type(&attr.value_type, &decl.name, &attr.accessor)?,
            );
            if let Some(ref name) = attr.name {
                attribute = attribute.named(name.as_str());
            }
            binding.attributes.push(attribute);
        }

        for child in &decl.children {
            let value_type = self.value_type(&child.value_type, &decl.name, &child.accessor)?;
            let child_binding = match (&child.kind, &child.name) {
                (ChildKindDecl::Reference, None) => {
                    ChildBinding::reference(child.accessor.as_str(), value_type)
                }
                (ChildKindDecl::Reference, Some(_)) => {
                    return Err(BindingError::new(
                        "reference children take their tag from the referenced type",
                    )
                    .with_type(decl.name.as_str())
                    .with_accessor(child.accessor.as_str())
                    .into());
                }
                (ChildKindDecl::Named, name) => {
                    let name = match name {
                        Some(name) => name.clone(),
                        None => names::property_name(&child.accessor),
                    };
                    ChildBinding::named(child.accessor.as_str(), name, value_type)
                }
            };
            binding.children.push(child_binding);
        }

        Ok(binding)
    }
}

/// Parse a binding schema document
pub fn parse_bindings(text: &str) -> Result<BindingRegistry> {
    let doc: SchemaDocument = serde_json::from_str(text)?;
    let builder = SchemaBuilder { enums: &doc.enums };

    let mut registry = BindingRegistry::new();
    for decl in &doc.types {
        registry.register(builder.binding(decl)?)?;
    }
    registry.validate()?;

    debug!(types = registry.len(), enums = doc.enums.len(), "loaded binding schema");
    Ok(registry)
}

/// Load a binding schema document from a file
pub fn load_bindings(path: impl AsRef<Path>) -> Result<BindingRegistry> {
    parse_bindings(&read(path.as_ref())?)
}

/// Parse a value table: `{ "<attribute>": ["value", ...] }`
pub fn parse_value_table(text: &str) -> Result<ValueTable> {
    let raw: IndexMap<String, Vec<String>> = serde_json::from_str(text)?;
    let mut table = ValueTable::new();
    for (attribute, values) in raw {
        table.insert(attribute, values);
    }
    Ok(table)
}

/// Load a value table from a file
pub fn load_value_table(path: impl AsRef<Path>) -> Result<ValueTable> {
    parse_value_table(&read(path.as_ref())?)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
    })
}
