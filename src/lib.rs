//! # xmlhint
//!
//! Editor autocompletion hints for XML vocabularies described by binding
//! declarations.
//!
//! A binding says how a data-model type maps onto XML: the tag it is written
//! as, the attributes it carries and the child elements it accepts. Starting
//! from a root type, [`HintGenerator`] discovers every reachable tag, its
//! attributes and their legal values, and every polymorphic substitute, and
//! produces a [`HintDocument`] that encodes to the `var tags = {...};`
//! statement used by XML hint addons in browser-based editors.
//!
//! ## Features
//!
//! - Boolean and enumerated attributes get their values suggested
//! - Custom value factories for everything else
//! - Subtypes are offered wherever their supertype is accepted
//! - Explicitly named children are published under their own name
//! - Cyclic element graphs are handled
//! - Deterministic output
//!
//! ## Example
//!
//! ```rust
//! use xmlhint::bindings::{
//!     AttributeBinding, BindingRegistry, ChildBinding, TypeBinding, ValueType,
//! };
//! use xmlhint::HintGenerator;
//!
//! let registry = BindingRegistry::new()
//!     .with(TypeBinding::new("Library")
//!         .with_root("library")
//!         .with_child(ChildBinding::reference(
//!             "getBooks",
//!             ValueType::list(ValueType::element("Book")),
//!         )))?
//!     .with(TypeBinding::new("Book")
//!         .with_root("book")
//!         .with_attribute(AttributeBinding::new("isAvailable", ValueType::Boolean)))?;
//!
//! let hints = HintGenerator::new(registry).hints_for(&"Library".into()).unwrap();
//! assert_eq!(
//!     hints.to_script(),
//!     r#"var tags = {"!top":["library"],"!attrs":{},"book":{"attrs":{"available":["true","false"]},"children":[]},"library":{"attrs":{},"children":["book"]}};"#
//! );
//! # Ok::<(), xmlhint::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod names;

pub mod bindings;
pub mod subtypes;
pub mod values;

pub mod descriptor;
pub mod generator;
pub mod hint;

pub mod loaders;

// Re-exports for convenience
pub use bindings::{BindingRegistry, MetadataSource, TypeRef};
pub use descriptor::TagDescriptor;
pub use error::{Error, Result};
pub use generator::{GenerationContext, HintGenerator};
pub use hint::{HintDocument, ScriptOptions};
pub use subtypes::SubtypeResolver;
pub use values::{ValueFactory, ValueSet};

/// Version of the xmlhint library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
