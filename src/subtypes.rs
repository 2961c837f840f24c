//! Subtype discovery
//!
//! Polymorphic children accept any tagged subtype of their declared type, so
//! the generator needs to know which subtypes exist. Resolvers must terminate
//! and must not report a type as its own subtype.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::bindings::{MetadataSource, TypeRef};

/// Finds the known subtypes of a type
pub trait SubtypeResolver: Send + Sync {
    /// All known subtypes of `ty`, excluding `ty` itself. Order is not significant.
    fn subtypes_of(&self, ty: &TypeRef) -> Vec<TypeRef>;
}

impl<F> SubtypeResolver for F
where
    F: Fn(&TypeRef) -> Vec<TypeRef> + Send + Sync,
{
    fn subtypes_of(&self, ty: &TypeRef) -> Vec<TypeRef> {
        self(ty)
    }
}

/// Resolver that reports no subtypes, disabling polymorphism
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSubtypes;

impl SubtypeResolver for NoSubtypes {
    fn subtypes_of(&self, _ty: &TypeRef) -> Vec<TypeRef> {
        Vec::new()
    }
}

/// Default resolver: scans every type the metadata source knows about and
/// keeps those whose supertype chain passes through the requested type.
#[derive(Clone)]
pub struct HierarchyScanner {
    source: Arc<dyn MetadataSource>,
}

impl HierarchyScanner {
    /// Scan the types known to `source`
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        Self { source }
    }

    fn descends_from(&self, ty: &TypeRef, ancestor: &TypeRef) -> bool {
        let mut seen = HashSet::new();
        let mut current = self.source.supertype(ty);
        while let Some(parent) = current {
            if &parent == ancestor {
                return true;
            }
            if !seen.insert(parent.clone()) {
                return false;
            }
            current = self.source.supertype(&parent);
        }
        false
    }
}

impl std::fmt::Debug for HierarchyScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchyScanner").finish_non_exhaustive()
    }
}

impl SubtypeResolver for HierarchyScanner {
    fn subtypes_of(&self, ty: &TypeRef) -> Vec<TypeRef> {
        self.source
            .known_types()
            .into_iter()
            .filter(|candidate| candidate != ty && self.descends_from(candidate, ty))
            .collect()
    }
}

/// Subtype relationships supplied by explicit registration
#[derive(Debug, Clone, Default)]
pub struct StaticSubtypes {
    subtypes: IndexMap<TypeRef, IndexSet<TypeRef>>,
}

impl StaticSubtypes {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `child` as a subtype of `parent`
    pub fn register(&mut self, parent: impl Into<TypeRef>, child: impl Into<TypeRef>) {
        let parent = parent.into();
        let child = child.into();
        if parent != child {
            self.subtypes.entry(parent).or_default().insert(child);
        }
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, parent: impl Into<TypeRef>, child: impl Into<TypeRef>) -> Self {
        self.register(parent, child);
        self
    }
}

impl SubtypeResolver for StaticSubtypes {
    fn subtypes_of(&self, ty: &TypeRef) -> Vec<TypeRef> {
        self.subtypes
            .get(ty)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::{BindingRegistry, TypeBinding};

    fn scanner() -> HierarchyScanner {
        let reg = BindingRegistry::new()
            .with(TypeBinding::new("Shape"))
            .and_then(|r| r.with(TypeBinding::new("Polygon").extends("Shape")))
            .and_then(|r| r.with(TypeBinding::new("Square").extends("Polygon")))
            .and_then(|r| r.with(TypeBinding::new("Circle").extends("Shape")))
            .and_then(|r| r.with(TypeBinding::new("Loop").extends("Loop")))
            .unwrap();
        HierarchyScanner::new(Arc::new(reg))
    }

    fn names(mut types: Vec<TypeRef>) -> Vec<String> {
        types.sort();
        types.into_iter().map(|t| t.name().to_string()).collect()
    }

    #[test]
    fn test_scanner_finds_transitive_subtypes() {
        let s = scanner();
        assert_eq!(names(s.subtypes_of(&"Shape".into())), vec!["Circle", "Polygon", "Square"]);
        assert_eq!(names(s.subtypes_of(&"Polygon".into())), vec!["Square"]);
        assert!(s.subtypes_of(&"Square".into()).is_empty());
    }

    #[test]
    fn test_scanner_excludes_self_on_cycles() {
        let s = scanner();
        assert!(s.subtypes_of(&"Loop".into()).is_empty());
    }

    #[test]
    fn test_static_subtypes() {
        let s = StaticSubtypes::new()
            .with("Shape", "Circle")
            .with("Shape", "Circle")
            .with("Shape", "Shape");
        assert_eq!(names(s.subtypes_of(&"Shape".into())), vec!["Circle"]);
        assert!(s.subtypes_of(&"Circle".into()).is_empty());
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |ty: &TypeRef| {
            if ty.name() == "Shape" {
                vec![TypeRef::new("Circle")]
            } else {
                Vec::new()
            }
        };
        assert_eq!(names(resolver.subtypes_of(&"Shape".into())), vec!["Circle"]);
        assert!(NoSubtypes.subtypes_of(&"Shape".into()).is_empty());
    }
}
