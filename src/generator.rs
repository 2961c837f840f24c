//! Hint generation
//!
//! [`HintGenerator`] walks the binding metadata from a root type and collects
//! one [`TagDescriptor`] per visited type, plus a renamed copy for every
//! explicitly named child. Each call works on its own [`GenerationContext`],
//! so a generator can be shared between threads.
//!
//! A type is registered in the context *before* its attributes, subtypes and
//! children are visited. A cyclic reference back to it therefore finds the
//! in-progress descriptor instead of recursing again, which bounds the walk
//! by the number of distinct reachable types.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::bindings::{ChildKind, MetadataSource, TypeRef, ValueType};
use crate::descriptor::TagDescriptor;
use crate::hint::HintDocument;
use crate::subtypes::{HierarchyScanner, SubtypeResolver};
use crate::values::{ValueEnumerator, ValueFactory};

/// Index of a descriptor inside a [`GenerationContext`]
pub type DescriptorId = usize;

/// Per-call traversal state
#[derive(Debug, Default)]
pub struct GenerationContext {
    descriptors: Vec<TagDescriptor>,
    by_type: HashMap<TypeRef, DescriptorId>,
    by_tag: IndexMap<String, DescriptorId>,
}

impl GenerationContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of descriptors created so far, clones included
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether nothing has been visited yet
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    fn lookup(&self, ty: &TypeRef) -> Option<DescriptorId> {
        self.by_type.get(ty).copied()
    }

    fn get(&self, id: DescriptorId) -> &TagDescriptor {
        &self.descriptors[id]
    }

    fn get_mut(&mut self, id: DescriptorId) -> &mut TagDescriptor {
        &mut self.descriptors[id]
    }

    /// Add a descriptor reachable under its tag name only
    fn insert_tagged(&mut self, descriptor: TagDescriptor) -> DescriptorId {
        let id = self.descriptors.len();
        if let Some(tag) = descriptor.tag() {
            self.by_tag.insert(tag.to_string(), id);
        }
        self.descriptors.push(descriptor);
        id
    }

    /// Add the descriptor of `ty`, reachable by type and by tag
    fn insert_type(&mut self, ty: TypeRef, descriptor: TagDescriptor) -> DescriptorId {
        let id = self.insert_tagged(descriptor);
        self.by_type.insert(ty, id);
        id
    }

    /// All tagged descriptors, keyed and sorted by tag.
    ///
    /// When several descriptors claimed the same tag the last one wins.
    fn into_registry(self) -> BTreeMap<String, TagDescriptor> {
        let mut slots: Vec<Option<TagDescriptor>> =
            self.descriptors.into_iter().map(Some).collect();
        self.by_tag
            .into_iter()
            .filter_map(|(tag, id)| slots[id].take().map(|d| (tag, d)))
            .collect()
    }
}

/// Builds hint documents from binding metadata
#[derive(Clone)]
pub struct HintGenerator {
    source: Arc<dyn MetadataSource>,
    subtypes: Arc<dyn SubtypeResolver>,
    values: ValueEnumerator,
}

impl HintGenerator {
    /// Generator over `source`, discovering subtypes by scanning the source
    pub fn new<S: MetadataSource + 'static>(source: S) -> Self {
        Self::from_shared(Arc::new(source))
    }

    /// Generator over a shared metadata source
    pub fn from_shared(source: Arc<dyn MetadataSource>) -> Self {
        Self {
            subtypes: Arc::new(HierarchyScanner::new(Arc::clone(&source))),
            source,
            values: ValueEnumerator::new(),
        }
    }

    /// Use `factory` for attributes that are neither boolean nor enumerated
    pub fn with_value_factory<F: ValueFactory + 'static>(mut self, factory: F) -> Self {
        self.values = self.values.with_factory(Arc::new(factory));
        self
    }

    /// Replace the default subtype scanner
    pub fn with_subtype_resolver<R: SubtypeResolver + 'static>(mut self, resolver: R) -> Self {
        self.subtypes = Arc::new(resolver);
        self
    }

    /// Generate the hints for documents rooted at `root`.
    ///
    /// Returns `None` when `root` has no tag of its own.
    pub fn hints_for(&self, root: &TypeRef) -> Option<HintDocument> {
        let mut ctx = GenerationContext::new();
        let id = self.resolve(root, &mut ctx);
        let Some(root_tag) = ctx.get(id).tag().map(str::to_string) else {
            debug!(root = %root, "root type has no tag, no hints generated");
            return None;
        };
        debug!(root = %root, tag = %root_tag, descriptors = ctx.len(), "generated hints");
        Some(HintDocument::new(root_tag, ctx.into_registry()))
    }

    /// Descriptor of `ty`, visiting it first if this context has not seen it yet
    pub fn resolve(&self, ty: &TypeRef, ctx: &mut GenerationContext) -> DescriptorId {
        if let Some(id) = ctx.lookup(ty) {
            return id;
        }

        let tag = self.source.tag_name(ty);
        debug!(ty = %ty, tag = ?tag, "visiting type");
        let id = ctx.insert_type(ty.clone(), TagDescriptor::new(tag));

        self.add_attributes(id, ty, ctx);
        self.add_overrides(id, ty, ctx);
        self.add_children(id, ty, ctx);
        id
    }

    fn add_attributes(&self, id: DescriptorId, ty: &TypeRef, ctx: &mut GenerationContext) {
        for attr in self.source.attributes(ty) {
            let name = attr.xml_name();
            debug!(ty = %ty, attribute = %name, "found attribute");
            let values = self.values.values_for(&name, &attr.value_type);
            ctx.get_mut(id).set_attribute(name, values);
        }
    }

    fn add_overrides(&self, id: DescriptorId, ty: &TypeRef, ctx: &mut GenerationContext) {
        let subtypes = self.subtypes.subtypes_of(ty);
        for sub in &subtypes {
            if let Some(tag) = self.source.tag_name(sub) {
                ctx.get_mut(id).add_override(tag);
            }
        }
        for sub in &subtypes {
            self.resolve(sub, ctx);
        }
    }

    fn add_children(&self, id: DescriptorId, ty: &TypeRef, ctx: &mut GenerationContext) {
        for child in self.source.children(ty) {
            let target = match child.value_type.item_type() {
                Some(ValueType::Element(target)) => target,
                Some(other) => {
                    debug!(
                        ty = %ty,
                        accessor = %child.accessor,
                        value_type = %other.describe(),
                        "child is not a bound type, skipped"
                    );
                    continue;
                }
                None => {
                    warn!(
                        ty = %ty,
                        accessor = %child.accessor,
                        "child container has an erased element type, skipped"
                    );
                    continue;
                }
            };

            let resolved = self.resolve(target, ctx);
            match child.kind {
                ChildKind::Reference => {
                    for name in ctx.get(resolved).substitutes() {
                        ctx.get_mut(id).add_child_tag(name);
                    }
                }
                ChildKind::Named(ref name) => {
                    let clone = ctx.get(resolved).clone_as(name.as_str());
                    ctx.insert_tagged(clone);
                    ctx.get_mut(id).add_child_tag(name.as_str());
                }
            }
            debug!(ty = %ty, accessor = %child.accessor, child = %target, "resolved child");
        }
    }
}

impl std::fmt::Debug for HintGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HintGenerator")
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::{AttributeBinding, BindingRegistry, ChildBinding, TypeBinding};
    use crate::subtypes::NoSubtypes;

    fn generator(bindings: Vec<TypeBinding>) -> HintGenerator {
        let mut reg = BindingRegistry::new();
        for b in bindings {
            reg.register(b).unwrap();
        }
        HintGenerator::new(reg)
    }

    fn children(doc: &HintDocument, tag: &str) -> Vec<String> {
        doc.get(tag).unwrap().children().iter().cloned().collect()
    }

    #[test]
    fn test_untagged_root_yields_nothing() {
        let g = generator(vec![TypeBinding::new("Plain")
            .with_attribute(AttributeBinding::new("getName", ValueType::scalar("string")))]);
        assert!(g.hints_for(&"Plain".into()).is_none());
        assert!(g.hints_for(&"Unknown".into()).is_none());
    }

    #[test]
    fn test_self_reference_terminates() {
        let g = generator(vec![TypeBinding::new("Node")
            .with_root("node")
            .with_child(ChildBinding::reference(
                "getNodes",
                ValueType::list(ValueType::element("Node")),
            ))]);
        let doc = g.hints_for(&"Node".into()).unwrap();
        assert_eq!(children(&doc, "node"), vec!["node"]);
    }

    #[test]
    fn test_mutual_reference_terminates() {
        let g = generator(vec![
            TypeBinding::new("Folder")
                .with_root("folder")
                .with_child(ChildBinding::reference(
                    "getFiles",
                    ValueType::list(ValueType::element("File")),
                )),
            TypeBinding::new("File")
                .with_root("file")
                .with_child(ChildBinding::reference("getParent", ValueType::element("Folder"))),
        ]);
        let doc = g.hints_for(&"Folder".into()).unwrap();
        assert_eq!(doc.tags().collect::<Vec<_>>(), vec!["file", "folder"]);
        assert_eq!(children(&doc, "folder"), vec!["file"]);
        assert_eq!(children(&doc, "file"), vec!["folder"]);
    }

    #[test]
    fn test_erased_child_is_skipped() {
        let g = generator(vec![TypeBinding::new("Bag")
            .with_root("bag")
            .with_child(ChildBinding::reference("getItems", ValueType::erased_list()))
            .with_child(ChildBinding::reference(
                "getLabels",
                ValueType::list(ValueType::scalar("string")),
            ))]);
        let doc = g.hints_for(&"Bag".into()).unwrap();
        assert!(doc.get("bag").unwrap().children().is_empty());
    }

    #[test]
    fn test_untagged_child_contributes_only_overrides() {
        let g = generator(vec![
            TypeBinding::new("Holder")
                .with_root("holder")
                .with_child(ChildBinding::reference("getPart", ValueType::element("Part"))),
            TypeBinding::new("Part"),
            TypeBinding::new("Gear").extends("Part").with_root("gear"),
            TypeBinding::new("Spring").extends("Part"),
        ]);
        let doc = g.hints_for(&"Holder".into()).unwrap();
        assert_eq!(children(&doc, "holder"), vec!["gear"]);
        assert_eq!(doc.tags().collect::<Vec<_>>(), vec!["gear", "holder"]);
    }

    #[test]
    fn test_subtypes_registered_without_being_children() {
        let g = generator(vec![
            TypeBinding::new("Doc").with_root("doc"),
            TypeBinding::new("Memo").extends("Doc").with_root("memo"),
        ]);
        let doc = g.hints_for(&"Doc".into()).unwrap();
        assert_eq!(doc.tags().collect::<Vec<_>>(), vec!["doc", "memo"]);
        assert_eq!(doc.get("doc").unwrap().overrides().len(), 1);

        let plain = g.clone().with_subtype_resolver(NoSubtypes).hints_for(&"Doc".into()).unwrap();
        assert_eq!(plain.tags().collect::<Vec<_>>(), vec!["doc"]);
        assert!(plain.get("doc").unwrap().overrides().is_empty());
    }

    #[test]
    fn test_context_is_reusable_across_roots() {
        let g = generator(vec![
            TypeBinding::new("A").with_root("a"),
            TypeBinding::new("B")
                .with_root("b")
                .with_child(ChildBinding::reference("getA", ValueType::element("A"))),
        ]);
        let mut ctx = GenerationContext::new();
        let a = g.resolve(&"A".into(), &mut ctx);
        let b = g.resolve(&"B".into(), &mut ctx);
        assert_eq!(ctx.len(), 2);
        assert_eq!(g.resolve(&"A".into(), &mut ctx), a);
        assert_ne!(a, b);
    }
}
