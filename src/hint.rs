//! Hint documents
//!
//! The published result of one generation run, and its encoding as the
//! `var tags = {...};` script statement consumed by editor hint addons.

use std::collections::BTreeMap;
use std::io::{self, Write};

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::error;

use crate::descriptor::TagDescriptor;
use crate::error::{Error, Result};
use crate::values::ValueSet;

/// Key of the root tag list in the encoded document
pub const TOP_KEY: &str = "!top";

/// Key of the global attribute table in the encoded document
pub const GLOBAL_ATTRS_KEY: &str = "!attrs";

/// Options for encoding a hint document as a script statement
#[derive(Debug, Clone)]
pub struct ScriptOptions {
    /// Variable the document is assigned to
    variable: String,
    /// Whether to pretty-print the JSON object
    pretty: bool,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            variable: "tags".to_string(),
            pretty: false,
        }
    }
}

impl ScriptOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the variable name
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Check if output is pretty-printed
    pub fn pretty(&self) -> bool {
        self.pretty
    }

    /// Set the variable name
    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = variable.into();
        self
    }

    /// Set pretty printing
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

/// Complete tag grammar reachable from one root type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintDocument {
    top_elements: Vec<String>,
    global_attrs: IndexMap<String, Option<ValueSet>>,
    registry: BTreeMap<String, TagDescriptor>,
}

impl HintDocument {
    /// Create a document with a single root tag
    pub fn new(root_tag: impl Into<String>, registry: BTreeMap<String, TagDescriptor>) -> Self {
        Self {
            top_elements: vec![root_tag.into()],
            global_attrs: IndexMap::new(),
            registry,
        }
    }

    /// Tags usable at the top level of a document, in order
    pub fn top_elements(&self) -> &[String] {
        &self.top_elements
    }

    /// Attributes allowed on every tag (currently always empty)
    pub fn global_attrs(&self) -> &IndexMap<String, Option<ValueSet>> {
        &self.global_attrs
    }

    /// Every tag discovered during generation, sorted by name
    pub fn registry(&self) -> &BTreeMap<String, TagDescriptor> {
        &self.registry
    }

    /// Descriptor of one tag
    pub fn get(&self, tag: &str) -> Option<&TagDescriptor> {
        self.registry.get(tag)
    }

    /// Registered tag names, sorted
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(String::as_str)
    }

    /// Write the script statement to `writer`
    pub fn write_script<W: Write>(&self, mut writer: W, options: &ScriptOptions) -> Result<()> {
        write!(writer, "var {} = ", options.variable())?;
        if options.pretty() {
            serde_json::to_writer_pretty(&mut writer, self)?;
        } else {
            serde_json::to_writer(&mut writer, self)?;
        }
        writer.write_all(b";")?;
        Ok(())
    }

    /// Encode as a script statement, propagating encoding errors
    pub fn try_to_script(&self, options: &ScriptOptions) -> Result<String> {
        let mut buf = Vec::new();
        self.write_script(&mut buf, options)?;
        String::from_utf8(buf).map_err(|e| Error::Other(format!("non UTF-8 script: {}", e)))
    }

    /// Encode with the given options; an encoding failure yields an empty string
    pub fn to_script_with(&self, options: &ScriptOptions) -> String {
        script_or_empty(self.try_to_script(options))
    }

    /// Encode as `var tags = {...};` in compact form
    pub fn to_script(&self) -> String {
        self.to_script_with(&ScriptOptions::default())
    }
}

fn script_or_empty(result: Result<String>) -> String {
    match result {
        Ok(script) => script,
        Err(e) => {
            error!(error = %e, "failed to encode hint document");
            String::new()
        }
    }
}

impl Serialize for HintDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.registry.len() + 2))?;
        map.serialize_entry(TOP_KEY, &self.top_elements)?;
        map.serialize_entry(GLOBAL_ATTRS_KEY, &self.global_attrs)?;
        for (tag, descriptor) in &self.registry {
            map.serialize_entry(tag, descriptor)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn document() -> HintDocument {
        let mut root = TagDescriptor::new(Some("root".to_string()));
        root.set_attribute("id", None);
        root.add_child_tag("item");
        let mut item = TagDescriptor::new(Some("item".to_string()));
        item.set_attribute(
            "on",
            Some(["true", "false"].iter().map(|s| s.to_string()).collect()),
        );

        let mut registry = BTreeMap::new();
        registry.insert("root".to_string(), root);
        registry.insert("item".to_string(), item);
        HintDocument::new("root", registry)
    }

    #[test]
    fn test_compact_script() {
        assert_eq!(
            document().to_script(),
            r#"var tags = {"!top":["root"],"!attrs":{},"item":{"attrs":{"on":["true","false"]},"children":[]},"root":{"attrs":{"id":null},"children":["item"]}};"#
        );
    }

    #[test]
    fn test_pretty_script_with_variable() {
        let options = ScriptOptions::new().with_variable("hints").with_pretty(true);
        let script = document().to_script_with(&options);
        assert!(script.starts_with("var hints = {\n  \"!top\": [\n    \"root\"\n  ],"));
        assert!(script.ends_with("\n};"));
        let json: serde_json::Value =
            serde_json::from_str(&script["var hints = ".len()..script.len() - 1]).unwrap();
        assert_eq!(json["root"]["children"][0], "item");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_encoding_failure_degrades_to_empty() {
        let err = document()
            .write_script(BrokenPipe, &ScriptOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(script_or_empty(Err(err)), "");
        assert_eq!(
            script_or_empty(document().try_to_script(&ScriptOptions::default())),
            document().to_script()
        );
    }

    #[test]
    fn test_write_script_matches_to_script() {
        let mut buf = Vec::new();
        document().write_script(&mut buf, &ScriptOptions::default()).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), document().to_script());
    }

    #[test]
    fn test_accessors() {
        let doc = document();
        assert_eq!(doc.top_elements(), ["root".to_string()]);
        assert!(doc.global_attrs().is_empty());
        assert_eq!(doc.tags().collect::<Vec<_>>(), vec!["item", "root"]);
        assert!(doc.get("item").is_some());
        assert!(doc.get("missing").is_none());
    }
}
