//! The generic node tree handed to us by the markup parser.
//!
//! The core only ever reads this shape. It is deserializable from the JSON the
//! upstream parser emits, and has a handful of builder methods so that callers
//! (and tests) can assemble trees by hand.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Node type for tags such as `{% string-field %}`.
pub const TAG: &str = "tag";
/// Node type for a run of plain text.
pub const TEXT: &str = "text";
/// Node type for a soft line break inside a paragraph.
pub const SOFTBREAK: &str = "softbreak";
/// Node type for a hard line break inside a paragraph.
pub const HARDBREAK: &str = "hardbreak";
/// Node type for a fenced code block.
pub const FENCE: &str = "fence";
/// Node type for a list.
pub const LIST: &str = "list";
/// Node type for a list item.
pub const ITEM: &str = "item";
/// Node type for a paragraph.
pub const PARAGRAPH: &str = "paragraph";

/// A `Node` is one element of the tree produced by the markup parser.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub r#type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    /// Source line numbers covered by this node, as reported upstream.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<usize>,
}

impl Node {
    /// Create a node of the given type with no attributes or children.
    #[must_use]
    pub fn new(r#type: impl Into<String>) -> Self {
        Self {
            r#type: r#type.into(),
            ..Self::default()
        }
    }

    /// Create a tag node, e.g. `Node::tag("string-field")`.
    #[must_use]
    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            r#type: TAG.to_string(),
            tag: Some(name.into()),
            ..Self::default()
        }
    }

    /// Create a text node.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(TEXT).with_attribute("content", content.into())
    }

    /// Create a fenced block with the given info string.
    #[must_use]
    pub fn fence(language: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(FENCE)
            .with_attribute("language", language.into())
            .with_attribute("content", content.into())
    }

    /// Create a list item whose text is `text`, optionally carrying an
    /// already extracted `#id` annotation.
    #[must_use]
    pub fn item(id: Option<&str>, text: impl Into<String>) -> Self {
        let item = Self::new(ITEM).with_child(Self::new(PARAGRAPH).with_child(Self::text(text)));
        match id {
            Some(id) => item.with_attribute("id", id),
            None => item,
        }
    }

    /// Create a list node from its items.
    #[must_use]
    pub fn list(items: Vec<Node>) -> Self {
        Self {
            r#type: LIST.to_string(),
            children: items,
            ..Self::default()
        }
    }

    /// Set an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// Append a child node.
    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Set the starting source line.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.lines = vec![line];
        self
    }

    /// The tag name, if this is a tag node.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        if self.r#type == TAG {
            self.tag.as_deref()
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_tag(&self, name: &str) -> bool {
        self.tag_name() == Some(name)
    }

    #[must_use]
    pub fn is_type(&self, r#type: &str) -> bool {
        self.r#type == r#type
    }

    /// First source line of this node, if the upstream parser reported one.
    #[must_use]
    pub fn start_line(&self) -> Option<usize> {
        self.lines.first().copied()
    }

    /// Concatenated text content of this node and all of its descendants.
    ///
    /// Soft and hard breaks become a single space, which is what labels want.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self.r#type.as_str() {
            TEXT => {
                if let Some(AttributeValue::String(content)) = self.attributes.get("content") {
                    out.push_str(content);
                }
            }
            SOFTBREAK | HARDBREAK => out.push(' '),
            _ => {
                for child in &self.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// The attribute map of a node, ordered by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, AttributeValue>);

impl Attributes {
    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.0.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert an attribute, replacing any previous value.
    pub fn insert(&mut self, name: String, value: AttributeValue) {
        self.0.insert(name, value);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
}

/// An `AttributeValue` is whatever the markup parser found on the right-hand
/// side of `name=...`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// An explicit `null`.
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<AttributeValue>),
    Object(BTreeMap<String, AttributeValue>),
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Null => write!(f, "null"),
            AttributeValue::Bool(value) => write!(f, "{value}"),
            AttributeValue::Number(value) => write!(f, "{value}"),
            AttributeValue::String(value) => write!(f, "{value}"),
            AttributeValue::Array(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            AttributeValue::Object(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Number(f64::from(value))
    }
}

impl From<Vec<&str>> for AttributeValue {
    fn from(values: Vec<&str>) -> Self {
        AttributeValue::Array(values.into_iter().map(AttributeValue::from).collect())
    }
}

impl From<Vec<AttributeValue>> for AttributeValue {
    fn from(values: Vec<AttributeValue>) -> Self {
        AttributeValue::Array(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_upstream_tree() -> Result<(), serde_json::Error> {
        let json = r#"{
            "type": "tag",
            "tag": "number-field",
            "attributes": {"id": "age", "label": "Age", "min": 0, "required": true, "examples": ["1", "2"]},
            "children": [{"type": "fence", "attributes": {"language": "value", "content": "42\n"}}],
            "lines": [3, 6]
        }"#;
        let node: Node = serde_json::from_str(json)?;
        assert!(node.is_tag("number-field"));
        assert_eq!(node.start_line(), Some(3));
        assert_eq!(node.attributes.get("min"), Some(&AttributeValue::Number(0.0)));
        assert_eq!(node.attributes.get("required"), Some(&AttributeValue::Bool(true)));
        assert_eq!(
            node.attributes.get("examples"),
            Some(&AttributeValue::from(vec!["1", "2"]))
        );
        assert_eq!(node.children.len(), 1);
        Ok(())
    }

    #[test]
    fn test_text_content_joins_breaks() {
        let node = Node::new(PARAGRAPH)
            .with_child(Node::text("first"))
            .with_child(Node::new(SOFTBREAK))
            .with_child(Node::text("second"));
        assert_eq!(node.text_content(), "first second");
    }

    #[test]
    fn test_tag_name_only_for_tags() {
        let mut node = Node::new(TEXT);
        node.tag = Some("string-field".to_string());
        assert_eq!(node.tag_name(), None);
        assert_eq!(Node::tag("form").tag_name(), Some("form"));
    }
}
