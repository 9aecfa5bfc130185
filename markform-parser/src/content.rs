//! Pulling a field's raw content out of its child nodes.

use crate::{
    accessors::get_string_attr,
    constants::VALUE_FENCE,
    model::{
        AttributeValue, Node,
        node::{FENCE, HARDBREAK, ITEM, SOFTBREAK, TEXT},
    },
};

/// A list item found inside a chooser field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionItem {
    /// The `#id` annotation, if the item had one.
    pub id: Option<String>,
    /// The leading `[c]` marker, verbatim.
    pub marker: Option<String>,
    pub label: String,
    pub line: Option<usize>,
}

/// The content of the `value` fence among the node's direct children.
///
/// One trailing newline (the fence's own line ending) is dropped. A field
/// without a value fence simply has no content.
#[must_use]
pub fn extract_fence_value(node: &Node) -> Option<String> {
    node.children.iter().find_map(|child| {
        if !child.is_type(FENCE) {
            return None;
        }
        match (
            child.attributes.get("language"),
            child.attributes.get("content"),
        ) {
            (Some(AttributeValue::String(language)), Some(AttributeValue::String(content)))
                if language.trim() == VALUE_FENCE =>
            {
                let content = content.strip_suffix('\n').unwrap_or(content);
                let content = content.strip_suffix('\r').unwrap_or(content);
                Some(content.to_string())
            }
            (Some(AttributeValue::String(language)), None) if language.trim() == VALUE_FENCE => {
                Some(String::new())
            }
            _ => None,
        }
    })
}

/// Every `item` node below `node`, in document order.
#[must_use]
pub fn extract_option_items(node: &Node) -> Vec<OptionItem> {
    let mut items = Vec::new();
    collect_items(node, &mut items);
    items
}

fn collect_items(node: &Node, items: &mut Vec<OptionItem>) {
    for child in &node.children {
        if child.is_type(ITEM) {
            items.push(option_item(child));
        } else if !child.is_type(FENCE) {
            collect_items(child, items);
        }
    }
}

fn option_item(node: &Node) -> OptionItem {
    let id = get_string_attr(node, "id")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string);
    let text = node.text_content();
    let (marker, label) = split_marker(text.trim());
    OptionItem {
        id,
        marker: marker.map(str::to_string),
        label: label.to_string(),
        line: node.start_line(),
    }
}

/// Split a leading `[c]` marker off an item's text.
///
/// Only three-character markers count; `[link](...)` style text is left
/// alone because its fourth character is not whitespace.
pub(crate) fn split_marker(text: &str) -> (Option<&str>, &str) {
    let mut chars = text.char_indices();
    let (Some((_, '[')), Some(_), Some((close, ']'))) = (chars.next(), chars.next(), chars.next())
    else {
        return (None, text);
    };
    let end = close + 1;
    let rest = text.get(end..).unwrap_or_default();
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        (text.get(..end), rest.trim())
    } else {
        (None, text)
    }
}

/// The raw text of a pipe table written inside a table field.
///
/// A `value` fence wins when present. Otherwise the tag's own children are
/// flattened back into lines: the upstream parser usually hands an un-parsed
/// pipe table over as paragraphs of text separated by soft breaks.
#[must_use]
pub fn extract_table_text(node: &Node) -> Option<String> {
    if let Some(fenced) = extract_fence_value(node) {
        return Some(fenced);
    }
    let mut lines = Vec::new();
    for child in &node.children {
        if child.is_type(FENCE) || child.tag_name().is_some() {
            continue;
        }
        let mut current = String::new();
        flatten_lines(child, &mut current, &mut lines);
        if !current.trim().is_empty() {
            lines.push(current);
        }
    }
    let text = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    (!text.is_empty()).then_some(text)
}

fn flatten_lines(node: &Node, current: &mut String, lines: &mut Vec<String>) {
    match node.r#type.as_str() {
        TEXT => {
            if let Some(AttributeValue::String(content)) = node.attributes.get("content") {
                current.push_str(content);
            }
        }
        SOFTBREAK | HARDBREAK => lines.push(std::mem::take(current)),
        _ => {
            for child in &node.children {
                flatten_lines(child, current, lines);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::node::PARAGRAPH;

    #[test]
    fn test_fence_value() {
        let node = Node::tag("string-field")
            .with_child(Node::fence("js", "nope"))
            .with_child(Node::fence("value", "Acme Corp\n"));
        assert_eq!(extract_fence_value(&node), Some("Acme Corp".to_string()));
        assert_eq!(extract_fence_value(&Node::tag("string-field")), None);
    }

    #[test]
    fn test_option_items_split_marker_and_id() {
        let node = Node::tag("single-select").with_child(Node::list(vec![
            Node::item(Some("bullish"), "[x] Bullish"),
            Node::item(Some("bearish"), "[ ] Bearish"),
            Node::item(None, "Neutral"),
        ]));
        let items = extract_option_items(&node);
        assert_eq!(items.len(), 3);
        assert_eq!(
            items.first(),
            Some(&OptionItem {
                id: Some("bullish".to_string()),
                marker: Some("[x]".to_string()),
                label: "Bullish".to_string(),
                line: None,
            })
        );
        assert_eq!(items.get(1).and_then(|i| i.marker.as_deref()), Some("[ ]"));
        assert_eq!(items.get(2).and_then(|i| i.marker.as_deref()), None);
        assert_eq!(items.get(2).and_then(|i| i.id.as_deref()), None);
    }

    #[test]
    fn test_split_marker_ignores_links() {
        assert_eq!(split_marker("[x] Done"), (Some("[x]"), "Done"));
        assert_eq!(split_marker("[a](b) text"), (None, "[a](b) text"));
        assert_eq!(split_marker("[/]"), (Some("[/]"), ""));
        assert_eq!(split_marker("plain"), (None, "plain"));
    }

    #[test]
    fn test_table_text_from_softbreaks() {
        let paragraph = Node::new(PARAGRAPH)
            .with_child(Node::text("| Name | Age |"))
            .with_child(Node::new(SOFTBREAK))
            .with_child(Node::text("|---|---|"))
            .with_child(Node::new(SOFTBREAK))
            .with_child(Node::text("| Ada | 36 |"));
        let node = Node::tag("table-field").with_child(paragraph);
        assert_eq!(
            extract_table_text(&node),
            Some("| Name | Age |\n|---|---|\n| Ada | 36 |".to_string())
        );
        assert_eq!(extract_table_text(&Node::tag("table-field")), None);
    }
}
