//! Typed getters over a node's attribute map.
//!
//! Every getter returns `None` (or an empty list) both when the attribute is
//! absent and when it holds a value of the wrong shape. Whether a missing
//! attribute is an error is up to the caller.

use crate::model::{AttributeValue, Node, ValidatorRef};

#[must_use]
pub fn get_string_attr<'a>(node: &'a Node, name: &str) -> Option<&'a str> {
    match node.attributes.get(name)? {
        AttributeValue::String(value) => Some(value),
        AttributeValue::Null
        | AttributeValue::Bool(_)
        | AttributeValue::Number(_)
        | AttributeValue::Array(_)
        | AttributeValue::Object(_) => None,
    }
}

#[must_use]
pub fn get_number_attr(node: &Node, name: &str) -> Option<f64> {
    match node.attributes.get(name)? {
        AttributeValue::Number(value) => Some(*value),
        AttributeValue::Null
        | AttributeValue::Bool(_)
        | AttributeValue::String(_)
        | AttributeValue::Array(_)
        | AttributeValue::Object(_) => None,
    }
}

#[must_use]
pub fn get_boolean_attr(node: &Node, name: &str) -> Option<bool> {
    match node.attributes.get(name)? {
        AttributeValue::Bool(value) => Some(*value),
        AttributeValue::Null
        | AttributeValue::Number(_)
        | AttributeValue::String(_)
        | AttributeValue::Array(_)
        | AttributeValue::Object(_) => None,
    }
}

/// A string array attribute. A lone string is treated as a one-element array;
/// non-string array members are dropped.
#[must_use]
pub fn get_string_array_attr(node: &Node, name: &str) -> Option<Vec<String>> {
    match node.attributes.get(name)? {
        AttributeValue::String(value) => Some(vec![value.clone()]),
        AttributeValue::Array(values) => Some(
            values
                .iter()
                .filter_map(|value| match value {
                    AttributeValue::String(s) => Some(s.clone()),
                    AttributeValue::Null
                    | AttributeValue::Bool(_)
                    | AttributeValue::Number(_)
                    | AttributeValue::Array(_)
                    | AttributeValue::Object(_) => None,
                })
                .collect(),
        ),
        AttributeValue::Null
        | AttributeValue::Bool(_)
        | AttributeValue::Number(_)
        | AttributeValue::Object(_) => None,
    }
}

/// A non-negative integer attribute (counts and lengths).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn get_count_attr(node: &Node, name: &str) -> Option<usize> {
    let value = get_number_attr(node, name)?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
        Some(value as usize)
    } else {
        None
    }
}

/// The `validate=...` attribute.
///
/// Accepts a single id, an array of ids, `{id, ...params}` objects, or a
/// mixture. Entries without an id are dropped.
#[must_use]
pub fn get_validator_refs(node: &Node) -> Vec<ValidatorRef> {
    match node.attributes.get("validate") {
        Some(AttributeValue::Array(values)) => values.iter().filter_map(validator_ref).collect(),
        Some(value) => validator_ref(value).into_iter().collect(),
        None => Vec::new(),
    }
}

fn validator_ref(value: &AttributeValue) -> Option<ValidatorRef> {
    match value {
        AttributeValue::String(id) => Some(ValidatorRef::Id(id.clone())),
        AttributeValue::Object(entries) => {
            let Some(AttributeValue::String(id)) = entries.get("id") else {
                tracing::warn!(?entries, "validator reference without an id, ignoring");
                return None;
            };
            let params = entries
                .iter()
                .filter(|(key, _)| key.as_str() != "id")
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            Some(ValidatorRef::WithParams {
                id: id.clone(),
                params,
            })
        }
        AttributeValue::Null
        | AttributeValue::Bool(_)
        | AttributeValue::Number(_)
        | AttributeValue::Array(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_wrong_types_are_absent() {
        let node = Node::tag("string-field")
            .with_attribute("label", 3)
            .with_attribute("required", "yes")
            .with_attribute("min", "5");
        assert_eq!(get_string_attr(&node, "label"), None);
        assert_eq!(get_boolean_attr(&node, "required"), None);
        assert_eq!(get_number_attr(&node, "min"), None);
        assert_eq!(get_string_attr(&node, "missing"), None);
    }

    #[test]
    fn test_string_array_accepts_single_string() {
        let node = Node::tag("number-field")
            .with_attribute("examples", "42")
            .with_attribute(
                "other",
                vec![AttributeValue::from("a"), AttributeValue::from(1), AttributeValue::from("b")],
            );
        assert_eq!(
            get_string_array_attr(&node, "examples"),
            Some(vec!["42".to_string()])
        );
        assert_eq!(
            get_string_array_attr(&node, "other"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_count_rejects_fractions_and_negatives() {
        let node = Node::tag("string-list")
            .with_attribute("minItems", 2)
            .with_attribute("maxItems", 2.5)
            .with_attribute("itemMinLength", -1);
        assert_eq!(get_count_attr(&node, "minItems"), Some(2));
        assert_eq!(get_count_attr(&node, "maxItems"), None);
        assert_eq!(get_count_attr(&node, "itemMinLength"), None);
    }

    #[test]
    fn test_validator_refs() {
        let object = AttributeValue::Object(BTreeMap::from([
            ("id".to_string(), AttributeValue::from("min_words")),
            ("min".to_string(), AttributeValue::from(50)),
        ]));
        let node = Node::tag("string-field")
            .with_attribute("validate", vec![AttributeValue::from("no_lorem"), object]);
        let refs = get_validator_refs(&node);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs.first().map(ValidatorRef::id), Some("no_lorem"));
        assert_eq!(
            refs.get(1),
            Some(&ValidatorRef::WithParams {
                id: "min_words".to_string(),
                params: BTreeMap::from([("min".to_string(), AttributeValue::from(50))]),
            })
        );

        let single = Node::tag("string-field").with_attribute("validate", "no_lorem");
        assert_eq!(
            get_validator_refs(&single),
            vec![ValidatorRef::Id("no_lorem".to_string())]
        );
        assert!(get_validator_refs(&Node::tag("string-field")).is_empty());
    }
}
