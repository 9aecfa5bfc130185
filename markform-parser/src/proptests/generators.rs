//! Input generators for property-based testing
#![allow(clippy::expect_used)]
use proptest::prelude::*;

/// Any string at all, including control characters and non-ASCII text.
pub fn any_text() -> impl Strategy<Value = String> {
    prop::string::string_regex(".*").expect("Failed to create any string strategy")
}

/// A valid identifier segment.
pub fn identifier() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,12}").expect("Failed to create identifier strategy")
}

/// Text in one of the four canonical scope reference shapes.
pub fn canonical_scope_ref() -> impl Strategy<Value = String> {
    prop_oneof![
        identifier(),
        (identifier(), identifier()).prop_map(|(field, option)| format!("{field}.{option}")),
        (identifier(), identifier(), 0..10_000usize)
            .prop_map(|(field, column, row)| format!("{field}.{column}[{row}]")),
    ]
}

/// Strings that look a bit like scope references but are often malformed.
pub fn scope_ref_like() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[a-zA-Z0-9_.\[\]\-]{0,24}")
        .expect("Failed to create scope-ref-like strategy")
}

/// A reason without parentheses or surrounding whitespace.
pub fn reason() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9][a-zA-Z0-9 ,.]{0,20}[a-zA-Z0-9]")
        .expect("Failed to create reason strategy")
}
