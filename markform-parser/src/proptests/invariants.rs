//! Invariants for scope references and sentinels

use proptest::prelude::*;

use crate::{
    scope_ref::{ScopeRef, parse_scope_ref},
    sentinel::{SentinelKind, detect_sentinel, parse_sentinel},
};

use super::generators::*;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 1000,
        max_shrink_iters: 10000,
        .. ProptestConfig::default()
    })]

    /// Canonical text survives a parse and display round trip unchanged.
    #[test]
    fn scope_ref_round_trips(text in canonical_scope_ref()) {
        let parsed = parse_scope_ref(&text);
        prop_assert!(parsed.is_ok(), "failed to parse {text:?}");
        if let Ok(scope) = parsed {
            prop_assert_eq!(scope.to_string(), text);
        }
    }

    /// Parsing returns an error value for malformed input, never panics.
    #[test]
    fn scope_ref_parse_never_panics(text in any_text()) {
        let _ = parse_scope_ref(&text);
    }

    /// Whatever parses is displayed in a form that parses back to itself.
    #[test]
    fn scope_ref_display_is_stable(text in scope_ref_like()) {
        if let Ok(scope) = parse_scope_ref(&text) {
            let again: Result<ScopeRef, _> = scope.to_string().parse();
            prop_assert_eq!(again.ok(), Some(scope));
        }
    }

    #[test]
    fn sentinel_detection_never_panics(text in any_text()) {
        let _ = detect_sentinel(&text);
        let _ = parse_sentinel(&text);
    }

    /// Every spelling of a sentinel with a reason is detected with that reason.
    #[test]
    fn sentinel_spellings_agree(reason in reason(), abort in any::<bool>()) {
        let (kind, name) = if abort {
            (SentinelKind::Abort, "ABORT")
        } else {
            (SentinelKind::Skip, "SKIP")
        };
        let canonical = format!("%{name}% ({reason})");
        for text in [
            canonical.clone(),
            format!("%{name}:{reason}%"),
            format!("%{name}({reason})%"),
            canonical.to_lowercase(),
        ] {
            let detected = detect_sentinel(&text);
            prop_assert_eq!(detected.as_ref().map(|s| s.kind), Some(kind));
            prop_assert_eq!(
                detected.and_then(|s| s.reason).map(|r| r.to_lowercase()),
                Some(reason.to_lowercase())
            );
        }
        let strict = parse_sentinel(&canonical);
        prop_assert_eq!(strict.and_then(|s| s.reason), Some(reason));
    }
}
