//! In-band `%SKIP%` / `%ABORT%` markers.
//!
//! Three spellings are recognised, each optionally carrying a reason:
//!
//! - canonical: `%SKIP%` or `%SKIP% (reason)`
//! - colon: `%SKIP:reason%`
//! - paren: `%SKIP(reason)%`
//!
//! [`parse_sentinel`] is what field parsing uses: it is case-sensitive and
//! only honours the canonical spelling. [`detect_sentinel`] is lenient and is
//! used to scan cells and already-parsed values.

use serde::{Deserialize, Serialize};

use crate::{
    constants::{ABORT_TOKEN, SKIP_TOKEN, STATE_ABORTED, STATE_SKIPPED},
    model::Response,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentinelKind {
    Skip,
    Abort,
}

impl SentinelKind {
    /// The canonical token, e.g. `%SKIP%`.
    #[must_use]
    pub fn token(&self) -> &'static str {
        match self {
            SentinelKind::Skip => SKIP_TOKEN,
            SentinelKind::Abort => ABORT_TOKEN,
        }
    }

    /// The `state` attribute value this sentinel implies.
    #[must_use]
    pub fn state(&self) -> &'static str {
        match self {
            SentinelKind::Skip => STATE_SKIPPED,
            SentinelKind::Abort => STATE_ABORTED,
        }
    }

    fn name(self) -> &'static str {
        let token = self.token();
        token
            .strip_prefix('%')
            .and_then(|t| t.strip_suffix('%'))
            .unwrap_or(token)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentinel {
    pub kind: SentinelKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Sentinel {
    fn new(kind: SentinelKind, reason: Option<&str>) -> Self {
        let reason = reason
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .map(str::to_string);
        Self { kind, reason }
    }

    /// The skipped or aborted response this sentinel stands for.
    #[must_use]
    pub fn into_response<T>(self) -> Response<T> {
        match self.kind {
            SentinelKind::Skip => Response::Skipped {
                reason: self.reason,
            },
            SentinelKind::Abort => Response::Aborted {
                reason: self.reason,
            },
        }
    }
}

/// Strict, canonical-form sentinel parsing.
///
/// Text after the token that is not a parenthesised reason is ignored and the
/// result is a bare sentinel: `%SKIP% later` reads as a skip without reason.
#[must_use]
pub fn parse_sentinel(content: &str) -> Option<Sentinel> {
    let content = content.trim();
    [SentinelKind::Skip, SentinelKind::Abort]
        .into_iter()
        .find_map(|kind| {
            let rest = content.strip_prefix(kind.token())?;
            Some(Sentinel::new(kind, canonical_reason(rest)))
        })
}

/// Lenient sentinel detection: case-insensitive, any of the three spellings.
#[must_use]
pub fn detect_sentinel(value: &str) -> Option<Sentinel> {
    let value = value.trim();
    let after_percent = value.strip_prefix('%')?;
    [SentinelKind::Skip, SentinelKind::Abort]
        .into_iter()
        .find_map(|kind| {
            let rest = strip_prefix_ignore_case(after_percent, kind.name())?;
            if let Some(canonical) = rest.strip_prefix('%') {
                Some(Sentinel::new(kind, canonical_reason(canonical)))
            } else if let Some(colon) = rest.strip_prefix(':') {
                let reason = colon.strip_suffix('%')?;
                Some(Sentinel::new(kind, Some(reason)))
            } else if let Some(paren) = rest.strip_prefix('(') {
                let reason = paren.strip_suffix(")%")?;
                Some(Sentinel::new(kind, Some(reason)))
            } else {
                None
            }
        })
}

fn canonical_reason(rest: &str) -> Option<&str> {
    let rest = rest.trim();
    rest.strip_prefix('(')?.strip_suffix(')')
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        value.get(prefix.len()..)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn sentinel(kind: SentinelKind, reason: Option<&str>) -> Option<Sentinel> {
        Some(Sentinel {
            kind,
            reason: reason.map(str::to_string),
        })
    }

    #[rstest]
    #[case("%SKIP%", sentinel(SentinelKind::Skip, None))]
    #[case("  %ABORT%\n", sentinel(SentinelKind::Abort, None))]
    #[case("%SKIP% (not applicable)", sentinel(SentinelKind::Skip, Some("not applicable")))]
    #[case("%ABORT%(source offline)", sentinel(SentinelKind::Abort, Some("source offline")))]
    #[case("%SKIP% ()", sentinel(SentinelKind::Skip, None))]
    #[case("%skip%", None)]
    #[case("%SKIP:reason%", None)]
    #[case("%SKIP(reason)%", None)]
    #[case("Acme %SKIP%", None)]
    #[case("", None)]
    fn test_parse_sentinel(#[case] input: &str, #[case] expected: Option<Sentinel>) {
        assert_eq!(parse_sentinel(input), expected);
    }

    // Trailing text without parentheses is swallowed rather than rejected.
    #[test]
    fn test_parse_sentinel_accepts_trailing_garbage_as_bare() {
        assert_eq!(
            parse_sentinel("%SKIP% garbage"),
            sentinel(SentinelKind::Skip, None)
        );
        assert_eq!(
            parse_sentinel("%ABORT% (unclosed"),
            sentinel(SentinelKind::Abort, None)
        );
    }

    #[rstest]
    #[case("%SKIP%", sentinel(SentinelKind::Skip, None))]
    #[case("%skip%", sentinel(SentinelKind::Skip, None))]
    #[case("%Abort% (gone)", sentinel(SentinelKind::Abort, Some("gone")))]
    #[case("%SKIP:not relevant%", sentinel(SentinelKind::Skip, Some("not relevant")))]
    #[case("%abort(timeout)%", sentinel(SentinelKind::Abort, Some("timeout")))]
    #[case("%SKIP:%", sentinel(SentinelKind::Skip, None))]
    #[case("%SKIP:unterminated", None)]
    #[case("%SKIPPED%", None)]
    #[case("skip", None)]
    #[case("%%", None)]
    fn test_detect_sentinel(#[case] input: &str, #[case] expected: Option<Sentinel>) {
        assert_eq!(detect_sentinel(input), expected);
    }

    #[test]
    fn test_into_response_keeps_reason() {
        let response: Response<String> = Sentinel::new(SentinelKind::Abort, Some(" later "))
            .into_response();
        assert_eq!(
            response,
            Response::Aborted {
                reason: Some("later".to_string())
            }
        );
    }
}
