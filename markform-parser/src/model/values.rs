//! Field values and the four-state response lifecycle.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use super::{CheckboxMode, FieldKind};

/// State of one checkbox option. Which states are legal depends on the
/// field's [`CheckboxMode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckboxState {
    Todo,
    Done,
    Incomplete,
    Active,
    Na,
    Unfilled,
    Yes,
    No,
}

impl CheckboxState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckboxState::Todo => "todo",
            CheckboxState::Done => "done",
            CheckboxState::Incomplete => "incomplete",
            CheckboxState::Active => "active",
            CheckboxState::Na => "na",
            CheckboxState::Unfilled => "unfilled",
            CheckboxState::Yes => "yes",
            CheckboxState::No => "no",
        }
    }

    /// Whether this state belongs to the state set of `mode`.
    #[must_use]
    pub fn is_valid_for(&self, mode: CheckboxMode) -> bool {
        match mode {
            CheckboxMode::Multi => matches!(
                self,
                CheckboxState::Todo
                    | CheckboxState::Done
                    | CheckboxState::Incomplete
                    | CheckboxState::Active
                    | CheckboxState::Na
            ),
            CheckboxMode::Simple => matches!(self, CheckboxState::Todo | CheckboxState::Done),
            CheckboxMode::Explicit => matches!(
                self,
                CheckboxState::Unfilled | CheckboxState::Yes | CheckboxState::No
            ),
        }
    }

    /// The unchecked state an option starts in under `mode`.
    #[must_use]
    pub fn default_for(mode: CheckboxMode) -> Self {
        match mode {
            CheckboxMode::Multi | CheckboxMode::Simple => CheckboxState::Todo,
            CheckboxMode::Explicit => CheckboxState::Unfilled,
        }
    }
}

impl fmt::Display for CheckboxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The content of one table cell.
///
/// Parsing only does best-effort coercion: a number that does not parse is
/// kept as [`CellValue::Text`] and reported later by validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(value) => write!(f, "{value}"),
            CellValue::Number(value) => write!(f, "{value}"),
            CellValue::Text(value) => f.write_str(value),
        }
    }
}

/// The lifecycle state of a response, without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseState {
    Unanswered,
    Answered,
    Skipped,
    Aborted,
}

/// A response to a field (`T = FieldValue`) or to a table cell
/// (`T = CellValue`).
///
/// Skipped and aborted responses never carry a value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Response<T> {
    Unanswered,
    Answered {
        value: T,
    },
    Skipped {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    Aborted {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl<T> Response<T> {
    #[must_use]
    pub fn state(&self) -> ResponseState {
        match self {
            Response::Unanswered => ResponseState::Unanswered,
            Response::Answered { .. } => ResponseState::Answered,
            Response::Skipped { .. } => ResponseState::Skipped,
            Response::Aborted { .. } => ResponseState::Aborted,
        }
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        if let Response::Answered { value } = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Response::Skipped { reason } | Response::Aborted { reason } => reason.as_deref(),
            Response::Unanswered | Response::Answered { .. } => None,
        }
    }
}

pub type FieldResponse = Response<FieldValue>;
pub type CellResponse = Response<CellValue>;

/// One table row, keyed by column id.
pub type TableRow = BTreeMap<String, CellResponse>;

/// The value of a field, mirroring its [`FieldKind`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldValue {
    String { value: Option<String> },
    Number { value: Option<f64> },
    StringList { items: Vec<String> },
    SingleSelect { selected: Option<String> },
    /// Selected option ids, in option order.
    MultiSelect { selected: Vec<String> },
    Checkboxes { values: BTreeMap<String, CheckboxState> },
    Url { value: Option<String> },
    UrlList { items: Vec<String> },
    Date { value: Option<String> },
    Year { value: Option<i32> },
    Table { rows: Vec<TableRow> },
}

impl FieldValue {
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::String { .. } => FieldKind::String,
            FieldValue::Number { .. } => FieldKind::Number,
            FieldValue::StringList { .. } => FieldKind::StringList,
            FieldValue::SingleSelect { .. } => FieldKind::SingleSelect,
            FieldValue::MultiSelect { .. } => FieldKind::MultiSelect,
            FieldValue::Checkboxes { .. } => FieldKind::Checkboxes,
            FieldValue::Url { .. } => FieldKind::Url,
            FieldValue::UrlList { .. } => FieldKind::UrlList,
            FieldValue::Date { .. } => FieldKind::Date,
            FieldValue::Year { .. } => FieldKind::Year,
            FieldValue::Table { .. } => FieldKind::Table,
        }
    }

    /// Whether the value counts as "no answer".
    ///
    /// Checkboxes are empty when every option still sits in its mode's
    /// default unchecked state; `mode` is ignored for every other kind.
    #[must_use]
    pub fn is_empty(&self, mode: Option<CheckboxMode>) -> bool {
        match self {
            FieldValue::String { value } | FieldValue::Url { value } | FieldValue::Date { value } => {
                value.is_none()
            }
            FieldValue::Number { value } => value.is_none(),
            FieldValue::Year { value } => value.is_none(),
            FieldValue::StringList { items } | FieldValue::UrlList { items } => items.is_empty(),
            FieldValue::SingleSelect { selected } => selected.is_none(),
            FieldValue::MultiSelect { selected } => selected.is_empty(),
            FieldValue::Checkboxes { values } => {
                let unchecked = CheckboxState::default_for(mode.unwrap_or_default());
                values.values().all(|state| *state == unchecked)
            }
            FieldValue::Table { rows } => rows.is_empty(),
        }
    }

    /// The text-like payloads of this value, for checks that apply to every
    /// string the user typed (single strings and list items).
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        match self {
            FieldValue::String { value } | FieldValue::Url { value } | FieldValue::Date { value } => {
                value.as_deref().into_iter().collect()
            }
            FieldValue::StringList { items } | FieldValue::UrlList { items } => {
                items.iter().map(String::as_str).collect()
            }
            FieldValue::Number { .. }
            | FieldValue::Year { .. }
            | FieldValue::SingleSelect { .. }
            | FieldValue::MultiSelect { .. }
            | FieldValue::Checkboxes { .. }
            | FieldValue::Table { .. } => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkbox_state_sets() {
        assert!(CheckboxState::Active.is_valid_for(CheckboxMode::Multi));
        assert!(!CheckboxState::Active.is_valid_for(CheckboxMode::Simple));
        assert!(!CheckboxState::Done.is_valid_for(CheckboxMode::Explicit));
        assert!(CheckboxState::No.is_valid_for(CheckboxMode::Explicit));
        assert_eq!(
            CheckboxState::default_for(CheckboxMode::Explicit),
            CheckboxState::Unfilled
        );
    }

    #[test]
    fn test_checkboxes_emptiness_depends_on_mode() {
        let values = BTreeMap::from([
            ("a".to_string(), CheckboxState::Unfilled),
            ("b".to_string(), CheckboxState::Unfilled),
        ]);
        let value = FieldValue::Checkboxes { values };
        assert!(value.is_empty(Some(CheckboxMode::Explicit)));
        assert!(!value.is_empty(Some(CheckboxMode::Multi)));
    }

    #[test]
    fn test_response_wire_format() -> Result<(), serde_json::Error> {
        let skipped: FieldResponse = Response::Skipped {
            reason: Some("not applicable".to_string()),
        };
        assert_eq!(
            serde_json::to_string(&skipped)?,
            r#"{"state":"skipped","reason":"not applicable"}"#
        );
        let answered: FieldResponse = Response::Answered {
            value: FieldValue::Year { value: Some(2024) },
        };
        assert_eq!(
            serde_json::to_string(&answered)?,
            r#"{"state":"answered","value":{"kind":"year","value":2024}}"#
        );
        Ok(())
    }
}
