//! Validation of parsed responses against their field definitions.
//!
//! Unlike parsing, validation never fails: every problem becomes a
//! [`ValidationIssue`] so that callers see all of them at once.

mod table;

use std::{collections::BTreeMap, fmt};

use regex::Regex;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

pub use table::validate_table;

use crate::{
    coerce::{is_http_url, parse_date},
    model::{
        CheckboxState, Constraints, FieldDefinition, FieldResponse, FieldValue, FormSchema,
        ListConstraints, Response,
    },
    scope_ref::ScopeRef,
    sentinel::detect_sentinel,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    RequiredMissing,
    KindMismatch,
    MinLength,
    MaxLength,
    PatternMismatch,
    InvalidPattern,
    MinValue,
    MaxValue,
    NotInteger,
    MinItems,
    MaxItems,
    ItemMinLength,
    ItemMaxLength,
    DuplicateItem,
    InvalidUrl,
    InvalidDate,
    UnknownOption,
    InvalidCheckboxState,
    MinSelections,
    MaxSelections,
    MinDone,
    SentinelValue,
    MinRowsNotMet,
    MaxRowsExceeded,
    CellMissing,
    CellEmpty,
    CellTypeMismatch,
}

impl IssueCode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::RequiredMissing => "REQUIRED_MISSING",
            IssueCode::KindMismatch => "KIND_MISMATCH",
            IssueCode::MinLength => "MIN_LENGTH",
            IssueCode::MaxLength => "MAX_LENGTH",
            IssueCode::PatternMismatch => "PATTERN_MISMATCH",
            IssueCode::InvalidPattern => "INVALID_PATTERN",
            IssueCode::MinValue => "MIN_VALUE",
            IssueCode::MaxValue => "MAX_VALUE",
            IssueCode::NotInteger => "NOT_INTEGER",
            IssueCode::MinItems => "MIN_ITEMS",
            IssueCode::MaxItems => "MAX_ITEMS",
            IssueCode::ItemMinLength => "ITEM_MIN_LENGTH",
            IssueCode::ItemMaxLength => "ITEM_MAX_LENGTH",
            IssueCode::DuplicateItem => "DUPLICATE_ITEM",
            IssueCode::InvalidUrl => "INVALID_URL",
            IssueCode::InvalidDate => "INVALID_DATE",
            IssueCode::UnknownOption => "UNKNOWN_OPTION",
            IssueCode::InvalidCheckboxState => "INVALID_CHECKBOX_STATE",
            IssueCode::MinSelections => "MIN_SELECTIONS",
            IssueCode::MaxSelections => "MAX_SELECTIONS",
            IssueCode::MinDone => "MIN_DONE",
            IssueCode::SentinelValue => "SENTINEL_VALUE",
            IssueCode::MinRowsNotMet => "MIN_ROWS_NOT_MET",
            IssueCode::MaxRowsExceeded => "MAX_ROWS_EXCEEDED",
            IssueCode::CellMissing => "CELL_MISSING",
            IssueCode::CellEmpty => "CELL_EMPTY",
            IssueCode::CellTypeMismatch => "CELL_TYPE_MISMATCH",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One problem found while validating.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub severity: Severity,
    pub message: String,
    /// What the issue is about: a field, an option or a table cell.
    #[serde(rename = "ref")]
    pub reference: ScopeRef,
}

impl ValidationIssue {
    #[must_use]
    pub fn error(code: IssueCode, message: impl Into<String>, reference: ScopeRef) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message: message.into(),
            reference,
        }
    }

    #[must_use]
    pub fn warning(code: IssueCode, message: impl Into<String>, reference: ScopeRef) -> Self {
        Self {
            code,
            severity: Severity::Warning,
            message: message.into(),
            reference,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.reference, self.code, self.message)
    }
}

/// Validate every field of `schema`. Fields with no entry in `responses`
/// count as unanswered.
#[must_use]
#[tracing::instrument(level = "trace", skip_all, fields(form = %schema.id))]
pub fn validate_form(
    schema: &FormSchema,
    responses: &BTreeMap<String, FieldResponse>,
) -> Vec<ValidationIssue> {
    let issues: Vec<_> = schema
        .fields()
        .flat_map(|field| {
            let response = responses.get(&field.id).unwrap_or(&Response::Unanswered);
            validate_field(field, response)
        })
        .collect();
    tracing::debug!(count = issues.len(), "validated form");
    issues
}

/// Validate one field's response.
///
/// Skipped and aborted fields are never reported. Unanswered fields are only
/// reported when required.
#[must_use]
pub fn validate_field(definition: &FieldDefinition, response: &FieldResponse) -> Vec<ValidationIssue> {
    let mut issues = Issues::new(definition);
    match response {
        Response::Skipped { .. } | Response::Aborted { .. } => {}
        Response::Unanswered => {
            if let Constraints::Table(table) = &definition.constraints {
                if definition.required {
                    issues
                        .0
                        .extend(validate_table(&definition.id, true, table, &[]));
                }
            } else if definition.required {
                issues.error(
                    IssueCode::RequiredMissing,
                    format!("Required field '{}' has no value", definition.label),
                );
            }
        }
        Response::Answered { value } => issues.answered(value),
    }
    issues.0
}

/// Issue collector for one field.
struct Issues<'a>(Vec<ValidationIssue>, &'a FieldDefinition);

impl<'a> Issues<'a> {
    fn new(definition: &'a FieldDefinition) -> Self {
        Self(Vec::new(), definition)
    }

    fn field(&self) -> ScopeRef {
        ScopeRef::field(&self.1.id)
    }

    fn option(&self, option_id: &str) -> ScopeRef {
        ScopeRef::Option {
            field_id: self.1.id.clone(),
            option_id: option_id.to_string(),
        }
    }

    fn error(&mut self, code: IssueCode, message: String) {
        let reference = self.field();
        self.0.push(ValidationIssue::error(code, message, reference));
    }

    fn answered(&mut self, value: &FieldValue) {
        let definition = self.1;
        if value.kind() != definition.kind() {
            self.error(
                IssueCode::KindMismatch,
                format!(
                    "Value is a {} but the field is a {}",
                    value.kind(),
                    definition.kind()
                ),
            );
            return;
        }
        for text in value.texts() {
            self.sentinel(text);
        }
        match &definition.constraints {
            Constraints::String(c) => {
                if let FieldValue::String { value: Some(text) } = value {
                    self.length(text, c.min_length, c.max_length);
                    if let Some(pattern) = &c.pattern {
                        self.pattern(text, pattern);
                    }
                }
            }
            Constraints::Number(c) => {
                if let FieldValue::Number { value: Some(number) } = value {
                    self.range(*number, c.min, c.max);
                    if c.integer && number.fract() != 0.0 {
                        self.error(
                            IssueCode::NotInteger,
                            format!("Value {number} must be an integer"),
                        );
                    }
                }
            }
            Constraints::StringList(c) => {
                if let FieldValue::StringList { items } = value {
                    self.list(items, c);
                }
            }
            Constraints::UrlList(c) => {
                if let FieldValue::UrlList { items } = value {
                    self.list(items, c);
                    for item in items {
                        self.url(item);
                    }
                }
            }
            Constraints::Url(_) => {
                if let FieldValue::Url { value: Some(url) } = value {
                    self.url(url);
                }
            }
            Constraints::Date(c) => {
                if let FieldValue::Date { value: Some(text) } = value {
                    self.date(text, c.min.as_deref(), c.max.as_deref());
                }
            }
            Constraints::Year(c) => {
                if let FieldValue::Year { value: Some(year) } = value {
                    self.range(f64::from(*year), c.min.map(f64::from), c.max.map(f64::from));
                }
            }
            Constraints::SingleSelect(_) => {
                if let FieldValue::SingleSelect {
                    selected: Some(selected),
                } = value
                {
                    self.known_option(selected);
                }
            }
            Constraints::MultiSelect(c) => {
                if let FieldValue::MultiSelect { selected } = value {
                    for id in selected {
                        self.known_option(id);
                    }
                    self.selections(selected.len(), c.min_selections, c.max_selections);
                }
            }
            Constraints::Checkboxes(c) => {
                if let FieldValue::Checkboxes { values } = value {
                    for (id, state) in values {
                        self.known_option(id);
                        if !state.is_valid_for(c.checkbox_mode) {
                            let reference = self.option(id);
                            self.0.push(ValidationIssue::error(
                                IssueCode::InvalidCheckboxState,
                                format!(
                                    "State '{state}' is not valid for {} checkboxes",
                                    c.checkbox_mode.as_str()
                                ),
                                reference,
                            ));
                        }
                    }
                    if let Some(min_done) = c.min_done {
                        let done = values
                            .values()
                            .filter(|state| matches!(state, CheckboxState::Done | CheckboxState::Yes))
                            .count();
                        if done < min_done {
                            self.error(
                                IssueCode::MinDone,
                                format!(
                                    "{done} of {} options are done but at least {min_done} are required",
                                    values.len()
                                ),
                            );
                        }
                    }
                }
            }
            Constraints::Table(c) => {
                if let FieldValue::Table { rows } = value {
                    self.0
                        .extend(validate_table(&definition.id, definition.required, c, rows));
                }
            }
        }
    }

    /// Answered text that still looks like a sentinel was written in a
    /// spelling the parser does not honour.
    fn sentinel(&mut self, text: &str) {
        if detect_sentinel(text).is_some() {
            let reference = self.field();
            self.0.push(ValidationIssue::warning(
                IssueCode::SentinelValue,
                format!("Value '{text}' looks like a sentinel; write %SKIP% or %ABORT% on its own"),
                reference,
            ));
        }
    }

    fn length(&mut self, text: &str, min: Option<usize>, max: Option<usize>) {
        let length = text.chars().count();
        if let Some(min) = min
            && length < min
        {
            self.error(
                IssueCode::MinLength,
                format!("Value has {length} characters but requires at least {min}"),
            );
        }
        if let Some(max) = max
            && length > max
        {
            self.error(
                IssueCode::MaxLength,
                format!("Value has {length} characters but allows at most {max}"),
            );
        }
    }

    fn pattern(&mut self, text: &str, pattern: &str) {
        match Regex::new(pattern) {
            Ok(regex) => {
                if !regex.is_match(text) {
                    self.error(
                        IssueCode::PatternMismatch,
                        format!("Value does not match pattern '{pattern}'"),
                    );
                }
            }
            Err(error) => self.error(
                IssueCode::InvalidPattern,
                format!("Pattern '{pattern}' is not a valid regular expression: {error}"),
            ),
        }
    }

    fn range(&mut self, value: f64, min: Option<f64>, max: Option<f64>) {
        if let Some(min) = min
            && value < min
        {
            self.error(
                IssueCode::MinValue,
                format!("Value {value} is less than the minimum {min}"),
            );
        }
        if let Some(max) = max
            && value > max
        {
            self.error(
                IssueCode::MaxValue,
                format!("Value {value} is greater than the maximum {max}"),
            );
        }
    }

    fn list(&mut self, items: &[String], c: &ListConstraints) {
        let count = items.len();
        if let Some(min) = c.min_items
            && count < min
        {
            self.error(
                IssueCode::MinItems,
                format!("List has {count} items but requires at least {min}"),
            );
        }
        if let Some(max) = c.max_items
            && count > max
        {
            self.error(
                IssueCode::MaxItems,
                format!("List has {count} items but allows at most {max}"),
            );
        }
        for item in items {
            let length = item.chars().count();
            if let Some(min) = c.item_min_length
                && length < min
            {
                self.error(
                    IssueCode::ItemMinLength,
                    format!("Item '{item}' has {length} characters but requires at least {min}"),
                );
            }
            if let Some(max) = c.item_max_length
                && length > max
            {
                self.error(
                    IssueCode::ItemMaxLength,
                    format!("Item '{item}' has {length} characters but allows at most {max}"),
                );
            }
        }
        if c.unique_items {
            let mut seen = FxHashSet::default();
            for item in items {
                if !seen.insert(item.as_str()) {
                    self.error(IssueCode::DuplicateItem, format!("Item '{item}' is repeated"));
                }
            }
        }
    }

    fn url(&mut self, text: &str) {
        if !is_http_url(text) {
            self.error(
                IssueCode::InvalidUrl,
                format!("'{text}' is not a valid http(s) URL"),
            );
        }
    }

    fn date(&mut self, text: &str, min: Option<&str>, max: Option<&str>) {
        let Some(date) = parse_date(text) else {
            self.error(
                IssueCode::InvalidDate,
                format!("'{text}' is not a valid date (expected YYYY-MM-DD)"),
            );
            return;
        };
        if let Some(min) = min
            && parse_date(min).is_some_and(|min| date < min)
        {
            self.error(
                IssueCode::MinValue,
                format!("Date {text} is before the minimum {min}"),
            );
        }
        if let Some(max) = max
            && parse_date(max).is_some_and(|max| date > max)
        {
            self.error(
                IssueCode::MaxValue,
                format!("Date {text} is after the maximum {max}"),
            );
        }
    }

    fn known_option(&mut self, option_id: &str) {
        if self.1.option(option_id).is_none() {
            let reference = self.option(option_id);
            self.0.push(ValidationIssue::error(
                IssueCode::UnknownOption,
                format!("'{option_id}' is not an option of this field"),
                reference,
            ));
        }
    }

    fn selections(&mut self, count: usize, min: Option<usize>, max: Option<usize>) {
        if let Some(min) = min
            && count < min
        {
            self.error(
                IssueCode::MinSelections,
                format!("{count} options selected but at least {min} are required"),
            );
        }
        if let Some(max) = max
            && count > max
        {
            self.error(
                IssueCode::MaxSelections,
                format!("{count} options selected but at most {max} are allowed"),
            );
        }
    }
}
