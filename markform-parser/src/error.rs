use std::fmt;

use crate::model::FieldKind;

/// Parse errors: malformed or contradictory field declarations.
///
/// These are fatal to the field (and therefore the document) being parsed.
#[non_exhaustive]
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("no form tag found in document")]
    MissingForm,

    #[error("missing required attribute '{1}' on {2}, {0}")]
    MissingAttribute(Detail, &'static str, String),

    #[error("invalid identifier '{1}', {0}")]
    InvalidId(Detail, String),

    #[error("invalid value '{2}' for attribute '{1}', {0}")]
    InvalidAttributeValue(Detail, &'static str, String),

    #[error("attribute '{1}' is not allowed on {2} fields, {0}")]
    ForbiddenAttribute(Detail, &'static str, FieldKind),

    #[error("attribute '{1}' must not be greater than '{2}', {0}")]
    InvalidBounds(Detail, &'static str, &'static str),

    #[error("example '{1}' is not a valid {2}, {0}")]
    InvalidExample(Detail, String, FieldKind),

    #[error("placeholder '{1}' is not a valid {2}, {0}")]
    InvalidPlaceholder(Detail, String, FieldKind),

    #[error("option '{1}' has no id annotation, {0}")]
    MissingOptionId(Detail, String),

    #[error("duplicate option id '{1}', {0}")]
    DuplicateOptionId(Detail, String),

    #[error("marker '{1}' is not valid for {2}, {0}")]
    InvalidMarker(Detail, String, String),

    #[error("explicit checkboxes are always required, {0}")]
    ExplicitNotRequired(Detail),

    #[error("invalid state '{1}', {0}")]
    InvalidState(Detail, String),

    #[error("content is a {1} sentinel but state attribute says '{2}', {0}")]
    SentinelStateConflict(Detail, &'static str, String),

    #[error("required field cannot be skipped, {0}")]
    SkipRequired(Detail),

    #[error("state '{1}' requires an empty value, {0}")]
    StateRequiresEmpty(Detail, String),

    #[error("state 'answered' requires a value, {0}")]
    AnsweredWithoutValue(Detail),

    #[error("invalid column type '{1}', {0}")]
    InvalidColumnType(Detail, String),

    #[error("duplicate column id '{1}', {0}")]
    DuplicateColumnId(Detail, String),

    #[error("'{1}' has {2} entries but there are {3} columns, {0}")]
    ColumnCountMismatch(Detail, &'static str, usize, usize),

    #[error("'{1}' requires 'columnIds', {0}")]
    ColumnAttributeWithoutIds(Detail, &'static str),

    #[error("table has neither 'columnIds' nor a header row, {0}")]
    MissingTableSchema(Detail),

    #[error("invalid table separator row, {0}")]
    InvalidTableSeparator(Detail),

    #[error("duplicate field id '{1}' (first defined at line {2}), {0}")]
    DuplicateFieldId(Detail, String, LineDisplay),

    #[error("duplicate group id '{1}', {0}")]
    DuplicateGroupId(Detail, String),

    #[error("field groups cannot be nested, {0}")]
    NestedGroup(Detail),
}

impl Error {
    /// The location this error refers to, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&Detail> {
        match self {
            Self::MissingForm => None,
            Self::MissingAttribute(detail, ..)
            | Self::InvalidId(detail, ..)
            | Self::InvalidAttributeValue(detail, ..)
            | Self::ForbiddenAttribute(detail, ..)
            | Self::InvalidBounds(detail, ..)
            | Self::InvalidExample(detail, ..)
            | Self::InvalidPlaceholder(detail, ..)
            | Self::MissingOptionId(detail, ..)
            | Self::DuplicateOptionId(detail, ..)
            | Self::InvalidMarker(detail, ..)
            | Self::ExplicitNotRequired(detail)
            | Self::InvalidState(detail, ..)
            | Self::SentinelStateConflict(detail, ..)
            | Self::SkipRequired(detail)
            | Self::StateRequiresEmpty(detail, ..)
            | Self::AnsweredWithoutValue(detail)
            | Self::InvalidColumnType(detail, ..)
            | Self::DuplicateColumnId(detail, ..)
            | Self::ColumnCountMismatch(detail, ..)
            | Self::ColumnAttributeWithoutIds(detail, ..)
            | Self::MissingTableSchema(detail)
            | Self::InvalidTableSeparator(detail)
            | Self::DuplicateFieldId(detail, ..)
            | Self::DuplicateGroupId(detail, ..)
            | Self::NestedGroup(detail) => Some(detail),
        }
    }

    /// The id of the offending field, when the error is tied to one.
    #[must_use]
    pub fn field_id(&self) -> Option<&str> {
        self.detail()?.field_id.as_deref()
    }

    #[must_use]
    pub fn line(&self) -> Option<usize> {
        self.detail()?.line
    }

    /// Get advice for this error if available.
    /// Returns helpful information for resolving the error.
    #[must_use]
    pub fn advice(&self) -> Option<&'static str> {
        match self {
            Self::MissingForm => Some("Wrap the fields in a {% form id=\"...\" %} tag"),
            Self::InvalidId(..) => Some(
                "Identifiers start with a lowercase letter followed by lowercase letters, digits or '_'",
            ),
            Self::ForbiddenAttribute(..) => Some(
                "placeholder and examples only apply to fields where free text is typed in",
            ),
            Self::MissingOptionId(..) => Some("Annotate every option, e.g. `- [ ] Yes {% #yes %}`"),
            Self::InvalidMarker(..) => Some(
                "Valid markers are [ ], [x], [/], [*], [-] (multi), [ ], [x] (simple) and [ ], [y], [n] (explicit)",
            ),
            Self::SkipRequired(..) => Some(
                "Required fields must be answered; use %ABORT% if the field cannot be completed",
            ),
            Self::InvalidState(..) => Some("Valid states are: empty, answered, skipped, aborted"),
            Self::InvalidColumnType(..) => Some("Valid column types are: string, number, url, date, year"),
            Self::InvalidTableSeparator(..) => Some(
                "The row after the header (or after the type row) must look like |---|---|",
            ),
            Self::ExplicitNotRequired(..) => Some(
                "Explicit checkboxes need a yes/no answer for every option; drop required=false",
            ),
            Self::MissingAttribute(..)
            | Self::InvalidAttributeValue(..)
            | Self::InvalidBounds(..)
            | Self::InvalidExample(..)
            | Self::InvalidPlaceholder(..)
            | Self::DuplicateOptionId(..)
            | Self::SentinelStateConflict(..)
            | Self::StateRequiresEmpty(..)
            | Self::AnsweredWithoutValue(..)
            | Self::DuplicateColumnId(..)
            | Self::ColumnCountMismatch(..)
            | Self::ColumnAttributeWithoutIds(..)
            | Self::MissingTableSchema(..)
            | Self::DuplicateFieldId(..)
            | Self::DuplicateGroupId(..)
            | Self::NestedGroup(..) => None,
        }
    }
}

/// Where a parse error happened: the field it belongs to and the source line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Detail {
    pub field_id: Option<String>,
    pub line: Option<usize>,
}

impl Detail {
    #[must_use]
    pub fn new(field_id: Option<&str>, line: Option<usize>) -> Self {
        Self {
            field_id: field_id.map(str::to_string),
            line,
        }
    }
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.field_id, self.line) {
            (Some(id), Some(line)) => write!(f, "field: {id}, line: {line}"),
            (Some(id), None) => write!(f, "field: {id}"),
            (None, Some(line)) => write!(f, "line: {line}"),
            (None, None) => write!(f, "unknown location"),
        }
    }
}

/// An optional line number that prints as `?` when unknown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineDisplay(pub Option<usize>);

impl fmt::Display for LineDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(line) => write!(f, "{line}"),
            None => write!(f, "?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_display() {
        let detail = Detail::new(Some("company"), Some(12));
        assert_eq!(format!("{detail}"), "field: company, line: 12");
        assert_eq!(format!("{}", Detail::new(None, Some(3))), "line: 3");
        assert_eq!(format!("{}", Detail::default()), "unknown location");
    }

    #[test]
    fn test_error_skip_required_display() {
        let error = Error::SkipRequired(Detail::new(Some("name"), Some(4)));
        assert_eq!(
            format!("{error}"),
            "required field cannot be skipped, field: name, line: 4"
        );
        assert_eq!(error.field_id(), Some("name"));
        assert_eq!(error.line(), Some(4));
        assert!(error.advice().is_some());
    }

    #[test]
    fn test_error_duplicate_field_display() {
        let error = Error::DuplicateFieldId(
            Detail::new(Some("age"), Some(20)),
            "age".to_string(),
            LineDisplay(None),
        );
        assert_eq!(
            format!("{error}"),
            "duplicate field id 'age' (first defined at line ?), field: age, line: 20"
        );
    }
}
