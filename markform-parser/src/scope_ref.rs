//! Scope references: compact text addresses for a field, an option, a table
//! column or a single table cell.
//!
//! | Text                | Parsed as                      |
//! |---------------------|--------------------------------|
//! | `company`           | [`ScopeRef::Field`]            |
//! | `rating.bullish`    | [`ScopeRef::Option`] (see below) |
//! | `people.name[5]`    | [`ScopeRef::Cell`]             |
//!
//! Syntax alone cannot tell `field.option` from `field.column`, so the
//! two-segment form always parses as an option reference.
//! [`validate_scope_ref`] re-reads it as a column reference when the target
//! field turns out to be a table.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::{FieldKind, FieldResponse, FieldValue, FormSchema};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScopeRef {
    Field {
        field_id: String,
    },
    Option {
        field_id: String,
        option_id: String,
    },
    Column {
        field_id: String,
        column_id: String,
    },
    Cell {
        field_id: String,
        column_id: String,
        row_index: usize,
    },
}

impl ScopeRef {
    #[must_use]
    pub fn field(field_id: impl Into<String>) -> Self {
        Self::Field {
            field_id: field_id.into(),
        }
    }

    #[must_use]
    pub fn cell(field_id: impl Into<String>, column_id: impl Into<String>, row_index: usize) -> Self {
        Self::Cell {
            field_id: field_id.into(),
            column_id: column_id.into(),
            row_index,
        }
    }

    /// The field every reference ultimately points into.
    #[must_use]
    pub fn field_id(&self) -> &str {
        match self {
            Self::Field { field_id }
            | Self::Option { field_id, .. }
            | Self::Column { field_id, .. }
            | Self::Cell { field_id, .. } => field_id,
        }
    }
}

impl fmt::Display for ScopeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field { field_id } => write!(f, "{field_id}"),
            Self::Option {
                field_id,
                option_id,
            } => write!(f, "{field_id}.{option_id}"),
            Self::Column {
                field_id,
                column_id,
            } => write!(f, "{field_id}.{column_id}"),
            Self::Cell {
                field_id,
                column_id,
                row_index,
            } => write!(f, "{field_id}.{column_id}[{row_index}]"),
        }
    }
}

impl FromStr for ScopeRef {
    type Err = ScopeRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_scope_ref(s)
    }
}

impl Serialize for ScopeRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ScopeRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_scope_ref(&text).map_err(serde::de::Error::custom)
    }
}

/// Why a scope reference could not be parsed or does not resolve.
#[non_exhaustive]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeRefError {
    #[error("Invalid scope reference format '{0}': {1}")]
    Format(String, &'static str),

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Unknown option '{option_id}' for field '{field_id}'. Valid options: {valid}")]
    UnknownOption {
        field_id: String,
        option_id: String,
        valid: String,
    },

    #[error("Field '{field_id}' is {kind}, not selectable or table")]
    NotSelectableOrTable { field_id: String, kind: FieldKind },

    #[error("Field '{field_id}' is {kind}, not a table")]
    NotTable { field_id: String, kind: FieldKind },

    #[error("Unknown column '{column_id}' for field '{field_id}'. Valid columns: {valid}")]
    UnknownColumn {
        field_id: String,
        column_id: String,
        valid: String,
    },

    #[error("Row index {row_index} out of bounds for '{field_id}' ({row_count} rows)")]
    OutOfBounds {
        field_id: String,
        row_index: usize,
        row_count: usize,
    },
}

/// Whether `text` is a bare identifier: `[a-z][a-z0-9_]*`.
#[must_use]
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Parse the text form of a scope reference.
///
/// # Errors
///
/// Returns [`ScopeRefError::Format`] for anything that is not one of
/// `field`, `field.id` or `field.column[n]`.
pub fn parse_scope_ref(text: &str) -> Result<ScopeRef, ScopeRefError> {
    let format_error = |reason| ScopeRefError::Format(text.to_string(), reason);
    if text.is_empty() {
        return Err(format_error("empty reference"));
    }

    let (path, row_index) = match text.strip_suffix(']') {
        Some(head) => {
            let (path, index) = head
                .split_once('[')
                .ok_or_else(|| format_error("unbalanced brackets"))?;
            if index.is_empty() {
                return Err(format_error("empty row index"));
            }
            if !index.chars().all(|c| c.is_ascii_digit()) {
                return Err(format_error("row index must be a non-negative integer"));
            }
            let index = index
                .parse::<usize>()
                .map_err(|_| format_error("row index is too large"))?;
            (path, Some(index))
        }
        None => (text, None),
    };
    if path.contains(['[', ']']) {
        return Err(format_error("unbalanced brackets"));
    }

    let segments: Vec<&str> = path.split('.').collect();
    if let Some(bad) = segments.iter().find(|segment| !is_identifier(segment)) {
        return Err(format_error(if bad.is_empty() {
            "empty segment"
        } else {
            "identifiers must match [a-z][a-z0-9_]*"
        }));
    }

    match (segments.as_slice(), row_index) {
        ([field_id], None) => Ok(ScopeRef::field(*field_id)),
        ([field_id, option_id], None) => Ok(ScopeRef::Option {
            field_id: (*field_id).to_string(),
            option_id: (*option_id).to_string(),
        }),
        ([field_id, column_id], Some(row_index)) => {
            Ok(ScopeRef::cell(*field_id, *column_id, row_index))
        }
        ([_], Some(_)) => Err(format_error("a row index needs a column")),
        (_, _) => Err(format_error("too many segments")),
    }
}

/// Resolve a parsed reference against `schema`.
///
/// An `Option` reference into a table comes back as a `Column` reference.
/// Cell row indexes are only bounds-checked when `row_counts` is given.
///
/// # Errors
///
/// Returns the first reason the reference does not point at anything.
pub fn validate_scope_ref(
    scope: &ScopeRef,
    schema: &FormSchema,
    row_counts: Option<&BTreeMap<String, usize>>,
) -> Result<ScopeRef, ScopeRefError> {
    let field_id = scope.field_id();
    let field = schema
        .field(field_id)
        .ok_or_else(|| ScopeRefError::UnknownField(field_id.to_string()))?;
    let kind = field.kind();

    match scope {
        ScopeRef::Field { .. } => Ok(scope.clone()),
        ScopeRef::Option { option_id, .. } => {
            if let Some(options) = field.options() {
                if options.iter().any(|option| option.id == *option_id) {
                    Ok(scope.clone())
                } else {
                    Err(ScopeRefError::UnknownOption {
                        field_id: field_id.to_string(),
                        option_id: option_id.clone(),
                        valid: join_ids(options.iter().map(|option| option.id.as_str())),
                    })
                }
            } else if kind == FieldKind::Table {
                let column = ScopeRef::Column {
                    field_id: field_id.to_string(),
                    column_id: option_id.clone(),
                };
                validate_scope_ref(&column, schema, row_counts)
            } else {
                Err(ScopeRefError::NotSelectableOrTable {
                    field_id: field_id.to_string(),
                    kind,
                })
            }
        }
        ScopeRef::Column { column_id, .. } | ScopeRef::Cell { column_id, .. } => {
            let table = field.constraints.table().ok_or_else(|| ScopeRefError::NotTable {
                field_id: field_id.to_string(),
                kind,
            })?;
            if table.column(column_id).is_none() {
                return Err(ScopeRefError::UnknownColumn {
                    field_id: field_id.to_string(),
                    column_id: column_id.clone(),
                    valid: join_ids(table.column_ids()),
                });
            }
            if let ScopeRef::Cell { row_index, .. } = scope
                && let Some(row_counts) = row_counts
            {
                let row_count = row_counts.get(field_id).copied().unwrap_or(0);
                if *row_index >= row_count {
                    return Err(ScopeRefError::OutOfBounds {
                        field_id: field_id.to_string(),
                        row_index: *row_index,
                        row_count,
                    });
                }
            }
            Ok(scope.clone())
        }
    }
}

/// Live row counts of every table field, for [`validate_scope_ref`].
///
/// Tables without an answered value have zero rows.
#[must_use]
pub fn row_counts(
    schema: &FormSchema,
    responses: &BTreeMap<String, FieldResponse>,
) -> BTreeMap<String, usize> {
    schema
        .fields()
        .filter(|field| field.kind() == FieldKind::Table)
        .map(|field| {
            let count = match responses.get(&field.id).and_then(|response| response.value()) {
                Some(FieldValue::Table { rows }) => rows.len(),
                Some(_) | None => 0,
            };
            (field.id.clone(), count)
        })
        .collect()
}

fn join_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> String {
    ids.into_iter().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::model::{
        CellValue, ColumnType, Constraints, FieldDefinition, FieldGroup, FieldOption, Priority,
        Response, SingleSelectConstraints, StringConstraints, TableColumn, TableConstraints,
    };

    fn definition(id: &str, constraints: Constraints) -> FieldDefinition {
        FieldDefinition {
            id: id.to_string(),
            label: id.to_string(),
            required: false,
            priority: Priority::Medium,
            role: "agent".to_string(),
            validators: vec![],
            constraints,
            line: None,
        }
    }

    fn column(id: &str) -> TableColumn {
        TableColumn {
            id: id.to_string(),
            label: id.to_string(),
            column_type: ColumnType::String,
            required: false,
        }
    }

    fn schema() -> FormSchema {
        let rating = Constraints::SingleSelect(SingleSelectConstraints {
            options: ["bullish", "bearish"]
                .into_iter()
                .map(|id| FieldOption {
                    id: id.to_string(),
                    label: id.to_string(),
                })
                .collect(),
        });
        let films = Constraints::Table(TableConstraints {
            columns: vec![column("title"), column("year")],
            min_rows: None,
            max_rows: None,
        });
        FormSchema {
            id: "research".to_string(),
            title: None,
            groups: vec![FieldGroup {
                id: None,
                title: None,
                fields: vec![
                    definition("company", Constraints::String(StringConstraints::default())),
                    definition("rating", rating),
                    definition("films", films),
                ],
            }],
        }
    }

    #[rstest]
    #[case("company", ScopeRef::field("company"))]
    #[case("rating.bullish", ScopeRef::Option { field_id: "rating".to_string(), option_id: "bullish".to_string() })]
    #[case("people.name[5]", ScopeRef::cell("people", "name", 5))]
    #[case("table.col[0]", ScopeRef::cell("table", "col", 0))]
    fn test_parse_scope_ref(#[case] text: &str, #[case] expected: ScopeRef) {
        assert_eq!(parse_scope_ref(text), Ok(expected.clone()));
        assert_eq!(expected.to_string(), text);
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case(".company")]
    #[case("company.")]
    #[case("a..b")]
    #[case("Company")]
    #[case("1company")]
    #[case("my-field")]
    #[case("my field")]
    #[case("a.b.c")]
    #[case("a.b[]")]
    #[case("a.b[-1]")]
    #[case("a.b[x]")]
    #[case("a.b[1")]
    #[case("a.b1]")]
    #[case("a.b[1][2]")]
    #[case("a[1]")]
    #[case("a.b[+1]")]
    fn test_parse_scope_ref_rejects(#[case] text: &str) {
        assert!(
            matches!(parse_scope_ref(text), Err(ScopeRefError::Format(..))),
            "expected format error for {text:?}"
        );
    }

    #[test]
    fn test_validate_disambiguates_option_and_column() -> Result<(), ScopeRefError> {
        let schema = schema();
        let films = parse_scope_ref("films.title")?;
        assert_eq!(
            validate_scope_ref(&films, &schema, None)?,
            ScopeRef::Column {
                field_id: "films".to_string(),
                column_id: "title".to_string(),
            }
        );
        let rating = parse_scope_ref("rating.bullish")?;
        assert_eq!(validate_scope_ref(&rating, &schema, None)?, rating);
        Ok(())
    }

    #[test]
    fn test_validate_errors() {
        let schema = schema();
        let check = |text: &str| {
            parse_scope_ref(text)
                .and_then(|scope| validate_scope_ref(&scope, &schema, None))
                .map_err(|error| error.to_string())
        };
        assert_eq!(
            check("films.nonexistent"),
            Err("Unknown column 'nonexistent' for field 'films'. Valid columns: title, year".to_string())
        );
        assert_eq!(
            check("rating.neutral"),
            Err("Unknown option 'neutral' for field 'rating'. Valid options: bullish, bearish".to_string())
        );
        assert_eq!(check("missing"), Err("Unknown field 'missing'".to_string()));
        assert_eq!(
            check("company.x"),
            Err("Field 'company' is string, not selectable or table".to_string())
        );
        assert_eq!(
            check("company.x[0]"),
            Err("Field 'company' is string, not a table".to_string())
        );
    }

    #[test]
    fn test_cell_bounds_only_checked_with_row_counts() {
        let schema = schema();
        let cell = ScopeRef::cell("films", "year", 2);
        assert_eq!(validate_scope_ref(&cell, &schema, None), Ok(cell.clone()));

        let row = BTreeMap::from([(
            "title".to_string(),
            Response::Answered {
                value: CellValue::Text("Alien".to_string()),
            },
        )]);
        let responses = BTreeMap::from([(
            "films".to_string(),
            Response::Answered {
                value: FieldValue::Table {
                    rows: vec![row.clone(), row],
                },
            },
        )]);
        let counts = row_counts(&schema, &responses);
        assert_eq!(counts.get("films"), Some(&2));
        assert_eq!(
            validate_scope_ref(&cell, &schema, Some(&counts)),
            Err(ScopeRefError::OutOfBounds {
                field_id: "films".to_string(),
                row_index: 2,
                row_count: 2,
            })
        );
        let inside = ScopeRef::cell("films", "year", 1);
        assert_eq!(validate_scope_ref(&inside, &schema, Some(&counts)), Ok(inside.clone()));
    }

    #[test]
    fn test_serde_as_string() -> Result<(), serde_json::Error> {
        let scope = ScopeRef::cell("people", "name", 3);
        assert_eq!(serde_json::to_string(&scope)?, r#""people.name[3]""#);
        let back: ScopeRef = serde_json::from_str(r#""rating.bullish""#)?;
        assert_eq!(back.field_id(), "rating");
        assert!(serde_json::from_str::<ScopeRef>(r#""Bad.Ref""#).is_err());
        Ok(())
    }
}
