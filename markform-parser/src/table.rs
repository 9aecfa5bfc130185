//! The pipe-table sub-parser used by `table-field`.
//!
//! Columns come either from explicit `columnIds` / `columnLabels` /
//! `columnTypes` attributes or from the table's own header row, optionally
//! followed by a row declaring each column's type:
//!
//! ```text
//! | Name   | Born          |
//! | string | year,required |
//! |--------|---------------|
//! | Ada    | 1815          |
//! ```
//!
//! Cells are coerced on a best-effort basis. A cell that should be a number
//! but is not stays as raw text; [`coerce_cell`] is the second, strict pass
//! that validation runs.

use std::str::FromStr;

use rustc_hash::FxHashSet;

use crate::{
    coerce::{is_http_url, parse_date, parse_number, parse_year},
    error::{Detail, Error},
    model::{
        AttributeValue, CellResponse, CellValue, ColumnType, Node, Response, TableColumn, TableRow,
    },
    scope_ref::is_identifier,
    sentinel::detect_sentinel,
};

const SEPARATOR: char = '|';

/// Columns and rows read from a table field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedTable {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<TableRow>,
}

/// Read the explicit column schema from a table field's attributes.
///
/// Returns `Ok(None)` when the field has no `columnIds`, in which case the
/// schema has to come from the table header.
///
/// # Errors
///
/// Fails on duplicate or malformed ids, unknown column types, label/type
/// counts that do not match the ids, and `columnLabels`/`columnTypes`
/// without `columnIds`.
pub fn explicit_columns(node: &Node, detail: &Detail) -> Result<Option<Vec<TableColumn>>, Error> {
    let Some(ids) = string_list(node, "columnIds", detail)? else {
        for name in ["columnLabels", "columnTypes"] {
            if node.attributes.contains_key(name) {
                return Err(Error::ColumnAttributeWithoutIds(detail.clone(), name));
            }
        }
        return Ok(None);
    };
    if ids.is_empty() {
        return Err(Error::InvalidAttributeValue(
            detail.clone(),
            "columnIds",
            "[]".to_string(),
        ));
    }

    let labels = string_list(node, "columnLabels", detail)?;
    if let Some(labels) = &labels
        && labels.len() != ids.len()
    {
        return Err(Error::ColumnCountMismatch(
            detail.clone(),
            "columnLabels",
            labels.len(),
            ids.len(),
        ));
    }

    let types = column_types(node, detail)?;
    if let Some(types) = &types
        && types.len() != ids.len()
    {
        return Err(Error::ColumnCountMismatch(
            detail.clone(),
            "columnTypes",
            types.len(),
            ids.len(),
        ));
    }

    let mut seen = FxHashSet::default();
    let mut columns = Vec::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
        let id = id.trim();
        if !is_identifier(id) {
            return Err(Error::InvalidId(detail.clone(), id.to_string()));
        }
        if !seen.insert(id) {
            return Err(Error::DuplicateColumnId(detail.clone(), id.to_string()));
        }
        let label = labels
            .as_ref()
            .and_then(|labels| labels.get(i))
            .map_or_else(|| id.to_string(), |label| label.trim().to_string());
        let (column_type, required) = types
            .as_ref()
            .and_then(|types| types.get(i))
            .copied()
            .unwrap_or_default();
        columns.push(TableColumn {
            id: id.to_string(),
            label,
            column_type,
            required,
        });
    }
    Ok(Some(columns))
}

/// Like [`get_string_array_attr`](crate::get_string_array_attr), but a value
/// that is not a string or an array of strings is an error rather than a
/// missing or shorter list.
fn string_list(node: &Node, name: &'static str, detail: &Detail) -> Result<Option<Vec<String>>, Error> {
    let invalid =
        |value: &AttributeValue| Error::InvalidAttributeValue(detail.clone(), name, value.to_string());
    match node.attributes.get(name) {
        None => Ok(None),
        Some(AttributeValue::String(value)) => Ok(Some(vec![value.clone()])),
        Some(AttributeValue::Array(values)) => values
            .iter()
            .map(|value| match value {
                AttributeValue::String(value) => Ok(value.clone()),
                other @ (AttributeValue::Null
                | AttributeValue::Bool(_)
                | AttributeValue::Number(_)
                | AttributeValue::Array(_)
                | AttributeValue::Object(_)) => Err(invalid(other)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(
            other @ (AttributeValue::Null
            | AttributeValue::Bool(_)
            | AttributeValue::Number(_)
            | AttributeValue::Object(_)),
        ) => Err(invalid(other)),
    }
}

/// `columnTypes` entries are either `"year"` or `{type: "year", required: true}`.
fn column_types(node: &Node, detail: &Detail) -> Result<Option<Vec<(ColumnType, bool)>>, Error> {
    let entries = match node.attributes.get("columnTypes") {
        None => return Ok(None),
        Some(AttributeValue::Array(entries)) => entries.as_slice(),
        Some(other @ AttributeValue::String(_)) => std::slice::from_ref(other),
        Some(
            other @ (AttributeValue::Null
            | AttributeValue::Bool(_)
            | AttributeValue::Number(_)
            | AttributeValue::Object(_)),
        ) => {
            return Err(Error::InvalidAttributeValue(
                detail.clone(),
                "columnTypes",
                other.to_string(),
            ));
        }
    };
    entries
        .iter()
        .map(|entry| match entry {
            AttributeValue::String(name) => Ok((column_type(name, detail)?, false)),
            AttributeValue::Object(fields) => {
                let Some(AttributeValue::String(name)) = fields.get("type") else {
                    return Err(Error::InvalidColumnType(detail.clone(), entry.to_string()));
                };
                let required = matches!(fields.get("required"), Some(AttributeValue::Bool(true)));
                Ok((column_type(name, detail)?, required))
            }
            AttributeValue::Null
            | AttributeValue::Bool(_)
            | AttributeValue::Number(_)
            | AttributeValue::Array(_) => {
                Err(Error::InvalidColumnType(detail.clone(), entry.to_string()))
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn column_type(name: &str, detail: &Detail) -> Result<ColumnType, Error> {
    ColumnType::from_str(name.trim())
        .map_err(|_| Error::InvalidColumnType(detail.clone(), name.to_string()))
}

/// Parse the table text of a field.
///
/// With `explicit` columns the text still starts with a header and a
/// separator row; the header only provides labels when `labelled` is false.
/// Without them the schema is inferred from the header.
///
/// # Errors
///
/// Fails when there is no schema at all, on a malformed separator row, and
/// when inferred column ids collide.
#[tracing::instrument(level = "trace", skip_all, fields(field = ?detail.field_id))]
pub fn parse_table(
    text: Option<&str>,
    explicit: Option<Vec<TableColumn>>,
    labelled: bool,
    detail: &Detail,
) -> Result<ParsedTable, Error> {
    let lines: Vec<&str> = text
        .unwrap_or_default()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let (columns, body) = match explicit {
        Some(mut columns) => {
            tracing::debug!("using explicit column schema");
            let Some((header, rest)) = lines.split_first() else {
                return Ok(ParsedTable {
                    columns,
                    rows: Vec::new(),
                });
            };
            let header = split_row(header);
            let (separator, body) = rest
                .split_first()
                .ok_or_else(|| Error::InvalidTableSeparator(detail.clone()))?;
            if !is_separator_row(&split_row(separator), header.len()) {
                return Err(Error::InvalidTableSeparator(detail.clone()));
            }
            if !labelled {
                for (column, label) in columns.iter_mut().zip(&header) {
                    if !label.is_empty() {
                        column.label.clone_from(label);
                    }
                }
            }
            (columns, body)
        }
        None => {
            tracing::debug!("inferring column schema from table header");
            inline_columns(&lines, detail)?
        }
    };

    let rows = body
        .iter()
        .map(|line| parse_row(line, &columns))
        .collect();
    Ok(ParsedTable { columns, rows })
}

/// Infer columns from the header (and optional type row), returning them with
/// the remaining data lines.
fn inline_columns<'a, 'b>(
    lines: &'b [&'a str],
    detail: &Detail,
) -> Result<(Vec<TableColumn>, &'b [&'a str]), Error> {
    let Some((header, rest)) = lines.split_first() else {
        return Err(Error::MissingTableSchema(detail.clone()));
    };
    let header = split_row(header);

    let mut seen = FxHashSet::default();
    let mut columns = Vec::with_capacity(header.len());
    for (i, label) in header.iter().enumerate() {
        // Ids have to stay addressable by scope refs, so a slug such as
        // `2024_sales` falls back to the positional id.
        let slug = slugify(label);
        let id = if is_identifier(&slug) {
            slug
        } else {
            tracing::debug!(label = %label, "header label is not an identifier, using column position");
            format!("col{i}")
        };
        if !seen.insert(id.clone()) {
            return Err(Error::DuplicateColumnId(detail.clone(), id));
        }
        columns.push(TableColumn {
            id,
            label: label.clone(),
            column_type: ColumnType::String,
            required: false,
        });
    }

    let (second, mut body) = rest
        .split_first()
        .ok_or_else(|| Error::InvalidTableSeparator(detail.clone()))?;
    let second = split_row(second);
    let separator = match type_row(&second, columns.len()) {
        Some(types) => {
            for (column, (column_type, required)) in columns.iter_mut().zip(types) {
                column.column_type = column_type;
                column.required = required;
            }
            let (separator, after) = body
                .split_first()
                .ok_or_else(|| Error::InvalidTableSeparator(detail.clone()))?;
            body = after;
            split_row(separator)
        }
        None => second,
    };
    if !is_separator_row(&separator, columns.len()) {
        return Err(Error::InvalidTableSeparator(detail.clone()));
    }
    Ok((columns, body))
}

/// The row's `type[,required]` declarations, if every cell is one.
fn type_row(cells: &[String], width: usize) -> Option<Vec<(ColumnType, bool)>> {
    if cells.len() != width {
        return None;
    }
    cells
        .iter()
        .map(|cell| {
            let mut parts = cell.split(',').map(str::trim);
            let column_type = ColumnType::from_str(parts.next()?).ok()?;
            let required = match parts.next() {
                None => false,
                Some("required") => true,
                Some(_) => return None,
            };
            parts.next().is_none().then_some((column_type, required))
        })
        .collect()
}

/// Whether every cell looks like `---`, `:--`, `--:` or `:-:`.
#[must_use]
pub fn is_separator_row(cells: &[String], width: usize) -> bool {
    cells.len() == width
        && cells.iter().all(|cell| {
            let cell = cell.strip_prefix(':').unwrap_or(cell);
            let cell = cell.strip_suffix(':').unwrap_or(cell);
            !cell.is_empty() && cell.chars().all(|c| c == '-')
        })
}

/// Split a pipe-table line into trimmed cells. One leading and one trailing
/// pipe are optional.
#[must_use]
pub fn split_row(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix(SEPARATOR).unwrap_or(line);
    let line = line.strip_suffix(SEPARATOR).unwrap_or(line);
    line.split(SEPARATOR)
        .map(|cell| cell.trim().to_string())
        .collect()
}

fn parse_row(line: &str, columns: &[TableColumn]) -> TableRow {
    let cells = split_row(line);
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let raw = cells.get(i).map_or("", String::as_str);
            (column.id.clone(), parse_cell_value(raw, column.column_type))
        })
        .collect()
}

/// Lower-case `label`, collapsing every run of non-alphanumerics into one `_`
/// and trimming underscores off both ends.
#[must_use]
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_underscore = false;
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_underscore && !slug.is_empty() {
                slug.push('_');
            }
            pending_underscore = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_underscore = true;
        }
    }
    slug
}

/// Best-effort coercion of one raw cell.
///
/// Empty cells are skipped, sentinels (any spelling) become skipped or aborted
/// cells. Anything else is answered; numbers and years that do not parse are
/// kept as text for validation to report.
#[must_use]
pub fn parse_cell_value(raw: &str, column_type: ColumnType) -> CellResponse {
    let raw = raw.trim();
    if raw.is_empty() {
        return Response::Skipped { reason: None };
    }
    if let Some(sentinel) = detect_sentinel(raw) {
        return sentinel.into_response();
    }
    let value = match column_type {
        ColumnType::Number => parse_number(raw).map(CellValue::Number),
        ColumnType::Year => parse_year(raw).map(|year| CellValue::Integer(i64::from(year))),
        ColumnType::String | ColumnType::Url | ColumnType::Date => None,
    };
    Response::Answered {
        value: value.unwrap_or_else(|| CellValue::Text(raw.to_string())),
    }
}

/// Strict coercion of an answered cell to its column type.
///
/// # Errors
///
/// Returns a human readable reason when the value is not a valid instance of
/// `column_type`.
#[allow(clippy::cast_precision_loss)]
pub fn coerce_cell(value: &CellValue, column_type: ColumnType) -> Result<CellValue, String> {
    match (column_type, value) {
        (ColumnType::String, CellValue::Text(_)) => Ok(value.clone()),
        (ColumnType::String, CellValue::Integer(_) | CellValue::Number(_)) => {
            Ok(CellValue::Text(value.to_string()))
        }
        (ColumnType::Number, CellValue::Number(_)) => Ok(value.clone()),
        (ColumnType::Number, CellValue::Integer(n)) => Ok(CellValue::Number(*n as f64)),
        (ColumnType::Number, CellValue::Text(text)) => parse_number(text)
            .map(CellValue::Number)
            .ok_or_else(|| format!("'{text}' is not a valid number")),
        (ColumnType::Year, CellValue::Integer(year)) => i32::try_from(*year)
            .map(|year| CellValue::Integer(i64::from(year)))
            .map_err(|_| format!("'{year}' is not a valid year")),
        (ColumnType::Year, CellValue::Number(n)) => {
            Err(format!("'{n}' is not a valid year"))
        }
        (ColumnType::Year, CellValue::Text(text)) => parse_year(text)
            .map(|year| CellValue::Integer(i64::from(year)))
            .ok_or_else(|| format!("'{text}' is not a valid year")),
        (ColumnType::Url, CellValue::Integer(_) | CellValue::Number(_) | CellValue::Text(_)) => {
            let text = value.to_string();
            if is_http_url(&text) {
                Ok(CellValue::Text(text))
            } else {
                Err(format!("'{text}' is not a valid URL"))
            }
        }
        (ColumnType::Date, CellValue::Integer(_) | CellValue::Number(_) | CellValue::Text(_)) => {
            let text = value.to_string();
            if parse_date(&text).is_some() {
                Ok(CellValue::Text(text))
            } else {
                Err(format!("'{text}' is not a valid date (expected YYYY-MM-DD)"))
            }
        }
    }
}
