use crate::{
    model::{Response, TableConstraints, TableRow},
    scope_ref::ScopeRef,
    table::coerce_cell,
};

use super::{IssueCode, ValidationIssue};

/// Check a table's rows against its columns and row bounds.
///
/// A required table without `minRows` must have at least one row. Every cell
/// has to be present and answered, skipped or aborted; answered cells must
/// coerce to their column type. Skipped and aborted cells always pass.
#[must_use]
pub fn validate_table(
    field_id: &str,
    required: bool,
    constraints: &TableConstraints,
    rows: &[TableRow],
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let count = rows.len();
    let field = || ScopeRef::field(field_id);

    if let Some(min) = constraints.min_rows.or(required.then_some(1))
        && count < min
    {
        issues.push(ValidationIssue::error(
            IssueCode::MinRowsNotMet,
            format!("Table has {} but requires at least {min}", rows_text(count)),
            field(),
        ));
    }
    if let Some(max) = constraints.max_rows
        && count > max
    {
        issues.push(ValidationIssue::error(
            IssueCode::MaxRowsExceeded,
            format!("Table has {} but allows at most {max}", rows_text(count)),
            field(),
        ));
    }

    for (row_index, row) in rows.iter().enumerate() {
        for column in &constraints.columns {
            let cell = || ScopeRef::cell(field_id, &column.id, row_index);
            match row.get(&column.id) {
                None => issues.push(ValidationIssue::error(
                    IssueCode::CellMissing,
                    format!("Row {row_index} has no cell for column '{}'", column.id),
                    cell(),
                )),
                Some(Response::Unanswered) => issues.push(ValidationIssue::error(
                    IssueCode::CellEmpty,
                    format!(
                        "Row {row_index}, column '{}' must be answered, skipped or aborted",
                        column.id
                    ),
                    cell(),
                )),
                Some(Response::Answered { value }) => {
                    if let Err(reason) = coerce_cell(value, column.column_type) {
                        issues.push(ValidationIssue::error(
                            IssueCode::CellTypeMismatch,
                            format!("Row {row_index}, column '{}': {reason}", column.id),
                            cell(),
                        ));
                    }
                }
                Some(Response::Skipped { .. } | Response::Aborted { .. }) => {}
            }
        }
    }
    issues
}

fn rows_text(count: usize) -> String {
    if count == 1 {
        "1 row".to_string()
    } else {
        format!("{count} rows")
    }
}
