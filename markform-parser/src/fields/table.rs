use crate::{
    constants::{STATE_ABORTED, STATE_SKIPPED},
    content::extract_table_text,
    error::Error,
    model::{Constraints, FieldValue, ParsedField, TableConstraints},
    sentinel::parse_sentinel,
    table::{ParsedTable, explicit_columns, parse_table},
};

use super::common::FieldContext;

pub(crate) fn parse(ctx: FieldContext<'_>) -> Result<ParsedField, Error> {
    let detail = ctx.detail();
    let required = ctx.required()?;
    let min_rows = ctx.count("minRows")?;
    let max_rows = ctx.count("maxRows")?;
    ctx.check_bounds(min_rows, max_rows, "minRows", "maxRows")?;

    let explicit = explicit_columns(ctx.node, &detail)?;
    let labelled = ctx.node.attributes.contains_key("columnLabels");
    let text = extract_table_text(ctx.node);

    // A skipped or aborted table has no header to infer columns from; without
    // `columnIds` it simply has no columns.
    let blank = text.as_deref().is_none_or(|text| text.trim().is_empty());
    let declared_skip = matches!(ctx.string("state")?, Some(STATE_SKIPPED | STATE_ABORTED));
    let ParsedTable { columns, rows } = if text.as_deref().and_then(parse_sentinel).is_some()
        || (blank && declared_skip)
    {
        if explicit.is_none() {
            tracing::debug!(field = ?detail.field_id, "skipped table without a column schema");
        }
        ParsedTable {
            columns: explicit.unwrap_or_default(),
            rows: Vec::new(),
        }
    } else {
        parse_table(text.as_deref(), explicit, labelled, &detail)?
    };

    let definition = ctx.definition(
        required,
        Constraints::Table(TableConstraints {
            columns,
            min_rows,
            max_rows,
        }),
    )?;
    let response = ctx.resolve(required, text.as_deref(), None, |_| {
        Ok(FieldValue::Table { rows })
    })?;
    Ok(ctx.finish(definition, response))
}
