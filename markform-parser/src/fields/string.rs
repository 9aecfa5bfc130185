use crate::{
    content::extract_fence_value,
    error::Error,
    model::{Constraints, FieldValue, ParsedField, StringConstraints},
};

use super::common::{FieldContext, trimmed};

pub(crate) fn parse(mut ctx: FieldContext<'_>) -> Result<ParsedField, Error> {
    let required = ctx.required()?;
    let min_length = ctx.count("minLength")?;
    let max_length = ctx.count("maxLength")?;
    ctx.check_bounds(min_length, max_length, "minLength", "maxLength")?;
    let pattern = ctx.string("pattern")?.map(str::to_string);
    let hints = ctx.hints(None)?;

    let definition = ctx.definition(
        required,
        Constraints::String(StringConstraints {
            min_length,
            max_length,
            pattern,
            hints,
        }),
    )?;
    let raw = extract_fence_value(ctx.node);
    let response = ctx.resolve(required, raw.as_deref(), None, |raw| {
        Ok(FieldValue::String {
            value: trimmed(raw),
        })
    })?;
    Ok(ctx.finish(definition, response))
}
