use crate::{
    coerce::parse_number,
    content::extract_fence_value,
    error::Error,
    model::{Constraints, FieldValue, NumberConstraints, ParsedField},
    sentinel::parse_sentinel,
};

use super::common::{FieldContext, trimmed};

pub(crate) fn parse(mut ctx: FieldContext<'_>) -> Result<ParsedField, Error> {
    let required = ctx.required()?;
    let min = ctx.number("min")?;
    let max = ctx.number("max")?;
    ctx.check_bounds(min, max, "min", "max")?;
    let integer = ctx.flag("integer")?;
    let hints = ctx.hints(Some(|text| parse_number(text).is_some()))?;

    let definition = ctx.definition(
        required,
        Constraints::Number(NumberConstraints {
            min,
            max,
            integer,
            hints,
        }),
    )?;
    let raw = extract_fence_value(ctx.node);
    let text = trimmed(raw.as_deref());
    let value = text.as_deref().and_then(parse_number);
    if let Some(text) = &text
        && value.is_none()
        && parse_sentinel(text).is_none()
    {
        ctx.warn(format!("'{text}' is not a number, treating the field as empty"));
    }
    let response = ctx.resolve(required, raw.as_deref(), None, |_| {
        Ok(FieldValue::Number { value })
    })?;
    Ok(ctx.finish(definition, response))
}
