//! `date-field` and `year-field`.

use crate::{
    coerce::{parse_date, parse_year},
    content::extract_fence_value,
    error::Error,
    model::{Constraints, DateConstraints, FieldValue, ParsedField, YearConstraints},
    sentinel::parse_sentinel,
};

use super::common::{FieldContext, trimmed};

pub(crate) fn parse_date_field(mut ctx: FieldContext<'_>) -> Result<ParsedField, Error> {
    let required = ctx.required()?;
    let min = date_bound(&ctx, "min")?;
    let max = date_bound(&ctx, "max")?;
    ctx.check_bounds(
        min.as_deref().and_then(parse_date),
        max.as_deref().and_then(parse_date),
        "min",
        "max",
    )?;
    let hints = ctx.hints(Some(|text| parse_date(text).is_some()))?;

    let definition = ctx.definition(
        required,
        Constraints::Date(DateConstraints { min, max, hints }),
    )?;
    let raw = extract_fence_value(ctx.node);
    // Kept verbatim; a malformed date is a validation issue.
    let response = ctx.resolve(required, raw.as_deref(), None, |raw| {
        Ok(FieldValue::Date {
            value: trimmed(raw),
        })
    })?;
    Ok(ctx.finish(definition, response))
}

fn date_bound(ctx: &FieldContext<'_>, name: &'static str) -> Result<Option<String>, Error> {
    match ctx.string(name)? {
        Some(text) if parse_date(text).is_some() => Ok(Some(text.trim().to_string())),
        Some(_) => Err(ctx.invalid(name)),
        None => Ok(None),
    }
}

pub(crate) fn parse_year_field(mut ctx: FieldContext<'_>) -> Result<ParsedField, Error> {
    let required = ctx.required()?;
    let min = year_bound(&ctx, "min")?;
    let max = year_bound(&ctx, "max")?;
    ctx.check_bounds(min, max, "min", "max")?;
    let hints = ctx.hints(Some(|text| parse_year(text).is_some()))?;

    let definition = ctx.definition(
        required,
        Constraints::Year(YearConstraints { min, max, hints }),
    )?;
    let raw = extract_fence_value(ctx.node);
    let text = trimmed(raw.as_deref());
    let value = text.as_deref().and_then(parse_year);
    if let Some(text) = &text
        && value.is_none()
        && parse_sentinel(text).is_none()
    {
        ctx.warn(format!("'{text}' is not a year, treating the field as empty"));
    }
    let response = ctx.resolve(required, raw.as_deref(), None, |_| {
        Ok(FieldValue::Year { value })
    })?;
    Ok(ctx.finish(definition, response))
}

#[allow(clippy::cast_possible_truncation)]
fn year_bound(ctx: &FieldContext<'_>, name: &'static str) -> Result<Option<i32>, Error> {
    match ctx.number(name)? {
        Some(year)
            if year.fract() == 0.0 && year >= f64::from(i32::MIN) && year <= f64::from(i32::MAX) =>
        {
            Ok(Some(year as i32))
        }
        Some(_) => Err(ctx.invalid(name)),
        None => Ok(None),
    }
}
