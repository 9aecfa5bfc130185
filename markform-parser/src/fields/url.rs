use crate::{
    coerce::is_http_url,
    content::extract_fence_value,
    error::Error,
    model::{Constraints, FieldValue, ParsedField, UrlConstraints},
};

use super::common::{FieldContext, trimmed};

pub(crate) fn parse(mut ctx: FieldContext<'_>) -> Result<ParsedField, Error> {
    let required = ctx.required()?;
    let hints = ctx.hints(Some(is_http_url))?;

    let definition = ctx.definition(required, Constraints::Url(UrlConstraints { hints }))?;
    let raw = extract_fence_value(ctx.node);
    // Malformed URLs are kept; validation reports them.
    let response = ctx.resolve(required, raw.as_deref(), None, |raw| {
        Ok(FieldValue::Url {
            value: trimmed(raw),
        })
    })?;
    Ok(ctx.finish(definition, response))
}
