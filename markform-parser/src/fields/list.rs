//! `string-list` and `url-list`: one item per line of the value fence.

use crate::{
    coerce::is_http_url,
    content::extract_fence_value,
    error::Error,
    model::{Constraints, FieldKind, FieldValue, ListConstraints, ParsedField},
};

use super::common::{FieldContext, list_items};

pub(crate) fn parse(mut ctx: FieldContext<'_>) -> Result<ParsedField, Error> {
    let urls = ctx.kind == FieldKind::UrlList;
    let required = ctx.required()?;
    let min_items = ctx.count("minItems")?;
    let max_items = ctx.count("maxItems")?;
    ctx.check_bounds(min_items, max_items, "minItems", "maxItems")?;
    let item_min_length = ctx.count("itemMinLength")?;
    let item_max_length = ctx.count("itemMaxLength")?;
    ctx.check_bounds(
        item_min_length,
        item_max_length,
        "itemMinLength",
        "itemMaxLength",
    )?;
    let unique_items = ctx.flag("uniqueItems")?;
    let hints = ctx.hints(urls.then_some(is_http_url as fn(&str) -> bool))?;

    let constraints = ListConstraints {
        min_items,
        max_items,
        item_min_length,
        item_max_length,
        unique_items,
        hints,
    };
    let constraints = if urls {
        Constraints::UrlList(constraints)
    } else {
        Constraints::StringList(constraints)
    };
    let definition = ctx.definition(required, constraints)?;

    let raw = extract_fence_value(ctx.node);
    let response = ctx.resolve(required, raw.as_deref(), None, |raw| {
        let items = list_items(raw);
        Ok(if urls {
            FieldValue::UrlList { items }
        } else {
            FieldValue::StringList { items }
        })
    })?;
    Ok(ctx.finish(definition, response))
}
