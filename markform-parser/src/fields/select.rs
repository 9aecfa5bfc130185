//! Option lists shared by the chooser kinds, and the two select kinds.
//!
//! Options are written as a list inside the tag, each carrying an id
//! annotation that the upstream parser has already pulled into the item's
//! `id` attribute:
//!
//! ```text
//! - [x] Bullish {% #bullish %}
//! - [ ] Bearish {% #bearish %}
//! ```

use rustc_hash::FxHashSet;

use crate::{
    constants::marker_state,
    content::{OptionItem, extract_fence_value, extract_option_items},
    error::{Detail, Error},
    model::{
        CheckboxState, Constraints, FieldOption, FieldValue, MultiSelectConstraints,
        ParsedField, SingleSelectConstraints,
    },
    scope_ref::is_identifier,
};

use super::common::FieldContext;

/// An option together with the marker it was written with.
pub(crate) struct MarkedOption {
    pub(crate) option: FieldOption,
    pub(crate) marker: Option<String>,
    pub(crate) line: Option<usize>,
}

/// Collect the options of a chooser field, checking ids.
pub(crate) fn marked_options(ctx: &FieldContext<'_>) -> Result<Vec<MarkedOption>, Error> {
    let mut seen = FxHashSet::default();
    extract_option_items(ctx.node)
        .into_iter()
        .map(|item| {
            let OptionItem {
                id,
                marker,
                label,
                line,
            } = item;
            let detail = Detail::new(Some(&ctx.id), line.or(ctx.line));
            let Some(id) = id else {
                return Err(Error::MissingOptionId(detail, label));
            };
            if !is_identifier(&id) {
                return Err(Error::InvalidId(detail, id));
            }
            if !seen.insert(id.clone()) {
                return Err(Error::DuplicateOptionId(detail, id));
            }
            Ok(MarkedOption {
                option: FieldOption { id, label },
                marker,
                line,
            })
        })
        .collect()
}

/// Whether a select option is marked as chosen. Selects are plain
/// checklists: only `[ ]` and `[x]` mean anything.
fn is_selected(ctx: &FieldContext<'_>, option: &MarkedOption) -> Result<bool, Error> {
    let Some(marker) = option.marker.as_deref() else {
        return Ok(false);
    };
    match marker_state(marker) {
        Some(CheckboxState::Todo) => Ok(false),
        Some(CheckboxState::Done) => Ok(true),
        Some(
            CheckboxState::Incomplete
            | CheckboxState::Active
            | CheckboxState::Na
            | CheckboxState::Unfilled
            | CheckboxState::Yes
            | CheckboxState::No,
        )
        | None => Err(Error::InvalidMarker(
            Detail::new(Some(&ctx.id), option.line.or(ctx.line)),
            marker.to_string(),
            format!("{} fields", ctx.kind),
        )),
    }
}

pub(crate) fn parse_single(mut ctx: FieldContext<'_>) -> Result<ParsedField, Error> {
    ctx.forbid_hints()?;
    let required = ctx.required()?;
    let marked = marked_options(&ctx)?;

    let mut selected = Vec::new();
    for option in &marked {
        if is_selected(&ctx, option)? {
            selected.push(option.option.id.clone());
        }
    }
    if selected.len() > 1 {
        ctx.warn(format!(
            "{} options are selected, keeping the first",
            selected.len()
        ));
    }
    let selected = selected.into_iter().next();

    let options = marked.into_iter().map(|marked| marked.option).collect();
    let definition = ctx.definition(
        required,
        Constraints::SingleSelect(SingleSelectConstraints { options }),
    )?;
    let raw = extract_fence_value(ctx.node);
    let response = ctx.resolve(required, raw.as_deref(), None, |_| {
        Ok(FieldValue::SingleSelect { selected })
    })?;
    Ok(ctx.finish(definition, response))
}

pub(crate) fn parse_multi(ctx: FieldContext<'_>) -> Result<ParsedField, Error> {
    ctx.forbid_hints()?;
    let required = ctx.required()?;
    let min_selections = ctx.count("minSelections")?;
    let max_selections = ctx.count("maxSelections")?;
    ctx.check_bounds(
        min_selections,
        max_selections,
        "minSelections",
        "maxSelections",
    )?;
    let marked = marked_options(&ctx)?;

    let mut selected = Vec::new();
    for option in &marked {
        if is_selected(&ctx, option)? {
            selected.push(option.option.id.clone());
        }
    }

    let options = marked.into_iter().map(|marked| marked.option).collect();
    let definition = ctx.definition(
        required,
        Constraints::MultiSelect(MultiSelectConstraints {
            options,
            min_selections,
            max_selections,
        }),
    )?;
    let raw = extract_fence_value(ctx.node);
    let response = ctx.resolve(required, raw.as_deref(), None, |_| {
        Ok(FieldValue::MultiSelect { selected })
    })?;
    Ok(ctx.finish(definition, response))
}
