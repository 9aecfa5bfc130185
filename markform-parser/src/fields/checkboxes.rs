use std::collections::BTreeMap;

use crate::{
    constants::marker_state,
    content::extract_fence_value,
    error::{Detail, Error},
    model::{
        ApprovalMode, CheckboxMode, CheckboxState, CheckboxesConstraints, Constraints,
        FieldValue, ParsedField,
    },
};

use super::{
    common::FieldContext,
    select::{MarkedOption, marked_options},
};

pub(crate) fn parse(ctx: FieldContext<'_>) -> Result<ParsedField, Error> {
    ctx.forbid_hints()?;
    let checkbox_mode: CheckboxMode = ctx.enumerated("checkboxMode")?;
    let approval_mode: ApprovalMode = ctx.enumerated("approvalMode")?;
    let min_done = ctx.count("minDone")?;

    let required = match checkbox_mode {
        CheckboxMode::Explicit => {
            if ctx.node.attributes.contains_key("required") && !ctx.required()? {
                return Err(Error::ExplicitNotRequired(ctx.detail()));
            }
            true
        }
        CheckboxMode::Multi | CheckboxMode::Simple => ctx.required()?,
    };

    let marked = marked_options(&ctx)?;
    let mut values = BTreeMap::new();
    for option in &marked {
        values.insert(option.option.id.clone(), state(&ctx, option, checkbox_mode)?);
    }

    let options = marked.into_iter().map(|marked| marked.option).collect();
    let definition = ctx.definition(
        required,
        Constraints::Checkboxes(CheckboxesConstraints {
            options,
            checkbox_mode,
            approval_mode,
            min_done,
        }),
    )?;
    let raw = extract_fence_value(ctx.node);
    let response = ctx.resolve(required, raw.as_deref(), Some(checkbox_mode), |_| {
        Ok(FieldValue::Checkboxes { values })
    })?;
    Ok(ctx.finish(definition, response))
}

/// The initial state of one option, from its marker.
fn state(
    ctx: &FieldContext<'_>,
    option: &MarkedOption,
    mode: CheckboxMode,
) -> Result<CheckboxState, Error> {
    let Some(marker) = option.marker.as_deref() else {
        return Ok(CheckboxState::default_for(mode));
    };
    // `[ ]` means "not answered yet" in every mode.
    let state = marker_state(marker).map(|state| {
        if state == CheckboxState::Todo && mode == CheckboxMode::Explicit {
            CheckboxState::Unfilled
        } else {
            state
        }
    });
    match state {
        Some(state) if state.is_valid_for(mode) => Ok(state),
        Some(_) | None => Err(Error::InvalidMarker(
            Detail::new(Some(&ctx.id), option.line.or(ctx.line)),
            marker.to_string(),
            format!("checkboxMode={}", mode.as_str()),
        )),
    }
}
