//! Progress tracking: how far along a form is.
//!
//! Every field gets a derived [`ProgressState`] computed from its value and
//! the validation issues that reference it. The per-field states are then
//! rolled up into [`ProgressCounts`] and a whole-form state.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    model::{
        CheckboxMode, CheckboxState, ColumnType, Constraints, FieldDefinition, FieldKind,
        FieldResponse, FieldValue, FormSchema, Response, ResponseState,
    },
    validate::ValidationIssue,
};

/// Shape of a form, independent of its values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StructureSummary {
    pub group_count: usize,
    pub field_count: usize,
    pub option_count: usize,
    pub column_count: usize,
    pub fields_by_kind: BTreeMap<FieldKind, usize>,
    /// Field id to kind.
    pub field_kinds: BTreeMap<String, FieldKind>,
    /// `field.option` to the kind of the owning field.
    pub qualified_options: BTreeMap<String, FieldKind>,
    /// `field.column` to the column's cell type.
    pub qualified_columns: BTreeMap<String, ColumnType>,
}

impl StructureSummary {
    /// Resolve a qualified `field.option` or `field.column` name.
    #[must_use]
    pub fn lookup(&self, qualified: &str) -> Option<Qualified> {
        if let Some(kind) = self.qualified_options.get(qualified) {
            return Some(Qualified::Option(*kind));
        }
        self.qualified_columns
            .get(qualified)
            .map(|column_type| Qualified::Column(*column_type))
    }
}

/// What a qualified name resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Qualified {
    Option(FieldKind),
    Column(ColumnType),
}

/// Build the structure summary in one pass over the schema.
#[must_use]
pub fn compute_structure_summary(schema: &FormSchema) -> StructureSummary {
    let mut summary = StructureSummary {
        group_count: schema.groups.len(),
        ..StructureSummary::default()
    };
    for field in schema.fields() {
        let kind = field.kind();
        summary.field_count += 1;
        *summary.fields_by_kind.entry(kind).or_default() += 1;
        summary.field_kinds.insert(field.id.clone(), kind);
        for option in field.options().unwrap_or_default() {
            summary.option_count += 1;
            summary
                .qualified_options
                .insert(format!("{}.{}", field.id, option.id), kind);
        }
        if let Some(table) = field.constraints.table() {
            for column in &table.columns {
                summary.column_count += 1;
                summary
                    .qualified_columns
                    .insert(format!("{}.{}", field.id, column.id), column.column_type);
            }
        }
    }
    summary
}

/// Derived progress of one field, or of the whole form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressState {
    Empty,
    Invalid,
    Incomplete,
    Complete,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldProgress {
    pub kind: FieldKind,
    pub required: bool,
    pub submitted: bool,
    pub state: ProgressState,
    /// Lifecycle state, with externally marked skips applied.
    pub response_state: ResponseState,
    /// Number of error-severity issues referencing this field.
    pub issue_count: usize,
    /// Options per state, for checkboxes fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkbox_progress: Option<BTreeMap<CheckboxState, usize>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProgressCounts {
    pub total: usize,
    pub required: usize,
    pub submitted: usize,
    pub complete: usize,
    pub incomplete: usize,
    pub invalid: usize,
    pub empty_required: usize,
    pub empty_optional: usize,
    pub answered: usize,
    pub skipped: usize,
    pub aborted: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub structure: StructureSummary,
    pub fields: BTreeMap<String, FieldProgress>,
    pub counts: ProgressCounts,
}

/// Whether a field carries a real value.
///
/// Checkboxes count as submitted once any option has left its mode's default
/// state.
#[must_use]
pub fn is_submitted(definition: &FieldDefinition, response: &FieldResponse) -> bool {
    let Some(value) = response.value() else {
        return false;
    };
    match (value, definition.checkbox_mode()) {
        (FieldValue::Checkboxes { values }, Some(mode)) => {
            let unchecked = CheckboxState::default_for(mode);
            values.values().any(|state| *state != unchecked)
        }
        (value, _) => !value.is_empty(None),
    }
}

/// Whether every checkbox has reached a final state for its mode.
fn checkboxes_complete(mode: CheckboxMode, values: &BTreeMap<String, CheckboxState>) -> bool {
    match mode {
        CheckboxMode::Simple => true,
        CheckboxMode::Explicit => !values.values().any(|state| *state == CheckboxState::Unfilled),
        CheckboxMode::Multi => !values.values().any(|state| {
            matches!(
                state,
                CheckboxState::Todo | CheckboxState::Incomplete | CheckboxState::Active
            )
        }),
    }
}

fn checkbox_tally(
    definition: &FieldDefinition,
    response: &FieldResponse,
) -> Option<BTreeMap<CheckboxState, usize>> {
    let Constraints::Checkboxes(constraints) = &definition.constraints else {
        return None;
    };
    let values = match response.value() {
        Some(FieldValue::Checkboxes { values }) => Some(values),
        Some(_) | None => None,
    };
    let unchecked = CheckboxState::default_for(constraints.checkbox_mode);
    let mut tally = BTreeMap::new();
    for option in &constraints.options {
        let state = values
            .and_then(|values| values.get(&option.id))
            .copied()
            .unwrap_or(unchecked);
        *tally.entry(state).or_default() += 1;
    }
    Some(tally)
}

/// Progress of one field.
#[must_use]
pub fn compute_field_progress(
    definition: &FieldDefinition,
    response: &FieldResponse,
    issues: &[ValidationIssue],
    externally_skipped: bool,
) -> FieldProgress {
    let submitted = is_submitted(definition, response);
    let issue_count = issues
        .iter()
        .filter(|issue| issue.is_error() && issue.reference.field_id() == definition.id)
        .count();

    let state = if !submitted {
        ProgressState::Empty
    } else if issue_count > 0 {
        ProgressState::Invalid
    } else {
        match (response, definition.checkbox_mode()) {
            (
                Response::Answered {
                    value: FieldValue::Checkboxes { values },
                },
                Some(mode),
            ) if !checkboxes_complete(mode, values) => ProgressState::Incomplete,
            _ => ProgressState::Complete,
        }
    };

    FieldProgress {
        kind: definition.kind(),
        required: definition.required,
        submitted,
        state,
        response_state: if externally_skipped {
            ResponseState::Skipped
        } else {
            response.state()
        },
        issue_count,
        checkbox_progress: checkbox_tally(definition, response),
    }
}

/// Compute per-field progress and the aggregate counts for a form.
///
/// `skipped` holds ids of fields marked skipped outside the document (for
/// example by the agent filling the form in); they count as skipped
/// regardless of their response.
#[must_use]
#[tracing::instrument(level = "trace", skip_all, fields(form = %schema.id))]
pub fn compute_progress_summary(
    schema: &FormSchema,
    responses: &BTreeMap<String, FieldResponse>,
    issues: &[ValidationIssue],
    skipped: &BTreeSet<String>,
) -> ProgressSummary {
    let mut fields = BTreeMap::new();
    let mut counts = ProgressCounts::default();

    for definition in schema.fields() {
        let response = responses
            .get(&definition.id)
            .unwrap_or(&Response::Unanswered);
        let progress =
            compute_field_progress(definition, response, issues, skipped.contains(&definition.id));

        counts.total += 1;
        if progress.required {
            counts.required += 1;
        }
        if progress.submitted {
            counts.submitted += 1;
        }
        match progress.state {
            ProgressState::Complete => counts.complete += 1,
            ProgressState::Incomplete => counts.incomplete += 1,
            ProgressState::Invalid => counts.invalid += 1,
            ProgressState::Empty if progress.required => counts.empty_required += 1,
            ProgressState::Empty => counts.empty_optional += 1,
        }
        match progress.response_state {
            ResponseState::Answered => counts.answered += 1,
            ResponseState::Skipped => counts.skipped += 1,
            ResponseState::Aborted => counts.aborted += 1,
            ResponseState::Unanswered => {}
        }
        fields.insert(definition.id.clone(), progress);
    }

    tracing::debug!(?counts, "computed progress");
    ProgressSummary {
        structure: compute_structure_summary(schema),
        fields,
        counts,
    }
}

/// Roll the counts up into a single state for the whole form.
#[must_use]
pub fn compute_form_state(counts: &ProgressCounts) -> ProgressState {
    if counts.invalid > 0 {
        ProgressState::Invalid
    } else if counts.incomplete > 0 {
        ProgressState::Incomplete
    } else if counts.empty_required == 0 {
        ProgressState::Complete
    } else if counts.submitted > 0 {
        ProgressState::Incomplete
    } else {
        ProgressState::Empty
    }
}

/// Whether the form can be considered finished.
///
/// Once any field has been skipped, every field must be addressed: answered
/// or skipped. Before that, only invalid, incomplete and empty required
/// fields block completion.
#[must_use]
pub fn is_form_complete(counts: &ProgressCounts) -> bool {
    let base = counts.invalid == 0 && counts.incomplete == 0 && counts.empty_required == 0;
    if counts.skipped > 0 {
        base && counts.answered + counts.skipped == counts.total
    } else {
        base
    }
}
