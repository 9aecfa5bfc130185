// Vocabulary shared by the parsers: tag names, attribute names, markers and
// sentinel tokens.

use crate::model::{CheckboxState, Priority};

pub(crate) const DEFAULT_ROLE: &str = "agent";
pub(crate) const DEFAULT_PRIORITY: Priority = Priority::Medium;

pub(crate) const FORM_TAG: &str = "form";
pub(crate) const GROUP_TAG: &str = "field-group";

/// Info string of the fenced block holding a field's value.
pub(crate) const VALUE_FENCE: &str = "value";

pub(crate) const SKIP_TOKEN: &str = "%SKIP%";
pub(crate) const ABORT_TOKEN: &str = "%ABORT%";

/// Values accepted by the `state` attribute.
pub(crate) const STATE_EMPTY: &str = "empty";
pub(crate) const STATE_ANSWERED: &str = "answered";
pub(crate) const STATE_SKIPPED: &str = "skipped";
pub(crate) const STATE_ABORTED: &str = "aborted";

/// Checkbox markers and the state each one denotes.
///
/// `[ ]` maps to `todo`; explicit-mode fields read it as `unfilled`.
pub(crate) const CHECKBOX_MARKERS: &[(&str, CheckboxState)] = &[
    ("[ ]", CheckboxState::Todo),
    ("[x]", CheckboxState::Done),
    ("[X]", CheckboxState::Done),
    ("[/]", CheckboxState::Incomplete),
    ("[*]", CheckboxState::Active),
    ("[-]", CheckboxState::Na),
    ("[y]", CheckboxState::Yes),
    ("[Y]", CheckboxState::Yes),
    ("[n]", CheckboxState::No),
    ("[N]", CheckboxState::No),
];

/// Look up the state a marker denotes.
pub(crate) fn marker_state(marker: &str) -> Option<CheckboxState> {
    CHECKBOX_MARKERS
        .iter()
        .find_map(|(text, state)| (*text == marker).then_some(*state))
}
