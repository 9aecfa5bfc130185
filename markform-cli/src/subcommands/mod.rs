use std::{fs, path::Path};

use anyhow::Context;
use markform_parser::{Node, Options, ParsedForm, parse_form};

pub mod check;
pub mod inspect;
pub mod scope;

/// Read a JSON node tree and parse the form in it.
#[tracing::instrument(skip(options))]
pub(crate) fn load_form(path: &Path, options: &Options) -> anyhow::Result<ParsedForm> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let root: Node = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a node tree", path.display()))?;
    let form = parse_form(&root, options).with_context(|| path.display().to_string())?;
    for warning in &form.warnings {
        tracing::warn!(
            file = %path.display(),
            field = %warning.field_id,
            line = ?warning.line,
            "{}",
            warning.message
        );
    }
    Ok(form)
}
