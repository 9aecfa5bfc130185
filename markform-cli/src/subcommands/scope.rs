use std::path::PathBuf;

use markform_parser::{Options, ScopeRef, ScopeRefError, parse_scope_ref, row_counts, validate_scope_ref};

use crate::error;

/// Resolve scope references against a form
///
/// Each reference is printed in its resolved form: `field.id` comes back as
/// an option or a column reference depending on the field it names. Cell row
/// indexes are checked against the rows the document currently has.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Node tree of the document, as JSON
    pub file: PathBuf,

    /// References such as `rating`, `rating.bullish` or `films.title[0]`
    #[arg(required = true)]
    pub refs: Vec<String>,
}

pub fn run(args: &Args, options: &Options) -> miette::Result<()> {
    let form = super::load_form(&args.file, options).map_err(|e| error::display(&e))?;
    let counts = row_counts(&form.schema, &form.responses);

    let mut invalid = 0;
    for text in &args.refs {
        let resolved = parse_scope_ref(text)
            .and_then(|scope| validate_scope_ref(&scope, &form.schema, Some(&counts)));
        match resolved {
            Ok(scope) => println!("{text}\t{}", describe(&scope)),
            Err(e) => {
                invalid += 1;
                report(text, &e);
            }
        }
    }

    if invalid > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn describe(scope: &ScopeRef) -> String {
    match scope {
        ScopeRef::Field { field_id } => format!("field {field_id}"),
        ScopeRef::Option {
            field_id,
            option_id,
        } => format!("option {option_id} of {field_id}"),
        ScopeRef::Column {
            field_id,
            column_id,
        } => format!("column {column_id} of {field_id}"),
        ScopeRef::Cell {
            field_id,
            column_id,
            row_index,
        } => format!("cell {column_id}[{row_index}] of {field_id}"),
    }
}

fn report(text: &str, error: &ScopeRefError) {
    tracing::debug!(reference = text, ?error, "invalid scope reference");
    eprintln!("{text}\t{error}");
}
