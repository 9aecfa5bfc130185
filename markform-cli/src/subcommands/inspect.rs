use std::{io::Write, path::PathBuf};

use markform_parser::Options;

use crate::error;

/// Print the parsed form (schema, responses and warnings) as JSON
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Node tree of the document, as JSON
    pub file: PathBuf,

    /// Print compact JSON instead of pretty-printing it
    #[arg(long)]
    pub compact: bool,
}

pub fn run(args: &Args, options: &Options) -> miette::Result<()> {
    inspect(args, options).map_err(|e| error::display(&e))
}

fn inspect(args: &Args, options: &Options) -> anyhow::Result<()> {
    let form = super::load_form(&args.file, options)?;
    let mut stdout = std::io::stdout().lock();
    if args.compact {
        serde_json::to_writer(&mut stdout, &form)?;
    } else {
        serde_json::to_writer_pretty(&mut stdout, &form)?;
    }
    writeln!(stdout)?;
    Ok(())
}
