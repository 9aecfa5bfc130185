use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use markform_parser::{
    Options, ProgressCounts, ProgressState, ValidationIssue, compute_form_state,
    compute_progress_summary, is_form_complete, validate_form,
};
use rayon::prelude::*;
use serde::Serialize;

use crate::error;

/// Validate forms and report their progress
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Node trees of the documents to check, as JSON
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Fields to count as skipped even though the document does not say so
    #[arg(long = "skip", value_name = "FIELD_ID")]
    pub skipped: Vec<String>,

    /// Print one JSON report per file instead of a summary
    #[arg(long)]
    pub json: bool,
}

/// The outcome of checking one form.
#[derive(Debug, Serialize)]
struct Report {
    file: PathBuf,
    form: String,
    state: ProgressState,
    complete: bool,
    counts: ProgressCounts,
    issues: Vec<ValidationIssue>,
}

impl Report {
    fn has_errors(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_error)
    }
}

pub fn run(args: &Args, options: &Options) -> miette::Result<()> {
    let skipped: BTreeSet<String> = args.skipped.iter().cloned().collect();

    // Forms are independent of each other, so check them in parallel.
    let results: Vec<(PathBuf, anyhow::Result<Report>)> = args
        .files
        .par_iter()
        .map(|file| (file.clone(), check(file, options, &skipped)))
        .collect();

    let mut failed = 0;
    for (file, result) in &results {
        match result {
            Ok(report) => {
                print_report(report, args.json).map_err(|e| error::display(&e))?;
                if report.has_errors() {
                    failed += 1;
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("\nFile: {}", file.display());
                eprintln!("{:?}", error::display(e));
            }
        }
    }

    if failed > 0 {
        eprintln!("\n{failed} of {} file(s) failed", results.len());
        std::process::exit(1);
    }
    Ok(())
}

#[tracing::instrument(skip(options, skipped))]
fn check(file: &Path, options: &Options, skipped: &BTreeSet<String>) -> anyhow::Result<Report> {
    let form = super::load_form(file, options)?;
    let issues = validate_form(&form.schema, &form.responses);
    let summary = compute_progress_summary(&form.schema, &form.responses, &issues, skipped);
    Ok(Report {
        file: file.to_path_buf(),
        form: form.schema.id,
        state: compute_form_state(&summary.counts),
        complete: is_form_complete(&summary.counts),
        counts: summary.counts,
        issues,
    })
}

fn print_report(report: &Report, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }
    let counts = &report.counts;
    println!(
        "{}: form '{}' is {} ({} of {} fields complete, {} answered, {} skipped, {} aborted)",
        report.file.display(),
        report.form,
        state_name(report.state),
        counts.complete,
        counts.total,
        counts.answered,
        counts.skipped,
        counts.aborted,
    );
    for issue in &report.issues {
        let severity = if issue.is_error() { "error" } else { "warning" };
        println!("  {severity}: {issue}");
    }
    Ok(())
}

fn state_name(state: ProgressState) -> &'static str {
    match state {
        ProgressState::Empty => "empty",
        ProgressState::Invalid => "invalid",
        ProgressState::Incomplete => "incomplete",
        ProgressState::Complete => "complete",
    }
}
