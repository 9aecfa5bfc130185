use markform_parser::Error as ParserError;
use miette::Diagnostic;

/// Parse error wrapper for miette display.
///
/// The input is a node tree rather than source text, so there is nothing to
/// point a label at: the location goes in the message instead.
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic(code(markform::parse))]
pub(crate) struct ParseDiagnostic {
    message: String,

    #[help]
    advice: Option<String>,
}

/// Turn an error into a report, with help text when a parser error is
/// somewhere in its chain.
pub(crate) fn display(error: &anyhow::Error) -> miette::Report {
    let Some(parser_error) = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ParserError>())
    else {
        return miette::miette!("{error:#}");
    };

    let outer = error.to_string();
    let inner = parser_error.to_string();
    // Keep any context (usually the file name) in front of the parser error.
    let message = if outer == inner {
        inner
    } else {
        format!("{outer}: {inner}")
    };
    miette::Report::new(ParseDiagnostic {
        message,
        advice: parser_error.advice().map(str::to_string),
    })
}
