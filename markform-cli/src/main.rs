use clap::{Parser, Subcommand};
use markform_parser::{Options, Priority};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

mod error;
mod subcommands;

/// Inspect and check forms embedded in markup documents.
///
/// Every input is the node tree produced by the markup parser, serialized as
/// JSON.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Role given to fields that do not declare one
    #[arg(long, global = true, default_value = "agent")]
    role: String,

    /// Priority given to fields that do not declare one
    #[arg(long, global = true, value_parser = clap::value_parser!(Priority), default_value = "medium")]
    priority: Priority,

    /// Strict mode
    ///
    /// When enabled, problems that would normally only be reported as warnings
    /// (such as a placeholder that is not a valid value for its field) make
    /// parsing fail instead.
    #[arg(long, global = true)]
    strict: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    Inspect(subcommands::inspect::Args),
    Check(subcommands::check::Args),
    Scope(subcommands::scope::Args),
}

impl Args {
    fn options(&self) -> Options {
        let builder = Options::builder()
            .with_default_role(self.role.clone())
            .with_default_priority(self.priority);
        if self.strict {
            builder.with_strict().build()
        } else {
            builder.build()
        }
    }
}

fn main() -> miette::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let options = args.options();

    match &args.command {
        Command::Inspect(inspect) => subcommands::inspect::run(inspect, &options),
        Command::Check(check) => subcommands::check::run(check, &options),
        Command::Scope(scope) => subcommands::scope::run(scope, &options),
    }
}
