use std::ffi::OsString;
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::commands::{self, CommandResult};
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};
use crate::formatter::{OutputFormat, emit_result};
use crate::util::Verbosity;

const NAME: &str = "sitedesk";

pub fn run() -> ExitCode {
    init_tracing();
    match run_cli(std::env::args()) {
        Ok(code) => code,
        Err(err) => {
            err.print();
            err.exit_code()
        }
    }
}

/// Parses arguments, resolves the project when the command needs one, and dispatches.
/// Returns a `sysexits`-compatible `ExitCode`.
pub fn run_cli<I, S>(args: I) -> Result<ExitCode, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let command = build_cli();
    let matches = command.try_get_matches_from(args)?;

    let verbosity = Verbosity {
        json: matches.get_flag("json"),
        verbose: matches.get_flag("verbose"),
    };
    let output = if verbosity.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let root_override = matches.get_one::<String>("root").cloned();

    let result = match matches.subcommand() {
        Some(("init", sub)) => commands::init::run(root_override, sub)?,
        Some(("schema", sub)) => commands::schema::run(sub)?,
        Some((name, sub)) => {
            let session = CliSession::bootstrap(root_override, verbosity)?;
            if session.verbosity.verbose {
                let paths = session.store.paths();
                tracing::info!(
                    root = %session.project.root().display(),
                    content = %paths.root().display(),
                    config_present = session.project.has_config_file(),
                    "resolved project context"
                );
            }
            dispatch(&session, name, sub)?
        }
        None => return Err(CliError::new("missing command", ExitStatus::Usage)),
    };
    emit_result(result, output)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_cli() -> Command {
    Command::new(NAME)
        .about("SiteDesk content workflow CLI")
        .arg(
            Arg::new("root")
                .long("root")
                .value_name("PATH")
                .global(true)
                .help("Project root. Defaults to the nearest ancestor with sitedesk.yaml or a content/ folder."),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Emit newline-delimited JSON instead of human-readable text."),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Log the resolved project and content paths."),
        )
        .subcommand_required(true)
        .subcommand(commands::init::command())
        .subcommand(commands::index::command())
        .subcommand(commands::page::command())
        .subcommand(commands::settings::command())
        .subcommand(commands::publish::command())
        .subcommand(commands::schema::command())
}

fn dispatch(
    session: &CliSession,
    name: &str,
    matches: &ArgMatches,
) -> Result<CommandResult, CliError> {
    match name {
        "index" => commands::index::run(session, matches),
        "page" => commands::page::run(session, matches),
        "settings" => commands::settings::run(session, matches),
        "publish" => commands::publish::run(session, matches),
        other => Err(CliError::new(
            format!("unknown command '{other}'"),
            ExitStatus::Usage,
        )),
    }
}
