use clap::{Arg, ArgAction, ArgMatches, Command};
use sitedesk::{PublicationPipeline, PublishRequest};

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::CliError;
use crate::util;

pub fn command() -> Command {
    Command::new("publish")
        .about("Copy pages, settings and the index from one content state to another")
        .arg(
            Arg::new("from")
                .long("from")
                .value_name("STATE")
                .value_parser(["draft", "published"])
                .help("Source state. Defaults to publish.from in sitedesk.yaml, else draft."),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .value_name("STATE")
                .value_parser(["draft", "published"])
                .help("Target state. Defaults to publish.to in sitedesk.yaml, else published."),
        )
        .arg(
            Arg::new("clean-orphans")
                .long("clean-orphans")
                .action(ArgAction::SetTrue)
                .help("Accepted for compatibility; stale target pages are never removed."),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let defaults = &session.project.config().publish;
    let request = PublishRequest {
        from: util::state_from(matches, "from")?.unwrap_or(defaults.from),
        to: util::state_from(matches, "to")?.unwrap_or(defaults.to),
        clean_orphans: matches.get_flag("clean-orphans") || defaults.clean_orphans,
    };

    let store = session.store.clone();
    let result = PublicationPipeline::new(store.clone(), store).run(request)?;
    Ok(CommandResult::Published { result })
}
