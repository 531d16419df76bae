use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command};
use sitedesk::{
    IndexUpdateRequest, PageRef, PositionSpecifier, SiteIndexAction, SiteIndexUpdatePipeline,
    SiteRepository, index_violations,
};

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};
use crate::util;

pub fn command() -> Command {
    Command::new("index")
        .about("Inspect and mutate the ordered page index")
        .subcommand_required(true)
        .subcommand(
            Command::new("show")
                .about("Print the index")
                .arg(util::state_arg()),
        )
        .subcommand(
            Command::new("check")
                .about("Report duplicate ids, duplicate slugs and invalid slugs")
                .arg(util::state_arg()),
        )
        .subcommand(
            Command::new("ensure")
                .about("List a page, updating it in place when its id is already listed")
                .arg(util::state_arg())
                .arg(Arg::new("id").long("id").required(true).value_name("ID"))
                .arg(Arg::new("slug").long("slug").required(true).value_name("SLUG"))
                .arg(Arg::new("title").long("title").required(true).value_name("TITLE"))
                .args(position_args())
                .group(position_group()),
        )
        .subcommand(
            Command::new("remove")
                .about("Unlist the page with the given slug")
                .arg(util::state_arg())
                .arg(Arg::new("slug").required(true).value_name("SLUG")),
        )
}

/// `--append`, `--prepend`, `--before ID`, `--after ID`.
pub fn position_args() -> [Arg; 4] {
    [
        Arg::new("append")
            .long("append")
            .action(ArgAction::SetTrue)
            .help("Move or insert at the end"),
        Arg::new("prepend")
            .long("prepend")
            .action(ArgAction::SetTrue)
            .help("Move or insert at the start"),
        Arg::new("before")
            .long("before")
            .value_name("ID")
            .help("Place directly before the page with this id"),
        Arg::new("after")
            .long("after")
            .value_name("ID")
            .help("Place directly after the page with this id"),
    ]
}

pub fn position_group() -> ArgGroup {
    ArgGroup::new("position")
        .args(["append", "prepend", "before", "after"])
        .multiple(false)
}

pub fn position_from(matches: &ArgMatches) -> Option<PositionSpecifier> {
    if matches.get_flag("append") {
        Some(PositionSpecifier::Append)
    } else if matches.get_flag("prepend") {
        Some(PositionSpecifier::Prepend)
    } else if let Some(id) = matches.get_one::<String>("before") {
        Some(PositionSpecifier::BeforeId(id.clone()))
    } else {
        matches
            .get_one::<String>("after")
            .map(|id| PositionSpecifier::AfterId(id.clone()))
    }
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    match matches.subcommand() {
        Some(("show", sub)) => {
            let state = util::state(sub)?;
            let index = session.store.read_index(state)?;
            Ok(CommandResult::IndexShown { state, index })
        }
        Some(("check", sub)) => {
            let state = util::state(sub)?;
            let index = session.store.read_index(state)?;
            Ok(CommandResult::IndexChecked {
                state,
                pages: index.len(),
                violations: index_violations(&index),
            })
        }
        Some(("ensure", sub)) => {
            let page = PageRef::new(
                util::required(sub, "id")?.as_str(),
                util::required(sub, "slug")?.as_str(),
                util::required(sub, "title")?.as_str(),
            );
            let action = SiteIndexAction::ensure_listed(page, position_from(sub));
            update(session, util::state(sub)?, action)
        }
        Some(("remove", sub)) => {
            let slug = util::required(sub, "slug")?;
            update(session, util::state(sub)?, SiteIndexAction::remove(slug.as_str()))
        }
        _ => Err(CliError::new("missing index subcommand", ExitStatus::Usage)),
    }
}

fn update(
    session: &CliSession,
    state: sitedesk::ContentState,
    action: SiteIndexAction,
) -> Result<CommandResult, CliError> {
    let outcome = SiteIndexUpdatePipeline::new(session.store.clone())
        .run(IndexUpdateRequest { state, action })?;
    Ok(CommandResult::IndexUpdated { state, outcome })
}
