use std::collections::HashSet;

use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use sitedesk::{
    ContentState, IndexUpdateOutcome, IndexUpdateRequest, Page, PagesRepository,
    SiteIndexAction, SiteIndexUpdatePipeline, SiteRepository, slug_key, upsert_page_ref,
};

use crate::commands::CommandResult;
use crate::commands::index::{position_args, position_from, position_group};
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};
use crate::util;

#[derive(Clone, Debug, Serialize)]
pub struct PageSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
    /// Whether the index of the same state lists this page.
    pub listed: bool,
}

pub fn command() -> Command {
    Command::new("page")
        .about("Manage page documents")
        .subcommand_required(true)
        .subcommand(
            Command::new("ls")
                .about("List stored pages in slug order")
                .arg(util::state_arg()),
        )
        .subcommand(
            Command::new("show")
                .about("Print one page")
                .arg(util::state_arg())
                .arg(Arg::new("slug").required(true).value_name("SLUG")),
        )
        .subcommand(
            Command::new("put")
                .about("Store a page document read from a file or stdin (-)")
                .arg(util::state_arg())
                .arg(Arg::new("file").required(true).value_name("FILE"))
                .arg(
                    Arg::new("list")
                        .long("list")
                        .action(ArgAction::SetTrue)
                        .help("Also list the page in the index"),
                )
                .args(position_args().map(|arg| arg.requires("list")))
                .group(position_group()),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a page document")
                .arg(util::state_arg())
                .arg(Arg::new("slug").required(true).value_name("SLUG"))
                .arg(
                    Arg::new("unlist")
                        .long("unlist")
                        .action(ArgAction::SetTrue)
                        .help("Also remove the page from the index"),
                ),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    match matches.subcommand() {
        Some(("ls", sub)) => list(session, util::state(sub)?),
        Some(("show", sub)) => {
            let state = util::state(sub)?;
            let slug = util::required(sub, "slug")?;
            let page = session.store.read(state, slug)?.ok_or_else(|| {
                CliError::new(
                    format!("no {state} page with slug '{slug}'"),
                    ExitStatus::Data,
                )
            })?;
            Ok(CommandResult::PageShown { state, page })
        }
        Some(("put", sub)) => put(session, sub),
        Some(("delete", sub)) => delete(session, sub),
        _ => Err(CliError::new("missing page subcommand", ExitStatus::Usage)),
    }
}

fn list(session: &CliSession, state: ContentState) -> Result<CommandResult, CliError> {
    let listed: HashSet<String> = session
        .store
        .read_index(state)?
        .pages
        .iter()
        .map(|page| page.slug_key())
        .collect();

    let pages = session
        .store
        .list(state)?
        .into_iter()
        .map(|page| PageSummary {
            listed: listed.contains(&slug_key(&page.slug)),
            id: page.id,
            slug: page.slug,
            title: page.title,
        })
        .collect();
    Ok(CommandResult::PageList { state, pages })
}

fn put(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let state = util::state(matches)?;
    let page: Page = util::read_json_input(util::required(matches, "file")?)?;
    if page.id.trim().is_empty() {
        return Err(CliError::new("page id must not be empty", ExitStatus::Data));
    }

    // Refuse to overwrite a document the index attributes to another page.
    upsert_page_ref(session.store.read_index(state)?, page.to_ref(), None)?;

    session.store.put(state, &page)?;
    let path = session.store.paths().page_path(state, &page.slug)?;

    let listing = if matches.get_flag("list") {
        let action = SiteIndexAction::ensure_listed(page.to_ref(), position_from(matches));
        Some(update_index(session, state, action)?)
    } else {
        None
    };

    Ok(CommandResult::PageSaved {
        state,
        page: page.to_ref(),
        path: path.display().to_string(),
        listing,
    })
}

fn delete(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let state = util::state(matches)?;
    let slug = util::required(matches, "slug")?.clone();

    let removed = session.store.delete(state, &slug)?;
    let unlisted = if matches.get_flag("unlist") {
        let outcome = update_index(session, state, SiteIndexAction::remove(slug.as_str()))?;
        Some(outcome.changed)
    } else {
        None
    };

    Ok(CommandResult::PageDeleted {
        state,
        slug,
        removed,
        unlisted,
    })
}

fn update_index(
    session: &CliSession,
    state: ContentState,
    action: SiteIndexAction,
) -> Result<IndexUpdateOutcome, CliError> {
    Ok(SiteIndexUpdatePipeline::new(session.store.clone()).run(IndexUpdateRequest { state, action })?)
}
