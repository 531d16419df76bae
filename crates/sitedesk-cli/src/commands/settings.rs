use clap::{Arg, ArgMatches, Command};
use sitedesk::{
    SettingsSection, SettingsUpdatePipeline, SettingsUpdateRequest, SiteRepository,
};

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};
use crate::util;

pub fn command() -> Command {
    Command::new("settings")
        .about("Inspect and edit the site settings aggregate")
        .subcommand_required(true)
        .subcommand(
            Command::new("show")
                .about("Print the settings document")
                .arg(util::state_arg()),
        )
        .subcommand(
            Command::new("set")
                .about("Replace one settings section with JSON from a file or stdin (-); null clears it")
                .arg(util::state_arg())
                .arg(
                    Arg::new("section")
                        .required(true)
                        .value_name("SECTION")
                        .value_parser(SettingsSection::ALL.map(SettingsSection::as_str)),
                )
                .arg(Arg::new("file").required(true).value_name("FILE")),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    match matches.subcommand() {
        Some(("show", sub)) => {
            let state = util::state(sub)?;
            let settings = session.store.read_settings(state)?;
            Ok(CommandResult::SettingsShown { state, settings })
        }
        Some(("set", sub)) => {
            let state = util::state(sub)?;
            let section: SettingsSection = util::required(sub, "section")?.parse()?;
            let value: serde_json::Value = util::read_json_input(util::required(sub, "file")?)?;

            let outcome = SettingsUpdatePipeline::new(session.store.clone()).run(
                SettingsUpdateRequest {
                    state,
                    section,
                    value,
                },
            )?;
            Ok(CommandResult::SettingsUpdated {
                state,
                section,
                changed: outcome.changed,
            })
        }
        _ => Err(CliError::new("missing settings subcommand", ExitStatus::Usage)),
    }
}
