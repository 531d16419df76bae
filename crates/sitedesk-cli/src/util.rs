use std::fs;
use std::io::{self, Read};

use clap::{Arg, ArgMatches};
use serde::de::DeserializeOwned;
use sitedesk::ContentState;

use crate::error::{CliError, ExitStatus};

#[derive(Clone, Copy, Debug, Default)]
pub struct Verbosity {
    pub json: bool,
    pub verbose: bool,
}

/// `--state draft|published`, defaulting to `draft`.
pub fn state_arg() -> Arg {
    Arg::new("state")
        .long("state")
        .value_name("STATE")
        .value_parser(["draft", "published"])
        .default_value("draft")
        .help("Content state to operate on")
}

pub fn state_from(matches: &ArgMatches, id: &str) -> Result<Option<ContentState>, CliError> {
    matches
        .get_one::<String>(id)
        .map(|raw| raw.parse::<ContentState>().map_err(CliError::from))
        .transpose()
}

pub fn state(matches: &ArgMatches) -> Result<ContentState, CliError> {
    Ok(state_from(matches, "state")?.unwrap_or(ContentState::Draft))
}

pub fn required<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a String, CliError> {
    matches
        .get_one::<String>(id)
        .ok_or_else(|| CliError::new(format!("missing required argument <{id}>"), ExitStatus::Usage))
}

/// Reads a JSON document from `source`, where `-` means stdin.
pub fn read_json_input<T: DeserializeOwned>(source: &str) -> Result<T, CliError> {
    let raw = if source == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(source)
            .map_err(|err| CliError::new(format!("cannot read {source}: {err}"), ExitStatus::Io))?
    };

    serde_json::from_str(&raw).map_err(|err| {
        CliError::new(
            format!("{source} is not a valid document: {err}"),
            ExitStatus::Data,
        )
    })
}
