use clap::{Arg, ArgMatches, Command};
use sitedesk::{SchemaKind, json_schema};

use crate::commands::CommandResult;
use crate::error::CliError;
use crate::util;

pub fn command() -> Command {
    Command::new("schema")
        .about("Print the JSON Schema of an exchanged document")
        .arg(
            Arg::new("name")
                .required(true)
                .value_name("NAME")
                .value_parser(SchemaKind::ALL.map(SchemaKind::as_str)),
        )
}

pub fn run(matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let kind: SchemaKind = util::required(matches, "name")?.parse()?;
    Ok(CommandResult::Schema {
        name: kind.to_string(),
        schema: json_schema(kind),
    })
}
