use std::process::ExitCode;

use serde_json::json;
use sitedesk::{IndexUpdateOutcome, SiteIndex, Warning};

use crate::commands::CommandResult;
use crate::error::CliError;

pub enum OutputFormat {
    Text,
    Json,
}

/// Renders a `CommandResult` as text or one line of JSON and converts it into an exit code.
pub fn emit_result(result: CommandResult, format: OutputFormat) -> Result<ExitCode, CliError> {
    match format {
        OutputFormat::Text => print_text(&result),
        OutputFormat::Json => print_json(&result)?,
    };
    Ok(ExitCode::from(result.exit_status().code()))
}

fn print_text(result: &CommandResult) {
    match result {
        CommandResult::ProjectInitialized {
            root,
            config_path,
            content_dir,
            created_config,
            dry_run,
        } => {
            if *dry_run {
                if *created_config {
                    println!("Dry run: would initialize project at {root} (config: {config_path})");
                } else {
                    println!("Dry run: project config already present at {config_path}");
                }
            } else if *created_config {
                println!("Initialized project at {root} (content: {content_dir})");
            } else {
                println!("Project already initialized at {root} (content: {content_dir})");
            }
        }
        CommandResult::IndexShown { state, index } => {
            println!("Index ({state}), updated {}:", index.updated_at.to_rfc3339());
            print_index(index);
        }
        CommandResult::IndexChecked {
            state,
            pages,
            violations,
        } => {
            if violations.is_empty() {
                println!("Index ({state}): OK ({pages} pages)");
            } else {
                println!("Index ({state}): {} violation(s)", violations.len());
                for violation in violations {
                    println!("  [{}] {}", violation.code, violation.path);
                }
            }
        }
        CommandResult::IndexUpdated { state, outcome } => print_index_update(*state, outcome),
        CommandResult::PageList { state, pages } => {
            println!("Pages ({state}, {}):", pages.len());
            for page in pages {
                let marker = if page.listed { "" } else { " (unlisted)" };
                println!("  - {} [{}] {}{marker}", page.slug, page.id, page.title);
            }
        }
        CommandResult::PageShown { page, .. } => {
            // Pages are documents; text mode still prints them as JSON.
            match serde_json::to_string_pretty(page) {
                Ok(body) => println!("{body}"),
                Err(err) => eprintln!("unable to render page: {err}"),
            }
        }
        CommandResult::PageSaved {
            state,
            page,
            path,
            listing,
        } => {
            println!("Saved {state} page '{}' at {path}", page.slug);
            if let Some(outcome) = listing {
                print_index_update(*state, outcome);
            }
        }
        CommandResult::PageDeleted {
            state,
            slug,
            removed,
            unlisted,
        } => {
            if *removed {
                println!("Deleted {state} page '{slug}'");
            } else {
                println!("No {state} page '{slug}' to delete");
            }
            match unlisted {
                Some(true) => println!("Removed '{slug}' from the {state} index"),
                Some(false) => println!("'{slug}' was not listed in the {state} index"),
                None => {}
            }
        }
        CommandResult::SettingsShown { state, settings } => match settings {
            Some(settings) => match serde_json::to_string_pretty(settings) {
                Ok(body) => println!("{body}"),
                Err(err) => eprintln!("unable to render settings: {err}"),
            },
            None => println!("No {state} settings document"),
        },
        CommandResult::SettingsUpdated {
            state,
            section,
            changed,
        } => {
            if *changed {
                println!("Updated {state} settings section '{section}'");
            } else {
                println!("Settings section '{section}' ({state}) unchanged");
            }
        }
        CommandResult::Published { result } => {
            println!(
                "Published {} -> {}: {} page(s) copied, settings {}",
                result.from,
                result.to,
                result.pages_copied,
                if result.settings_copied {
                    "copied"
                } else {
                    "not copied"
                }
            );
            print_warnings(&result.warnings);
        }
        CommandResult::Schema { schema, .. } => match serde_json::to_string_pretty(schema) {
            Ok(body) => println!("{body}"),
            Err(err) => eprintln!("unable to render schema: {err}"),
        },
    }
}

fn print_index(index: &SiteIndex) {
    if index.is_empty() {
        println!("  (empty)");
    }
    for (position, page) in index.pages.iter().enumerate() {
        println!("  {:>3}. {} [{}] {}", position + 1, page.slug, page.id, page.title);
    }
}

fn print_index_update(state: sitedesk::ContentState, outcome: &IndexUpdateOutcome) {
    if outcome.changed {
        println!("Index ({state}) updated: {} page(s)", outcome.index.len());
    } else {
        println!("Index ({state}) unchanged");
    }
    print_warnings(&outcome.warnings);
}

fn print_warnings(warnings: &[Warning]) {
    for warning in warnings {
        println!("  warning[{}] {}", warning.code, warning.path);
    }
}

fn print_json(result: &CommandResult) -> Result<(), CliError> {
    let payload = json!(result);
    println!("{payload}");
    Ok(())
}
