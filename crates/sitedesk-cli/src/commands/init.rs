use std::path::{Path, PathBuf};

use clap::{Arg, ArgAction, ArgMatches, Command};
use sitedesk::store::write_atomic;
use sitedesk::{CONFIG_FILE_NAME, FileContentStore, Project, SiteConfig, SiteRepository};

use crate::commands::CommandResult;
use crate::error::{CliError, ExitStatus};

pub fn command() -> Command {
    Command::new("init")
        .about("Initialize a SiteDesk project")
        .arg(
            Arg::new("path")
                .value_name("PATH")
                .help("Project root to initialize. Defaults to the current directory."),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Show what would be created without writing to disk."),
        )
}

pub fn run(root_override: Option<String>, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let positional = matches.get_one::<String>("path").cloned();
    let target = root_override
        .or(positional)
        .unwrap_or_else(|| ".".to_string());
    let dry_run = matches.get_flag("dry-run");

    let root = std::path::absolute(PathBuf::from(&target))?;
    if root.exists() && !root.is_dir() {
        return Err(CliError::new(
            format!("project root {} is not a directory", root.display()),
            ExitStatus::Usage,
        ));
    }

    let config_path = root.join(CONFIG_FILE_NAME);
    let created_config = !config_path.exists();
    let config = match SiteConfig::load(&config_path)? {
        Some(existing) => existing,
        None => SiteConfig::default(),
    };

    if dry_run {
        return Ok(result(&root, &config_path, &config, created_config, true));
    }

    if created_config {
        write_atomic(&config_path, config.to_yaml()?.as_bytes())?;
    }
    let project = Project::open(&root)?;
    SiteRepository::ensure_base(&FileContentStore::for_project(&project))?;
    tracing::debug!(root = %project.root().display(), "project initialized");

    Ok(result(
        project.root(),
        &project.config_path(),
        project.config(),
        created_config,
        false,
    ))
}

fn result(
    root: &Path,
    config_path: &Path,
    config: &SiteConfig,
    created_config: bool,
    dry_run: bool,
) -> CommandResult {
    CommandResult::ProjectInitialized {
        root: root.display().to_string(),
        config_path: config_path.display().to_string(),
        content_dir: root.join(&config.content_dir).display().to_string(),
        created_config,
        dry_run,
    }
}
