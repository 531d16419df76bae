use std::path::PathBuf;
use std::sync::Arc;

use sitedesk::{FileContentStore, Project, discover_from_current_dir};

use crate::error::CliError;
use crate::util::Verbosity;

pub struct CliSession {
    pub project: Project,
    pub store: Arc<FileContentStore>,
    pub verbosity: Verbosity,
}

impl CliSession {
    /// Resolves the project (explicit `--root` or ancestor discovery) and opens its store.
    pub fn bootstrap(root_override: Option<String>, verbosity: Verbosity) -> Result<Self, CliError> {
        let project = match root_override {
            Some(path) => Project::open(PathBuf::from(path))?,
            None => discover_from_current_dir()?,
        };
        let store = Arc::new(FileContentStore::for_project(&project));

        Ok(Self {
            project,
            store,
            verbosity,
        })
    }
}
