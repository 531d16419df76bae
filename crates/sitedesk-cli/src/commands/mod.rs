use serde::Serialize;
use sitedesk::{
    ContentState, IndexUpdateOutcome, InvariantViolation, Page, PageRef, PublicationResult,
    SettingsSection, SiteIndex, SiteSettings,
};

use crate::error::ExitStatus;

pub mod index;
pub mod init;
pub mod page;
pub mod publish;
pub mod schema;
pub mod settings;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandResult {
    ProjectInitialized {
        root: String,
        config_path: String,
        content_dir: String,
        created_config: bool,
        dry_run: bool,
    },
    IndexShown {
        state: ContentState,
        index: SiteIndex,
    },
    IndexChecked {
        state: ContentState,
        pages: usize,
        violations: Vec<InvariantViolation>,
    },
    IndexUpdated {
        state: ContentState,
        outcome: IndexUpdateOutcome,
    },
    PageList {
        state: ContentState,
        pages: Vec<page::PageSummary>,
    },
    PageShown {
        state: ContentState,
        page: Page,
    },
    PageSaved {
        state: ContentState,
        page: PageRef,
        path: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        listing: Option<IndexUpdateOutcome>,
    },
    PageDeleted {
        state: ContentState,
        slug: String,
        removed: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        unlisted: Option<bool>,
    },
    SettingsShown {
        state: ContentState,
        settings: Option<SiteSettings>,
    },
    SettingsUpdated {
        state: ContentState,
        section: SettingsSection,
        changed: bool,
    },
    Published {
        result: PublicationResult,
    },
    Schema {
        name: String,
        schema: serde_json::Value,
    },
}

impl CommandResult {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            CommandResult::IndexChecked { violations, .. } => {
                if violations.is_empty() {
                    ExitStatus::Ok
                } else {
                    ExitStatus::Data
                }
            }
            _ => ExitStatus::Ok,
        }
    }
}
