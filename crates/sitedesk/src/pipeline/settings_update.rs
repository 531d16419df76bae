use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SiteError;
use crate::model::ContentState;
use crate::repository::SiteRepository;
use crate::settings::{SettingsSection, SiteSettings};

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SettingsUpdateRequest {
    pub state: ContentState,
    pub section: SettingsSection,
    /// Replacement sub-document; `null` clears the section.
    pub value: serde_json::Value,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SettingsUpdateOutcome {
    pub settings: SiteSettings,
    pub changed: bool,
}

/// Replaces one section of the settings aggregate, skipping no-op writes.
pub struct SettingsUpdatePipeline<R> {
    repo: R,
}

impl<R: SiteRepository> SettingsUpdatePipeline<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn run(&self, request: SettingsUpdateRequest) -> Result<SettingsUpdateOutcome, SiteError> {
        let SettingsUpdateRequest {
            state,
            section,
            value,
        } = request;
        self.repo.ensure_base()?;

        let mut settings = self.repo.read_settings(state)?.unwrap_or_default();
        if !settings.replace_section(section, value) {
            tracing::debug!(%state, %section, "settings section unchanged, skipping write");
            return Ok(SettingsUpdateOutcome {
                settings,
                changed: false,
            });
        }

        self.repo.write_settings(state, &settings)?;
        tracing::debug!(%state, %section, "settings section replaced");
        Ok(SettingsUpdateOutcome {
            settings,
            changed: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryContentStore;
    use serde_json::json;

    #[test]
    fn replaces_section_and_keeps_the_rest() {
        let store = InMemoryContentStore::new();
        store.seed_settings(
            ContentState::Draft,
            SiteSettings {
                footer: Some(json!({"text": "(c) Acme"})),
                ..SiteSettings::default()
            },
        );
        let pipeline = SettingsUpdatePipeline::new(&store);

        let outcome = pipeline
            .run(SettingsUpdateRequest {
                state: ContentState::Draft,
                section: SettingsSection::Header,
                value: json!({"logo": "/logo.svg"}),
            })
            .unwrap();

        assert!(outcome.changed);
        let stored = store.read_settings(ContentState::Draft).unwrap().unwrap();
        assert_eq!(stored.header, Some(json!({"logo": "/logo.svg"})));
        assert_eq!(stored.footer, Some(json!({"text": "(c) Acme"})));
        assert_eq!(store.writes().settings, 1);
    }

    #[test]
    fn identical_value_is_not_written() {
        let store = InMemoryContentStore::new();
        store.seed_settings(
            ContentState::Published,
            SiteSettings {
                theme: Some(json!({"palette": "dusk"})),
                ..SiteSettings::default()
            },
        );
        let pipeline = SettingsUpdatePipeline::new(&store);

        let outcome = pipeline
            .run(SettingsUpdateRequest {
                state: ContentState::Published,
                section: SettingsSection::Theme,
                value: json!({"palette": "dusk"}),
            })
            .unwrap();

        assert!(!outcome.changed);
        assert_eq!(store.writes().total(), 0);
    }

    #[test]
    fn first_write_creates_settings_document() {
        let store = InMemoryContentStore::new();
        let pipeline = SettingsUpdatePipeline::new(&store);

        pipeline
            .run(SettingsUpdateRequest {
                state: ContentState::Draft,
                section: SettingsSection::Identity,
                value: json!({"name": "Acme"}),
            })
            .unwrap();

        assert!(store.read_settings(ContentState::Draft).unwrap().is_some());
    }
}
