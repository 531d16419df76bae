use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::clock::{Clock, SystemClock};
use crate::error::SiteError;
use crate::index::{assert_index, slug_key};
use crate::model::{ContentState, SiteIndex};
use crate::repository::{PagesRepository, SiteRepository};
use crate::warning::{
    PUBLISH_EMPTY_INDEX, PUBLISH_PAGE_MISMATCH, PUBLISH_PAGE_MISSING,
    PUBLISH_SETTINGS_COPY_FAILED, PUBLISH_SETTINGS_MISSING, Warning,
};

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    #[serde(default = "default_from")]
    pub from: ContentState,
    #[serde(default = "default_to")]
    pub to: ContentState,
    /// Accepted for forward compatibility. Targets are overwrite-only; nothing is removed.
    #[serde(default)]
    pub clean_orphans: bool,
}

impl Default for PublishRequest {
    fn default() -> Self {
        Self {
            from: default_from(),
            to: default_to(),
            clean_orphans: false,
        }
    }
}

fn default_from() -> ContentState {
    ContentState::Draft
}

fn default_to() -> ContentState {
    ContentState::Published
}

/// Summary of one publication run. Never persisted.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicationResult {
    pub pages_copied: usize,
    pub settings_copied: bool,
    pub warnings: Vec<Warning>,
    pub from: ContentState,
    pub to: ContentState,
}

impl PublicationResult {
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|warning| warning.code == code)
    }
}

/// Copies pages, settings and the index from one content state to another.
///
/// Missing or mismatched pages, an empty index and settings failures become warnings; storage
/// failures on pages or the index abort the run. Already-copied files stay in place.
pub struct PublicationPipeline<S, P, C = SystemClock> {
    site: S,
    pages: P,
    clock: C,
}

impl<S: SiteRepository, P: PagesRepository> PublicationPipeline<S, P, SystemClock> {
    pub fn new(site: S, pages: P) -> Self {
        Self::with_clock(site, pages, SystemClock)
    }
}

impl<S: SiteRepository, P: PagesRepository, C: Clock> PublicationPipeline<S, P, C> {
    pub fn with_clock(site: S, pages: P, clock: C) -> Self {
        Self { site, pages, clock }
    }

    pub fn run(&self, request: PublishRequest) -> Result<PublicationResult, SiteError> {
        let PublishRequest {
            from,
            to,
            clean_orphans,
        } = request;
        if from == to {
            return Err(SiteError::InvalidRequest(format!(
                "cannot publish {from} into itself"
            )));
        }

        self.site.ensure_base()?;
        self.pages.ensure_base()?;

        let mut warnings = Vec::new();
        let source = self.site.read_index(from)?;
        assert_index(&source)?;

        if source.is_empty() {
            warnings.push(Warning::new(
                PUBLISH_EMPTY_INDEX,
                "index",
                json!({ "state": from }),
            ));
        }

        let mut pages_copied = 0;
        for page_ref in &source.pages {
            match self.pages.read(from, &page_ref.slug)? {
                // The target index lists the ref, so the document must land under the ref's slug.
                Some(page) if page.id != page_ref.id || page.slug_key() != slug_key(&page_ref.slug) => {
                    warnings.push(Warning::new(
                        PUBLISH_PAGE_MISMATCH,
                        format!("pages/{}", page_ref.slug),
                        json!({
                            "id": page_ref.id,
                            "slug": page_ref.slug,
                            "documentId": page.id,
                            "documentSlug": page.slug,
                        }),
                    ));
                }
                Some(page) => {
                    self.pages.put(to, &page)?;
                    pages_copied += 1;
                }
                None => warnings.push(Warning::new(
                    PUBLISH_PAGE_MISSING,
                    format!("pages/{}", page_ref.slug),
                    json!({ "id": page_ref.id, "slug": page_ref.slug }),
                )),
            }
        }

        let settings_copied = match self.copy_settings(from, to) {
            Ok(true) => true,
            Ok(false) => {
                warnings.push(Warning::new(
                    PUBLISH_SETTINGS_MISSING,
                    "settings/site",
                    json!({ "state": from }),
                ));
                false
            }
            Err(err) => {
                warnings.push(Warning::new(
                    PUBLISH_SETTINGS_COPY_FAILED,
                    "settings/site",
                    json!({ "error": err.to_string(), "errorCode": err.code() }),
                ));
                false
            }
        };

        let target = SiteIndex::new(source.pages, self.clock.now());
        self.site.write_index(to, &target)?;

        if clean_orphans {
            tracing::debug!(%to, "orphan cleanup requested; targets are overwrite-only");
        }

        for warning in &warnings {
            tracing::warn!(code = %warning.code, path = %warning.path, "publication warning");
        }
        tracing::info!(
            %from,
            %to,
            pages_copied,
            settings_copied,
            warnings = warnings.len(),
            "publication finished"
        );

        Ok(PublicationResult {
            pages_copied,
            settings_copied,
            warnings,
            from,
            to,
        })
    }

    /// Returns `Ok(false)` when the source has no settings document.
    fn copy_settings(&self, from: ContentState, to: ContentState) -> Result<bool, SiteError> {
        let Some(settings) = self.site.read_settings(from)? else {
            return Ok(false);
        };
        self.site.write_settings(to, &settings)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::model::{Page, PageMeta, PageRef};
    use crate::repository::InMemoryContentStore;
    use crate::settings::SiteSettings;
    use chrono::{DateTime, TimeZone, Utc};

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 6, 2, 8, 30, 0).unwrap())
    }

    fn page(id: &str, slug: &str) -> Page {
        Page {
            id: id.into(),
            slug: slug.into(),
            title: slug.into(),
            blocks: Vec::new(),
            meta: PageMeta {
                created_at: DateTime::<Utc>::default(),
                updated_at: DateTime::<Utc>::default(),
            },
            sitemap: None,
        }
    }

    fn seeded(slugs: &[&str], with_pages: &[&str]) -> InMemoryContentStore {
        let store = InMemoryContentStore::new();
        let refs = slugs
            .iter()
            .enumerate()
            .map(|(i, slug)| PageRef::new(format!("p{i}"), *slug, *slug))
            .collect();
        store.seed_index(ContentState::Draft, SiteIndex::new(refs, DateTime::<Utc>::default()));
        for (i, slug) in slugs.iter().enumerate() {
            if with_pages.contains(slug) {
                store
                    .seed_page(ContentState::Draft, page(&format!("p{i}"), slug))
                    .unwrap();
            }
        }
        store.seed_settings(
            ContentState::Draft,
            SiteSettings {
                seo: Some(json!({"title": "Acme"})),
                ..SiteSettings::default()
            },
        );
        store
    }

    #[test]
    fn publishing_into_same_state_is_rejected() {
        let store = InMemoryContentStore::new();
        let pipeline = PublicationPipeline::with_clock(&store, &store, clock());
        let err = pipeline
            .run(PublishRequest {
                from: ContentState::Draft,
                to: ContentState::Draft,
                clean_orphans: false,
            })
            .unwrap_err();
        assert!(matches!(err, SiteError::InvalidRequest(_)));
    }

    #[test]
    fn copies_everything_and_restamps_index() {
        let store = seeded(&["home", "about", "blog"], &["home", "about", "blog"]);
        let pipeline = PublicationPipeline::with_clock(&store, &store, clock());

        let result = pipeline.run(PublishRequest::default()).unwrap();

        assert_eq!(result.pages_copied, 3);
        assert!(result.settings_copied);
        assert!(result.warnings.is_empty());

        let published = store.read_index(ContentState::Published).unwrap();
        let draft = store.read_index(ContentState::Draft).unwrap();
        assert_eq!(published.pages, draft.pages);
        assert_eq!(published.updated_at, clock().0);
        assert_eq!(
            store.read_settings(ContentState::Published).unwrap(),
            store.read_settings(ContentState::Draft).unwrap()
        );
    }

    #[test]
    fn settings_write_failure_is_a_warning() {
        let store = seeded(&["home"], &["home"]);
        store.set_fail_settings_writes(true);
        let pipeline = PublicationPipeline::with_clock(&store, &store, clock());

        let result = pipeline.run(PublishRequest::default()).unwrap();

        assert_eq!(result.pages_copied, 1);
        assert!(!result.settings_copied);
        assert!(result.has_warning(PUBLISH_SETTINGS_COPY_FAILED));
        assert_eq!(store.writes().index, 1);
    }

    #[test]
    fn absent_source_settings_are_reported() {
        let store = InMemoryContentStore::new();
        store.seed_index(
            ContentState::Draft,
            SiteIndex::new(vec![PageRef::new("p0", "home", "Home")], DateTime::<Utc>::default()),
        );
        store.seed_page(ContentState::Draft, page("p0", "home")).unwrap();
        let pipeline = PublicationPipeline::with_clock(&store, &store, clock());

        let result = pipeline.run(PublishRequest::default()).unwrap();
        assert!(!result.settings_copied);
        assert!(result.has_warning(PUBLISH_SETTINGS_MISSING));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn duplicate_ids_abort_before_copying() {
        let store = InMemoryContentStore::new();
        store.seed_index(
            ContentState::Draft,
            SiteIndex::new(
                vec![PageRef::new("p0", "home", "Home"), PageRef::new("p0", "about", "About")],
                DateTime::<Utc>::default(),
            ),
        );
        let pipeline = PublicationPipeline::with_clock(&store, &store, clock());

        let err = pipeline.run(PublishRequest::default()).unwrap_err();
        assert_eq!(err.code(), "INDEX_DUPLICATE_ID");
        assert_eq!(store.writes().total(), 0);
    }

    #[test]
    fn page_document_under_foreign_slug_is_not_copied() {
        let store = seeded(&["home", "about"], &["about"]);
        let mut stray = page("p0", "home");
        stray.slug = "start".into();
        // Stored under the `home` key while claiming a different slug.
        store.seed_page_at(ContentState::Draft, "home", stray).unwrap();
        let pipeline = PublicationPipeline::with_clock(&store, &store, clock());

        let result = pipeline.run(PublishRequest::default()).unwrap();

        assert_eq!(result.pages_copied, 1);
        assert!(result.has_warning(PUBLISH_PAGE_MISMATCH));
        assert!(!store.exists(ContentState::Published, "start").unwrap());
        assert!(!store.exists(ContentState::Published, "home").unwrap());
    }

    #[test]
    fn publishing_back_to_draft_is_allowed() {
        let store = InMemoryContentStore::new();
        store.seed_index(
            ContentState::Published,
            SiteIndex::new(vec![PageRef::new("p0", "home", "Home")], DateTime::<Utc>::default()),
        );
        store
            .seed_page(ContentState::Published, page("p0", "home"))
            .unwrap();
        let pipeline = PublicationPipeline::with_clock(&store, &store, clock());

        let result = pipeline
            .run(PublishRequest {
                from: ContentState::Published,
                to: ContentState::Draft,
                clean_orphans: true,
            })
            .unwrap();

        assert_eq!(result.pages_copied, 1);
        assert_eq!(result.from, ContentState::Published);
        assert!(store.exists(ContentState::Draft, "home").unwrap());
    }
}
