use std::fs;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use sitedesk::warning::{PUBLISH_EMPTY_INDEX, PUBLISH_PAGE_MISMATCH, PUBLISH_PAGE_MISSING};
use sitedesk::{
    ContentPaths, ContentState, FileContentStore, FixedClock, Page, PageMeta, PageRef,
    PagesRepository, PublicationPipeline, PublishRequest, SiteIndex, SiteRepository,
    SiteSettings,
};

fn clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2024, 7, 4, 9, 15, 0).unwrap())
}

fn make_store() -> (tempfile::TempDir, FileContentStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileContentStore::new(ContentPaths::new(dir.path().join("content")));
    SiteRepository::ensure_base(&store).expect("ensure base");
    (dir, store)
}

fn page(id: &str, slug: &str) -> Page {
    Page {
        id: id.into(),
        slug: slug.into(),
        title: slug.to_uppercase(),
        blocks: vec![json!({"type": "hero", "heading": slug})],
        meta: PageMeta {
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
        },
        sitemap: None,
    }
}

fn seed_draft(store: &FileContentStore, pages: &[Page]) {
    let refs = pages.iter().map(Page::to_ref).collect();
    store
        .write_index(ContentState::Draft, &SiteIndex::new(refs, DateTime::<Utc>::default()))
        .unwrap();
    for page in pages {
        store.put(ContentState::Draft, page).unwrap();
    }
}

#[test]
fn publish_round_trip_matches_draft() {
    let (_dir, store) = make_store();
    let pages = [page("1", "home"), page("2", "about"), page("3", "blog")];
    seed_draft(&store, &pages);
    store
        .write_settings(
            ContentState::Draft,
            &SiteSettings {
                header: Some(json!({"logo": "/logo.svg"})),
                ..SiteSettings::default()
            },
        )
        .unwrap();

    let result = PublicationPipeline::with_clock(&store, &store, clock())
        .run(PublishRequest::default())
        .unwrap();

    assert_eq!(result.pages_copied, 3);
    assert!(result.settings_copied);
    assert!(result.warnings.is_empty());

    let published = store.read_index(ContentState::Published).unwrap();
    assert_eq!(published.pages, store.read_index(ContentState::Draft).unwrap().pages);
    assert_eq!(published.updated_at, clock().0);
    for page in &pages {
        assert_eq!(
            store.read(ContentState::Published, &page.slug).unwrap().as_ref(),
            Some(page)
        );
    }
    assert_eq!(
        store.read_settings(ContentState::Published).unwrap(),
        store.read_settings(ContentState::Draft).unwrap()
    );
}

#[test]
fn drifted_page_is_skipped_with_one_warning() {
    let (_dir, store) = make_store();
    seed_draft(&store, &[page("1", "home"), page("2", "about"), page("3", "blog")]);
    assert!(store.delete(ContentState::Draft, "about").unwrap());

    let result = PublicationPipeline::with_clock(&store, &store, clock())
        .run(PublishRequest::default())
        .unwrap();

    assert_eq!(result.pages_copied, 2);
    let missing: Vec<_> = result
        .warnings
        .iter()
        .filter(|warning| warning.code == PUBLISH_PAGE_MISSING)
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].meta["slug"], "about");
    assert!(!store.exists(ContentState::Published, "about").unwrap());

    // The index is copied as-is, drift included.
    assert_eq!(store.read_index(ContentState::Published).unwrap().len(), 3);
}

#[test]
fn empty_index_still_copies_settings() {
    let (_dir, store) = make_store();
    store
        .write_settings(
            ContentState::Draft,
            &SiteSettings {
                footer: Some(json!({"copyright": "Acme"})),
                ..SiteSettings::default()
            },
        )
        .unwrap();

    let result = PublicationPipeline::with_clock(&store, &store, clock())
        .run(PublishRequest::default())
        .unwrap();

    assert!(result.has_warning(PUBLISH_EMPTY_INDEX));
    assert_eq!(result.pages_copied, 0);
    assert!(result.settings_copied);
    assert!(store.read_index(ContentState::Published).unwrap().is_empty());
    assert!(store.read_settings(ContentState::Published).unwrap().is_some());
}

#[test]
fn stale_target_pages_are_left_in_place() {
    let (_dir, store) = make_store();
    store
        .put(ContentState::Published, &page("9", "legacy"))
        .unwrap();
    seed_draft(&store, &[page("1", "home")]);

    PublicationPipeline::with_clock(&store, &store, clock())
        .run(PublishRequest {
            clean_orphans: true,
            ..PublishRequest::default()
        })
        .unwrap();

    assert!(store.exists(ContentState::Published, "legacy").unwrap());
    let published = store.read_index(ContentState::Published).unwrap();
    assert_eq!(published.pages, vec![PageRef::new("1", "home", "HOME")]);
}

#[test]
fn corrupt_source_page_aborts_publication() {
    let (_dir, store) = make_store();
    seed_draft(&store, &[page("1", "home")]);
    let path = store.paths().page_path(ContentState::Draft, "home").unwrap();
    fs::write(&path, "{ not json").unwrap();

    let err = PublicationPipeline::with_clock(&store, &store, clock())
        .run(PublishRequest::default())
        .unwrap_err();

    assert_eq!(err.code(), "INVALID_PERSISTED_DOCUMENT");
    assert!(store.read_index(ContentState::Published).unwrap().is_empty());
}

#[test]
fn publishing_twice_yields_same_target() {
    let (_dir, store) = make_store();
    seed_draft(&store, &[page("1", "home"), page("2", "about")]);
    let pipeline = PublicationPipeline::with_clock(&store, &store, clock());

    let first = pipeline.run(PublishRequest::default()).unwrap();
    let snapshot = |slug: &str| {
        fs::read(store.paths().page_path(ContentState::Published, slug).unwrap()).unwrap()
    };
    let index_after_first = store.read_index(ContentState::Published).unwrap();
    let home_after_first = snapshot("home");
    let about_after_first = snapshot("about");

    let later = FixedClock(Utc.with_ymd_and_hms(2024, 7, 5, 9, 15, 0).unwrap());
    let second = PublicationPipeline::with_clock(&store, &store, later)
        .run(PublishRequest::default())
        .unwrap();

    assert_eq!(first.pages_copied, 2);
    assert_eq!(second.pages_copied, 2);
    assert_eq!(first.warnings, second.warnings);

    let index_after_second = store.read_index(ContentState::Published).unwrap();
    assert_eq!(index_after_second.pages, index_after_first.pages);
    assert_eq!(index_after_second.updated_at, later.0);
    assert_eq!(snapshot("home"), home_after_first);
    assert_eq!(snapshot("about"), about_after_first);
}

#[test]
fn document_with_foreign_slug_is_skipped() {
    let (_dir, store) = make_store();
    seed_draft(&store, &[page("1", "home")]);
    let mut moved = page("1", "start");
    moved.title = "Start".into();
    // Hand-edited: home.json now claims to be `start`.
    fs::write(
        store.paths().page_path(ContentState::Draft, "home").unwrap(),
        serde_json::to_vec(&moved).unwrap(),
    )
    .unwrap();

    let result = PublicationPipeline::with_clock(&store, &store, clock())
        .run(PublishRequest::default())
        .unwrap();

    assert_eq!(result.pages_copied, 0);
    assert!(result.has_warning(PUBLISH_PAGE_MISMATCH));
    assert!(!store.exists(ContentState::Published, "start").unwrap());
    assert!(!store.exists(ContentState::Published, "home").unwrap());
}
