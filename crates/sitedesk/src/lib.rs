pub mod clock;
pub mod error;
pub mod index;
pub mod model;
pub mod pipeline;
pub mod project;
pub mod repository;
pub mod schema;
pub mod settings;
pub mod store;
pub mod warning;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{InvariantViolation, SiteError};
pub use index::{
    IndexChange, PositionSpecifier, Removal, SiteIndexAction, Upsert, apply as apply_index_action,
    assert_index, index_violations, remove_page_by_slug, slug_key, upsert_page_ref,
    validate_slug,
};
pub use model::{ChangeFrequency, ContentState, Page, PageMeta, PageRef, PageSitemap, SiteIndex};
pub use pipeline::{
    IndexUpdateOutcome, IndexUpdateRequest, PublicationPipeline, PublicationResult,
    PublishRequest, SettingsUpdateOutcome, SettingsUpdatePipeline, SettingsUpdateRequest,
    SiteIndexUpdatePipeline,
};
pub use project::{
    CONFIG_FILE_NAME, ContentPaths, DEFAULT_CONTENT_DIR, Project, PublishDefaults, SiteConfig,
    discover as discover_project, discover_from_current_dir, discover_within,
};
pub use repository::{
    FileContentStore, InMemoryContentStore, PagesRepository, SiteRepository, WriteCounts,
};
pub use schema::{SchemaKind, json_schema};
pub use settings::{SettingsSection, SiteSettings};
pub use store::{Loaded, Revision, StagedWrite};
pub use warning::Warning;
