use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use parking_lot::Mutex;

use crate::error::SiteError;
use crate::index::slug::slug_key;
use crate::model::{ContentState, Page, SiteIndex};
use crate::project::{ContentPaths, Project};
use crate::repository::{PagesRepository, SiteRepository};
use crate::settings::SiteSettings;
use crate::store::{self, Loaded, Revision};

/// File-system repository: one JSON document per path, every write atomic.
///
/// Index writes for a state are serialized in-process so the revision check in
/// [`SiteRepository::write_index_if`] and the write that follows cannot interleave
/// with another writer in this process.
pub struct FileContentStore {
    paths: ContentPaths,
    draft_index: Mutex<()>,
    published_index: Mutex<()>,
}

impl FileContentStore {
    pub fn new(paths: ContentPaths) -> Self {
        Self {
            paths,
            draft_index: Mutex::new(()),
            published_index: Mutex::new(()),
        }
    }

    pub fn for_project(project: &Project) -> Self {
        Self::new(project.content_paths())
    }

    pub fn paths(&self) -> &ContentPaths {
        &self.paths
    }

    fn index_lock(&self, state: ContentState) -> &Mutex<()> {
        match state {
            ContentState::Draft => &self.draft_index,
            ContentState::Published => &self.published_index,
        }
    }

    fn create_dir(path: &Path) -> Result<(), SiteError> {
        fs::create_dir_all(path).map_err(|err| SiteError::io(path, err))
    }
}

impl SiteRepository for FileContentStore {
    fn ensure_base(&self) -> Result<(), SiteError> {
        for state in ContentState::ALL {
            Self::create_dir(&self.paths.pages_dir(state))?;
            Self::create_dir(&self.paths.settings_dir(state))?;

            let _guard = self.index_lock(state).lock();
            let index_path = self.paths.index_path(state);
            if store::read_revision(&index_path)?.is_absent() {
                store::write_json(&index_path, &SiteIndex::default())?;
                tracing::debug!(%state, path = %index_path.display(), "seeded empty index");
            }
        }
        Ok(())
    }

    fn read_index_versioned(&self, state: ContentState) -> Result<Loaded<SiteIndex>, SiteError> {
        let path = self.paths.index_path(state);
        Ok(
            store::read_json_versioned(&path)?.unwrap_or_else(|| Loaded {
                value: SiteIndex::default(),
                revision: Revision::ABSENT,
            }),
        )
    }

    fn write_index(&self, state: ContentState, index: &SiteIndex) -> Result<(), SiteError> {
        let _guard = self.index_lock(state).lock();
        store::write_json(&self.paths.index_path(state), index)
    }

    fn write_index_if(
        &self,
        state: ContentState,
        index: &SiteIndex,
        expected: &Revision,
    ) -> Result<(), SiteError> {
        let _guard = self.index_lock(state).lock();
        let path = self.paths.index_path(state);
        if store::read_revision(&path)? != *expected {
            return Err(SiteError::Conflict { state });
        }
        store::write_json(&path, index)
    }

    fn read_settings(&self, state: ContentState) -> Result<Option<SiteSettings>, SiteError> {
        store::read_json(&self.paths.settings_path(state))
    }

    fn write_settings(
        &self,
        state: ContentState,
        settings: &SiteSettings,
    ) -> Result<(), SiteError> {
        store::write_json(&self.paths.settings_path(state), settings)
    }
}

impl PagesRepository for FileContentStore {
    fn ensure_base(&self) -> Result<(), SiteError> {
        for state in ContentState::ALL {
            Self::create_dir(&self.paths.pages_dir(state))?;
        }
        Ok(())
    }

    fn read(&self, state: ContentState, slug: &str) -> Result<Option<Page>, SiteError> {
        store::read_json(&self.paths.page_path(state, slug)?)
    }

    fn put(&self, state: ContentState, page: &Page) -> Result<(), SiteError> {
        let path = self.paths.page_path(state, &page.slug)?;
        store::write_json(&path, page)
    }

    fn delete(&self, state: ContentState, slug: &str) -> Result<bool, SiteError> {
        let path = self.paths.page_path(state, slug)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(SiteError::io(&path, err)),
        }
    }

    fn exists(&self, state: ContentState, slug: &str) -> Result<bool, SiteError> {
        let path = self.paths.page_path(state, slug)?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(SiteError::io(&path, err)),
        }
    }

    fn list(&self, state: ContentState) -> Result<Vec<Page>, SiteError> {
        let dir = self.paths.pages_dir(state);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(SiteError::io(&dir, err)),
        };

        let mut pages = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| SiteError::io(&dir, err))?;
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if store::is_temp_file(&name) || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            if let Some(page) = store::read_json::<Page>(&path)? {
                pages.push(page);
            }
        }

        pages.sort_by_cached_key(|page| slug_key(&page.slug));
        Ok(pages)
    }
}
