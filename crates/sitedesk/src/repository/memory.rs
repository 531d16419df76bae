use std::collections::BTreeMap;
use std::io;

use parking_lot::Mutex;

use crate::error::SiteError;
use crate::index::slug::validate_slug;
use crate::model::{ContentState, Page, SiteIndex};
use crate::repository::{PagesRepository, SiteRepository};
use crate::settings::SiteSettings;
use crate::store::{Loaded, Revision};

/// Number of successful writes per document kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteCounts {
    pub index: usize,
    pub settings: usize,
    pub pages: usize,
}

impl WriteCounts {
    pub fn total(&self) -> usize {
        self.index + self.settings + self.pages
    }
}

#[derive(Default)]
struct Inner {
    indexes: BTreeMap<ContentState, (SiteIndex, u64)>,
    settings: BTreeMap<ContentState, SiteSettings>,
    pages: BTreeMap<(ContentState, String), Page>,
    writes: WriteCounts,
    next_revision: u64,
    fail_settings_writes: bool,
}

impl Inner {
    fn bump(&mut self) -> u64 {
        self.next_revision += 1;
        self.next_revision
    }
}

/// Repository double that keeps everything in memory and counts writes.
///
/// `seed_*` helpers populate state without touching the counters.
#[derive(Default)]
pub struct InMemoryContentStore {
    inner: Mutex<Inner>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> WriteCounts {
        self.inner.lock().writes
    }

    pub fn reset_writes(&self) {
        self.inner.lock().writes = WriteCounts::default();
    }

    /// Makes every subsequent `write_settings` call fail with an I/O error.
    pub fn set_fail_settings_writes(&self, fail: bool) {
        self.inner.lock().fail_settings_writes = fail;
    }

    pub fn seed_index(&self, state: ContentState, index: SiteIndex) {
        let mut inner = self.inner.lock();
        let revision = inner.bump();
        inner.indexes.insert(state, (index, revision));
    }

    pub fn seed_settings(&self, state: ContentState, settings: SiteSettings) {
        self.inner.lock().settings.insert(state, settings);
    }

    pub fn seed_page(&self, state: ContentState, page: Page) -> Result<(), SiteError> {
        let key = validate_slug(&page.slug)?;
        self.inner.lock().pages.insert((state, key), page);
        Ok(())
    }

    /// Stores `page` under `slug` regardless of the slug the document itself carries.
    pub fn seed_page_at(&self, state: ContentState, slug: &str, page: Page) -> Result<(), SiteError> {
        let key = validate_slug(slug)?;
        self.inner.lock().pages.insert((state, key), page);
        Ok(())
    }
}

impl SiteRepository for InMemoryContentStore {
    fn ensure_base(&self) -> Result<(), SiteError> {
        Ok(())
    }

    fn read_index_versioned(&self, state: ContentState) -> Result<Loaded<SiteIndex>, SiteError> {
        let inner = self.inner.lock();
        Ok(match inner.indexes.get(&state) {
            Some((index, revision)) => Loaded {
                value: index.clone(),
                revision: Revision::from_token(format!("mem-{revision}")),
            },
            None => Loaded {
                value: SiteIndex::default(),
                revision: Revision::ABSENT,
            },
        })
    }

    fn write_index(&self, state: ContentState, index: &SiteIndex) -> Result<(), SiteError> {
        let mut inner = self.inner.lock();
        let revision = inner.bump();
        inner.indexes.insert(state, (index.clone(), revision));
        inner.writes.index += 1;
        Ok(())
    }

    fn write_index_if(
        &self,
        state: ContentState,
        index: &SiteIndex,
        expected: &Revision,
    ) -> Result<(), SiteError> {
        let mut inner = self.inner.lock();
        let current = match inner.indexes.get(&state) {
            Some((_, revision)) => Revision::from_token(format!("mem-{revision}")),
            None => Revision::ABSENT,
        };
        if current != *expected {
            return Err(SiteError::Conflict { state });
        }
        let revision = inner.bump();
        inner.indexes.insert(state, (index.clone(), revision));
        inner.writes.index += 1;
        Ok(())
    }

    fn read_settings(&self, state: ContentState) -> Result<Option<SiteSettings>, SiteError> {
        Ok(self.inner.lock().settings.get(&state).cloned())
    }

    fn write_settings(
        &self,
        state: ContentState,
        settings: &SiteSettings,
    ) -> Result<(), SiteError> {
        let mut inner = self.inner.lock();
        if inner.fail_settings_writes {
            return Err(SiteError::io(
                format!("memory://{state}/settings/site.json"),
                io::Error::other("simulated settings write failure"),
            ));
        }
        inner.settings.insert(state, settings.clone());
        inner.writes.settings += 1;
        Ok(())
    }
}

impl PagesRepository for InMemoryContentStore {
    fn ensure_base(&self) -> Result<(), SiteError> {
        Ok(())
    }

    fn read(&self, state: ContentState, slug: &str) -> Result<Option<Page>, SiteError> {
        let key = validate_slug(slug)?;
        Ok(self.inner.lock().pages.get(&(state, key)).cloned())
    }

    fn put(&self, state: ContentState, page: &Page) -> Result<(), SiteError> {
        let key = validate_slug(&page.slug)?;
        let mut inner = self.inner.lock();
        inner.pages.insert((state, key), page.clone());
        inner.writes.pages += 1;
        Ok(())
    }

    fn delete(&self, state: ContentState, slug: &str) -> Result<bool, SiteError> {
        let key = validate_slug(slug)?;
        Ok(self.inner.lock().pages.remove(&(state, key)).is_some())
    }

    fn exists(&self, state: ContentState, slug: &str) -> Result<bool, SiteError> {
        let key = validate_slug(slug)?;
        Ok(self.inner.lock().pages.contains_key(&(state, key)))
    }

    fn list(&self, state: ContentState) -> Result<Vec<Page>, SiteError> {
        // Keys are (state, slug key), so iteration is already in slug order.
        Ok(self
            .inner
            .lock()
            .pages
            .iter()
            .filter(|((page_state, _), _)| *page_state == state)
            .map(|(_, page)| page.clone())
            .collect())
    }
}
