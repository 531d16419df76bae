//! Storage-agnostic ports consumed by the pipelines.
//!
//! Absence is never an error at this layer: a missing index reads as the empty
//! index, missing pages and settings read as `None`.

mod file;
mod memory;

use std::sync::Arc;

use crate::error::SiteError;
use crate::model::{ContentState, Page, SiteIndex};
use crate::settings::SiteSettings;
use crate::store::{Loaded, Revision};

pub use file::FileContentStore;
pub use memory::{InMemoryContentStore, WriteCounts};

pub trait SiteRepository: Send + Sync {
    /// Creates whatever backing structure the store needs. Idempotent.
    fn ensure_base(&self) -> Result<(), SiteError>;

    fn read_index_versioned(&self, state: ContentState) -> Result<Loaded<SiteIndex>, SiteError>;

    fn read_index(&self, state: ContentState) -> Result<SiteIndex, SiteError> {
        Ok(self.read_index_versioned(state)?.value)
    }

    fn write_index(&self, state: ContentState, index: &SiteIndex) -> Result<(), SiteError>;

    /// Writes `index` only if the stored revision still equals `expected`.
    ///
    /// Fails with [`SiteError::Conflict`] otherwise.
    fn write_index_if(
        &self,
        state: ContentState,
        index: &SiteIndex,
        expected: &Revision,
    ) -> Result<(), SiteError>;

    fn read_settings(&self, state: ContentState) -> Result<Option<SiteSettings>, SiteError>;

    fn write_settings(&self, state: ContentState, settings: &SiteSettings)
    -> Result<(), SiteError>;
}

pub trait PagesRepository: Send + Sync {
    fn ensure_base(&self) -> Result<(), SiteError>;

    fn read(&self, state: ContentState, slug: &str) -> Result<Option<Page>, SiteError>;

    fn put(&self, state: ContentState, page: &Page) -> Result<(), SiteError>;

    /// Returns whether a page was removed.
    fn delete(&self, state: ContentState, slug: &str) -> Result<bool, SiteError>;

    fn exists(&self, state: ContentState, slug: &str) -> Result<bool, SiteError>;

    /// All pages of `state`, sorted by slug key.
    fn list(&self, state: ContentState) -> Result<Vec<Page>, SiteError>;
}

impl<R> SiteRepository for Arc<R>
where
    R: SiteRepository + ?Sized,
{
    fn ensure_base(&self) -> Result<(), SiteError> {
        (**self).ensure_base()
    }

    fn read_index_versioned(&self, state: ContentState) -> Result<Loaded<SiteIndex>, SiteError> {
        (**self).read_index_versioned(state)
    }

    fn read_index(&self, state: ContentState) -> Result<SiteIndex, SiteError> {
        (**self).read_index(state)
    }

    fn write_index(&self, state: ContentState, index: &SiteIndex) -> Result<(), SiteError> {
        (**self).write_index(state, index)
    }

    fn write_index_if(
        &self,
        state: ContentState,
        index: &SiteIndex,
        expected: &Revision,
    ) -> Result<(), SiteError> {
        (**self).write_index_if(state, index, expected)
    }

    fn read_settings(&self, state: ContentState) -> Result<Option<SiteSettings>, SiteError> {
        (**self).read_settings(state)
    }

    fn write_settings(
        &self,
        state: ContentState,
        settings: &SiteSettings,
    ) -> Result<(), SiteError> {
        (**self).write_settings(state, settings)
    }
}

impl<R> SiteRepository for &R
where
    R: SiteRepository + ?Sized,
{
    fn ensure_base(&self) -> Result<(), SiteError> {
        (**self).ensure_base()
    }

    fn read_index_versioned(&self, state: ContentState) -> Result<Loaded<SiteIndex>, SiteError> {
        (**self).read_index_versioned(state)
    }

    fn read_index(&self, state: ContentState) -> Result<SiteIndex, SiteError> {
        (**self).read_index(state)
    }

    fn write_index(&self, state: ContentState, index: &SiteIndex) -> Result<(), SiteError> {
        (**self).write_index(state, index)
    }

    fn write_index_if(
        &self,
        state: ContentState,
        index: &SiteIndex,
        expected: &Revision,
    ) -> Result<(), SiteError> {
        (**self).write_index_if(state, index, expected)
    }

    fn read_settings(&self, state: ContentState) -> Result<Option<SiteSettings>, SiteError> {
        (**self).read_settings(state)
    }

    fn write_settings(
        &self,
        state: ContentState,
        settings: &SiteSettings,
    ) -> Result<(), SiteError> {
        (**self).write_settings(state, settings)
    }
}

impl<P> PagesRepository for Arc<P>
where
    P: PagesRepository + ?Sized,
{
    fn ensure_base(&self) -> Result<(), SiteError> {
        (**self).ensure_base()
    }

    fn read(&self, state: ContentState, slug: &str) -> Result<Option<Page>, SiteError> {
        (**self).read(state, slug)
    }

    fn put(&self, state: ContentState, page: &Page) -> Result<(), SiteError> {
        (**self).put(state, page)
    }

    fn delete(&self, state: ContentState, slug: &str) -> Result<bool, SiteError> {
        (**self).delete(state, slug)
    }

    fn exists(&self, state: ContentState, slug: &str) -> Result<bool, SiteError> {
        (**self).exists(state, slug)
    }

    fn list(&self, state: ContentState) -> Result<Vec<Page>, SiteError> {
        (**self).list(state)
    }
}

impl<P> PagesRepository for &P
where
    P: PagesRepository + ?Sized,
{
    fn ensure_base(&self) -> Result<(), SiteError> {
        (**self).ensure_base()
    }

    fn read(&self, state: ContentState, slug: &str) -> Result<Option<Page>, SiteError> {
        (**self).read(state, slug)
    }

    fn put(&self, state: ContentState, page: &Page) -> Result<(), SiteError> {
        (**self).put(state, page)
    }

    fn delete(&self, state: ContentState, slug: &str) -> Result<bool, SiteError> {
        (**self).delete(state, slug)
    }

    fn exists(&self, state: ContentState, slug: &str) -> Result<bool, SiteError> {
        (**self).exists(state, slug)
    }

    fn list(&self, state: ContentState) -> Result<Vec<Page>, SiteError> {
        (**self).list(state)
    }
}
