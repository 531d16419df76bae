//! Pure index mutators.
//!
//! Every function takes the index by value and hands it back together with an
//! explicit change flag, so callers can skip persistence without comparing
//! snapshots themselves. A no-op never clones the page list.

use serde_json::json;

use crate::error::{InvariantViolation, SiteError};
use crate::index::action::{PositionSpecifier, SiteIndexAction};
use crate::index::slug::validate_slug;
use crate::model::{PageRef, SiteIndex};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upsert {
    pub index: SiteIndex,
    pub changed: bool,
    /// The requested before/after anchor was not listed and the page was appended.
    pub anchor_missing: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Removal {
    pub index: SiteIndex,
    pub removed: bool,
}

/// Outcome of applying one [`SiteIndexAction`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexChange {
    pub index: SiteIndex,
    pub changed: bool,
    pub missing_anchor: Option<String>,
}

/// Inserts `page`, or updates the entry with the same id.
///
/// An existing entry keeps its slot unless `position` is given, in which case it is
/// moved to the resolved position. Rejects empty ids and unsafe slugs, and fails
/// with `INDEX_SLUG_CONFLICT` when another entry already owns the slug.
pub fn upsert_page_ref(
    mut index: SiteIndex,
    page: PageRef,
    position: Option<&PositionSpecifier>,
) -> Result<Upsert, SiteError> {
    if page.id.trim().is_empty() {
        return Err(SiteError::InvalidRequest("page id must not be empty".into()));
    }
    let key = validate_slug(&page.slug)?;
    if let Some(conflict) = index
        .pages
        .iter()
        .position(|existing| existing.id != page.id && existing.slug_key() == key)
    {
        return Err(InvariantViolation::new(
            "INDEX_SLUG_CONFLICT",
            format!("pages[{conflict}].slug"),
            json!({
                "slug": page.slug,
                "existingId": index.pages[conflict].id,
                "incomingId": page.id,
            }),
        )
        .into());
    }

    let Some(current) = index.position_of_id(&page.id) else {
        let (target, anchor_missing) =
            resolve_position(&index.pages, position.unwrap_or(&PositionSpecifier::Append));
        index.pages.insert(target, page);
        return Ok(Upsert {
            index,
            changed: true,
            anchor_missing,
        });
    };

    let fields_changed = index.pages[current] != page;
    let position = position.filter(|pos| pos.anchor() != Some(page.id.as_str()));

    let Some(position) = position else {
        if fields_changed {
            index.pages[current] = page;
        }
        return Ok(Upsert {
            index,
            changed: fields_changed,
            anchor_missing: false,
        });
    };

    index.pages.remove(current);
    let (target, anchor_missing) = resolve_position(&index.pages, position);
    index.pages.insert(target, page);

    Ok(Upsert {
        index,
        changed: fields_changed || target != current,
        anchor_missing,
    })
}

/// Removes the first entry whose slug key matches `slug`.
pub fn remove_page_by_slug(mut index: SiteIndex, slug: &str) -> Removal {
    let key = crate::index::slug::slug_key(slug);
    match index.pages.iter().position(|page| page.slug_key() == key) {
        Some(found) => {
            index.pages.remove(found);
            Removal {
                index,
                removed: true,
            }
        }
        None => Removal {
            index,
            removed: false,
        },
    }
}

pub fn apply(index: SiteIndex, action: &SiteIndexAction) -> Result<IndexChange, SiteError> {
    match action {
        SiteIndexAction::EnsurePageListed { page, position } => {
            let upsert = upsert_page_ref(index, page.clone(), position.as_ref())?;
            let missing_anchor = if upsert.anchor_missing {
                position
                    .as_ref()
                    .and_then(PositionSpecifier::anchor)
                    .map(str::to_string)
            } else {
                None
            };
            Ok(IndexChange {
                index: upsert.index,
                changed: upsert.changed,
                missing_anchor,
            })
        }
        SiteIndexAction::RemoveBySlug { slug } => {
            let removal = remove_page_by_slug(index, slug);
            Ok(IndexChange {
                index: removal.index,
                changed: removal.removed,
                missing_anchor: None,
            })
        }
    }
}

/// Returns the insertion index and whether the anchor was missing.
fn resolve_position(pages: &[PageRef], position: &PositionSpecifier) -> (usize, bool) {
    match position {
        PositionSpecifier::Append => (pages.len(), false),
        PositionSpecifier::Prepend => (0, false),
        PositionSpecifier::BeforeId(anchor) => match pages.iter().position(|p| &p.id == anchor) {
            Some(found) => (found, false),
            None => (pages.len(), true),
        },
        PositionSpecifier::AfterId(anchor) => match pages.iter().position(|p| &p.id == anchor) {
            Some(found) => (found + 1, false),
            None => (pages.len(), true),
        },
    }
}
