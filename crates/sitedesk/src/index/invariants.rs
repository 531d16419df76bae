use std::collections::HashMap;

use serde_json::json;

use crate::error::{InvariantViolation, SiteError};
use crate::index::slug::{slug_key, validate_slug};
use crate::model::SiteIndex;

/// Lists every invariant violation in `index`, in page order.
///
/// Mutators keep ids and slugs unique on their own; this check exists for indexes
/// that were edited outside the engine and is run before publication.
pub fn index_violations(index: &SiteIndex) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut seen_ids: HashMap<&str, usize> = HashMap::new();
    let mut seen_slugs: HashMap<String, usize> = HashMap::new();

    for (pos, page) in index.pages.iter().enumerate() {
        if page.id.trim().is_empty() {
            violations.push(InvariantViolation::new(
                "INDEX_EMPTY_ID",
                format!("pages[{pos}].id"),
                json!({ "slug": page.slug }),
            ));
        } else if let Some(first) = seen_ids.insert(page.id.as_str(), pos) {
            violations.push(InvariantViolation::new(
                "INDEX_DUPLICATE_ID",
                format!("pages[{pos}].id"),
                json!({ "id": page.id, "firstAt": first }),
            ));
        }

        if let Err(err) = validate_slug(&page.slug) {
            violations.push(InvariantViolation::new(
                "INDEX_INVALID_SLUG",
                format!("pages[{pos}].slug"),
                json!({ "slug": page.slug, "reason": err.to_string() }),
            ));
            continue;
        }

        if let Some(first) = seen_slugs.insert(slug_key(&page.slug), pos) {
            violations.push(InvariantViolation::new(
                "INDEX_DUPLICATE_SLUG",
                format!("pages[{pos}].slug"),
                json!({ "slug": page.slug, "firstAt": first }),
            ));
        }
    }

    violations
}

/// Fails with the first violation found in `index`.
pub fn assert_index(index: &SiteIndex) -> Result<(), SiteError> {
    match index_violations(index).into_iter().next() {
        Some(violation) => Err(SiteError::Invariant(violation)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageRef;
    use chrono::{DateTime, Utc};

    fn index(pages: Vec<PageRef>) -> SiteIndex {
        SiteIndex::new(pages, DateTime::<Utc>::default())
    }

    #[test]
    fn clean_index_passes() {
        let idx = index(vec![
            PageRef::new("1", "home", "Home"),
            PageRef::new("2", "about", "About"),
        ]);
        assert!(index_violations(&idx).is_empty());
        assert!(assert_index(&idx).is_ok());
    }

    #[test]
    fn reports_duplicates_with_paths() {
        let idx = index(vec![
            PageRef::new("1", "home", "Home"),
            PageRef::new("1", "about", "About"),
            PageRef::new("3", "HOME", "Home again"),
        ]);
        let violations = index_violations(&idx);
        let codes: Vec<_> = violations.iter().map(|v| (v.code, v.path.as_str())).collect();
        assert_eq!(
            codes,
            vec![
                ("INDEX_DUPLICATE_ID", "pages[1].id"),
                ("INDEX_DUPLICATE_SLUG", "pages[2].slug"),
            ]
        );
        assert_eq!(violations[0].details["firstAt"], 0);
    }

    #[test]
    fn flags_empty_ids_and_bad_slugs() {
        let idx = index(vec![PageRef::new("", "../escape", "Bad")]);
        let codes: Vec<_> = index_violations(&idx).iter().map(|v| v.code).collect();
        assert_eq!(codes, vec!["INDEX_EMPTY_ID", "INDEX_INVALID_SLUG"]);

        let err = assert_index(&idx).unwrap_err();
        assert_eq!(err.code(), "INDEX_EMPTY_ID");
    }
}
