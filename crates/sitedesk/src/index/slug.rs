use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::SiteError;

/// Normalized form of a slug: NFC, lower-cased, trimmed.
///
/// Two slugs with the same key name the same page file.
pub fn slug_key(slug: &str) -> String {
    slug.trim().nfc().collect::<String>().to_lowercase()
}

/// Rejects slugs that are empty or could escape the pages directory.
pub fn validate_slug(slug: &str) -> Result<String, SiteError> {
    static SLUG_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = SLUG_REGEX.get_or_init(|| {
        Regex::new(r"^[\p{L}\p{N}]+(?:[-_][\p{L}\p{N}]+)*$").expect("Invalid regex")
    });

    let key = slug_key(slug);
    if key.is_empty() {
        return Err(SiteError::InvalidRequest("slug must not be empty".into()));
    }
    if !re.is_match(&key) {
        return Err(SiteError::InvalidRequest(format!(
            "slug '{slug}' must be letters and digits separated by single hyphens or underscores"
        )));
    }
    Ok(key)
}
