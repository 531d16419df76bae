use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SiteError;
use crate::index::slug::slug_key;

/// One of the two parallel content trees.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum ContentState {
    Draft,
    Published,
}

impl ContentState {
    pub const ALL: [ContentState; 2] = [ContentState::Draft, ContentState::Published];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentState::Draft => "draft",
            ContentState::Published => "published",
        }
    }
}

impl fmt::Display for ContentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentState {
    type Err = SiteError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(ContentState::Draft),
            "published" => Ok(ContentState::Published),
            other => Err(SiteError::InvalidRequest(format!(
                "unknown content state '{other}' (expected draft or published)"
            ))),
        }
    }
}

/// Minimal page descriptor stored in the site index.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PageRef {
    pub id: String,
    pub slug: String,
    pub title: String,
}

impl PageRef {
    pub fn new(id: impl Into<String>, slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug: slug.into(),
            title: title.into(),
        }
    }

    /// Normalized slug used for uniqueness checks and file naming.
    pub fn slug_key(&self) -> String {
        slug_key(&self.slug)
    }
}

/// Ordered registry of page references for one content state.
///
/// Order drives navigation and is never changed except through an index action.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SiteIndex {
    #[serde(default)]
    pub pages: Vec<PageRef>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl SiteIndex {
    pub fn new(pages: Vec<PageRef>, updated_at: DateTime<Utc>) -> Self {
        Self { pages, updated_at }
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn position_of_id(&self, id: &str) -> Option<usize> {
        self.pages.iter().position(|page| page.id == id)
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<&PageRef> {
        let key = slug_key(slug);
        self.pages.iter().find(|page| page.slug_key() == key)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

/// Per-page sitemap hints.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageSitemap {
    #[serde(default)]
    pub exclude: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_frequency: Option<ChangeFrequency>,
}

/// A full page document. Blocks are opaque to the engine.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub blocks: Vec<serde_json::Value>,
    pub meta: PageMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sitemap: Option<PageSitemap>,
}

impl Page {
    pub fn to_ref(&self) -> PageRef {
        PageRef::new(self.id.clone(), self.slug.clone(), self.title.clone())
    }

    pub fn slug_key(&self) -> String {
        slug_key(&self.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_state_parses_case_insensitively() {
        assert_eq!("Draft".parse::<ContentState>().unwrap(), ContentState::Draft);
        assert_eq!(
            " published ".parse::<ContentState>().unwrap(),
            ContentState::Published
        );
        assert!("staging".parse::<ContentState>().is_err());
    }

    #[test]
    fn index_uses_camel_case_on_disk() {
        let raw = r#"{"pages":[{"id":"p1","slug":"home","title":"Home"}],"updatedAt":"2024-05-01T10:00:00Z"}"#;
        let index: SiteIndex = serde_json::from_str(raw).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.updated_at.to_rfc3339(), "2024-05-01T10:00:00+00:00");

        let value = serde_json::to_value(&index).unwrap();
        assert!(value.get("updatedAt").is_some());
    }

    #[test]
    fn missing_fields_read_as_empty_index() {
        let index: SiteIndex = serde_json::from_str("{}").unwrap();
        assert!(index.is_empty());
        assert_eq!(index.updated_at, DateTime::<Utc>::default());
    }

    #[test]
    fn find_by_slug_ignores_case() {
        let index = SiteIndex::new(
            vec![PageRef::new("p1", "About-Us", "About")],
            DateTime::<Utc>::default(),
        );
        assert_eq!(index.find_by_slug("about-us").map(|p| p.id.as_str()), Some("p1"));
    }
}
