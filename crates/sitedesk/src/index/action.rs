use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::PageRef;

/// Where an upserted page lands in the index.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PositionSpecifier {
    #[default]
    Append,
    Prepend,
    BeforeId(String),
    AfterId(String),
}

impl PositionSpecifier {
    pub fn anchor(&self) -> Option<&str> {
        match self {
            PositionSpecifier::BeforeId(id) | PositionSpecifier::AfterId(id) => Some(id),
            PositionSpecifier::Append | PositionSpecifier::Prepend => None,
        }
    }
}

/// The only ways a site index may change.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SiteIndexAction {
    /// Insert the page, or update it in place and optionally move it.
    #[serde(rename_all = "camelCase")]
    EnsurePageListed {
        #[serde(rename = "ref")]
        page: PageRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<PositionSpecifier>,
    },
    RemoveBySlug { slug: String },
}

impl SiteIndexAction {
    pub fn ensure_listed(page: PageRef, position: Option<PositionSpecifier>) -> Self {
        Self::EnsurePageListed { page, position }
    }

    pub fn remove(slug: impl Into<String>) -> Self {
        Self::RemoveBySlug { slug: slug.into() }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SiteIndexAction::EnsurePageListed { .. } => "ensurePageListed",
            SiteIndexAction::RemoveBySlug { .. } => "removeBySlug",
        }
    }
}
