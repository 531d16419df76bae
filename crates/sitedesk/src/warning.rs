use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const PUBLISH_EMPTY_INDEX: &str = "PUBLISH_EMPTY_INDEX";
pub const PUBLISH_PAGE_MISSING: &str = "PUBLISH_PAGE_MISSING";
/// The stored document's id or slug disagrees with the index entry it was read for.
pub const PUBLISH_PAGE_MISMATCH: &str = "PUBLISH_PAGE_MISMATCH";
pub const PUBLISH_SETTINGS_COPY_FAILED: &str = "PUBLISH_SETTINGS_COPY_FAILED";
pub const PUBLISH_SETTINGS_MISSING: &str = "PUBLISH_SETTINGS_MISSING";
pub const INDEX_POSITION_ANCHOR_MISSING: &str = "INDEX_POSITION_ANCHOR_MISSING";

/// Non-fatal diagnostic collected by a pipeline run.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Warning {
    pub code: String,
    pub path: String,
    #[serde(default)]
    pub meta: serde_json::Value,
}

impl Warning {
    pub fn new(code: &str, path: impl Into<String>, meta: serde_json::Value) -> Self {
        Self {
            code: code.to_string(),
            path: path.into(),
            meta,
        }
    }
}
