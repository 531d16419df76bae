use std::fmt;
use std::str::FromStr;

use schemars::schema_for;

use crate::error::SiteError;
use crate::index::SiteIndexAction;
use crate::model::{Page, SiteIndex};
use crate::settings::SiteSettings;

/// Documents whose JSON Schema is exported for the validation boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaKind {
    Action,
    Index,
    Page,
    Settings,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 4] = [
        SchemaKind::Action,
        SchemaKind::Index,
        SchemaKind::Page,
        SchemaKind::Settings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaKind::Action => "action",
            SchemaKind::Index => "index",
            SchemaKind::Page => "page",
            SchemaKind::Settings => "settings",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaKind {
    type Err = SiteError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SchemaKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| SiteError::InvalidRequest(format!("unknown schema '{value}'")))
    }
}

pub fn json_schema(kind: SchemaKind) -> serde_json::Value {
    let schema = match kind {
        SchemaKind::Action => schema_for!(SiteIndexAction),
        SchemaKind::Index => schema_for!(SiteIndex),
        SchemaKind::Page => schema_for!(Page),
        SchemaKind::Settings => schema_for!(SiteSettings),
    };
    schema.to_value()
}
