use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SiteError;

/// Aggregate settings document for one content state.
///
/// Sub-documents are opaque JSON; publication copies the whole aggregate.
/// Unknown top-level keys survive a read/write cycle through `extra`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SiteSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menus: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SettingsSection {
    Header,
    Footer,
    Menus,
    Identity,
    Social,
    Seo,
    Theme,
    Admin,
}

impl SettingsSection {
    pub const ALL: [SettingsSection; 8] = [
        SettingsSection::Header,
        SettingsSection::Footer,
        SettingsSection::Menus,
        SettingsSection::Identity,
        SettingsSection::Social,
        SettingsSection::Seo,
        SettingsSection::Theme,
        SettingsSection::Admin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingsSection::Header => "header",
            SettingsSection::Footer => "footer",
            SettingsSection::Menus => "menus",
            SettingsSection::Identity => "identity",
            SettingsSection::Social => "social",
            SettingsSection::Seo => "seo",
            SettingsSection::Theme => "theme",
            SettingsSection::Admin => "admin",
        }
    }
}

impl fmt::Display for SettingsSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingsSection {
    type Err = SiteError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        SettingsSection::ALL
            .into_iter()
            .find(|section| section.as_str() == wanted)
            .ok_or_else(|| SiteError::InvalidRequest(format!("unknown settings section '{value}'")))
    }
}

impl SiteSettings {
    pub fn section(&self, section: SettingsSection) -> Option<&serde_json::Value> {
        self.slot(section).as_ref()
    }

    /// Replaces one section. `null` clears it. Returns whether anything changed.
    pub fn replace_section(&mut self, section: SettingsSection, value: serde_json::Value) -> bool {
        let next = if value.is_null() { None } else { Some(value) };
        let slot = self.slot_mut(section);
        if *slot == next {
            return false;
        }
        *slot = next;
        true
    }

    fn slot(&self, section: SettingsSection) -> &Option<serde_json::Value> {
        match section {
            SettingsSection::Header => &self.header,
            SettingsSection::Footer => &self.footer,
            SettingsSection::Menus => &self.menus,
            SettingsSection::Identity => &self.identity,
            SettingsSection::Social => &self.social,
            SettingsSection::Seo => &self.seo,
            SettingsSection::Theme => &self.theme,
            SettingsSection::Admin => &self.admin,
        }
    }

    fn slot_mut(&mut self, section: SettingsSection) -> &mut Option<serde_json::Value> {
        match section {
            SettingsSection::Header => &mut self.header,
            SettingsSection::Footer => &mut self.footer,
            SettingsSection::Menus => &mut self.menus,
            SettingsSection::Identity => &mut self.identity,
            SettingsSection::Social => &mut self.social,
            SettingsSection::Seo => &mut self.seo,
            SettingsSection::Theme => &mut self.theme,
            SettingsSection::Admin => &mut self.admin,
        }
    }
}
