use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SiteError;
use crate::index::slug::validate_slug;
use crate::model::ContentState;

pub const CONFIG_FILE_NAME: &str = "sitedesk.yaml";
pub const DEFAULT_CONTENT_DIR: &str = "content";

/// Defaults applied to `sitedesk publish` when flags are omitted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PublishDefaults {
    #[serde(default = "default_from")]
    pub from: ContentState,
    #[serde(default = "default_to")]
    pub to: ContentState,
    #[serde(default)]
    pub clean_orphans: bool,
}

impl Default for PublishDefaults {
    fn default() -> Self {
        Self {
            from: default_from(),
            to: default_to(),
            clean_orphans: false,
        }
    }
}

fn default_from() -> ContentState {
    ContentState::Draft
}

fn default_to() -> ContentState {
    ContentState::Published
}

fn default_content_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CONTENT_DIR)
}

/// Contents of `sitedesk.yaml`. Every key is optional.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SiteConfig {
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,
    #[serde(default)]
    pub publish: PublishDefaults,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            publish: PublishDefaults::default(),
        }
    }
}

impl SiteConfig {
    /// Loads the config file at `path`; a missing file yields `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>, SiteError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(SiteError::io(path, err)),
        };
        if raw.trim().is_empty() {
            return Ok(Some(Self::default()));
        }
        serde_yaml::from_str(&raw)
            .map(Some)
            .map_err(|err| SiteError::Config {
                path: path.to_path_buf(),
                message: err.to_string(),
            })
    }

    pub fn to_yaml(&self) -> Result<String, SiteError> {
        serde_yaml::to_string(self).map_err(|err| SiteError::Serialization(err.to_string()))
    }
}

/// Canonical document locations inside one content directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentPaths {
    root: PathBuf,
}

impl ContentPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `{content}/{state}`
    pub fn state_dir(&self, state: ContentState) -> PathBuf {
        self.root.join(state.as_str())
    }

    /// `{content}/{state}/index.json`
    pub fn index_path(&self, state: ContentState) -> PathBuf {
        self.state_dir(state).join("index.json")
    }

    pub fn settings_dir(&self, state: ContentState) -> PathBuf {
        self.state_dir(state).join("settings")
    }

    /// `{content}/{state}/settings/site.json`
    pub fn settings_path(&self, state: ContentState) -> PathBuf {
        self.settings_dir(state).join("site.json")
    }

    pub fn pages_dir(&self, state: ContentState) -> PathBuf {
        self.state_dir(state).join("pages")
    }

    /// `{content}/{state}/pages/{slug key}.json`. Rejects unsafe slugs.
    pub fn page_path(&self, state: ContentState, slug: &str) -> Result<PathBuf, SiteError> {
        let key = validate_slug(slug)?;
        Ok(self.pages_dir(state).join(format!("{key}.json")))
    }
}

/// A resolved project root with its configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Project {
    root: PathBuf,
    config: SiteConfig,
    config_present: bool,
}

impl Project {
    /// Opens `root` directly, without walking ancestors.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, SiteError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(SiteError::Project(format!(
                "project root {} is not a directory",
                root.display()
            )));
        }
        let root = fs::canonicalize(root).map_err(|err| SiteError::io(root, err))?;
        let loaded = SiteConfig::load(&root.join(CONFIG_FILE_NAME))?;
        Ok(Self {
            root,
            config_present: loaded.is_some(),
            config: loaded.unwrap_or_default(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    pub fn has_config_file(&self) -> bool {
        self.config_present
    }

    pub fn content_paths(&self) -> ContentPaths {
        ContentPaths::new(self.root.join(&self.config.content_dir))
    }
}

/// Discovers the project enclosing the process working directory.
pub fn discover_from_current_dir() -> Result<Project, SiteError> {
    let cwd = env::current_dir().map_err(|err| SiteError::io(".", err))?;
    discover(cwd)
}

/// Finds the nearest ancestor of `start` holding `sitedesk.yaml` or a `content/` directory.
pub fn discover(start: impl AsRef<Path>) -> Result<Project, SiteError> {
    discover_within(start, None)
}

/// Like [`discover`], but never looks above `ceiling` when one is given.
pub fn discover_within(
    start: impl AsRef<Path>,
    ceiling: Option<&Path>,
) -> Result<Project, SiteError> {
    let from = existing_dir(start.as_ref())?;
    let ceiling = ceiling.map(existing_dir).transpose()?;

    for candidate in from.ancestors() {
        if candidate.join(CONFIG_FILE_NAME).is_file()
            || candidate.join(DEFAULT_CONTENT_DIR).is_dir()
        {
            return Project::open(candidate);
        }
        if ceiling.as_deref() == Some(candidate) {
            break;
        }
    }

    Err(SiteError::Project(format!(
        "no {CONFIG_FILE_NAME} or {DEFAULT_CONTENT_DIR}/ directory found from {}",
        from.display()
    )))
}

/// Canonical form of the deepest existing directory at or above `path`.
fn existing_dir(path: &Path) -> Result<PathBuf, SiteError> {
    let dir = path
        .ancestors()
        .find(|candidate| candidate.is_dir())
        .ok_or_else(|| {
            SiteError::Project(format!("no existing directory above {}", path.display()))
        })?;
    fs::canonicalize(dir).map_err(|err| SiteError::io(dir, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn discover_finds_content_dir_marker() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("site");
        fs::create_dir_all(root.join("content").join("draft")).unwrap();
        let nested = root.join("content").join("draft");

        let project = discover(&nested).unwrap();
        assert_eq!(project.root(), root.canonicalize().unwrap().as_path());
        assert!(!project.has_config_file());
        assert_eq!(
            project.content_paths().index_path(ContentState::Draft),
            project.root().join("content/draft/index.json")
        );
    }

    #[test]
    fn config_moves_content_dir() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "contentDir: data/site\npublish:\n  cleanOrphans: true\n",
        )
        .unwrap();

        let project = discover(temp.path().join("not-yet-created")).unwrap();
        assert!(project.has_config_file());
        assert!(project.config().publish.clean_orphans);
        assert_eq!(project.config().publish.from, ContentState::Draft);
        assert!(
            project
                .content_paths()
                .settings_path(ContentState::Published)
                .ends_with("data/site/published/settings/site.json")
        );
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "contentDirectory: x\n").unwrap();

        let err = Project::open(temp.path()).unwrap_err();
        assert!(matches!(err, SiteError::Config { .. }));
    }

    #[test]
    fn discover_errors_without_markers() {
        let temp = tempdir().unwrap();
        let orphan = temp.path().join("orphan");
        fs::create_dir_all(&orphan).unwrap();

        let err = discover_within(&orphan, Some(temp.path())).unwrap_err();
        assert!(matches!(err, SiteError::Project(_)));
    }

    #[test]
    fn ceiling_still_matches_markers_at_its_own_level() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("content")).unwrap();
        let nested = temp.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();

        let project = discover_within(&nested, Some(temp.path())).unwrap();
        assert_eq!(project.root(), temp.path().canonicalize().unwrap().as_path());
    }

    #[test]
    fn page_path_lowercases_and_validates() {
        let paths = ContentPaths::new("/srv/content");
        assert_eq!(
            paths.page_path(ContentState::Draft, "About-Us").unwrap(),
            PathBuf::from("/srv/content/draft/pages/about-us.json")
        );
        assert!(paths.page_path(ContentState::Draft, "../secrets").is_err());
    }

    #[test]
    fn discover_accepts_a_file_inside_the_project() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "").unwrap();
        let file = temp.path().join("notes.txt");
        fs::write(&file, "x").unwrap();

        let project = discover_within(&file, Some(temp.path())).unwrap();
        assert!(project.has_config_file());
        assert_eq!(project.config(), &SiteConfig::default());
    }
}
