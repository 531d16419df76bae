//! Atomic single-file writes and JSON reads with corruption diagnostics.
//!
//! Writes go to a sibling temp file that is fsynced and then renamed over the
//! target, so readers observe either the previous or the new content in full.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::SiteError;
use crate::store::Revision;

/// A document read from disk together with the revision of its bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct Loaded<T> {
    pub value: T,
    pub revision: Revision,
}

/// Temp file that has been written and synced but not yet renamed into place.
///
/// Dropping it without calling [`StagedWrite::commit`] leaves the target untouched
/// and the temp file behind.
#[derive(Debug)]
#[must_use = "a staged write has no effect on the target until committed"]
pub struct StagedWrite {
    temp: PathBuf,
    target: PathBuf,
}

impl StagedWrite {
    pub fn temp_path(&self) -> &Path {
        &self.temp
    }

    pub fn target_path(&self) -> &Path {
        &self.target
    }

    /// Renames the temp file over the target and syncs the parent directory.
    pub fn commit(self) -> Result<(), SiteError> {
        fs::rename(&self.temp, &self.target).map_err(|err| SiteError::io(&self.target, err))?;
        sync_parent_dir(&self.target);
        Ok(())
    }
}

/// Writes `bytes` to a fresh sibling temp file of `path` and flushes it to disk.
pub fn stage(path: &Path, bytes: &[u8]) -> Result<StagedWrite, SiteError> {
    let parent = parent_dir(path);
    fs::create_dir_all(parent).map_err(|err| SiteError::io(parent, err))?;

    let temp = temp_path_for(path);
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp)
        .map_err(|err| SiteError::io(&temp, err))?;
    file.write_all(bytes)
        .map_err(|err| SiteError::io(&temp, err))?;
    file.sync_all().map_err(|err| SiteError::io(&temp, err))?;

    Ok(StagedWrite {
        temp,
        target: path.to_path_buf(),
    })
}

/// Replaces `path` with `bytes` so that no reader can observe a partial write.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), SiteError> {
    stage(path, bytes)?.commit()?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "atomic write committed");
    Ok(())
}

/// Pretty-printed JSON with a trailing newline, written atomically.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), SiteError> {
    let mut payload = serde_json::to_vec_pretty(value)?;
    payload.push(b'\n');
    write_atomic(path, &payload)
}

/// Reads and parses a JSON document. A missing file is `Ok(None)`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, SiteError> {
    Ok(read_json_versioned(path)?.map(|loaded| loaded.value))
}

pub fn read_json_versioned<T: DeserializeOwned>(
    path: &Path,
) -> Result<Option<Loaded<T>>, SiteError> {
    let Some(bytes) = read_bytes(path)? else {
        return Ok(None);
    };
    let value = serde_json::from_slice(&bytes)
        .map_err(|err| SiteError::invalid_document(path, err.to_string()))?;
    Ok(Some(Loaded {
        value,
        revision: Revision::of_bytes(&bytes),
    }))
}

/// Revision of the bytes currently stored at `path`, without parsing them.
pub fn read_revision(path: &Path) -> Result<Revision, SiteError> {
    Ok(match read_bytes(path)? {
        Some(bytes) => Revision::of_bytes(&bytes),
        None => Revision::ABSENT,
    })
}

/// Whether `file_name` looks like a temp file produced by [`stage`].
pub fn is_temp_file(file_name: &str) -> bool {
    file_name.starts_with('.') && file_name.ends_with(".tmp")
}

fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>, SiteError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(SiteError::io(path, err)),
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    // pid + millis is unique per process; the nonce separates threads within one.
    let mut nonce = [0u8; 4];
    if getrandom::getrandom(&mut nonce).is_err() {
        nonce = elapsed.subsec_nanos().to_le_bytes();
    }

    path.with_file_name(format!(
        ".{name}.{}.{}.{}.tmp",
        std::process::id(),
        elapsed.as_millis(),
        hex::encode(nonce)
    ))
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    let parent = parent_dir(path);
    if let Err(err) = fs::File::open(parent).and_then(|dir| dir.sync_all()) {
        tracing::debug!(path = %parent.display(), error = %err, "parent directory sync skipped");
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::tempdir;

    fn temp_files(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| is_temp_file(name))
            .collect()
    }

    #[test]
    fn write_creates_parents_and_leaves_no_temp_files() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("draft").join("settings").join("site.json");

        write_atomic(&target, b"{\"a\":1}").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"{\"a\":1}");
        assert!(temp_files(target.parent().unwrap()).is_empty());
    }

    #[test]
    fn last_full_write_wins_byte_for_byte() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("index.json");

        let long = vec![b'x'; 64 * 1024];
        write_atomic(&target, &long).unwrap();
        write_atomic(&target, b"short").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"short");
    }

    #[test]
    fn interrupted_write_keeps_previous_content() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("index.json");
        write_atomic(&target, b"{\"version\":1}").unwrap();

        let staged = stage(&target, b"{\"version\":2}").unwrap();
        let temp_path = staged.temp_path().to_path_buf();
        drop(staged);

        assert_eq!(fs::read(&target).unwrap(), b"{\"version\":1}");
        let value: Value = read_json(&target).unwrap().unwrap();
        assert_eq!(value, json!({"version": 1}));
        assert!(temp_path.exists());

        // The next write picks a fresh temp name and still succeeds.
        write_atomic(&target, b"{\"version\":3}").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"{\"version\":3}");
    }

    #[test]
    fn missing_file_reads_as_none() {
        let temp = tempdir().unwrap();
        let value: Option<Value> = read_json(&temp.path().join("nope.json")).unwrap();
        assert!(value.is_none());
        assert!(read_revision(&temp.path().join("nope.json")).unwrap().is_absent());
    }

    #[test]
    fn unparsable_file_is_invalid_document() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("index.json");
        fs::write(&target, "{ not json").unwrap();

        let err = read_json::<Value>(&target).unwrap_err();
        match err {
            SiteError::InvalidDocument { path, .. } => assert_eq!(path, target),
            other => panic!("expected invalid document, got {other:?}"),
        }
    }

    #[test]
    fn revision_tracks_content() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("doc.json");
        write_json(&target, &json!({"n": 1})).unwrap();
        let first: Loaded<Value> = read_json_versioned(&target).unwrap().unwrap();
        assert_eq!(first.revision, read_revision(&target).unwrap());

        write_json(&target, &json!({"n": 2})).unwrap();
        assert_ne!(first.revision, read_revision(&target).unwrap());
    }

    #[test]
    fn write_json_is_pretty_with_trailing_newline() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("doc.json");
        write_json(&target, &json!({"n": 1})).unwrap();
        let contents = fs::read_to_string(&target).unwrap();
        assert_eq!(contents, "{\n  \"n\": 1\n}\n");
    }
}
