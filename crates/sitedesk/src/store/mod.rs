//! Crash-safe file primitives shared by the file-system repository.

pub mod atomic;

use sha2::{Digest, Sha256};

pub use atomic::{
    Loaded, StagedWrite, is_temp_file, read_json, read_json_versioned, read_revision, stage,
    write_atomic, write_json,
};

/// Opaque token for the persisted version of one document.
///
/// `Revision::ABSENT` stands for "no document stored yet".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Revision(Option<String>);

impl Revision {
    pub const ABSENT: Revision = Revision(None);

    /// SHA-256 of the stored bytes, hex encoded.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(Some(hex::encode(hasher.finalize())))
    }

    pub fn from_token(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }
}
