//! Photo handles attached to occurrences.

use std::path::{Path, PathBuf};
use std::{fs, io};

use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum PhotoError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("{0} is empty")]
    Empty(PathBuf),
}

/// An opaque handle to an image attached to one occurrence.
///
/// The handle records where the image came from and a digest of its bytes;
/// the bytes themselves are never held in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: Uuid,
    pub path: PathBuf,
    pub size_bytes: u64,
    /// Hex-encoded SHA-256 of the file contents.
    pub sha256: String,
}

impl Photo {
    /// Read an image file and build a fresh handle for it.
    pub fn from_path(path: &Path) -> Result<Self, PhotoError> {
        let bytes = fs::read(path).map_err(|source| PhotoError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if bytes.is_empty() {
            return Err(PhotoError::Empty(path.to_path_buf()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            path: path.to_path_buf(),
            size_bytes: bytes.len() as u64,
            sha256: hex::encode(Sha256::digest(&bytes)),
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}
