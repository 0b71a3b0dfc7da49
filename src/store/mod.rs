//! Watermark store
//!
//! Persistent mapping from folder id to the last-processed timestamp for
//! that folder. The whole mapping is one JSON document, loaded at the
//! start of a pass, mutated in memory and saved back at the end.
//!
//! Saving replaces the full document (no append or merge); callers load
//! the latest mapping, mutate, then save the same mapping back. The file
//! is assumed single-writer; no locking is provided.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Type-safe wrapper for folder IDs
///
/// Prevents mixing up folder ids with drive ids or file ids at compile
/// time. The value is the storage provider's opaque identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(String);

impl FolderId {
    /// Create a new FolderId from a string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for FolderId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for FolderId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Persisted state for one watched folder
///
/// Created the first time a folder is observed; never deleted. The
/// watermark moves forward only after the folder's new items have been
/// reported (or deliberately suppressed in dry-run).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderRecord {
    pub id: FolderId,

    /// Display label for whom the folder belongs to; not a key
    pub owner: String,

    /// Last successfully processed scan time; `None` means never scanned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark: Option<DateTime<Utc>>,
}

impl FolderRecord {
    /// Create a record for a newly observed folder (no watermark yet)
    pub fn new(id: impl Into<FolderId>, owner: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owner: owner.into(),
            watermark: None,
        }
    }
}

/// The full persisted mapping, keyed by folder id
pub type WatermarkMap = HashMap<FolderId, FolderRecord>;

/// Load the watermark mapping from `path`
///
/// A missing file is a valid empty database, not an error: the first run
/// starts from an empty mapping. Content that exists but cannot be parsed
/// is a `Decode` error and fatal for the run.
pub fn load(path: impl AsRef<Path>) -> crate::Result<WatermarkMap> {
    let path = path.as_ref();

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "No database file yet, starting empty");
            return Ok(WatermarkMap::new());
        }
        Err(e) => return Err(e.into()),
    };

    let map: WatermarkMap = serde_json::from_reader(file).map_err(|e| {
        crate::DropwatchError::Decode(format!("invalid database {}: {}", path.display(), e))
    })?;

    Ok(map)
}

/// Save the watermark mapping to `path`, replacing prior content
///
/// Writes to a temporary file in the target directory and renames it over
/// the destination, so a crash mid-write leaves the previous document
/// intact.
pub fn save(path: impl AsRef<Path>, map: &WatermarkMap) -> crate::Result<()> {
    let path = path.as_ref();
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());

    let mut tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
        None => tempfile::NamedTempFile::new_in(".")?,
    };

    serde_json::to_writer_pretty(&mut tmp, map)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;

    tracing::debug!(path = %path.display(), folders = map.len(), "Database saved");
    Ok(())
}
