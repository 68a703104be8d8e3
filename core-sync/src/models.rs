//! Catalog Domain Models
//!
//! [`MediaRecord`] is one catalog entry as produced by a scan. [`KnownState`]
//! is the caller's baseline: what it already has, keyed by content id.

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordOrigin {
    /// Scanned from the repository's media collections.
    MediaStoreContent,
}

impl RecordOrigin {
    /// Numeric tag understood by hosts.
    pub fn code(&self) -> i32 {
        match self {
            Self::MediaStoreContent => 1,
        }
    }
}

/// One catalog entry.
///
/// Created by the scanner, optionally completed by backfill, then handed to
/// the caller and never touched again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub origin: RecordOrigin,
    /// Repository-assigned identifier, stable until deletion
    pub content_id: i64,
    /// Item URI inside its collection
    pub uri: String,
    /// Best-effort filesystem path
    pub path: Option<String>,
    #[serde(rename = "sourceMimeType")]
    pub mime_type: String,
    pub width: i32,
    pub height: i32,
    #[serde(rename = "sourceRotationDegrees")]
    pub rotation_degrees: i32,
    pub size_bytes: i64,
    pub date_added_secs: i64,
    /// Authoritative timestamp for change detection
    pub date_modified_millis: i64,
    #[serde(rename = "sourceDateTakenMillis")]
    pub date_taken_millis: Option<i64>,
    /// Zero for images
    pub duration_millis: i64,
}

impl MediaRecord {
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video/")
    }

    /// Whether the record lacks dimensions, or a duration when one is expected.
    pub fn needs_backfill(&self, expects_duration: bool) -> bool {
        self.width <= 0 || self.height <= 0 || (expects_duration && self.duration_millis == 0)
    }
}

/// Directory a scan is restricted to. Only direct children are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryScope {
    prefix: String,
    parent: PathBuf,
}

impl DirectoryScope {
    pub fn new(directory: &str) -> Result<Self> {
        let trimmed = directory.trim_end_matches('/');
        if directory.is_empty() {
            return Err(SyncError::InvalidDirectory(directory.to_string()));
        }

        // "/" trims down to nothing but is still the root.
        let parent = if trimmed.is_empty() { "/" } else { trimmed };
        Ok(Self {
            prefix: format!("{}/", trimmed),
            parent: PathBuf::from(parent),
        })
    }

    /// Scope with a trailing separator, used for source-level prefix matching.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether `path` sits directly in the scope, not in a subfolder.
    pub fn contains_directly(&self, path: &str) -> bool {
        Path::new(path).parent() == Some(self.parent.as_path())
    }
}

/// Baseline for a differential scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownState {
    entries: HashMap<i64, i64>,
    directory: Option<DirectoryScope>,
}

impl KnownState {
    /// Build from `content_id -> date_modified_millis`.
    pub fn new(entries: HashMap<i64, i64>) -> Self {
        Self {
            entries,
            directory: None,
        }
    }

    /// Restrict the scan to the direct children of `directory`.
    pub fn scoped_to(mut self, directory: &str) -> Result<Self> {
        self.directory = Some(DirectoryScope::new(directory)?);
        Ok(self)
    }

    pub fn directory(&self) -> Option<&DirectoryScope> {
        self.directory.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when the id is unknown or strictly newer than what we know.
    pub fn is_modified(&self, content_id: i64, date_modified_millis: i64) -> bool {
        match self.entries.get(&content_id) {
            None => true,
            Some(known) => *known < date_modified_millis,
        }
    }
}

impl FromIterator<(i64, i64)> for KnownState {
    fn from_iter<T: IntoIterator<Item = (i64, i64)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
