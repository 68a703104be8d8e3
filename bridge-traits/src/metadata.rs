//! Metadata Backfill Abstractions
//!
//! Repository rows sometimes lack dimensions (or, for videos, duration). The
//! core then asks the host to inspect the media itself. Every call is best
//! effort: a failure leaves the record with the fields it already had.

use crate::error::Result;

/// Fields recovered from an image's embedded metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub rotation_degrees: Option<i32>,
}

/// Fields recovered by introspecting a video container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoMetadata {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub rotation_degrees: Option<i32>,
    pub duration_millis: Option<i64>,
}

/// Metadata reader trait
///
/// Implementations block while they open and parse the source.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::metadata::MetadataReader;
///
/// fn dimensions(reader: &dyn MetadataReader, uri: &str) -> Option<(i32, i32)> {
///     let meta = reader.read_image_metadata(uri, "image/jpeg", None).ok()?;
///     Some((meta.width?, meta.height?))
/// }
/// ```
pub trait MetadataReader: Send + Sync {
    /// Parse embedded image metadata (EXIF or container header).
    ///
    /// `size_bytes` is the size recorded by the repository, when known. It
    /// lets implementations refuse to open sources that are obviously bogus.
    fn read_image_metadata(
        &self,
        uri: &str,
        mime_type: &str,
        size_bytes: Option<i64>,
    ) -> Result<ImageMetadata>;

    /// Introspect a video for dimensions, rotation and duration.
    fn read_video_metadata(&self, uri: &str) -> Result<VideoMetadata>;
}
