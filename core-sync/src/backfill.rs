//! Metadata backfill for records the repository left incomplete.
//!
//! Best effort: whatever the reader returns overrides the record, anything
//! it cannot provide keeps the repository value, and failures are dropped.

use crate::models::MediaRecord;
use bridge_traits::MetadataReader;
use std::sync::Arc;
use tracing::debug;

/// Image formats whose metadata is not worth parsing.
const SKIPPED_IMAGE_TYPES: &[&str] = &["image/tiff", "image/svg+xml"];

pub struct MetadataBackfill {
    reader: Arc<dyn MetadataReader>,
}

impl MetadataBackfill {
    pub fn new(reader: Arc<dyn MetadataReader>) -> Self {
        Self { reader }
    }

    /// Fill dimensions, rotation and duration from the media itself.
    pub fn fill(&self, record: &mut MediaRecord) {
        if record.is_image() {
            if SKIPPED_IMAGE_TYPES.contains(&record.mime_type.as_str()) {
                return;
            }
            match self.reader.read_image_metadata(
                &record.uri,
                &record.mime_type,
                Some(record.size_bytes),
            ) {
                Ok(meta) => {
                    record.width = meta.width.unwrap_or(record.width);
                    record.height = meta.height.unwrap_or(record.height);
                    record.rotation_degrees =
                        meta.rotation_degrees.unwrap_or(record.rotation_degrees);
                }
                Err(e) => {
                    debug!(content_id = record.content_id, error = %e, "Image backfill failed");
                }
            }
        } else if record.is_video() {
            match self.reader.read_video_metadata(&record.uri) {
                Ok(meta) => {
                    record.width = meta.width.unwrap_or(record.width);
                    record.height = meta.height.unwrap_or(record.height);
                    record.rotation_degrees =
                        meta.rotation_degrees.unwrap_or(record.rotation_degrees);
                    record.duration_millis = meta.duration_millis.unwrap_or(record.duration_millis);
                }
                Err(e) => {
                    debug!(content_id = record.content_id, error = %e, "Video backfill failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordOrigin;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{BridgeError, ImageMetadata, VideoMetadata};
    use mockall::mock;

    mock! {
        pub Reader {}

        impl MetadataReader for Reader {
            fn read_image_metadata(
                &self,
                uri: &str,
                mime_type: &str,
                size_bytes: Option<i64>,
            ) -> BridgeResult<ImageMetadata>;
            fn read_video_metadata(&self, uri: &str) -> BridgeResult<VideoMetadata>;
        }
    }

    fn record(mime_type: &str) -> MediaRecord {
        MediaRecord {
            origin: RecordOrigin::MediaStoreContent,
            content_id: 9,
            uri: "content://media/external/images/media/9".to_string(),
            path: Some("/sdcard/DCIM/a".to_string()),
            mime_type: mime_type.to_string(),
            width: 0,
            height: 0,
            rotation_degrees: 90,
            size_bytes: 1024,
            date_added_secs: 1,
            date_modified_millis: 1_000,
            date_taken_millis: None,
            duration_millis: 0,
        }
    }

    #[test]
    fn test_image_backfill_overrides_known_fields() {
        let mut reader = MockReader::new();
        reader
            .expect_read_image_metadata()
            .withf(|_, mime, size| mime == "image/jpeg" && *size == Some(1024))
            .times(1)
            .returning(|_, _, _| {
                Ok(ImageMetadata {
                    width: Some(4000),
                    height: Some(3000),
                    rotation_degrees: None,
                })
            });

        let backfill = MetadataBackfill::new(Arc::new(reader));
        let mut record = record("image/jpeg");
        backfill.fill(&mut record);

        assert_eq!((record.width, record.height), (4000, 3000));
        assert_eq!(record.rotation_degrees, 90);
    }

    #[test]
    fn test_video_backfill_sets_duration() {
        let mut reader = MockReader::new();
        reader.expect_read_video_metadata().times(1).returning(|_| {
            Ok(VideoMetadata {
                width: Some(1920),
                height: Some(1080),
                rotation_degrees: Some(270),
                duration_millis: Some(12_500),
            })
        });

        let backfill = MetadataBackfill::new(Arc::new(reader));
        let mut record = record("video/mp4");
        backfill.fill(&mut record);

        assert_eq!((record.width, record.height), (1920, 1080));
        assert_eq!(record.rotation_degrees, 270);
        assert_eq!(record.duration_millis, 12_500);
    }

    #[test]
    fn test_failures_are_swallowed() {
        let mut reader = MockReader::new();
        reader
            .expect_read_image_metadata()
            .returning(|_, _, _| Err(BridgeError::Decode("truncated".to_string())));

        let backfill = MetadataBackfill::new(Arc::new(reader));
        let mut record = record("image/png");
        let before = record.clone();
        backfill.fill(&mut record);

        assert_eq!(record, before);
    }

    #[test]
    fn test_tiff_and_svg_are_skipped() {
        let mut reader = MockReader::new();
        reader.expect_read_image_metadata().never();

        let backfill = MetadataBackfill::new(Arc::new(reader));
        backfill.fill(&mut record("image/tiff"));
        backfill.fill(&mut record("image/svg+xml"));
    }
}
