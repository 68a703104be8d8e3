//! Image decoding and metadata for file-backed media, using the `image` crate.

use crate::orientation::read_orientation_code;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::uri::to_file_path;
use bridge_traits::imaging::scaled_dimensions;
use bridge_traits::{
    DecodeRequest, ImageDecoder, ImageMetadata, MetadataReader, Orientation, VideoMetadata,
};
use image::{DynamicImage, ImageReader};
use std::path::PathBuf;
use tracing::debug;

fn local_path(uri: &str) -> Result<PathBuf> {
    to_file_path(uri)
        .ok_or_else(|| BridgeError::NotAvailable(format!("no local file behind {}", uri)))
}

fn decode_error(e: image::ImageError) -> BridgeError {
    match e {
        image::ImageError::IoError(io) => BridgeError::Io(io),
        other => BridgeError::Decode(other.to_string()),
    }
}

/// Decoder for `file://` URIs and absolute paths.
///
/// Images come back upright and no smaller than needed to cover the
/// requested bounds. Videos are not supported.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

impl ImageCrateDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, request: &DecodeRequest<'_>) -> Result<DynamicImage> {
        if request.mime_type.starts_with("video/") {
            return Err(BridgeError::NotAvailable(
                "video frame extraction".to_string(),
            ));
        }
        let path = local_path(request.uri)?;
        let img = ImageReader::open(&path)?
            .with_guessed_format()?
            .decode()
            .map_err(decode_error)?;

        let img = match read_orientation_code(&path) {
            Some(code) => Orientation::from(code).apply(img),
            None => img,
        };

        let bounds = scaled_dimensions(img.width(), img.height(), request.width, request.height);
        let img = match bounds {
            Some((width, height)) => img.thumbnail_exact(width, height),
            None => img,
        };

        debug!(width = img.width(), height = img.height(), "Decoded image");
        Ok(if request.prefer_full_color {
            img
        } else {
            DynamicImage::ImageRgb8(img.to_rgb8())
        })
    }
}

/// Metadata reader for file-backed images.
///
/// Dimensions come from the image header, orientation from EXIF. Video
/// introspection is not available on desktop.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifMetadataReader;

impl ExifMetadataReader {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataReader for ExifMetadataReader {
    fn read_image_metadata(
        &self,
        uri: &str,
        _mime_type: &str,
        size_bytes: Option<i64>,
    ) -> Result<ImageMetadata> {
        if size_bytes == Some(0) {
            return Err(BridgeError::OperationFailed(format!("{} is empty", uri)));
        }
        let path = local_path(uri)?;
        let (width, height) = ImageReader::open(&path)?
            .with_guessed_format()?
            .into_dimensions()
            .map_err(decode_error)?;

        Ok(ImageMetadata {
            width: i32::try_from(width).ok(),
            height: i32::try_from(height).ok(),
            rotation_degrees: read_orientation_code(&path)
                .map(|code| Orientation::from(code).rotation_degrees()),
        })
    }

    fn read_video_metadata(&self, _uri: &str) -> Result<VideoMetadata> {
        Err(BridgeError::NotAvailable("video metadata".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &tempfile::TempDir, name: &str, width: u32, height: u32) -> String {
        let path = dir.path().join(name);
        DynamicImage::new_rgba8(width, height).save(&path).unwrap();
        path.to_string_lossy().to_string()
    }

    fn request(uri: &str, width: u32, height: u32, prefer_full_color: bool) -> DecodeRequest<'_> {
        DecodeRequest {
            uri,
            mime_type: "image/png",
            width,
            height,
            prefer_full_color,
        }
    }

    #[test]
    fn test_decode_covers_requested_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "wide.png", 400, 200);

        let img = ImageCrateDecoder::new()
            .decode(&request(&path, 50, 50, true))
            .unwrap();
        assert_eq!((img.width(), img.height()), (100, 50));
        assert!(img.color().has_alpha());
    }

    #[test]
    fn test_decode_reduced_color_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "small.png", 10, 10);
        let uri = format!("file://{}", path);

        let img = ImageCrateDecoder::new()
            .decode(&request(&uri, 50, 50, false))
            .unwrap();
        assert_eq!((img.width(), img.height()), (10, 10));
        assert!(!img.color().has_alpha());
    }

    #[test]
    fn test_decode_rejects_content_uris_and_videos() {
        let decoder = ImageCrateDecoder::new();
        assert!(matches!(
            decoder.decode(&request("content://media/external/images/media/1", 10, 10, true)),
            Err(BridgeError::NotAvailable(_))
        ));
        let video = DecodeRequest {
            mime_type: "video/mp4",
            ..request("/tmp/clip.mp4", 10, 10, true)
        };
        assert!(matches!(decoder.decode(&video), Err(BridgeError::NotAvailable(_))));
    }

    #[test]
    fn test_decode_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.png").to_string_lossy().to_string();
        assert!(matches!(
            ImageCrateDecoder::new().decode(&request(&missing, 10, 10, true)),
            Err(BridgeError::Io(_))
        ));
    }

    #[test]
    fn test_metadata_reader_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "meta.png", 33, 21);

        let meta = ExifMetadataReader::new()
            .read_image_metadata(&path, "image/png", Some(100))
            .unwrap();
        assert_eq!(meta.width, Some(33));
        assert_eq!(meta.height, Some(21));
        assert_eq!(meta.rotation_degrees, None);

        assert!(ExifMetadataReader::new()
            .read_video_metadata(&path)
            .is_err());
    }
}
