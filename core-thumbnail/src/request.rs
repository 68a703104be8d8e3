//! Thumbnail request value object.

use crate::error::{Result, ThumbnailError};

/// What to render and at which size.
///
/// Immutable once built. Width and height are already normalized: a missing
/// or non-positive dimension is replaced by `default_size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRequest {
    uri: String,
    mime_type: String,
    date_modified_millis: i64,
    rotation_degrees: i32,
    is_flipped: bool,
    width: u32,
    height: u32,
    default_size: u32,
    quality: u8,
    decoded: bool,
    page_id: Option<i32>,
}

impl ThumbnailRequest {
    pub fn builder(uri: impl Into<String>, mime_type: impl Into<String>) -> ThumbnailRequestBuilder {
        ThumbnailRequestBuilder {
            uri: uri.into(),
            mime_type: mime_type.into(),
            date_modified_millis: 0,
            rotation_degrees: 0,
            is_flipped: false,
            width: None,
            height: None,
            default_size: None,
            quality: 100,
            decoded: false,
            page_id: None,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn date_modified_millis(&self) -> i64 {
        self.date_modified_millis
    }

    pub fn rotation_degrees(&self) -> i32 {
        self.rotation_degrees
    }

    pub fn is_flipped(&self) -> bool {
        self.is_flipped
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn default_size(&self) -> u32 {
        self.default_size
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Carried for hosts that accept raw pixels. Payloads are always encoded.
    pub fn decoded(&self) -> bool {
        self.decoded
    }

    pub fn page_id(&self) -> Option<i32> {
        self.page_id
    }

    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video/")
    }

    /// Repository thumbnails are only worth trying for unflipped requests at
    /// the default size.
    pub fn allows_fast_path(&self) -> bool {
        !self.is_flipped && (self.width == self.default_size || self.height == self.default_size)
    }
}

#[derive(Debug, Clone)]
pub struct ThumbnailRequestBuilder {
    uri: String,
    mime_type: String,
    date_modified_millis: i64,
    rotation_degrees: i32,
    is_flipped: bool,
    width: Option<i64>,
    height: Option<i64>,
    default_size: Option<i64>,
    quality: i64,
    decoded: bool,
    page_id: Option<i32>,
}

impl ThumbnailRequestBuilder {
    pub fn date_modified_millis(mut self, millis: i64) -> Self {
        self.date_modified_millis = millis;
        self
    }

    pub fn orientation(mut self, rotation_degrees: i32, is_flipped: bool) -> Self {
        self.rotation_degrees = rotation_degrees;
        self.is_flipped = is_flipped;
        self
    }

    /// Requested bounds in pixels. Non-positive values fall back to the
    /// default size.
    pub fn size(mut self, width: Option<i64>, height: Option<i64>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn default_size(mut self, size: i64) -> Self {
        self.default_size = Some(size);
        self
    }

    pub fn quality(mut self, quality: i64) -> Self {
        self.quality = quality;
        self
    }

    pub fn decoded(mut self, decoded: bool) -> Self {
        self.decoded = decoded;
        self
    }

    pub fn page_id(mut self, page_id: Option<i32>) -> Self {
        self.page_id = page_id;
        self
    }

    pub fn build(self) -> Result<ThumbnailRequest> {
        if self.uri.is_empty() {
            return Err(ThumbnailError::InvalidRequest("uri is empty".to_string()));
        }
        if self.mime_type.is_empty() {
            return Err(ThumbnailError::InvalidRequest(
                "mime type is empty".to_string(),
            ));
        }
        let default_size = self
            .default_size
            .filter(|size| *size > 0)
            .and_then(|size| u32::try_from(size).ok())
            .ok_or_else(|| {
                ThumbnailError::InvalidRequest(format!(
                    "default size must be positive, got {:?}",
                    self.default_size
                ))
            })?;
        let quality = u8::try_from(self.quality)
            .ok()
            .filter(|quality| *quality <= 100)
            .ok_or_else(|| {
                ThumbnailError::InvalidRequest(format!(
                    "quality must be within 0..=100, got {}",
                    self.quality
                ))
            })?;

        let normalize = |value: Option<i64>| {
            value
                .filter(|v| *v > 0)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(default_size)
        };

        Ok(ThumbnailRequest {
            width: normalize(self.width),
            height: normalize(self.height),
            uri: self.uri,
            mime_type: self.mime_type,
            date_modified_millis: self.date_modified_millis,
            rotation_degrees: self.rotation_degrees,
            is_flipped: self.is_flipped,
            default_size,
            quality,
            decoded: self.decoded,
            page_id: self.page_id,
        })
    }
}
