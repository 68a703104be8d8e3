//! Thumbnail encoding.
//!
//! Sources that can carry transparency keep it (PNG) when the decoded image
//! actually has an alpha channel. Everything else becomes JPEG. Every payload
//! ends with a one-byte trailer marking it as encoded.

use crate::error::{Result, ThumbnailError};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::DynamicImage;

/// Trailer byte appended to every encoded payload.
pub const ENCODED_TRAILER: u8 = 0xCA;

const ALPHA_CAPABLE_TYPES: &[&str] = &[
    "image/bmp",
    "image/x-ms-bmp",
    "image/gif",
    "image/x-icon",
    "image/vnd.microsoft.icon",
    "image/png",
    "image/svg+xml",
    "image/tiff",
    "image/webp",
];

/// Whether files of this MIME type may contain transparency.
pub fn can_have_alpha(mime_type: &str) -> bool {
    ALPHA_CAPABLE_TYPES.contains(&mime_type)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    /// JPEG at the given quality, 1..=100
    Jpeg(u8),
}

impl OutputFormat {
    pub fn for_image(img: &DynamicImage, mime_type: &str, quality: u8) -> Self {
        if can_have_alpha(mime_type) && img.color().has_alpha() {
            Self::Png
        } else {
            Self::Jpeg(quality.clamp(1, 100))
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg(_) => "image/jpeg",
        }
    }
}

/// Encode `img` into `out`, followed by [`ENCODED_TRAILER`].
pub fn encode_into(img: &DynamicImage, format: OutputFormat, out: &mut Vec<u8>) -> Result<()> {
    match format {
        OutputFormat::Png => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_with_encoder(PngEncoder::new(&mut *out))
                .map_err(|e| ThumbnailError::Encode(format!("PNG: {}", e)))?;
        }
        OutputFormat::Jpeg(quality) => {
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut *out, quality))
                .map_err(|e| ThumbnailError::Encode(format!("JPEG: {}", e)))?;
        }
    }
    out.push(ENCODED_TRAILER);
    Ok(())
}
