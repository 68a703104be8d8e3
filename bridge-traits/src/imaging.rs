//! Image Decoding and Memory Abstractions

use image::DynamicImage;

use crate::error::Result;

/// Parameters for a general purpose decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeRequest<'a> {
    /// Source locator, repository or file scheme.
    pub uri: &'a str,
    /// Declared MIME type of the source.
    pub mime_type: &'a str,
    /// Target bounds. The decoder should return an image close to, and not
    /// much smaller than, these bounds.
    pub width: u32,
    pub height: u32,
    /// Decode to a full 8-bit-per-channel color format instead of a cheaper
    /// reduced one.
    pub prefer_full_color: bool,
}

/// Image decoder trait
///
/// Loads an image (or a representative video frame) at approximately the
/// requested bounds. The result is expected to be orientation-correct.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, request: &DecodeRequest<'_>) -> Result<DynamicImage>;
}

/// Target dimensions for a `width` x `height` image shown at
/// `target_width` x `target_height`.
///
/// `None` unless the image exceeds the target on both axes. The aspect ratio
/// is kept and the smaller ratio wins, so the result still covers the target.
pub fn scaled_dimensions(
    width: u32,
    height: u32,
    target_width: u32,
    target_height: u32,
) -> Option<(u32, u32)> {
    if target_width == 0 || target_height == 0 {
        return None;
    }
    if width <= target_width || height <= target_height {
        return None;
    }

    let factor = f64::min(
        width as f64 / target_width as f64,
        height as f64 / target_height as f64,
    );
    let scaled_width = (width as f64 / factor).round() as u32;
    let scaled_height = (height as f64 / factor).round() as u32;
    Some((scaled_width.max(1), scaled_height.max(1)))
}

/// Memory monitor trait
///
/// Consulted before an encoded payload is copied into its final buffer.
pub trait MemoryMonitor: Send + Sync {
    /// Bytes that can currently be allocated without pressure.
    fn available_bytes(&self) -> u64;
}

/// Monitor for hosts that do not report memory pressure.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnboundedMemory;

impl MemoryMonitor for UnboundedMemory {
    fn available_bytes(&self) -> u64 {
        u64::MAX
    }
}
