//! Downscaling to the requested bounds.

use bridge_traits::imaging::scaled_dimensions;
use image::imageops::FilterType;
use image::DynamicImage;

/// Downscale `img` for display at the target size. Never upscales.
pub fn scale_to_fit(img: DynamicImage, target_width: u32, target_height: u32) -> DynamicImage {
    match scaled_dimensions(img.width(), img.height(), target_width, target_height) {
        Some((width, height)) => img.resize_exact(width, height, FilterType::Triangle),
        None => img,
    }
}
