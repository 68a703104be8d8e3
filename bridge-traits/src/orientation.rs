//! EXIF orientation handling.
//!
//! Catalog records describe orientation as a rotation plus a horizontal flip.
//! Image transforms and embedded metadata are keyed by the EXIF orientation
//! code. Both directions of the mapping live here, shared by the core and the
//! platform bridges.

use image::DynamicImage;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Normal,
    MirroredHorizontal,
    CW180,
    MirroredVertical,
    MirroredHorizontalAnd270CW,
    CW90,
    MirroredHorizontalAnd90CW,
    CW270,
}

impl Orientation {
    /// Orientation for a rotation in degrees and a flip flag. Rotations other
    /// than 90, 180 and 270 count as none.
    pub fn from_rotation(rotation_degrees: i32, is_flipped: bool) -> Self {
        match (rotation_degrees.rem_euclid(360), is_flipped) {
            (90, false) => Self::CW90,
            (180, false) => Self::CW180,
            (270, false) => Self::CW270,
            (_, false) => Self::Normal,
            (90, true) => Self::MirroredHorizontalAnd90CW,
            (180, true) => Self::MirroredVertical,
            (270, true) => Self::MirroredHorizontalAnd270CW,
            (_, true) => Self::MirroredHorizontal,
        }
    }

    pub fn exif_code(&self) -> u32 {
        match self {
            Self::Normal => 1,
            Self::MirroredHorizontal => 2,
            Self::CW180 => 3,
            Self::MirroredVertical => 4,
            Self::MirroredHorizontalAnd270CW => 5,
            Self::CW90 => 6,
            Self::MirroredHorizontalAnd90CW => 7,
            Self::CW270 => 8,
        }
    }

    pub fn rotation_degrees(&self) -> i32 {
        match self {
            Self::CW90 | Self::MirroredHorizontalAnd90CW => 90,
            Self::CW180 | Self::MirroredVertical => 180,
            Self::CW270 | Self::MirroredHorizontalAnd270CW => 270,
            Self::Normal | Self::MirroredHorizontal => 0,
        }
    }

    pub fn is_flipped(&self) -> bool {
        matches!(
            self,
            Self::MirroredHorizontal
                | Self::MirroredVertical
                | Self::MirroredHorizontalAnd270CW
                | Self::MirroredHorizontalAnd90CW
        )
    }

    pub fn apply(&self, img: DynamicImage) -> DynamicImage {
        match self {
            Self::Normal => img,
            Self::MirroredHorizontal => img.fliph(),
            Self::CW180 => img.rotate180(),
            Self::MirroredVertical => img.flipv(),
            Self::MirroredHorizontalAnd270CW => img.fliph().rotate270(),
            Self::CW90 => img.rotate90(),
            Self::MirroredHorizontalAnd90CW => img.fliph().rotate90(),
            Self::CW270 => img.rotate270(),
        }
    }
}

impl From<u32> for Orientation {
    fn from(code: u32) -> Self {
        match code {
            2 => Self::MirroredHorizontal,
            3 => Self::CW180,
            4 => Self::MirroredVertical,
            5 => Self::MirroredHorizontalAnd270CW,
            6 => Self::CW90,
            7 => Self::MirroredHorizontalAnd90CW,
            8 => Self::CW270,
            _ => Self::Normal,
        }
    }
}
