//! EXIF orientation codes, read with `kamadak-exif`. Mapping a code to a
//! rotation or a transform is [`bridge_traits::Orientation`]'s job.

use exif::{In, Tag};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Orientation code (1..=8) stored in the file, if any.
pub(crate) fn read_orientation_code(path: &Path) -> Option<u32> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;
    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
}
