//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! Desktop hosts have no OS media index or platform codecs, so this crate
//! fills the gaps with portable libraries:
//! - `MediaRepository` as an in-memory index the host populates
//! - `ImageDecoder` using the `image` crate, with EXIF orientation applied
//! - `MetadataReader` using image headers and `kamadak-exif`
//! - `MemoryMonitor` using `sysinfo`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ImageCrateDecoder, MemoryMediaRepository};
//! use bridge_traits::{MediaCollection, MediaRow};
//!
//! let repository = MemoryMediaRepository::new();
//! repository.insert(
//!     MediaCollection::Images,
//!     MediaRow::new(0).with_path("/photos/a.jpg").with_mime_type("image/jpeg"),
//! );
//! let decoder = ImageCrateDecoder::new();
//! ```

mod decoder;
mod memory;
mod orientation;
mod repository;

pub use decoder::{ExifMetadataReader, ImageCrateDecoder};
pub use memory::SysinfoMemoryMonitor;
pub use repository::MemoryMediaRepository;
