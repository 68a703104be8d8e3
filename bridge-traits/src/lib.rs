//! # Host Bridge Traits
//!
//! Platform abstraction traits that each host must implement for the media
//! pipeline.
//!
//! ## Overview
//!
//! The pipeline reads from an external, authoritative media repository (an
//! OS-managed index of images and videos) and relies on host codecs to decode
//! previews. None of these are owned by the core, so each one is expressed as
//! a trait here and implemented per platform.
//!
//! ## Traits
//!
//! ### Repository
//! - [`MediaRepository`](repository::MediaRepository) - Cursor queries over
//!   the image and video collections, plus the repository's own thumbnails
//!
//! ### Media
//! - [`MetadataReader`](metadata::MetadataReader) - Best-effort width, height,
//!   rotation and duration extraction used to backfill incomplete rows
//! - [`ImageDecoder`](imaging::ImageDecoder) - General purpose decode-and-scale
//! - [`MemoryMonitor`](imaging::MemoryMonitor) - Available memory before a
//!   payload is materialized
//!
//! ### Shared helpers
//! - [`Orientation`](orientation::Orientation) - EXIF orientation codes and
//!   the matching image transforms
//! - [`scaled_dimensions`](imaging::scaled_dimensions) - Aspect-preserving
//!   reduction to cover target bounds
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Blocking contract
//!
//! Repository cursors and codecs hold native resources and block the calling
//! thread. The traits are therefore synchronous; callers run them on the
//! blocking pool and drop cursors as soon as iteration stops.
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform errors into it and keep the original message, since
//! the core forwards it to the consumer as diagnostic detail.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so that a single implementation can
//! serve concurrent scans and thumbnail requests.

pub mod error;
pub mod imaging;
pub mod metadata;
pub mod orientation;
pub mod repository;
pub mod time;
pub mod uri;

pub use error::BridgeError;

pub use imaging::{DecodeRequest, ImageDecoder, MemoryMonitor, UnboundedMemory};
pub use metadata::{ImageMetadata, MetadataReader, VideoMetadata};
pub use orientation::Orientation;
pub use repository::{
    Column, MediaCollection, MediaRepository, MediaRow, RepositoryCapabilities, RowCursor,
    RowFilter, RowQuery, SortOrder, ThumbnailApi,
};
pub use time::{Clock, ConsoleLogger, FixedClock, LogEntry, LogLevel, LoggerSink, SystemClock};
