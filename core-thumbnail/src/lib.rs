//! # Thumbnail Delivery
//!
//! Produces correctly oriented, appropriately sized preview images for
//! catalog items.
//!
//! ## Overview
//!
//! A request goes through an ordered chain of strategies (repository
//! thumbnails first when eligible, then a general decode). The first image is
//! downscaled to the requested bounds, encoded into a pooled buffer and
//! copied out once enough memory is available.
//!
//! ## Components
//!
//! - **Request** (`request`): immutable, normalized `ThumbnailRequest`
//! - **Strategies** (`strategy`): resolver, legacy and decode sources
//! - **Orientation** (`bridge_traits::Orientation`): legacy thumbnail correction
//! - **Scaling** (`scale`): aspect-preserving downscale
//! - **Encoding** (`encode`): PNG/JPEG selection and the trailer byte
//! - **Buffer Pool** (`pool`): reusable encode buffers shared by all requests
//! - **Resolver** (`resolver`): ties the above together

pub mod encode;
pub mod error;
pub mod pool;
pub mod request;
pub mod resolver;
pub mod scale;
pub mod strategy;

pub use encode::{OutputFormat, ENCODED_TRAILER};
pub use error::{Result, ThumbnailError};
pub use bridge_traits::Orientation;
pub use pool::BufferPool;
pub use request::{ThumbnailRequest, ThumbnailRequestBuilder};
pub use resolver::{EncodedThumbnail, ThumbnailResolver};
pub use strategy::{GenericDecode, LegacyThumbnail, ResolverThumbnail, ThumbnailStrategy};
