//! Thumbnail sources, tried in order.
//!
//! The chain is fixed once from the repository capabilities: one repository
//! fast path (size-aware or legacy, if any) followed by a general decode.
//! A strategy answers with an image, with nothing, or with an error that the
//! resolver keeps for diagnostics.

use crate::error::Result;
use crate::request::ThumbnailRequest;
use bridge_traits::uri::parse_content_id;
use bridge_traits::{
    DecodeRequest, ImageDecoder, MediaCollection, MediaRepository, Orientation,
    RepositoryCapabilities, ThumbnailApi,
};
use image::DynamicImage;
use std::sync::Arc;

/// One way of producing a preview image.
pub trait ThumbnailStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Repository shortcuts only apply to unflipped, default-size requests.
    fn is_fast_path(&self) -> bool {
        false
    }

    fn attempt(&self, request: &ThumbnailRequest) -> Result<Option<DynamicImage>>;
}

/// Size-aware repository thumbnail by URI.
pub struct ResolverThumbnail {
    repository: Arc<dyn MediaRepository>,
}

impl ResolverThumbnail {
    pub fn new(repository: Arc<dyn MediaRepository>) -> Self {
        Self { repository }
    }
}

impl ThumbnailStrategy for ResolverThumbnail {
    fn name(&self) -> &'static str {
        "resolver"
    }

    fn is_fast_path(&self) -> bool {
        true
    }

    fn attempt(&self, request: &ThumbnailRequest) -> Result<Option<DynamicImage>> {
        Ok(self
            .repository
            .load_thumbnail(request.uri(), request.width(), request.height())?)
    }
}

/// Fixed-size repository thumbnail looked up by content id.
pub struct LegacyThumbnail {
    repository: Arc<dyn MediaRepository>,
    normalizes_orientation: bool,
}

impl LegacyThumbnail {
    pub fn new(repository: Arc<dyn MediaRepository>, normalizes_orientation: bool) -> Self {
        Self {
            repository,
            normalizes_orientation,
        }
    }
}

impl ThumbnailStrategy for LegacyThumbnail {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn is_fast_path(&self) -> bool {
        true
    }

    fn attempt(&self, request: &ThumbnailRequest) -> Result<Option<DynamicImage>> {
        let Some(content_id) = parse_content_id(request.uri()) else {
            return Ok(None);
        };
        let collection = if request.is_video() {
            MediaCollection::Videos
        } else {
            MediaCollection::Images
        };

        let thumbnail = self.repository.legacy_thumbnail(collection, content_id)?;
        if collection == MediaCollection::Videos || self.normalizes_orientation {
            return Ok(thumbnail);
        }
        let orientation = Orientation::from_rotation(request.rotation_degrees(), request.is_flipped());
        Ok(thumbnail.map(|img| orientation.apply(img)))
    }
}

/// General decode of the source at about the requested bounds.
pub struct GenericDecode {
    decoder: Arc<dyn ImageDecoder>,
}

impl GenericDecode {
    pub fn new(decoder: Arc<dyn ImageDecoder>) -> Self {
        Self { decoder }
    }
}

impl ThumbnailStrategy for GenericDecode {
    fn name(&self) -> &'static str {
        "decode"
    }

    fn attempt(&self, request: &ThumbnailRequest) -> Result<Option<DynamicImage>> {
        let decode = DecodeRequest {
            uri: request.uri(),
            mime_type: request.mime_type(),
            width: request.width(),
            height: request.height(),
            prefer_full_color: request.quality() == 100,
        };
        Ok(Some(self.decoder.decode(&decode)?))
    }
}

/// Ordered chain for a platform.
pub fn default_chain(
    capabilities: &RepositoryCapabilities,
    repository: Arc<dyn MediaRepository>,
    decoder: Arc<dyn ImageDecoder>,
) -> Vec<Box<dyn ThumbnailStrategy>> {
    let mut chain: Vec<Box<dyn ThumbnailStrategy>> = Vec::with_capacity(2);
    match capabilities.thumbnail_api {
        ThumbnailApi::Resolver => chain.push(Box::new(ResolverThumbnail::new(repository))),
        ThumbnailApi::Legacy => chain.push(Box::new(LegacyThumbnail::new(
            repository,
            capabilities.normalizes_orientation,
        ))),
        ThumbnailApi::None => {}
    }
    chain.push(Box::new(GenericDecode::new(decoder)));
    chain
}
