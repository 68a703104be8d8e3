//! # Thumbnail Resolver
//!
//! Turns a [`ThumbnailRequest`] into an encoded payload.
//!
//! ## Workflow
//!
//! 1. Try each strategy in order, skipping fast paths the request is not
//!    eligible for, and stop at the first image
//! 2. Downscale when the image exceeds the requested bounds on both axes
//! 3. Encode (PNG or JPEG) into a pooled buffer and append the trailer
//! 4. Check available memory, then copy the payload out and return the buffer
//!
//! There are no retries. When every strategy comes back empty the caller gets
//! [`ThumbnailError::Exhausted`] with the last strategy error, if any.

use crate::encode::{encode_into, OutputFormat};
use crate::error::{Result, ThumbnailError};
use crate::pool::BufferPool;
use crate::request::ThumbnailRequest;
use crate::scale::scale_to_fit;
use crate::strategy::{default_chain, ThumbnailStrategy};
use bridge_traits::{ImageDecoder, MediaRepository, MemoryMonitor, RepositoryCapabilities};
use bytes::Bytes;
use image::DynamicImage;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// An encoded thumbnail ready for delivery.
#[derive(Debug, Clone)]
pub struct EncodedThumbnail {
    /// Encoded image followed by the trailer byte
    pub payload: Bytes,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    /// Strategy that produced the image
    pub source: &'static str,
}

pub struct ThumbnailResolver {
    strategies: Vec<Box<dyn ThumbnailStrategy>>,
    pool: Arc<BufferPool>,
    memory: Arc<dyn MemoryMonitor>,
}

impl ThumbnailResolver {
    /// Resolver with the chain implied by the repository's capabilities.
    pub fn new(
        repository: Arc<dyn MediaRepository>,
        decoder: Arc<dyn ImageDecoder>,
        memory: Arc<dyn MemoryMonitor>,
        pool: Arc<BufferPool>,
    ) -> Self {
        let capabilities = repository.capabilities();
        Self::with_capabilities(&capabilities, repository, decoder, memory, pool)
    }

    /// Resolver with the chain implied by already resolved capabilities.
    pub fn with_capabilities(
        capabilities: &RepositoryCapabilities,
        repository: Arc<dyn MediaRepository>,
        decoder: Arc<dyn ImageDecoder>,
        memory: Arc<dyn MemoryMonitor>,
        pool: Arc<BufferPool>,
    ) -> Self {
        let strategies = default_chain(capabilities, repository, decoder);
        Self::with_strategies(strategies, memory, pool)
    }

    pub fn with_strategies(
        strategies: Vec<Box<dyn ThumbnailStrategy>>,
        memory: Arc<dyn MemoryMonitor>,
        pool: Arc<BufferPool>,
    ) -> Self {
        Self {
            strategies,
            pool,
            memory,
        }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    #[instrument(skip(self, request), fields(uri = %request.uri(), width = request.width(), height = request.height()))]
    pub fn resolve(&self, request: &ThumbnailRequest) -> Result<EncodedThumbnail> {
        let (image, source) = self.first_image(request)?;
        let image = scale_to_fit(image, request.width(), request.height());
        let format = OutputFormat::for_image(&image, request.mime_type(), request.quality());

        let mut buffer = self.pool.acquire();
        let outcome = self.materialize(&image, format, &mut buffer);
        self.pool.release(buffer);

        let payload = outcome?;
        debug!(source, bytes = payload.len(), ?format, "Resolved thumbnail");
        Ok(EncodedThumbnail {
            payload,
            format,
            width: image.width(),
            height: image.height(),
            source,
        })
    }

    fn first_image(&self, request: &ThumbnailRequest) -> Result<(DynamicImage, &'static str)> {
        let fast_path = request.allows_fast_path();
        let mut last_error = None;

        for strategy in &self.strategies {
            if strategy.is_fast_path() && !fast_path {
                continue;
            }
            match strategy.attempt(request) {
                Ok(Some(image)) => return Ok((image, strategy.name())),
                Ok(None) => debug!(strategy = strategy.name(), "No thumbnail"),
                Err(e) => {
                    debug!(strategy = strategy.name(), error = %e, "Thumbnail strategy failed");
                    last_error = Some(e.to_string());
                }
            }
        }

        warn!(mime_type = request.mime_type(), "All thumbnail strategies failed");
        Err(ThumbnailError::Exhausted {
            uri: request.uri().to_string(),
            mime_type: request.mime_type().to_string(),
            detail: last_error,
        })
    }

    fn materialize(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
        buffer: &mut Vec<u8>,
    ) -> Result<Bytes> {
        encode_into(image, format, buffer)?;

        let required = buffer.len() as u64;
        let available = self.memory.available_bytes();
        if available < required {
            return Err(ThumbnailError::OutOfMemory {
                required,
                available,
            });
        }
        Ok(Bytes::copy_from_slice(buffer))
    }
}
