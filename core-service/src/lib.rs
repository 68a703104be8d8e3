//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (media repository,
//! metadata reader, image decoder, memory monitor, clock) into the catalog
//! and thumbnail pipelines. Desktop apps typically enable the
//! `desktop-shims` feature (which depends on `bridge-desktop`) and build
//! their dependencies with [`CoreDependencies::desktop`].
//!
//! Catalog scans and thumbnails are delivered as [`StreamHandle`]s; change
//! detection queries return plain values. Hosts that speak JSON go through
//! [`MediaService::handle_call`] and [`MediaService::open_stream`].

pub mod calls;
pub mod error;
pub mod streams;

pub use calls::{MethodCall, MEDIA_BYTE_STREAM, MEDIA_STORE_STREAM};
pub use error::{CoreError, ErrorKind, Result};
pub use streams::{EventSink, StreamEvent, StreamHandle, SUCCESS_SENTINEL};

use std::collections::HashMap;
use std::sync::Arc;

use bridge_traits::{Clock, ImageDecoder, MediaRepository, MemoryMonitor, MetadataReader, SystemClock};
use core_async::task;
use core_runtime::PipelineConfig;
use core_sync::{CatalogScanner, ChangeDetector, KnownState};
use core_thumbnail::{BufferPool, ThumbnailRequest, ThumbnailResolver};
use streams::{spawn_guarded, ByteStreamer, RecordStreamer, ThumbnailStreamer};
use tracing::{info, instrument};

/// Aggregated handle to all bridge dependencies the core requires.
pub struct CoreDependencies {
    pub repository: Arc<dyn MediaRepository>,
    pub metadata_reader: Arc<dyn MetadataReader>,
    pub decoder: Arc<dyn ImageDecoder>,
    pub memory_monitor: Arc<dyn MemoryMonitor>,
    pub clock: Arc<dyn Clock>,
    pub config: PipelineConfig,
    /// Shared by every thumbnail request of the process
    pub buffer_pool: Arc<BufferPool>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit bridge handles, with the
    /// system clock and the default configuration.
    pub fn new(
        repository: Arc<dyn MediaRepository>,
        metadata_reader: Arc<dyn MetadataReader>,
        decoder: Arc<dyn ImageDecoder>,
        memory_monitor: Arc<dyn MemoryMonitor>,
    ) -> Self {
        let config = PipelineConfig::default();
        Self {
            repository,
            metadata_reader,
            decoder,
            memory_monitor,
            clock: Arc::new(SystemClock),
            buffer_pool: Arc::new(pool_for(&config)),
            config,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the configuration. The buffer pool is resized to match.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.buffer_pool = Arc::new(pool_for(&config));
        self.config = config;
        self
    }

    /// Share an existing pool instead of the one built from the config.
    pub fn with_buffer_pool(mut self, pool: Arc<BufferPool>) -> Self {
        self.buffer_pool = pool;
        self
    }
}

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
impl CoreDependencies {
    /// Desktop bundle around an in-memory repository.
    pub fn desktop(
        repository: Arc<bridge_desktop::MemoryMediaRepository>,
        config: PipelineConfig,
    ) -> Self {
        Self::new(
            repository,
            Arc::new(bridge_desktop::ExifMetadataReader::new()),
            Arc::new(bridge_desktop::ImageCrateDecoder::new()),
            Arc::new(bridge_desktop::SysinfoMemoryMonitor::new()),
        )
        .with_config(config)
    }
}

fn pool_for(config: &PipelineConfig) -> BufferPool {
    BufferPool::new(config.buffer_pool_size, config.buffer_initial_capacity)
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct MediaService {
    scanner: CatalogScanner,
    detector: Arc<ChangeDetector>,
    thumbnails: Arc<ThumbnailStreamer>,
    clock: Arc<dyn Clock>,
    config: Arc<PipelineConfig>,
}

impl MediaService {
    /// Create a new service from the provided dependencies.
    ///
    /// Fails when the config is invalid or claims a capability the repository
    /// does not offer.
    pub fn new(deps: CoreDependencies) -> Result<Self> {
        deps.config.validate()?;
        let capabilities = deps
            .config
            .resolve_capabilities(deps.repository.capabilities())?;

        let resolver = ThumbnailResolver::with_capabilities(
            &capabilities,
            Arc::clone(&deps.repository),
            deps.decoder,
            deps.memory_monitor,
            deps.buffer_pool,
        );
        info!(
            strategies = ?resolver.strategy_names(),
            generation_counter = capabilities.generation_counter,
            "Media service ready"
        );

        Ok(Self {
            scanner: CatalogScanner::new(Arc::clone(&deps.repository), deps.metadata_reader)
                .with_capabilities(capabilities),
            detector: Arc::new(
                ChangeDetector::new(deps.repository).with_capabilities(capabilities),
            ),
            thumbnails: Arc::new(ThumbnailStreamer::new(
                Arc::new(resolver),
                ByteStreamer::new(deps.config.chunk_size),
            )),
            clock: deps.clock,
            config: Arc::new(deps.config),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Stream the records that are new or updated relative to `known`.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime context.
    #[instrument(skip(self, known), fields(known = known.len()))]
    pub fn scan_catalog(&self, known: KnownState) -> StreamHandle {
        let streamer = RecordStreamer::new(self.scanner.clone(), self.config.batch_size);
        spawn_guarded(self.config.channel_capacity, move |sink| {
            streamer.stream(known, sink)
        })
    }

    /// Stream the encoded thumbnail for `request`.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime context.
    #[instrument(skip(self, request), fields(uri = %request.uri()))]
    pub fn fetch_thumbnail(&self, request: ThumbnailRequest) -> StreamHandle {
        let thumbnails = Arc::clone(&self.thumbnails);
        spawn_guarded(self.config.channel_capacity, move |sink| {
            thumbnails.stream(&request, sink)
        })
    }

    /// Known ids that no longer exist in the repository.
    pub async fn check_obsolete_ids(&self, known_ids: &[i64]) -> Result<Vec<i64>> {
        let detector = Arc::clone(&self.detector);
        let known_ids = known_ids.to_vec();
        blocking(move || detector.obsolete_content_ids(&known_ids)).await
    }

    /// Known ids whose live path differs from the recorded one.
    pub async fn check_obsolete_paths(
        &self,
        known_path_by_id: &HashMap<i64, Option<String>>,
    ) -> Result<Vec<i64>> {
        let detector = Arc::clone(&self.detector);
        let known_path_by_id = known_path_by_id.clone();
        blocking(move || detector.obsolete_paths(&known_path_by_id)).await
    }

    /// URIs of items changed after `generation`.
    ///
    /// Empty when the platform has no generation counter; callers then fall
    /// back to a full scan.
    pub async fn changed_since(&self, generation: i64) -> Result<Vec<String>> {
        let detector = Arc::clone(&self.detector);
        blocking(move || detector.changed_uris(generation)).await
    }
}

async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|e| CoreError::Task(task::panic_message(e)))
}
