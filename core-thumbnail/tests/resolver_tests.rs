//! End-to-end resolver tests against mocked bridges.

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    BridgeError, DecodeRequest, ImageDecoder, MediaCollection, MediaRepository,
    RepositoryCapabilities, RowCursor, RowQuery, UnboundedMemory,
};
use core_thumbnail::{
    BufferPool, OutputFormat, ThumbnailError, ThumbnailRequest, ThumbnailResolver,
    ENCODED_TRAILER,
};
use image::DynamicImage;
use mockall::mock;
use std::collections::HashSet;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

mock! {
    pub Repo {}

    impl MediaRepository for Repo {
        fn capabilities(&self) -> RepositoryCapabilities;
        fn query(&self, query: &RowQuery) -> BridgeResult<RowCursor>;
        fn load_thumbnail(&self, uri: &str, width: u32, height: u32) -> BridgeResult<Option<DynamicImage>>;
        fn legacy_thumbnail(&self, collection: MediaCollection, content_id: i64) -> BridgeResult<Option<DynamicImage>>;
    }
}

/// Decoder answering with a fixed outcome and recording what it was asked.
struct FakeDecoder {
    outcome: fn() -> BridgeResult<DynamicImage>,
    requests: Mutex<Vec<(u32, u32, bool)>>,
}

impl FakeDecoder {
    fn new(outcome: fn() -> BridgeResult<DynamicImage>) -> Self {
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn unused() -> Self {
        Self::new(|| panic!("decoder should not be called"))
    }

    fn requests(&self) -> Vec<(u32, u32, bool)> {
        self.requests.lock().unwrap().clone()
    }
}

impl ImageDecoder for FakeDecoder {
    fn decode(&self, request: &DecodeRequest<'_>) -> BridgeResult<DynamicImage> {
        self.requests
            .lock()
            .unwrap()
            .push((request.width, request.height, request.prefer_full_color));
        (self.outcome)()
    }
}

fn repo_with(capabilities: RepositoryCapabilities) -> MockRepo {
    let mut repo = MockRepo::new();
    repo.expect_capabilities().return_const(capabilities);
    repo
}

fn pool() -> Arc<BufferPool> {
    Arc::new(BufferPool::new(4, 4096))
}

fn default_size_request(mime_type: &str, quality: i64) -> ThumbnailRequest {
    ThumbnailRequest::builder("content://media/external/images/media/77", mime_type)
        .default_size(128)
        .quality(quality)
        .build()
        .unwrap()
}

#[test]
fn test_resolver_thumbnail_used_first() {
    let mut repo = repo_with(RepositoryCapabilities::default());
    repo.expect_load_thumbnail()
        .times(1)
        .returning(|_, _, _| Ok(Some(DynamicImage::new_rgb8(128, 96))));
    let resolver = ThumbnailResolver::new(
        Arc::new(repo),
        Arc::new(FakeDecoder::unused()),
        Arc::new(UnboundedMemory),
        pool(),
    );
    let thumbnail = resolver.resolve(&default_size_request("image/jpeg", 90)).unwrap();

    assert_eq!(thumbnail.source, "resolver");
    assert_eq!(thumbnail.format, OutputFormat::Jpeg(90));
    assert_eq!(thumbnail.payload.last(), Some(&ENCODED_TRAILER));
}

#[test]
fn test_falls_back_to_decode_with_full_color_hint() {
    let mut repo = repo_with(RepositoryCapabilities::default());
    repo.expect_load_thumbnail()
        .returning(|_, _, _| Err(BridgeError::OperationFailed("no thumbnail".to_string())));
    let decoder = Arc::new(FakeDecoder::new(|| Ok(DynamicImage::new_rgba8(200, 200))));

    let resolver = ThumbnailResolver::new(
        Arc::new(repo),
        decoder.clone(),
        Arc::new(UnboundedMemory),
        pool(),
    );
    let thumbnail = resolver.resolve(&default_size_request("image/png", 100)).unwrap();

    assert_eq!(decoder.requests(), vec![(128, 128, true)]);

    assert_eq!(thumbnail.source, "decode");
    assert_eq!(thumbnail.format, OutputFormat::Png);
    assert_eq!((thumbnail.width, thumbnail.height), (128, 128));
}

#[test]
fn test_flipped_requests_skip_repository_thumbnails() {
    let mut repo = repo_with(RepositoryCapabilities::legacy());
    repo.expect_legacy_thumbnail().never();
    let decoder = Arc::new(FakeDecoder::new(|| Ok(DynamicImage::new_rgb8(50, 50))));

    let resolver = ThumbnailResolver::new(
        Arc::new(repo),
        decoder.clone(),
        Arc::new(UnboundedMemory),
        pool(),
    );
    let request = ThumbnailRequest::builder("content://media/external/images/media/3", "image/jpeg")
        .default_size(128)
        .orientation(0, true)
        .quality(80)
        .build()
        .unwrap();

    assert_eq!(resolver.resolve(&request).unwrap().source, "decode");
    assert_eq!(decoder.requests(), vec![(128, 128, false)]);
}

#[test]
fn test_exhaustion_carries_decoder_error() {
    let mut repo = repo_with(RepositoryCapabilities::default());
    repo.expect_load_thumbnail().returning(|_, _, _| Ok(None));
    let decoder = FakeDecoder::new(|| Err(BridgeError::Decode("corrupt header".to_string())));

    let resolver = ThumbnailResolver::new(
        Arc::new(repo),
        Arc::new(decoder),
        Arc::new(UnboundedMemory),
        pool(),
    );
    let err = resolver
        .resolve(&default_size_request("image/jpeg", 90))
        .unwrap_err();

    match err {
        ThumbnailError::Exhausted { detail, .. } => {
            assert!(detail.unwrap().contains("corrupt header"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_concurrent_resolves_never_share_a_buffer() {
    const THREADS: usize = 8;
    let pool = Arc::new(BufferPool::new(2, 1024));
    let held: Arc<Mutex<HashSet<usize>>> = Arc::new(Mutex::new(HashSet::new()));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let held = Arc::clone(&held);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for round in 0..50 {
                    let mut buffer = pool.acquire();
                    let addr = buffer.as_ptr() as usize;
                    assert!(held.lock().unwrap().insert(addr), "buffer handed out twice");
                    buffer.extend_from_slice(&[round as u8; 64]);
                    if round % 10 == 0 {
                        thread::sleep(Duration::from_millis(1));
                    }
                    held.lock().unwrap().remove(&addr);
                    pool.release(buffer);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert!(pool.idle() <= 2);
}

#[test]
fn test_shared_pool_across_resolvers() {
    let pool = pool();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                let mut repo = repo_with(RepositoryCapabilities::default());
                repo.expect_load_thumbnail()
                    .returning(move |_, _, _| Ok(Some(DynamicImage::new_rgb8(128 + i, 128))));
                let resolver = ThumbnailResolver::new(
                    Arc::new(repo),
                    Arc::new(FakeDecoder::unused()),
                    Arc::new(UnboundedMemory),
                    pool,
                );
                resolver
                    .resolve(&default_size_request("image/jpeg", 70))
                    .unwrap()
                    .payload
            })
        })
        .collect();

    for handle in handles {
        let payload = handle.join().unwrap();
        assert_eq!(&payload[..2], &[0xFF, 0xD8]);
        assert_eq!(payload.last(), Some(&ENCODED_TRAILER));
    }
    assert!(pool.idle() >= 1);
}
