//! Byte delivery: fixed-size chunks followed by the success sentinel.

use super::{EventSink, StreamEvent, SUCCESS_SENTINEL};
use crate::error::{CoreError, Result};
use bytes::{Buf, BytesMut};
use core_thumbnail::{ThumbnailRequest, ThumbnailResolver};
use std::io::{self, Read};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Splits a byte source into chunks of `chunk_size`. Only the last chunk may
/// be shorter.
#[derive(Debug, Clone, Copy)]
pub struct ByteStreamer {
    chunk_size: usize,
}

impl ByteStreamer {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Emit `reader` as chunks, then the sentinel.
    ///
    /// A read failure is reported as `streamBytes-exception` and no sentinel
    /// follows. Returns `true` when the sentinel was delivered.
    pub fn stream_from(&self, mut reader: impl Read, sink: &EventSink) -> bool {
        let mut chunks = 0usize;
        loop {
            let mut chunk = BytesMut::zeroed(self.chunk_size);
            let filled = match fill(&mut reader, &mut chunk) {
                Ok(filled) => filled,
                Err(e) => {
                    sink.error("streamBytes", &CoreError::Stream(e));
                    return false;
                }
            };
            if filled == 0 {
                break;
            }
            chunk.truncate(filled);
            if !sink.success(StreamEvent::Bytes(chunk.freeze())) {
                debug!(chunks, "Byte stream cancelled");
                return false;
            }
            chunks += 1;
            if filled < self.chunk_size {
                break;
            }
        }
        sink.success(StreamEvent::Sentinel(SUCCESS_SENTINEL))
    }
}

/// Read until `buf` is full or the source is exhausted.
fn fill(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Resolves a thumbnail and streams its encoded payload.
pub struct ThumbnailStreamer {
    resolver: Arc<ThumbnailResolver>,
    bytes: ByteStreamer,
}

impl ThumbnailStreamer {
    pub fn new(resolver: Arc<ThumbnailResolver>, bytes: ByteStreamer) -> Self {
        Self { resolver, bytes }
    }

    /// Resolution failures become a single `getThumbnail-*` error event.
    #[instrument(skip(self, request, sink), fields(uri = %request.uri()))]
    pub fn stream(&self, request: &ThumbnailRequest, sink: &EventSink) -> Result<()> {
        match self.resolver.resolve(request) {
            Ok(thumbnail) => {
                debug!(bytes = thumbnail.payload.len(), source = thumbnail.source, "Streaming thumbnail");
                self.bytes.stream_from(thumbnail.payload.reader(), sink);
            }
            Err(e) => {
                sink.error("getThumbnail", &CoreError::from(e));
            }
        }
        Ok(())
    }
}
