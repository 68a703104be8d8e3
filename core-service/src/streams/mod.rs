//! # Stream Delivery
//!
//! Ordered, cancellable event streams for catalog scans and thumbnail bytes.
//!
//! ## Protocol
//!
//! Each stream is a bounded channel read by one [`StreamHandle`]:
//!
//! - catalog scans emit one [`StreamEvent::Count`], then record batches
//! - thumbnails emit byte chunks, then [`StreamEvent::Sentinel`]
//! - failures become a single [`StreamEvent::Error`]
//! - [`StreamEvent::EndOfStream`] closes every stream, exactly once
//!
//! ## Guarded execution
//!
//! The producer runs on the blocking pool. A supervising task waits for it,
//! turns an `Err` or a panic into an error event and then emits
//! `EndOfStream`. Producers never emit `EndOfStream` themselves.
//!
//! ## Cancellation
//!
//! [`StreamHandle::cancel`] or dropping the handle triggers the stream's
//! `CancellationToken` and closes the channel. Producers check
//! [`EventSink::is_cancelled`] between rows and chunks; anything emitted after
//! that is dropped with a debug log.

pub mod binary;
pub mod records;

pub use binary::{ByteStreamer, ThumbnailStreamer};
pub use records::RecordStreamer;

use crate::error::{CoreError, ErrorKind, Result};
use bytes::Bytes;
use core_async::sync::{mpsc, CancellationToken};
use core_async::task::{self, JoinHandle};
use core_sync::MediaRecord;
use tracing::{debug, error, warn};

/// Reserved value marking the successful end of a byte stream.
pub const SUCCESS_SENTINEL: i32 = 202;

/// One event on a stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Unfiltered number of rows in the repository
    Count(u64),
    Records(Vec<MediaRecord>),
    Bytes(Bytes),
    /// Always [`SUCCESS_SENTINEL`]
    Sentinel(i32),
    Error {
        code: String,
        kind: ErrorKind,
        message: String,
        details: Option<String>,
    },
    EndOfStream,
}

impl StreamEvent {
    pub fn error(code: impl Into<String>, error: &CoreError) -> Self {
        Self::Error {
            code: code.into(),
            kind: error.kind(),
            message: error.to_string(),
            details: error.details(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::EndOfStream)
    }
}

/// Producer side of a stream.
#[derive(Clone)]
pub struct EventSink {
    sender: mpsc::Sender<StreamEvent>,
    token: CancellationToken,
}

impl EventSink {
    /// True once the consumer cancelled or went away.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.sender.is_closed()
    }

    /// Emit an event from the blocking pool, waiting for channel capacity.
    ///
    /// Returns `false` when the event was dropped because the stream is
    /// cancelled. Must not be called from async code.
    pub fn success(&self, event: StreamEvent) -> bool {
        if self.is_cancelled() {
            debug!(event = event_name(&event), "Stream cancelled, dropping event");
            return false;
        }
        match self.sender.blocking_send(event) {
            Ok(()) => true,
            Err(mpsc::error::SendError(event)) => {
                debug!(event = event_name(&event), "Consumer gone, dropping event");
                false
            }
        }
    }

    /// Emit an error event for `error`, coded for `operation`.
    pub fn error(&self, operation: &str, error: &CoreError) -> bool {
        warn!(code = %error.code(operation), kind = %error.kind(), "Stream error: {}", error);
        self.success(StreamEvent::error(error.code(operation), error))
    }

    async fn emit(&self, event: StreamEvent) {
        if self.token.is_cancelled() {
            debug!(event = event_name(&event), "Stream cancelled, dropping event");
            return;
        }
        if let Err(mpsc::error::SendError(event)) = self.sender.send(event).await {
            debug!(event = event_name(&event), "Consumer gone, dropping event");
        }
    }
}

fn event_name(event: &StreamEvent) -> &'static str {
    match event {
        StreamEvent::Count(_) => "count",
        StreamEvent::Records(_) => "records",
        StreamEvent::Bytes(_) => "bytes",
        StreamEvent::Sentinel(_) => "sentinel",
        StreamEvent::Error { .. } => "error",
        StreamEvent::EndOfStream => "end_of_stream",
    }
}

/// Consumer side of a stream.
///
/// Dropping the handle cancels the stream.
pub struct StreamHandle {
    receiver: mpsc::Receiver<StreamEvent>,
    token: CancellationToken,
    supervisor: Option<JoinHandle<()>>,
}

impl StreamHandle {
    /// Next event, in emission order. `None` once the stream is closed.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }

    /// Stop the producer. Events already buffered can still be received.
    pub fn cancel(&mut self) {
        self.token.cancel();
        self.receiver.close();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Receive every remaining event until the stream closes.
    pub async fn collect(mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.recv().await {
            events.push(event);
        }
        self.join_supervisor().await;
        events
    }

    /// Cancel and wait until the producer has released its resources.
    pub async fn close(mut self) {
        self.cancel();
        self.join_supervisor().await;
    }

    async fn join_supervisor(&mut self) {
        if let Some(supervisor) = self.supervisor.take() {
            if let Err(e) = supervisor.await {
                warn!("Stream supervisor failed: {}", e);
            }
        }
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Run `work` on the blocking pool under a supervisor and return the stream.
///
/// `work` emits through the sink. An `Err` becomes a `safe-exception` error
/// event, a panic a `safe-panic` one. `EndOfStream` follows either way.
///
/// # Panics
///
/// Panics when called outside of a Tokio runtime context.
pub fn spawn_guarded<F>(capacity: usize, work: F) -> StreamHandle
where
    F: FnOnce(&EventSink) -> Result<()> + Send + 'static,
{
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    let token = CancellationToken::new();
    let sink = EventSink {
        sender,
        token: token.clone(),
    };

    let worker_sink = sink.clone();
    let supervisor = task::spawn(async move {
        let outcome = task::spawn_blocking(move || work(&worker_sink)).await;
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!("Stream producer failed: {}", e);
                sink.emit(StreamEvent::error("safe-exception", &e)).await;
            }
            Err(join_error) => {
                let code = if task::is_panic(&join_error) {
                    "safe-panic"
                } else {
                    "safe-exception"
                };
                let message = task::panic_message(join_error);
                error!(code, "Stream producer aborted: {}", message);
                sink.emit(StreamEvent::Error {
                    code: code.to_string(),
                    kind: ErrorKind::Internal,
                    message,
                    details: None,
                })
                .await;
            }
        }
        sink.emit(StreamEvent::EndOfStream).await;
    });

    StreamHandle {
        receiver,
        token,
        supervisor: Some(supervisor),
    }
}
