//! Synchronization primitives.
//!
//! Stream delivery uses a bounded [`mpsc`] channel per request, scoped by a
//! [`CancellationToken`]. Closing the consumer side or cancelling the token
//! stops the producer at its next emission.

pub use tokio::sync::{mpsc, oneshot, Mutex, MutexGuard, RwLock, Semaphore};
pub use tokio_util::sync::{CancellationToken, DropGuard};
