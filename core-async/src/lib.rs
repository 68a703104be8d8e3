//! Async runtime facade for the gallery media pipeline.
//!
//! Every pipeline crate goes through this crate instead of naming Tokio
//! directly, so that the executor wiring lives in one place.
//!
//! # Modules
//!
//! - `task`: spawning async work and offloading blocking work (cursor
//!   iteration, image decoding) to the blocking pool
//! - `sync`: channels, locks and the cancellation token that scopes a stream
//!   to its consumer
//! - `time`: durations, timeouts and wall-clock helpers
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//!
//! # async fn example() {
//! let rows = task::spawn_blocking(|| {
//!     // iterate a repository cursor here
//!     3usize
//! })
//! .await
//! .unwrap();
//! assert_eq!(rows, 3);
//! # }
//! ```

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::{spawn, spawn_blocking};
pub use time::{sleep, Duration, Instant};
